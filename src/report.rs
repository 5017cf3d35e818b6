use crate::chain::{Direction, Quote};
use crate::contract::{MarketContext, OptionContract, PositionConfig};
use crate::errors::EngineResult;
use crate::models::black_scholes::BlackScholes;
use crate::models::greeks::Greeks;
use crate::models::{ModelParams, ValuationModel};
use crate::payoff::breakeven::{breakeven, chance_of_profit};
use crate::payoff::curve::{generate_curve, partition, PartitionedCurve};
use crate::payoff::decay::{decay_series, DecayPoint};
use crate::payoff::settlement::{exercise_breakdown, sell_breakdown, ExerciseBreakdown, SellBreakdown};
use chrono::{DateTime, Utc};
use serde::Serialize;

// ── Report (everything the dashboard draws for one contract) ──

#[derive(Debug, Clone, Serialize)]
pub struct QuoteSummary {
    pub symbol: String,
    pub price: f64,
    pub previous_close: f64,
    pub change: f64,
    pub percent_change: f64,
    pub direction: Direction,
}

impl From<&Quote> for QuoteSummary {
    fn from(q: &Quote) -> Self {
        Self {
            symbol: q.symbol.clone(),
            price: q.price,
            previous_close: q.previous_close,
            change: q.change(),
            percent_change: q.percent_change(),
            direction: q.direction(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PositionSummary {
    pub quantity: u32,
    pub average_cost: Option<f64>,
    pub cost_basis: f64,
    /// quantity * 100 * cost_basis
    pub total_cost: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub model: &'static str,
    pub risk_free_rate: f64,
    pub quote: QuoteSummary,
    pub contract: OptionContract,
    pub position: PositionSummary,
    pub days_to_expiration: f64,
    pub days_in_future: f64,
    /// Years to expiry at the shifted valuation date.
    pub ttl_years: f64,
    /// Premium per share at live spot on the shifted valuation date.
    pub theoretical_value: f64,
    /// Raw annual sensitivities at live spot today.
    pub greeks: Greeks,
    pub greeks_display: Greeks,
    pub breakeven: f64,
    pub chance_of_profit: f64,
    pub range_percent: f64,
    pub curve: PartitionedCurve,
    pub decay: Vec<DecayPoint>,
    pub exercise: ExerciseBreakdown,
    pub sell: SellBreakdown,
}

/// Inputs the user controls between redraws.
#[derive(Debug, Clone, Copy)]
pub struct ReportRequest {
    pub range_percent: f64,
    pub days_in_future: f64,
    /// Underlying price the exit cards are evaluated at.
    pub exit_price: f64,
}

impl Report {
    pub fn build(
        quote: &Quote,
        contract: &OptionContract,
        position: &PositionConfig,
        market: &MarketContext,
        request: ReportRequest,
    ) -> EngineResult<Self> {
        contract.validate()?;
        let bs = BlackScholes::new();
        let spot = quote.price;

        let today = ModelParams::new(
            spot,
            contract.strike,
            market.years_to_expiry(contract, 0.0),
            contract.implied_volatility,
            market.risk_free_rate,
        )?;
        let greeks = Greeks::compute(&bs, &today, contract.option_type);

        let curve = generate_curve(
            spot,
            request.range_percent,
            contract,
            position,
            request.days_in_future,
            market,
        )?;
        let ttl_years = curve.ttl_years();
        let theoretical_value = curve.point_at(spot)?.theoretical_value;

        let cost_basis = position.cost_basis(contract);

        Ok(Self {
            generated_at: market.as_of,
            model: bs.name(),
            risk_free_rate: market.risk_free_rate,
            quote: QuoteSummary::from(quote),
            contract: contract.clone(),
            position: PositionSummary {
                quantity: position.quantity,
                average_cost: position.average_cost,
                cost_basis,
                total_cost: position.shares() * cost_basis,
            },
            days_to_expiration: contract.days_to_expiration(market.as_of),
            days_in_future: request.days_in_future,
            ttl_years,
            theoretical_value,
            greeks,
            greeks_display: greeks.for_display(),
            breakeven: breakeven(contract, position),
            chance_of_profit: chance_of_profit(spot, contract, position, market)?,
            range_percent: request.range_percent,
            curve: partition(curve),
            decay: decay_series(spot, contract, market)?,
            exercise: exercise_breakdown(request.exit_price, contract, position),
            sell: sell_breakdown(request.exit_price, contract, position, request.days_in_future, market)?,
        })
    }
}
