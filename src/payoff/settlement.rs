/// Exit scenarios for a clicked point on the payoff curve.
///
/// Exercise (call): pay premium + strike per share, receive shares worth the
/// clicked price.
///   cost     = q * 100 * (cost_basis + K)
///   proceeds = q * 100 * S
/// Exercise (put) mirrors it: buy the shares at S to deliver at K.
///   cost     = q * 100 * (cost_basis + S)
///   proceeds = q * 100 * K
///
/// Sell: close the contract at its theoretical value.
///   cost   = q * 100 * cost_basis
///   return = q * 100 * (V(S) - cost_basis)
///
/// Every figure is computed from unrounded inputs. Pure functions.

use crate::contract::{MarketContext, OptionContract, OptionType, PositionConfig};
use crate::errors::EngineResult;
use crate::models::black_scholes::BlackScholes;
use crate::models::{ModelParams, ValuationModel};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExerciseBreakdown {
    pub underlying_price: f64,
    pub cost: f64,
    pub proceeds: f64,
    pub net_return: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SellBreakdown {
    pub underlying_price: f64,
    pub cost: f64,
    /// Position value at the theoretical premium.
    pub value: f64,
    pub net_return: f64,
    /// net_return as a percentage of cost. Zero when the cost basis is zero.
    pub return_percent: f64,
}

pub fn exercise_breakdown(underlying_price: f64, contract: &OptionContract, config: &PositionConfig) -> ExerciseBreakdown {
    let shares = config.shares();
    let basis = config.cost_basis(contract);
    let (cost, proceeds) = match contract.option_type {
        OptionType::Call => (shares * (basis + contract.strike), shares * underlying_price),
        OptionType::Put => (shares * (basis + underlying_price), shares * contract.strike),
    };
    ExerciseBreakdown {
        underlying_price,
        cost,
        proceeds,
        net_return: proceeds - cost,
    }
}

#[inline]
pub fn exercise_return(underlying_price: f64, contract: &OptionContract, config: &PositionConfig) -> f64 {
    exercise_breakdown(underlying_price, contract, config).net_return
}

/// Fails with `InvalidInput` when the contract, price or day shift cannot be
/// valued.
pub fn sell_breakdown(
    underlying_price: f64,
    contract: &OptionContract,
    config: &PositionConfig,
    days_in_future: f64,
    market: &MarketContext,
) -> EngineResult<SellBreakdown> {
    contract.validate()?;
    let params = ModelParams::new(
        underlying_price,
        contract.strike,
        market.checked_years_to_expiry(contract, days_in_future)?,
        contract.implied_volatility,
        market.risk_free_rate,
    )?;
    let theoretical = BlackScholes::new().value(&params, contract.option_type);

    let shares = config.shares();
    let basis = config.cost_basis(contract);
    let cost = shares * basis;
    let net_return = shares * (theoretical - basis);
    let return_percent = if cost > 0.0 { 100.0 * net_return / cost } else { 0.0 };

    Ok(SellBreakdown {
        underlying_price,
        cost,
        value: shares * theoretical,
        net_return,
        return_percent,
    })
}

#[inline]
pub fn sell_return(
    underlying_price: f64,
    contract: &OptionContract,
    config: &PositionConfig,
    days_in_future: f64,
    market: &MarketContext,
) -> EngineResult<f64> {
    Ok(sell_breakdown(underlying_price, contract, config, days_in_future, market)?.net_return)
}
