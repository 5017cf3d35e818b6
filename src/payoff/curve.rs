use crate::contract::{MarketContext, OptionContract, OptionType, PositionConfig};
use crate::errors::{EngineError, EngineResult};
use crate::models::black_scholes::BlackScholes;
use crate::models::{ModelParams, ValuationModel};
use serde::Serialize;

/// Price steps across the full [low, high] window. The curve holds
/// `CURVE_STEPS + 1` samples when the whole window is positive.
pub const CURVE_STEPS: usize = 160;

/// One sample of a payoff curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub underlying_price: f64,
    /// Premium per share at the valuation date.
    pub theoretical_value: f64,
    /// quantity * 100 * (theoretical_value - cost_basis)
    pub position_profit: f64,
}

impl ChartPoint {
    /// Break-even counts as profit.
    #[inline]
    pub fn is_profit(&self) -> bool {
        self.position_profit >= 0.0
    }
}

/// Lazy, finite payoff curve. Cloning it (or calling `restart`) replays the
/// same samples from the start.
#[derive(Debug, Clone)]
pub struct PayoffCurve<M: ValuationModel = BlackScholes> {
    model: M,
    option_type: OptionType,
    strike: f64,
    sigma: f64,
    rate: f64,
    ttl_years: f64,
    cost_basis: f64,
    shares: f64,
    low: f64,
    step: f64,
    steps: usize,
    next_index: usize,
}

impl<M: ValuationModel> PayoffCurve<M> {
    /// Years to expiry every sample is valued at.
    pub fn ttl_years(&self) -> f64 {
        self.ttl_years
    }

    pub fn restart(&mut self) {
        self.next_index = 0;
    }

    /// Theoretical value and position profit at an arbitrary price, using the
    /// same time and volatility context as the curve samples.
    pub fn point_at(&self, underlying_price: f64) -> EngineResult<ChartPoint> {
        let params = ModelParams::new(underlying_price, self.strike, self.ttl_years, self.sigma, self.rate)?;
        Ok(self.sample(&params))
    }

    #[inline]
    fn sample(&self, params: &ModelParams) -> ChartPoint {
        let theoretical_value = self.model.value(params, self.option_type);
        ChartPoint {
            underlying_price: params.spot,
            theoretical_value,
            position_profit: self.shares * (theoretical_value - self.cost_basis),
        }
    }
}

impl<M: ValuationModel> Iterator for PayoffCurve<M> {
    type Item = ChartPoint;

    fn next(&mut self) -> Option<ChartPoint> {
        while self.next_index <= self.steps && self.steps > 0 {
            let price = self.low + self.step * self.next_index as f64;
            self.next_index += 1;
            // Wide ranges dip below zero; the model has no value there.
            if price <= 0.0 {
                continue;
            }
            let params = ModelParams::from_validated(price, self.strike, self.ttl_years, self.sigma, self.rate);
            return Some(self.sample(&params));
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.steps == 0 { 0 } else { (self.steps + 1).saturating_sub(self.next_index) };
        (0, Some(remaining))
    }
}

/// Payoff curve over `current_spot * (1 ± range_percent / 100)`, valued
/// `days_in_future` days after `market.as_of`.
///
/// Prices are strictly increasing. A non-positive range yields an empty
/// curve. An invalid contract or spot, a non-finite day shift, or a range
/// too wide to sample in finite steps fails with `InvalidInput`.
pub fn generate_curve(
    current_spot: f64,
    range_percent: f64,
    contract: &OptionContract,
    config: &PositionConfig,
    days_in_future: f64,
    market: &MarketContext,
) -> EngineResult<PayoffCurve> {
    generate_curve_with(BlackScholes::new(), current_spot, range_percent, contract, config, days_in_future, market)
}

pub fn generate_curve_with<M: ValuationModel>(
    model: M,
    current_spot: f64,
    range_percent: f64,
    contract: &OptionContract,
    config: &PositionConfig,
    days_in_future: f64,
    market: &MarketContext,
) -> EngineResult<PayoffCurve<M>> {
    contract.validate()?;
    // Validates spot and rate the same way a single price() call would.
    ModelParams::new(current_spot, contract.strike, 0.0, contract.implied_volatility, market.risk_free_rate)?;

    let ttl_years = market.checked_years_to_expiry(contract, days_in_future)?;
    let (low, step, steps) = if range_percent.is_finite() && range_percent > 0.0 {
        let half_width = current_spot * range_percent / 100.0;
        let step = 2.0 * half_width / CURVE_STEPS as f64;
        if !(step.is_finite() && (current_spot + half_width).is_finite()) {
            return Err(EngineError::invalid_input(format!(
                "range of {range_percent}% around {current_spot} overflows the price axis"
            )));
        }
        (current_spot - half_width, step, CURVE_STEPS)
    } else {
        (current_spot, 0.0, 0)
    };

    tracing::debug!(
        model = model.name(),
        spot = current_spot,
        range_percent,
        days_in_future,
        ttl_years,
        steps,
        "payoff curve"
    );

    Ok(PayoffCurve {
        model,
        option_type: contract.option_type,
        strike: contract.strike,
        sigma: contract.implied_volatility,
        rate: market.risk_free_rate,
        ttl_years,
        cost_basis: config.cost_basis(contract),
        shares: config.shares(),
        low,
        step,
        steps,
        next_index: 0,
    })
}

/// Curve split for two-colour rendering.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PartitionedCurve {
    /// position_profit >= 0
    pub profit: Vec<ChartPoint>,
    /// position_profit < 0
    pub loss: Vec<ChartPoint>,
}

pub fn partition(points: impl IntoIterator<Item = ChartPoint>) -> PartitionedCurve {
    let (profit, loss) = points.into_iter().partition(ChartPoint::is_profit);
    PartitionedCurve { profit, loss }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::tests::{as_of, sample_contract};
    use crate::models::black_scholes::price;

    fn market() -> MarketContext {
        MarketContext::new(0.014, as_of())
    }

    #[test]
    fn test_strictly_increasing() {
        let contract = sample_contract(OptionType::Call);
        let curve = generate_curve(150.0, 9.0, &contract, &PositionConfig::default(), 0.0, &market()).unwrap();
        let points: Vec<_> = curve.collect();
        assert_eq!(points.len(), CURVE_STEPS + 1);
        assert!(points.windows(2).all(|w| w[1].underlying_price > w[0].underlying_price));
        assert!((points[0].underlying_price - 136.5).abs() < 1e-9);
        assert!((points[CURVE_STEPS].underlying_price - 163.5).abs() < 1e-9);
    }

    #[test]
    fn test_points_use_position_formula() {
        let contract = sample_contract(OptionType::Put);
        let config = PositionConfig::new(2, Some(4.0)).unwrap();
        let m = market();
        let curve = generate_curve(150.0, 5.0, &contract, &config, 10.0, &m).unwrap();
        let t = (91.0 - 10.0) / 365.0;
        assert!((curve.ttl_years() - t).abs() < 1e-12);
        for p in curve {
            let v = price(p.underlying_price, 150.0, t, 0.3, 0.014, OptionType::Put).unwrap();
            assert_eq!(p.theoretical_value, v);
            assert_eq!(p.position_profit, 200.0 * (v - 4.0));
        }
    }

    #[test]
    fn test_restartable() {
        let contract = sample_contract(OptionType::Call);
        let mut curve = generate_curve(150.0, 9.0, &contract, &PositionConfig::default(), 0.0, &market()).unwrap();
        let first: Vec<_> = curve.clone().collect();
        let drained: Vec<_> = curve.by_ref().collect();
        assert_eq!(curve.next(), None);
        curve.restart();
        let again: Vec<_> = curve.collect();
        assert_eq!(first, drained);
        assert_eq!(first, again);
    }

    #[test]
    fn test_empty_when_range_not_positive() {
        let contract = sample_contract(OptionType::Call);
        let cfg = PositionConfig::default();
        assert_eq!(generate_curve(150.0, 0.0, &contract, &cfg, 0.0, &market()).unwrap().count(), 0);
        assert_eq!(generate_curve(150.0, -3.0, &contract, &cfg, 0.0, &market()).unwrap().count(), 0);
    }

    #[test]
    fn test_wide_range_skips_non_positive_prices() {
        let contract = sample_contract(OptionType::Call);
        let points: Vec<_> = generate_curve(150.0, 150.0, &contract, &PositionConfig::default(), 0.0, &market())
            .unwrap()
            .collect();
        assert!(!points.is_empty());
        assert!(points.iter().all(|p| p.underlying_price > 0.0));
        assert!(points.len() < CURVE_STEPS + 1);
    }

    #[test]
    fn test_overflowing_range_rejected() {
        let contract = sample_contract(OptionType::Call);
        let cfg = PositionConfig::default();
        let err = generate_curve(150.0, 1e308, &contract, &cfg, 0.0, &market()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)), "{err}");

        // Huge but representable ranges still sample cleanly
        let points: Vec<_> = generate_curve(150.0, 1e12, &contract, &cfg, 0.0, &market()).unwrap().collect();
        assert!(!points.is_empty());
        assert!(points.iter().all(|p| p.underlying_price.is_finite() && p.theoretical_value.is_finite()));
        assert!(points.windows(2).all(|w| w[1].underlying_price > w[0].underlying_price));
    }

    #[test]
    fn test_non_finite_days_in_future_rejected() {
        let contract = sample_contract(OptionType::Call);
        let cfg = PositionConfig::default();
        for days in [f64::NEG_INFINITY, f64::INFINITY, f64::NAN] {
            let err = generate_curve(150.0, 9.0, &contract, &cfg, days, &market()).unwrap_err();
            assert!(matches!(err, EngineError::InvalidInput(_)), "{days}: {err}");
        }
    }

    #[test]
    fn test_invalid_contract_rejected() {
        let mut contract = sample_contract(OptionType::Call);
        contract.implied_volatility = 0.0;
        assert!(generate_curve(150.0, 9.0, &contract, &PositionConfig::default(), 0.0, &market()).is_err());
        let contract = sample_contract(OptionType::Call);
        assert!(generate_curve(0.0, 9.0, &contract, &PositionConfig::default(), 0.0, &market()).is_err());
    }

    #[test]
    fn test_expired_curve_is_intrinsic() {
        let contract = sample_contract(OptionType::Call);
        let curve = generate_curve(150.0, 9.0, &contract, &PositionConfig::default(), 91.0, &market()).unwrap();
        assert_eq!(curve.ttl_years(), 0.0);
        for p in curve {
            assert_eq!(p.theoretical_value, (p.underlying_price - 150.0).max(0.0));
        }
    }

    #[test]
    fn test_partition_zero_is_profit() {
        let at = |x: f64, profit: f64| ChartPoint { underlying_price: x, theoretical_value: 0.0, position_profit: profit };
        let split = partition(vec![at(1.0, -0.01), at(2.0, 0.0), at(3.0, -0.0), at(4.0, 12.5)]);
        assert_eq!(split.profit.len(), 3);
        assert_eq!(split.loss.len(), 1);
        assert_eq!(split.loss[0].underlying_price, 1.0);
        assert!(split.profit.iter().any(|p| p.underlying_price == 2.0));
    }

    #[test]
    fn test_partition_of_curve_preserves_order() {
        let contract = sample_contract(OptionType::Call);
        let curve = generate_curve(150.0, 20.0, &contract, &PositionConfig::default(), 0.0, &market()).unwrap();
        let split = partition(curve);
        assert!(!split.profit.is_empty() && !split.loss.is_empty());
        assert!(split.profit.iter().all(|p| p.position_profit >= 0.0));
        assert!(split.loss.iter().all(|p| p.position_profit < 0.0));
        assert!(split.profit.windows(2).all(|w| w[1].underlying_price > w[0].underlying_price));
    }

    #[test]
    fn test_point_at_matches_curve_context() {
        let contract = sample_contract(OptionType::Call);
        let curve = generate_curve(150.0, 9.0, &contract, &PositionConfig::default(), 30.0, &market()).unwrap();
        let p = curve.point_at(160.0).unwrap();
        let v = price(160.0, 150.0, curve.ttl_years(), 0.3, 0.014, OptionType::Call).unwrap();
        assert_eq!(p.theoretical_value, v);
        assert!(curve.point_at(-1.0).is_err());
    }
}
