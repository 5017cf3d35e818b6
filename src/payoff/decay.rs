use crate::contract::{MarketContext, OptionContract, DAYS_PER_YEAR};
use crate::errors::EngineResult;
use crate::models::black_scholes::BlackScholes;
use crate::models::{ModelParams, ValuationModel};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecayPoint {
    /// Days after `as_of`.
    pub day: u32,
    pub value: f64,
}

/// Value of the contract at a fixed spot for each whole day from `as_of`
/// until the last day before expiry. Empty for an expired contract.
pub fn decay_series(spot: f64, contract: &OptionContract, market: &MarketContext) -> EngineResult<Vec<DecayPoint>> {
    contract.validate()?;
    ModelParams::new(spot, contract.strike, 0.0, contract.implied_volatility, market.risk_free_rate)?;

    let bs = BlackScholes::new();
    let days = contract.days_to_expiration(market.as_of) as u32;
    let series = (0..days)
        .map(|day| {
            let ttl = (days - day) as f64 / DAYS_PER_YEAR;
            let params = ModelParams::from_validated(
                spot,
                contract.strike,
                ttl,
                contract.implied_volatility,
                market.risk_free_rate,
            );
            DecayPoint {
                day,
                value: bs.value(&params, contract.option_type),
            }
        })
        .collect();
    Ok(series)
}
