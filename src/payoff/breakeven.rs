use crate::contract::{MarketContext, OptionContract, OptionType, PositionConfig};
use crate::errors::EngineResult;
use crate::models::greeks;

/// Underlying price at expiry where the position neither gains nor loses.
#[inline]
pub fn breakeven(contract: &OptionContract, config: &PositionConfig) -> f64 {
    let basis = config.cost_basis(contract);
    match contract.option_type {
        OptionType::Call => contract.strike + basis,
        OptionType::Put => contract.strike - basis,
    }
}

/// Rough odds of finishing past breakeven, in percent.
///
/// Delta of a contract struck at the breakeven price, valued at the current
/// spot with the contract's own volatility. Time runs over the whole days
/// between now and the expiry stamp, without the expiry day itself. A put
/// whose premium eats the whole strike can never profit and scores zero.
pub fn chance_of_profit(
    spot: f64,
    contract: &OptionContract,
    config: &PositionConfig,
    market: &MarketContext,
) -> EngineResult<f64> {
    contract.validate()?;
    let target = breakeven(contract, config);
    if target <= 0.0 {
        return Ok(0.0);
    }
    let d = greeks::delta(
        spot,
        target,
        market.years_to_expiry(contract, 1.0),
        contract.implied_volatility,
        market.risk_free_rate,
        contract.option_type,
    )?;
    Ok(100.0 * d.abs())
}
