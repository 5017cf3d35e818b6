use crate::contract::OptionType;
use crate::errors::EngineResult;
use crate::models::{ModelParams, ValuationModel};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

/// Black-Scholes European option valuation.
///
/// d1 = (ln(S/K) + (r + sigma^2/2)*T) / (sigma * sqrt(T))
/// d2 = d1 - sigma * sqrt(T)
/// C  = S * Phi(d1) - K * e^(-rT) * Phi(d2)
/// P  = K * e^(-rT) * Phi(-d2) - S * Phi(-d1)
///
/// At T = 0 the contract is worth its intrinsic value.
/// All computation uses precomputed ModelParams. No allocations.
#[derive(Debug, Clone)]
pub struct BlackScholes {
    /// Standard normal distribution (created once, reused)
    normal: Normal,
}

impl BlackScholes {
    pub fn new() -> Self {
        Self { normal: Normal::standard() }
    }

    /// Standard normal CDF
    #[inline]
    pub fn cdf(&self, x: f64) -> f64 {
        self.normal.cdf(x)
    }

    /// Standard normal density
    #[inline]
    pub fn pdf(&self, x: f64) -> f64 {
        self.normal.pdf(x)
    }
}

impl Default for BlackScholes {
    fn default() -> Self {
        Self::new()
    }
}

impl ValuationModel for BlackScholes {
    #[inline]
    fn name(&self) -> &'static str {
        "Black-Scholes"
    }

    #[inline]
    fn value(&self, params: &ModelParams, option_type: OptionType) -> f64 {
        if params.is_expired() {
            return option_type.intrinsic(params.spot, params.strike);
        }

        let k_disc = params.strike * params.discount;
        match option_type {
            OptionType::Call => params.spot * self.cdf(params.d1) - k_disc * self.cdf(params.d2),
            OptionType::Put => k_disc * self.cdf(-params.d2) - params.spot * self.cdf(-params.d1),
        }
    }
}

/// Theoretical premium per share.
/// Fails with `InvalidInput` on non-positive spot, strike or volatility.
pub fn price(
    spot: f64,
    strike: f64,
    ttl_years: f64,
    volatility: f64,
    risk_free_rate: f64,
    option_type: OptionType,
) -> EngineResult<f64> {
    let params = ModelParams::new(spot, strike, ttl_years, volatility, risk_free_rate)?;
    Ok(BlackScholes::new().value(&params, option_type))
}
