pub mod black_scholes;
pub mod greeks;

use crate::contract::OptionType;
use crate::errors::{EngineError, EngineResult};

/// All valuation models implement this trait.
/// value() must be a pure function: deterministic output from inputs only.
pub trait ValuationModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Theoretical premium per share. Never panics, never NaN for
    /// parameters built through `ModelParams::new`.
    fn value(&self, params: &ModelParams, option_type: OptionType) -> f64;
}

// ── Precomputed model parameters (stack, no alloc) ──

#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct ModelParams {
    pub spot: f64,
    pub strike: f64,
    pub ttl_years: f64,
    pub sigma: f64,
    pub rate: f64,
    // Precomputed
    pub sqrt_t: f64,
    pub sigma_sqrt_t: f64,
    /// e^(-rT)
    pub discount: f64,
    /// Only meaningful when `ttl_years > 0`.
    pub d1: f64,
    pub d2: f64,
}

impl ModelParams {
    /// Validates inputs and precomputes d1/d2. A non-positive time to expiry
    /// is clamped to zero; the model then prices at intrinsic value.
    pub fn new(spot: f64, strike: f64, ttl_years: f64, sigma: f64, rate: f64) -> EngineResult<Self> {
        if !(spot.is_finite() && spot > 0.0) {
            return Err(EngineError::invalid_input(format!("spot must be > 0, got {spot}")));
        }
        if !(strike.is_finite() && strike > 0.0) {
            return Err(EngineError::invalid_input(format!("strike must be > 0, got {strike}")));
        }
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(EngineError::invalid_input(format!("volatility must be > 0, got {sigma}")));
        }
        if ttl_years.is_nan() || ttl_years == f64::INFINITY {
            return Err(EngineError::invalid_input(format!("time to expiry must be finite, got {ttl_years}")));
        }
        if !rate.is_finite() {
            return Err(EngineError::invalid_input(format!("risk-free rate must be finite, got {rate}")));
        }
        Ok(Self::from_validated(spot, strike, ttl_years, sigma, rate))
    }

    /// Hot-path constructor for callers that already validated strike and
    /// volatility and only vary spot across a positive grid.
    #[inline]
    pub(crate) fn from_validated(spot: f64, strike: f64, ttl_years: f64, sigma: f64, rate: f64) -> Self {
        let ttl_years = ttl_years.max(0.0);
        let sqrt_t = ttl_years.sqrt();
        let sigma_sqrt_t = sigma * sqrt_t;
        let discount = (-rate * ttl_years).exp();
        let (d1, d2) = if ttl_years > 0.0 {
            let d1 = ((spot / strike).ln() + (rate + 0.5 * sigma * sigma) * ttl_years) / sigma_sqrt_t;
            (d1, d1 - sigma_sqrt_t)
        } else {
            (0.0, 0.0)
        };
        Self {
            spot,
            strike,
            ttl_years,
            sigma,
            rate,
            sqrt_t,
            sigma_sqrt_t,
            discount,
            d1,
            d2,
        }
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.ttl_years <= 0.0
    }
}
