//! First-order Black-Scholes sensitivities.
//!
//! Raw figures are annual and per unit: theta per year, vega per 1.0 change
//! in volatility, rho per 1.0 change in rate. `Greeks::for_display` rescales
//! them to the per-day / per-point convention the dashboard shows.
//!
//! At T = 0 every Greek is zero except delta, which steps with moneyness.

use crate::contract::{OptionType, DAYS_PER_YEAR};
use crate::errors::EngineResult;
use crate::models::black_scholes::BlackScholes;
use crate::models::ModelParams;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Greeks {
    /// dV/dS
    pub delta: f64,
    /// d2V/dS2
    pub gamma: f64,
    /// dV/dt
    pub theta: f64,
    /// dV/dsigma
    pub vega: f64,
    /// dV/dr
    pub rho: f64,
}

impl Greeks {
    /// All five sensitivities from one set of precomputed parameters.
    pub fn compute(bs: &BlackScholes, params: &ModelParams, option_type: OptionType) -> Self {
        if params.is_expired() {
            return Self {
                delta: expired_delta(params, option_type),
                ..Self::default()
            };
        }
        Self {
            delta: delta_of(bs, params, option_type),
            gamma: gamma_of(bs, params),
            theta: theta_of(bs, params, option_type),
            vega: vega_of(bs, params),
            rho: rho_of(bs, params, option_type),
        }
    }

    /// Theta per calendar day, vega and rho per percentage point.
    pub fn for_display(&self) -> Self {
        Self {
            delta: self.delta,
            gamma: self.gamma,
            theta: self.theta / DAYS_PER_YEAR,
            vega: self.vega / 100.0,
            rho: self.rho / 100.0,
        }
    }
}

// ── Per-Greek entry points ──

pub fn delta(spot: f64, strike: f64, ttl_years: f64, volatility: f64, rate: f64, option_type: OptionType) -> EngineResult<f64> {
    let params = ModelParams::new(spot, strike, ttl_years, volatility, rate)?;
    if params.is_expired() {
        return Ok(expired_delta(&params, option_type));
    }
    Ok(delta_of(&BlackScholes::new(), &params, option_type))
}

/// Identical for calls and puts.
pub fn gamma(spot: f64, strike: f64, ttl_years: f64, volatility: f64, rate: f64, _option_type: OptionType) -> EngineResult<f64> {
    let params = ModelParams::new(spot, strike, ttl_years, volatility, rate)?;
    if params.is_expired() {
        return Ok(0.0);
    }
    Ok(gamma_of(&BlackScholes::new(), &params))
}

pub fn theta(spot: f64, strike: f64, ttl_years: f64, volatility: f64, rate: f64, option_type: OptionType) -> EngineResult<f64> {
    let params = ModelParams::new(spot, strike, ttl_years, volatility, rate)?;
    if params.is_expired() {
        return Ok(0.0);
    }
    Ok(theta_of(&BlackScholes::new(), &params, option_type))
}

/// Identical for calls and puts.
pub fn vega(spot: f64, strike: f64, ttl_years: f64, volatility: f64, rate: f64, _option_type: OptionType) -> EngineResult<f64> {
    let params = ModelParams::new(spot, strike, ttl_years, volatility, rate)?;
    if params.is_expired() {
        return Ok(0.0);
    }
    Ok(vega_of(&BlackScholes::new(), &params))
}

pub fn rho(spot: f64, strike: f64, ttl_years: f64, volatility: f64, rate: f64, option_type: OptionType) -> EngineResult<f64> {
    let params = ModelParams::new(spot, strike, ttl_years, volatility, rate)?;
    if params.is_expired() {
        return Ok(0.0);
    }
    Ok(rho_of(&BlackScholes::new(), &params, option_type))
}

// ── Formulas (T > 0) ──

#[inline]
fn expired_delta(params: &ModelParams, option_type: OptionType) -> f64 {
    match option_type {
        OptionType::Call => if params.spot > params.strike { 1.0 } else { 0.0 },
        OptionType::Put => if params.spot < params.strike { -1.0 } else { 0.0 },
    }
}

#[inline]
fn delta_of(bs: &BlackScholes, params: &ModelParams, option_type: OptionType) -> f64 {
    match option_type {
        OptionType::Call => bs.cdf(params.d1),
        OptionType::Put => bs.cdf(params.d1) - 1.0,
    }
}

#[inline]
fn gamma_of(bs: &BlackScholes, params: &ModelParams) -> f64 {
    bs.pdf(params.d1) / (params.spot * params.sigma_sqrt_t)
}

#[inline]
fn theta_of(bs: &BlackScholes, params: &ModelParams, option_type: OptionType) -> f64 {
    let decay = -params.spot * bs.pdf(params.d1) * params.sigma / (2.0 * params.sqrt_t);
    let carry = params.rate * params.strike * params.discount;
    match option_type {
        OptionType::Call => decay - carry * bs.cdf(params.d2),
        OptionType::Put => decay + carry * bs.cdf(-params.d2),
    }
}

#[inline]
fn vega_of(bs: &BlackScholes, params: &ModelParams) -> f64 {
    params.spot * bs.pdf(params.d1) * params.sqrt_t
}

#[inline]
fn rho_of(bs: &BlackScholes, params: &ModelParams, option_type: OptionType) -> f64 {
    let k_t_disc = params.strike * params.ttl_years * params.discount;
    match option_type {
        OptionType::Call => k_t_disc * bs.cdf(params.d2),
        OptionType::Put => -k_t_disc * bs.cdf(-params.d2),
    }
}
