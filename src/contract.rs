use crate::errors::{EngineError, EngineResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Shares delivered per equity option contract.
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

/// Calendar days per year used for every time-to-expiry conversion.
pub const DAYS_PER_YEAR: f64 = 365.0;

// ── Option Type ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Intrinsic value at the given spot.
    #[inline]
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            Self::Call => (spot - strike).max(0.0),
            Self::Put => (strike - spot).max(0.0),
        }
    }
}

impl std::fmt::Display for OptionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Put => write!(f, "put"),
        }
    }
}

impl std::str::FromStr for OptionType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "calls" | "c" => Ok(Self::Call),
            "put" | "puts" | "p" => Ok(Self::Put),
            other => Err(EngineError::invalid_input(format!("unknown option type: {other}"))),
        }
    }
}

// ── Option Contract ──

/// Immutable snapshot of one listed contract as reported by the quote provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    pub contract_symbol: Option<String>,
    pub option_type: OptionType,
    pub strike: f64,
    /// Last traded premium per share.
    pub last_price: f64,
    /// Annualized, as a fraction (0.25 = 25%).
    pub implied_volatility: f64,
    /// Unix seconds.
    pub expiration: i64,
    /// Display only.
    pub percent_change: f64,
    /// Display only.
    pub change: f64,
}

impl OptionContract {
    /// Rejects contracts the pricing model cannot value.
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.strike.is_finite() && self.strike > 0.0) {
            return Err(EngineError::invalid_input(format!("strike must be > 0, got {}", self.strike)));
        }
        if !(self.implied_volatility.is_finite() && self.implied_volatility > 0.0) {
            return Err(EngineError::invalid_input(format!(
                "implied volatility must be > 0, got {}",
                self.implied_volatility
            )));
        }
        if !(self.last_price.is_finite() && self.last_price >= 0.0) {
            return Err(EngineError::invalid_input(format!(
                "last price must be >= 0, got {}",
                self.last_price
            )));
        }
        Ok(())
    }

    pub fn expiration_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expiration, 0)
    }

    /// Whole calendar days until expiration, counting the expiry day itself.
    /// The provider stamps expirations at 00:00 UTC, so the stamp passes
    /// before the session opens; the expiry day keeps one day left until it
    /// ends. Zero from the following day on.
    pub fn days_to_expiration(&self, as_of: DateTime<Utc>) -> f64 {
        match self.expiration_time() {
            Some(expiry) if expiry > as_of => ((expiry - as_of).num_days() + 1) as f64,
            Some(expiry) if expiry + Duration::days(1) > as_of => 1.0,
            _ => 0.0,
        }
    }
}

// ── Position Config ──

/// User overrides for the position being analysed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionConfig {
    pub quantity: u32,
    /// Cost basis per share; the contract's last price when absent.
    pub average_cost: Option<f64>,
}

impl PositionConfig {
    pub fn new(quantity: u32, average_cost: Option<f64>) -> EngineResult<Self> {
        if quantity == 0 {
            return Err(EngineError::invalid_input("quantity must be at least 1"));
        }
        if let Some(cost) = average_cost {
            if !(cost.is_finite() && cost >= 0.0) {
                return Err(EngineError::invalid_input(format!("average cost must be >= 0, got {cost}")));
            }
        }
        Ok(Self { quantity, average_cost })
    }

    #[inline]
    pub fn cost_basis(&self, contract: &OptionContract) -> f64 {
        self.average_cost.unwrap_or(contract.last_price)
    }

    /// Quantity times the contract multiplier: shares controlled.
    #[inline]
    pub fn shares(&self) -> f64 {
        self.quantity as f64 * CONTRACT_MULTIPLIER
    }
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self { quantity: 1, average_cost: None }
    }
}

// ── Market Context ──

/// Rate and valuation clock shared by every calculation in one redraw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketContext {
    pub risk_free_rate: f64,
    pub as_of: DateTime<Utc>,
}

impl MarketContext {
    pub fn new(risk_free_rate: f64, as_of: DateTime<Utc>) -> Self {
        Self { risk_free_rate, as_of }
    }

    /// Years to expiry after moving the valuation date `days_in_future` days
    /// forward. Never negative.
    #[inline]
    pub fn years_to_expiry(&self, contract: &OptionContract, days_in_future: f64) -> f64 {
        ((contract.days_to_expiration(self.as_of) - days_in_future) / DAYS_PER_YEAR).max(0.0)
    }

    /// `years_to_expiry` for a caller-supplied day shift. NaN and infinite
    /// shifts fail with `InvalidInput` instead of collapsing to expiry.
    pub fn checked_years_to_expiry(&self, contract: &OptionContract, days_in_future: f64) -> EngineResult<f64> {
        if !days_in_future.is_finite() {
            return Err(EngineError::invalid_input(format!(
                "days in future must be finite, got {days_in_future}"
            )));
        }
        Ok(self.years_to_expiry(contract, days_in_future))
    }
}
