//! Option pricing, Greeks and payoff engine behind the strikeboard dashboard,
//! plus the read-only quote feed that supplies it.

pub mod chain;
pub mod config;
pub mod contract;
pub mod errors;
pub mod feeds;
pub mod models;
pub mod payoff;
pub mod report;

pub use contract::{MarketContext, OptionContract, OptionType, PositionConfig};
pub use errors::{EngineError, EngineResult};
