use crate::contract::{OptionContract, OptionType};
use serde::Serialize;

// ── Underlying Quote ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Gain,
    Loss,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub previous_close: f64,
}

impl Quote {
    #[inline]
    pub fn change(&self) -> f64 {
        self.price - self.previous_close
    }

    #[inline]
    pub fn percent_change(&self) -> f64 {
        if self.previous_close > 0.0 {
            100.0 * self.change() / self.previous_close
        } else {
            0.0
        }
    }

    /// Unchanged days render as a loss.
    #[inline]
    pub fn direction(&self) -> Direction {
        if self.change() > 0.0 {
            Direction::Gain
        } else {
            Direction::Loss
        }
    }
}

// ── Option Chain (one expiration) ──

#[derive(Debug, Clone, Default, Serialize)]
pub struct OptionChain {
    pub underlying: String,
    /// Every listed expiration, Unix seconds.
    pub expiration_dates: Vec<i64>,
    /// The expiration `calls`/`puts` belong to.
    pub expiration: Option<i64>,
    /// Ascending by strike.
    pub calls: Vec<OptionContract>,
    /// Ascending by strike.
    pub puts: Vec<OptionContract>,
    /// Underlying quote embedded in the chain response, if any.
    pub quote: Option<Quote>,
}

impl OptionChain {
    pub fn side(&self, option_type: OptionType) -> &[OptionContract] {
        match option_type {
            OptionType::Call => &self.calls,
            OptionType::Put => &self.puts,
        }
    }

    pub fn find(&self, option_type: OptionType, strike: f64) -> Option<&OptionContract> {
        self.side(option_type)
            .iter()
            .find(|c| (c.strike - strike).abs() < 1e-6)
    }

    /// Contract whose strike is closest to spot. Ties go to the lower strike.
    pub fn nearest(&self, option_type: OptionType, spot: f64) -> Option<&OptionContract> {
        self.side(option_type)
            .iter()
            .min_by(|a, b| (a.strike - spot).abs().total_cmp(&(b.strike - spot).abs()))
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.puts.is_empty()
    }

    pub(crate) fn sort(&mut self) {
        self.calls.sort_by(|a, b| a.strike.total_cmp(&b.strike));
        self.puts.sort_by(|a, b| a.strike.total_cmp(&b.strike));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::tests::sample_contract;

    fn chain() -> OptionChain {
        let strikes = [140.0, 145.0, 150.0, 155.0];
        let make = |ty, k| OptionContract { strike: k, ..sample_contract(ty) };
        let mut chain = OptionChain {
            underlying: "AAPL".into(),
            calls: strikes.iter().rev().map(|&k| make(OptionType::Call, k)).collect(),
            puts: strikes.iter().map(|&k| make(OptionType::Put, k)).collect(),
            ..OptionChain::default()
        };
        chain.sort();
        chain
    }

    #[test]
    fn test_sorted_sides() {
        let c = chain();
        assert!(c.calls.windows(2).all(|w| w[0].strike < w[1].strike));
        assert_eq!(c.side(OptionType::Put).len(), 4);
    }

    #[test]
    fn test_nearest_strike() {
        let c = chain();
        assert_eq!(c.nearest(OptionType::Call, 151.9).unwrap().strike, 150.0);
        assert_eq!(c.nearest(OptionType::Put, 170.0).unwrap().strike, 155.0);
        // Equidistant: first (lower) strike wins
        assert_eq!(c.nearest(OptionType::Call, 147.5).unwrap().strike, 145.0);
        assert!(OptionChain::default().nearest(OptionType::Call, 100.0).is_none());
    }

    #[test]
    fn test_find() {
        let c = chain();
        assert_eq!(c.find(OptionType::Put, 145.0).unwrap().option_type, OptionType::Put);
        assert!(c.find(OptionType::Call, 146.0).is_none());
    }

    #[test]
    fn test_quote_change() {
        let q = Quote { symbol: "AAPL".into(), price: 102.0, previous_close: 100.0 };
        assert_eq!(q.change(), 2.0);
        assert!((q.percent_change() - 2.0).abs() < 1e-12);
        assert_eq!(q.direction(), Direction::Gain);
        let flat = Quote { price: 100.0, ..q };
        assert_eq!(flat.direction(), Direction::Loss);
    }
}
