//! Static market catalog: markets, their instruments and the supported timeframes

use crate::error::{Error, Result};

pub const TIMEFRAMES: [&str; 3] = ["15m", "1h", "4h"];

const MARKETS: [(&str, [&str; 4]); 4] = [
    ("Forex", ["EURUSD", "GBPUSD", "USDJPY", "AUDUSD"]),
    ("Indices", ["US500", "NAS100", "UK100", "GER40"]),
    ("Commodities", ["XAUUSD", "XAGUSD", "USOIL", "UKOIL"]),
    ("Crypto", ["BTCUSD", "ETHUSD", "LTCUSD", "XRPUSD"]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketEntry {
    pub name: String,
    pub instruments: Vec<String>,
}

/// Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketCatalog {
    markets: Vec<MarketEntry>,
    timeframes: Vec<String>,
}

impl MarketCatalog {
    pub fn new(markets: Vec<MarketEntry>, timeframes: Vec<String>) -> Self {
        Self { markets, timeframes }
    }

    pub fn list_markets(&self) -> Vec<&str> {
        self.markets.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn list_instruments(&self, market: &str) -> Result<&[String]> {
        self.markets
            .iter()
            .find(|m| m.name == market)
            .map(|m| m.instruments.as_slice())
            .ok_or_else(|| Error::NotFound {
                kind: "market",
                name: market.to_string(),
            })
    }

    pub fn list_timeframes(&self) -> &[String] {
        &self.timeframes
    }

    pub fn is_timeframe(&self, timeframe: &str) -> bool {
        self.timeframes.iter().any(|t| t == timeframe)
    }

    /// Reverse lookup: the first market listing `instrument`.
    pub fn market_for(&self, instrument: &str) -> Option<&str> {
        self.markets
            .iter()
            .find(|m| m.instruments.iter().any(|i| i == instrument))
            .map(|m| m.name.as_str())
    }
}

impl Default for MarketCatalog {
    fn default() -> Self {
        let markets = MARKETS
            .iter()
            .map(|(name, instruments)| MarketEntry {
                name: name.to_string(),
                instruments: instruments.iter().map(|i| i.to_string()).collect(),
            })
            .collect();
        Self::new(markets, TIMEFRAMES.iter().map(|t| t.to_string()).collect())
    }
}
