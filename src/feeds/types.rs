use serde::Deserialize;

// Upstream JSON shapes. Every field is optional: the provider omits keys
// freely (no trades yet, halted contracts, pre-market).

// ── Chart (spot price) ──
//
// {
//   "chart": {
//     "result": [
//       { "meta": { "symbol": "AAPL", "regularMarketPrice": 189.98,
//                   "chartPreviousClose": 187.44, "previousClose": 187.44 } }
//     ],
//     "error": null
//   }
// }

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartBody,
}

#[derive(Debug, Deserialize)]
pub struct ChartBody {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: Option<String>,
    pub regular_market_price: Option<f64>,
    pub chart_previous_close: Option<f64>,
    pub previous_close: Option<f64>,
}

// ── Options ──

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResponse {
    pub option_chain: OptionsBody,
}

#[derive(Debug, Deserialize)]
pub struct OptionsBody {
    pub result: Option<Vec<OptionsResult>>,
    pub error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResult {
    pub underlying_symbol: Option<String>,
    #[serde(default)]
    pub expiration_dates: Vec<i64>,
    pub quote: Option<UnderlyingQuote>,
    #[serde(default)]
    pub options: Vec<OptionsByExpiration>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnderlyingQuote {
    pub symbol: Option<String>,
    pub regular_market_price: Option<f64>,
    pub regular_market_previous_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsByExpiration {
    pub expiration_date: Option<i64>,
    #[serde(default)]
    pub calls: Vec<RawContract>,
    #[serde(default)]
    pub puts: Vec<RawContract>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContract {
    pub contract_symbol: Option<String>,
    pub strike: Option<f64>,
    pub last_price: Option<f64>,
    pub change: Option<f64>,
    pub percent_change: Option<f64>,
    pub implied_volatility: Option<f64>,
    pub expiration: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ProviderError {
    pub code: Option<String>,
    pub description: Option<String>,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.code.as_deref().unwrap_or("unknown"),
            self.description.as_deref().unwrap_or("no description")
        )
    }
}
