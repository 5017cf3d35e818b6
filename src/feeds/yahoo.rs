use super::types::*;
use crate::chain::{OptionChain, Quote};
use crate::contract::{OptionContract, OptionType};
use crate::errors::{EngineError, EngineResult};
use reqwest::{Client, Url};

pub const DEFAULT_CHART_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
pub const DEFAULT_OPTIONS_URL: &str = "https://query2.finance.yahoo.com/v7/finance/options";

/// Quote provider REST client. Read-only, unauthenticated GETs.
/// All methods return Result, never panic.
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    chart_url: String,
    options_url: String,
}

impl YahooClient {
    pub fn new(chart_url: &str, options_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .user_agent("Mozilla/5.0 (X11; Linux x86_64) strikeboard/0.1")
                .build()
                .unwrap_or_default(),
            chart_url: chart_url.trim_end_matches('/').to_string(),
            options_url: options_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_text(&self, url: Url) -> EngineResult<String> {
        let resp = self.client.get(url.as_str()).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%status, %url, "quote provider rejected request");
            return Err(EngineError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.text().await?)
    }

    /// Live price and previous close for `ticker`.
    pub async fn get_quote(&self, ticker: &str) -> EngineResult<Quote> {
        let url = endpoint(&self.chart_url, ticker, None)?;
        tracing::info!(ticker, "fetching quote");
        let body = self.get_text(url).await?;
        parse_quote(ticker, &body)
    }

    /// Chain for `expiration` (Unix seconds), or the nearest listed
    /// expiration when `None`.
    pub async fn get_option_chain(&self, ticker: &str, expiration: Option<i64>) -> EngineResult<OptionChain> {
        let url = endpoint(&self.options_url, ticker, expiration)?;
        tracing::info!(ticker, ?expiration, "fetching option chain");
        let body = self.get_text(url).await?;
        parse_option_chain(&body)
    }
}

/// `base/<ticker>`, with the ticker percent-encoded as a single path segment.
fn endpoint(base: &str, ticker: &str, date: Option<i64>) -> EngineResult<Url> {
    let mut url = Url::parse(base).map_err(|e| EngineError::Config(format!("provider url {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| EngineError::Config(format!("provider url {base}: cannot hold a path")))?
        .pop_if_empty()
        .push(&ticker.to_ascii_lowercase());
    if let Some(date) = date {
        url.query_pairs_mut().append_pair("date", &date.to_string());
    }
    Ok(url)
}

pub fn parse_quote(ticker: &str, body: &str) -> EngineResult<Quote> {
    let resp: ChartResponse = serde_json::from_str(body)?;
    if let Some(err) = resp.chart.error {
        return Err(EngineError::data(format!("chart {ticker}: {err}")));
    }

    let meta = resp
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .map(|r| r.meta)
        .ok_or_else(|| EngineError::data(format!("no chart data for {ticker}")))?;

    let price = meta
        .regular_market_price
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or_else(|| EngineError::data(format!("no market price for {ticker}")))?;
    let previous_close = meta.chart_previous_close.or(meta.previous_close).unwrap_or(price);

    Ok(Quote {
        symbol: meta.symbol.unwrap_or_else(|| ticker.to_ascii_uppercase()),
        price,
        previous_close,
    })
}

/// Parses a live response or a saved snapshot of one.
pub fn parse_option_chain(body: &str) -> EngineResult<OptionChain> {
    let resp: OptionsResponse = serde_json::from_str(body)?;
    if let Some(err) = resp.option_chain.error {
        return Err(EngineError::data(format!("option chain: {err}")));
    }

    let result = resp
        .option_chain
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| EngineError::data("no option chain returned"))?;

    let underlying = result
        .underlying_symbol
        .clone()
        .or_else(|| result.quote.as_ref().and_then(|q| q.symbol.clone()))
        .unwrap_or_default();

    let quote = result.quote.as_ref().and_then(|q| {
        let price = q.regular_market_price.filter(|p| p.is_finite() && *p > 0.0)?;
        Some(Quote {
            symbol: q.symbol.clone().unwrap_or_else(|| underlying.clone()),
            price,
            previous_close: q.regular_market_previous_close.unwrap_or(price),
        })
    });

    let mut chain = OptionChain {
        underlying,
        expiration_dates: result.expiration_dates,
        quote,
        ..OptionChain::default()
    };

    if let Some(by_exp) = result.options.into_iter().next() {
        chain.expiration = by_exp.expiration_date;
        chain.calls = convert_side(&by_exp.calls, OptionType::Call, by_exp.expiration_date);
        chain.puts = convert_side(&by_exp.puts, OptionType::Put, by_exp.expiration_date);
    }
    chain.sort();

    tracing::debug!(
        underlying = %chain.underlying,
        calls = chain.calls.len(),
        puts = chain.puts.len(),
        "parsed option chain"
    );
    Ok(chain)
}

fn convert_side(raw: &[RawContract], option_type: OptionType, expiration: Option<i64>) -> Vec<OptionContract> {
    raw.iter()
        .filter_map(|r| {
            let converted = convert_contract(r, option_type, expiration);
            if converted.is_none() {
                tracing::debug!(symbol = ?r.contract_symbol, "skipping unpriceable contract");
            }
            converted
        })
        .collect()
}

fn convert_contract(raw: &RawContract, option_type: OptionType, expiration: Option<i64>) -> Option<OptionContract> {
    let contract = OptionContract {
        contract_symbol: raw.contract_symbol.clone(),
        option_type,
        strike: raw.strike?,
        last_price: raw.last_price.unwrap_or(0.0),
        implied_volatility: raw.implied_volatility?,
        expiration: raw.expiration.or(expiration)?,
        percent_change: raw.percent_change.unwrap_or(0.0),
        change: raw.change.unwrap_or(0.0),
    };
    contract.validate().ok()?;
    Some(contract)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART: &str = r#"{
        "chart": {
            "result": [{ "meta": { "symbol": "AAPL", "regularMarketPrice": 189.98,
                                   "chartPreviousClose": 187.44, "previousClose": 186.0 } }],
            "error": null
        }
    }"#;

    const OPTIONS: &str = r#"{
        "optionChain": {
            "result": [{
                "underlyingSymbol": "AAPL",
                "expirationDates": [1711670400, 1712275200],
                "strikes": [180.0, 190.0],
                "quote": { "symbol": "AAPL", "regularMarketPrice": 189.98, "regularMarketPreviousClose": 187.44 },
                "options": [{
                    "expirationDate": 1711670400,
                    "hasMiniOptions": false,
                    "calls": [
                        { "contractSymbol": "AAPL240329C00190000", "strike": 190.0, "lastPrice": 3.1,
                          "change": -0.2, "percentChange": -6.06, "impliedVolatility": 0.2241,
                          "expiration": 1711670400, "inTheMoney": false },
                        { "contractSymbol": "AAPL240329C00180000", "strike": 180.0, "lastPrice": 10.5,
                          "change": 0.4, "percentChange": 3.96, "impliedVolatility": 0.2617,
                          "expiration": 1711670400, "inTheMoney": true },
                        { "contractSymbol": "AAPL240329C00185000", "strike": 185.0, "lastPrice": 6.0,
                          "impliedVolatility": 0.0, "expiration": 1711670400 }
                    ],
                    "puts": [
                        { "contractSymbol": "AAPL240329P00180000", "strike": 180.0, "lastPrice": 0.9,
                          "impliedVolatility": 0.25 }
                    ]
                }]
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_quote() {
        let q = parse_quote("aapl", CHART).unwrap();
        assert_eq!(q.symbol, "AAPL");
        assert_eq!(q.price, 189.98);
        assert_eq!(q.previous_close, 187.44);
    }

    #[test]
    fn test_parse_quote_falls_back_to_previous_close() {
        let body = r#"{"chart":{"result":[{"meta":{"regularMarketPrice":10.0,"previousClose":9.5}}],"error":null}}"#;
        let q = parse_quote("xyz", body).unwrap();
        assert_eq!(q.symbol, "XYZ");
        assert_eq!(q.previous_close, 9.5);
    }

    #[test]
    fn test_parse_quote_provider_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_quote("zzzz", body).unwrap_err();
        assert!(matches!(err, EngineError::Data(ref m) if m.contains("delisted")), "{err}");
    }

    #[test]
    fn test_parse_quote_malformed() {
        assert!(matches!(parse_quote("aapl", "not json"), Err(EngineError::Parse(_))));
    }

    #[test]
    fn test_parse_option_chain() {
        let chain = parse_option_chain(OPTIONS).unwrap();
        assert_eq!(chain.underlying, "AAPL");
        assert_eq!(chain.expiration_dates, vec![1711670400, 1712275200]);
        assert_eq!(chain.expiration, Some(1711670400));

        // Zero-vol contract dropped, remaining sorted by strike
        assert_eq!(chain.calls.len(), 2);
        assert_eq!(chain.calls[0].strike, 180.0);
        assert_eq!(chain.calls[1].contract_symbol.as_deref(), Some("AAPL240329C00190000"));
        assert_eq!(chain.calls[1].percent_change, -6.06);

        // Put inherits the expiration of its group
        assert_eq!(chain.puts.len(), 1);
        assert_eq!(chain.puts[0].option_type, OptionType::Put);
        assert_eq!(chain.puts[0].expiration, 1711670400);
        assert_eq!(chain.puts[0].change, 0.0);

        let quote = chain.quote.unwrap();
        assert_eq!(quote.price, 189.98);
        assert_eq!(quote.previous_close, 187.44);
    }

    #[test]
    fn test_parse_empty_result() {
        let body = r#"{"optionChain":{"result":[],"error":null}}"#;
        assert!(matches!(parse_option_chain(body), Err(EngineError::Data(_))));
    }

    #[test]
    fn test_endpoint_appends_ticker_segment() {
        let url = endpoint("https://example.test/v8/finance/chart", "AAPL", None).unwrap();
        assert_eq!(url.as_str(), "https://example.test/v8/finance/chart/aapl");

        let url = endpoint("https://example.test/options/", "msft", Some(1711670400)).unwrap();
        assert_eq!(url.as_str(), "https://example.test/options/msft?date=1711670400");
    }

    #[test]
    fn test_endpoint_encodes_reserved_characters() {
        let url = endpoint("https://example.test/chart", "a/b?c#d", None).unwrap();
        assert_eq!(url.path(), "/chart/a%2Fb%3Fc%23d");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);

        let url = endpoint("https://example.test/options", "../x", Some(1)).unwrap();
        assert_eq!(url.path_segments().map(|s| s.count()), Some(2));
        assert_eq!(url.query(), Some("date=1"));
    }

    #[test]
    fn test_endpoint_rejects_bad_base() {
        assert!(matches!(endpoint("not a url", "aapl", None), Err(EngineError::Config(_))));
        assert!(matches!(endpoint("mailto:quotes@example.test", "aapl", None), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_client_trims_urls() {
        let c = YahooClient::new("https://example.test/chart/", "https://example.test/options//");
        assert_eq!(c.chart_url, "https://example.test/chart");
        assert_eq!(c.options_url, "https://example.test/options");
    }
}
