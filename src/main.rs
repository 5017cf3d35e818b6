use chrono::Utc;
use strikeboard::chain::{OptionChain, Quote};
use strikeboard::config::AppConfig;
use strikeboard::feeds::yahoo::{self, YahooClient};
use strikeboard::report::{Report, ReportRequest};
use strikeboard::{EngineError, EngineResult, MarketContext, OptionContract, PositionConfig};

#[tokio::main]
async fn main() {
    // Structured logging on stderr; stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cfg = match AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cfg).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cfg: AppConfig) -> EngineResult<()> {
    let client = YahooClient::new(&cfg.chart_url, &cfg.options_url);

    let (quote, chain) = match &cfg.chain_file {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading saved option chain");
            let body = tokio::fs::read_to_string(path).await?;
            let chain = yahoo::parse_option_chain(&body)?;
            let quote = match chain.quote.clone() {
                Some(q) => q,
                None => client.get_quote(&cfg.ticker).await?,
            };
            (quote, chain)
        }
        None => {
            let (quote, chain) = tokio::join!(
                client.get_quote(&cfg.ticker),
                client.get_option_chain(&cfg.ticker, cfg.expiration),
            );
            (quote?, chain?)
        }
    };

    let contract = select_contract(&cfg, &chain, &quote)?;
    let position = PositionConfig::new(cfg.quantity, cfg.avg_cost)?;
    let market = MarketContext::new(cfg.risk_free_rate, Utc::now());

    tracing::info!(
        symbol = %quote.symbol,
        spot = quote.price,
        strike = contract.strike,
        option_type = %contract.option_type,
        days_to_expiration = contract.days_to_expiration(market.as_of),
        "building report"
    );

    let request = ReportRequest {
        range_percent: cfg.chart_range_percent,
        days_in_future: cfg.days_in_future,
        exit_price: cfg.exit_price.unwrap_or(quote.price),
    };
    let report = Report::build(&quote, &contract, &position, &market, request)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn select_contract(cfg: &AppConfig, chain: &OptionChain, quote: &Quote) -> EngineResult<OptionContract> {
    let found = match cfg.strike {
        Some(strike) => chain.find(cfg.option_type, strike),
        None => chain.nearest(cfg.option_type, quote.price),
    };
    found.cloned().ok_or_else(|| match cfg.strike {
        Some(strike) => EngineError::data(format!("no {} {} at strike {strike}", cfg.ticker, cfg.option_type)),
        None => EngineError::data(format!("no {} {}s listed", cfg.ticker, cfg.option_type)),
    })
}
