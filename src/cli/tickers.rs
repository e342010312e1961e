//! Tickers command implementation

use crate::config::Config;
use crate::feed::ConstituentsFetcher;
use clap::Args;

#[derive(Args, Debug)]
pub struct TickersArgs {
    /// Print only the first N symbols
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Print one comma-separated line, ready to pass to `analyze`
    #[arg(long)]
    pub joined: bool,
}

impl TickersArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let symbols = sp500_symbols(config, self.limit).await?;

        if self.joined {
            println!("{}", symbols.join(","));
        } else {
            for symbol in &symbols {
                println!("{}", symbol);
            }
        }
        Ok(())
    }
}

/// Current S&P 500 constituents from the configured page
pub(crate) async fn sp500_symbols(config: &Config, limit: Option<usize>) -> anyhow::Result<Vec<String>> {
    let fetcher = ConstituentsFetcher::from_config(&config.feed)?;
    let symbols = fetcher.fetch().await?;
    tracing::info!(url = fetcher.url(), count = symbols.len(), limit = ?limit, "Loaded S&P 500 list");
    Ok(take_first(symbols, limit))
}

fn take_first(mut symbols: Vec<String>, limit: Option<usize>) -> Vec<String> {
    if let Some(limit) = limit {
        symbols.truncate(limit);
    }
    symbols
}
