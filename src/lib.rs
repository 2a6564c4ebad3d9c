pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

pub use crate::core::config;

use crate::core::cache::RateCache;
use crate::core::chain::RateSourceChain;
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::AppConfig;
use crate::core::convert::Converter;
use crate::core::store::EntryStore;
use crate::providers::{FrankfurterProvider, OpenExchangeRateProvider};
use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Record {
        date: Option<NaiveDate>,
        balances: Vec<(String, f64)>,
    },
    Show {
        date: Option<NaiveDate>,
    },
    History,
    Allocation {
        date: Option<NaiveDate>,
    },
    Rate {
        from: String,
        to: String,
        date: Option<NaiveDate>,
    },
    Remove {
        date: NaiveDate,
    },
}

/// Everything a command needs: the loaded config, a converter wired to the
/// rate providers, and the entry ledger.
pub struct App {
    pub config: AppConfig,
    pub converter: Converter,
    pub store: Arc<dyn EntryStore>,
}

impl App {
    pub fn new(config: AppConfig, converter: Converter, store: Arc<dyn EntryStore>) -> Self {
        Self {
            config,
            converter,
            store,
        }
    }

    /// Builds the converter from the configured providers and opens the
    /// on-disk ledger.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let converter = build_converter(&config, clock)?;
        let store = store::open_store(&config)?;
        Ok(Self::new(config, converter, store))
    }

    pub async fn run(&self, command: AppCommand) -> Result<()> {
        match command {
            AppCommand::Record { date, balances } => {
                cli::record::run(self, date, &balances).await.map(|_| ())
            }
            AppCommand::Show { date } => cli::show::run(self, date).await,
            AppCommand::History => cli::history::run(self).await,
            AppCommand::Allocation { date } => cli::allocation::run(self, date).await,
            AppCommand::Rate { from, to, date } => cli::rate::run(self, &from, &to, date).await,
            AppCommand::Remove { date } => cli::remove::run(self, date).await,
        }
    }
}

pub fn build_converter(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<Converter> {
    let rates = &config.rates;
    let primary = FrankfurterProvider::new(
        &config.providers.primary.base_url,
        rates.timeout(),
        rates.retries,
    )?;
    let secondary = OpenExchangeRateProvider::new(
        &config.providers.secondary.base_url,
        rates.timeout(),
        rates.retries,
    )?;
    let cache = Arc::new(RateCache::with_limits(
        Arc::clone(&clock),
        rates.cache_ttl(),
        rates.cache_capacity,
    ));
    let chain = RateSourceChain::new(Arc::new(primary), Arc::new(secondary), cache, clock)
        .with_timeout(rates.timeout());
    Ok(Converter::new(chain))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("networth starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let app = App::from_config(config)?;
    app.run(command).await
}
