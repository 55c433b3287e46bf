pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::cli::convert::ConvertArgs;
use crate::cli::currency::CurrencyArgs;
use crate::core::config::AppConfig;
use crate::providers::{OpenExchangeRatesProvider, RateResolver, ResolverSettings};
use anyhow::Result;
use tracing::debug;

pub enum AppCommand {
    Categories,
    Convert(ConvertArgs),
    Quick,
    Currency(CurrencyArgs),
    Rates { refresh: bool, offline: bool },
    Status,
    ClearCache,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    // Unit conversions need neither config nor network
    match command {
        AppCommand::Categories => {
            println!("{}", cli::convert::render_categories());
            Ok(())
        }
        AppCommand::Convert(args) => cli::convert::run(&args),
        AppCommand::Quick => cli::quick::run(),
        currency_command => run_currency_command(currency_command, config_path).await,
    }
}

async fn run_currency_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let resolver = build_resolver(&config)?;
    match command {
        AppCommand::Currency(args) => cli::currency::run(&resolver, &args).await,
        AppCommand::Rates { refresh, offline } => {
            cli::currency::run_rates(&resolver, refresh, offline).await
        }
        AppCommand::Status => cli::currency::run_status(&resolver).await,
        AppCommand::ClearCache => cli::currency::run_clear_cache(&resolver).await,
        AppCommand::Categories | AppCommand::Convert(_) | AppCommand::Quick => {
            unreachable!("Unit commands don't resolve rates")
        }
    }
}

fn build_resolver(config: &AppConfig) -> Result<RateResolver<OpenExchangeRatesProvider>> {
    let provider = OpenExchangeRatesProvider::new(
        &config.providers.openexchangerates.base_url,
        config.app_id(),
        config.cache.request_timeout(),
    )?;

    let data_path = config.default_data_path().ok();
    let store = store::open_rate_store(data_path.as_deref());

    Ok(RateResolver::new(
        provider,
        store,
        ResolverSettings::from(config),
    ))
}
