use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use xconv::cli::convert::ConvertArgs;
use xconv::cli::currency::CurrencyArgs;
use xconv::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for xconv::AppCommand {
    fn from(cmd: Commands) -> xconv::AppCommand {
        match cmd {
            Commands::Categories => xconv::AppCommand::Categories,
            Commands::Convert {
                value,
                from,
                to,
                category,
                swap,
            } => xconv::AppCommand::Convert(ConvertArgs {
                value,
                from,
                to,
                category,
                swap,
            }),
            Commands::Quick => xconv::AppCommand::Quick,
            Commands::Currency {
                amount,
                from,
                to,
                refresh,
                swap,
            } => xconv::AppCommand::Currency(CurrencyArgs {
                amount,
                from,
                to,
                refresh,
                swap,
            }),
            Commands::Rates { refresh, offline } => xconv::AppCommand::Rates { refresh, offline },
            Commands::Status => xconv::AppCommand::Status,
            Commands::ClearCache => xconv::AppCommand::ClearCache,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List unit categories and their units
    Categories,
    /// Convert a value between units
    #[command(allow_negative_numbers = true)]
    Convert {
        /// Value to convert
        value: String,
        /// Source unit, by name or abbreviation
        from: Option<String>,
        /// Target unit, by name or abbreviation
        to: Option<String>,
        /// Unit category, guessed from the units when omitted
        #[arg(short = 'k', long)]
        category: Option<String>,
        /// Exchange source and target units
        #[arg(short, long)]
        swap: bool,
    },
    /// Show quick reference conversions
    Quick,
    /// Convert an amount between currencies
    Currency {
        /// Amount to convert
        amount: String,
        /// Source currency code
        from: Option<String>,
        /// Target currency code
        to: Option<String>,
        /// Skip cached rates
        #[arg(short, long)]
        refresh: bool,
        /// Exchange source and target currencies
        #[arg(short, long)]
        swap: bool,
    },
    /// Show current exchange rates
    Rates {
        /// Skip cached rates
        #[arg(short, long)]
        refresh: bool,
        /// Only show cached rates, never contact the API
        #[arg(long, conflicts_with = "refresh")]
        offline: bool,
    },
    /// Show exchange rate cache and API usage
    Status,
    /// Remove cached exchange rates
    ClearCache,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => xconv::cli::setup::setup(),
        Some(cmd) => xconv::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
