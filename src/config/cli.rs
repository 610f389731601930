use crate::config::toml_config::RatesConfig;
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "tcmb-rates")]
#[command(about = "Query TCMB exchange rates from the command line")]
pub struct CliConfig {
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<String>,

    #[arg(long, help = "Override the upstream base URL")]
    pub base_url: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List supported currencies
    Currencies {
        #[arg(long, help = "Print JSON instead of a table")]
        json: bool,
    },
    /// Latest buy/sell rates
    Current {
        #[arg(long, value_delimiter = ',', help = "Comma separated currency codes")]
        currencies: Vec<String>,

        #[arg(long, help = "Skip the same-day cache")]
        no_cache: bool,

        #[arg(long, help = "Print JSON instead of a table")]
        json: bool,
    },
    /// Buy/sell timeline for one currency
    Historical {
        #[arg(long)]
        currency: String,

        #[arg(long, help = "Start date (YYYY-MM-DD)")]
        start: String,

        #[arg(long, help = "End date (YYYY-MM-DD)")]
        end: String,

        #[arg(long, help = "Print JSON instead of a table")]
        json: bool,
    },
    /// Convert an amount with current sell rates
    Convert {
        #[arg(long)]
        amount: f64,

        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,
    },
    /// Check the configured API key against the upstream
    CheckKey,
}

impl CliConfig {
    /// 命令列參數優先於檔案設定
    pub fn apply_to(&self, config: &mut RatesConfig) {
        if let Some(base_url) = &self.base_url {
            config.upstream.base_url = base_url.clone();
        }
    }
}
