use clap::Parser;
use tcmb_rates::domain::model::RateRecord;
use tcmb_rates::utils::error::ErrorSeverity;
use tcmb_rates::utils::{logger, validation::Validate};
use tcmb_rates::{rate_service, rates_cache, CliConfig, Command, ConversionSide, RatesConfig, Result};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting tcmb-rates CLI");
    if cli.verbose {
        tracing::debug!("CLI arguments: {:?}", cli);
    }

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: &CliConfig) -> Result<()> {
    let mut config = RatesConfig::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate()?;

    let service = rate_service(&config);

    match &cli.command {
        Command::Currencies { json } => {
            let currencies = service.list_currencies();
            if *json {
                println!("{}", serde_json::to_string_pretty(&currencies)?);
            } else {
                for currency in currencies {
                    println!("{:<4} {:<24} {}", currency.code, currency.name, currency.name_en);
                }
            }
        }
        Command::Current {
            currencies,
            no_cache,
            json,
        } => {
            let requested: Vec<String> = currencies
                .iter()
                .map(|code| code.trim().to_uppercase())
                .filter(|code| !code.is_empty())
                .collect();
            let codes = if requested.is_empty() {
                config.default_currencies()
            } else {
                requested
            };

            let rates = match rates_cache(&config).filter(|_| !*no_cache) {
                Some(cache) => service.get_current_rates_cached(&cache, &codes).await,
                None => service.get_current_rates(&codes).await,
            };

            if rates.is_empty() {
                tracing::warn!("⚠️ No rates resolved for {:?}", codes);
            }
            print_rates(&rates, *json)?;
        }
        Command::Historical {
            currency,
            start,
            end,
            json,
        } => {
            let rates = service.get_historical_rates(currency, start, end).await?;
            print_rates(&rates, *json)?;
        }
        Command::Convert { amount, from, to } => {
            let from: ConversionSide = from.parse()?;
            let to: ConversionSide = to.parse()?;
            let conversion = service.convert(*amount, from, to).await?;
            println!("{} {} = {} {}", conversion.amount, from, conversion.formatted(), to);
        }
        Command::CheckKey => {
            let report = service.check_key().await?;
            if report.success {
                println!("✅ {} ({} {})", report.message, report.status, report.status_text);
            } else {
                println!("❌ {} ({} {})", report.message, report.status, report.status_text);
            }
            if let Some(data) = report.data.filter(|_| cli.verbose) {
                println!("{}", data);
            }
        }
    }

    Ok(())
}

fn print_rates(rates: &[RateRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rates)?);
        return Ok(());
    }

    println!("{:<10} {:<4} {:>12} {:>12}", "DATE", "CCY", "BUY", "SELL");
    for rate in rates {
        println!(
            "{:<10} {:<4} {:>12} {:>12}",
            rate.date,
            rate.currency,
            format_rate(rate.buy_rate),
            format_rate(rate.sell_rate)
        );
    }
    Ok(())
}

fn format_rate(rate: Option<f64>) -> String {
    rate.map(|r| format!("{:.4}", r)).unwrap_or_else(|| "-".to_string())
}
