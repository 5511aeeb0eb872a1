use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use sub_enum::adapters::{self, terminal::{self, TerminalProgress}};
use sub_enum::domain::ports::{ProgressReporter, SilentProgress};
use sub_enum::utils::logger;
use sub_enum::utils::style::{self, OutputStyle};
use sub_enum::{Aggregator, CliConfig, Domain, EnumError, ReportFormat, Reporter};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    let style = OutputStyle::from_flag(config.no_color);
    // 只有表格輸出時才印進度，csv/json 保持乾淨
    let interactive = config.format == ReportFormat::Table;
    if interactive {
        println!("{}\n", terminal::banner(style));
    }

    // 驗證網域，在任何網路請求之前
    let domain = match Domain::parse(&config.domain) {
        Ok(domain) => domain,
        Err(e) => {
            eprintln!("{} {}", style::error_marker(style), e.user_friendly_message());
            std::process::exit(e.exit_code());
        }
    };

    tokio::select! {
        outcome = run(&config, &domain, style, interactive) => match outcome {
            Ok(output) => println!("{}", output),
            Err(e) => {
                tracing::error!("Run failed: {:#}", e);
                let (message, code) = match e.downcast_ref::<EnumError>() {
                    Some(inner) => (inner.user_friendly_message(), inner.exit_code()),
                    None => (format!("{:#}", e), 3),
                };
                eprintln!("{} {}", style::error_marker(style), message);
                std::process::exit(code);
            }
        },
        _ = tokio::signal::ctrl_c() => {
            let interrupted = EnumError::Interrupted;
            eprintln!("\n{}", interrupted.user_friendly_message());
            std::process::exit(interrupted.exit_code());
        }
    }
}

async fn run(
    config: &CliConfig,
    domain: &Domain,
    style: OutputStyle,
    interactive: bool,
) -> anyhow::Result<String> {
    let settings = config.settings().context("Failed to load settings")?;
    tracing::debug!("Settings: {:?}", settings);

    let sources = adapters::build_sources(&settings)?;
    let resolver = adapters::build_resolver(&settings)?;
    let progress: Arc<dyn ProgressReporter> = if interactive {
        println!("{}", style::accent("Gathering subdomains...", style));
        Arc::new(TerminalProgress::new(style))
    } else {
        Arc::new(SilentProgress)
    };

    let aggregator = Aggregator::new(sources, resolver, settings.concurrency, progress);
    let report = aggregator.aggregate(domain).await;
    tracing::info!("{} rows for {}", report.rows.len(), domain);

    if interactive {
        println!();
    }
    let output = Reporter::new(config.format, style).render(&report)?;
    Ok(output)
}
