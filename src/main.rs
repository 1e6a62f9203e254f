use anyhow::Result;
use chrono::Local;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use four_keys::cli::{self, Cli, Command};
use four_keys::config;
use four_keys::observer::{NoopObserver, QueryObserver, TracingObserver};
use four_keys::ui;

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let common = cli.common().clone();

    init_logging(common.debug);

    let config = match config::load_config(common.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    let observer: Box<dyn QueryObserver> = if common.debug {
        ui::display_status("In debug mode");
        Box::new(TracingObserver::new())
    } else {
        Box::new(NoopObserver)
    };

    let args = common.query_args();
    let now = Local::now();

    let rendered = match &cli.command {
        None => cli::run_metrics(&args, &config, observer.as_ref(), now).and_then(|output| {
            ui::render(&output, common.format, ui::format_metrics)
        }),
        Some(Command::Releases) => cli::run_releases(&args, &config, observer.as_ref(), now)
            .and_then(|output| ui::render(&output, common.format, ui::format_releases)),
        Some(Command::TimeSeries { interval }) => {
            cli::run_time_series(&args, *interval, &config, observer.as_ref(), now).and_then(
                |output| ui::render(&output, common.format, ui::format_time_series),
            )
        }
    };

    match rendered {
        Ok(text) => {
            println!("{}", text.trim_end());
            Ok(())
        }
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    }
}
