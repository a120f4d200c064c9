use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use drawkit_cli::{Args, ErrorAdapter};

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting Drawkit");
    debug!(args:?; "Parsed arguments");

    match drawkit_cli::run(&args) {
        Ok(output) => println!("{output}"),
        Err(err) => {
            let adapted_error = ErrorAdapter(&err);

            let reporter = miette::GraphicalReportHandler::new();
            let mut writer = String::new();
            reporter
                .render_report(&mut writer, &adapted_error)
                .expect("Writing to String buffer is infallible");

            error!("Failed\n{writer}");
            process::exit(1);
        }
    }

    info!("Completed successfully");
}
