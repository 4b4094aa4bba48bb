mod cli;
mod commands;

use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

use ca_core::infra::storage::{default_db_path, Storage};
use ca_core::usecase::app_service::AppService;

use crate::cli::{Cli, Command, RewriteArgs};
use crate::commands::{CommandError, Printer};

fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logger(verbose: u8, log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let level = level_for(verbose);
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        loggers.push(WriteLogger::new(
            LevelFilter::Debug.max(level),
            config,
            OpenOptions::new().create(true).append(true).open(path)?,
        ));
    }
    CombinedLogger::init(loggers)?;
    Ok(())
}

fn open_service(cli: &Cli) -> Result<AppService, CommandError> {
    let db_path = cli.db_path.clone().unwrap_or_else(default_db_path);
    if let Some(dir) = db_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    log::debug!("DB: {}", db_path.display());

    let storage = Storage::open(&db_path.to_string_lossy())?;
    let mut service = AppService::new(storage)?;

    if let Command::Rewrite(RewriteArgs {
        model: Some(model), ..
    }) = &cli.command
    {
        service = service.with_model(model.clone());
    }
    Ok(service)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logger(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("failed to initialize logger: {e}");
    }

    let service = match open_service(&cli) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let printer = Printer::new(cli.json);
    let result = commands::run(&service, cli.command, printer).await;

    let summary = service.get_metrics();
    log::debug!(
        "metrics: rewrites={}/{} uploads={} errors(auth={} network={} server={})",
        summary.rewrites_succeeded,
        summary.rewrites_requested,
        summary.images_uploaded,
        summary.error_counts.auth,
        summary.error_counts.network,
        summary.error_counts.server,
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let CommandError::App(app) = &e {
                log::debug!("{} (recoverable={})", app.code.as_str(), app.recoverable);
                if app.is_auth() {
                    eprintln!("error: {e}\n`collector-admin login` で再ログインしてください");
                    return ExitCode::FAILURE;
                }
            }
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        let cli = Cli::try_parse_from(["collector-admin", "-vv", "me"]).unwrap();
        assert_eq!(level_for(cli.verbose), LevelFilter::Debug);
        assert_eq!(level_for(0), LevelFilter::Warn);
        assert_eq!(level_for(1), LevelFilter::Info);
        assert_eq!(level_for(5), LevelFilter::Trace);
    }
}
