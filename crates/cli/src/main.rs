//! CLI tool for translating PowerPoint and Word files.

use anyhow::{Context, Result};
use clap::Parser;
use office_cli::{build_translator, resolve_job, run, Args, FileConfig, Outcome, Settings};
use office_core::{CancellationToken, ChatCompletionOracle, WalkReport};
use std::process::ExitCode;

/// Conventional exit status after SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    match translate(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn translate(args: Args) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let file_config = FileConfig::discover(args.config.as_deref(), &cwd)?;
    let settings = Settings::resolve(args, file_config)?;
    let job = resolve_job(&settings, &cwd)?;

    println!(
        "Translating {} file '{}' to {}",
        job.format.label(),
        job.input.display(),
        settings.target_language
    );

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("Interrupted, finishing the current request...");
        handler_token.cancel();
    })
    .context("Failed to install the Ctrl-C handler")?;

    let oracle = ChatCompletionOracle::new(settings.oracle.clone())?;
    let translator = build_translator(&settings, Box::new(oracle));

    match run(&job, translator, &cancel)? {
        Outcome::Completed {
            output,
            report,
            cache_hits,
            oracle_calls,
        } => {
            print_summary(&report);
            println!("Translated document saved to {}", output.display());
            if settings.use_cache {
                println!("Cache hits this run: {}", cache_hits);
            }
            log::debug!("Oracle calls this run: {}", oracle_calls);
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Cancelled { report, cache_hits } => {
            print_summary(&report);
            if settings.use_cache {
                println!("Cache saved ({} hits this run); no output written", cache_hits);
            } else {
                println!("No output written");
            }
            Ok(ExitCode::from(EXIT_INTERRUPTED))
        }
    }
}

fn print_summary(report: &WalkReport) {
    println!(
        "Units: {} translated, {} unchanged, {} failed",
        report.translated,
        report.unchanged,
        report.failures.len()
    );
    for failure in &report.failures {
        log::debug!("  {}: {}", failure.location, failure.reason);
    }
}
