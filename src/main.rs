use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{fmt, EnvFilter};

use site_build::app::create_app;
use site_build::builder::{run_build, BuildReport};
use site_build::config::{Cli, Config};
use site_build::error::BuildError;
use site_build::minifier::MinifyOutcome;
use site_build::settings::ProductionConfig;
use site_build::tools::SystemRunner;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::from_cli(cli)?;
    init_logging(config.verbose);

    if config.show_config {
        let app = create_app(ProductionConfig::from_env());
        let json = serde_json::to_string_pretty(app.config())
            .context("Failed to serialize settings")?;
        println!("{json}");
        return Ok(ExitCode::SUCCESS);
    }

    // Setup Ctrl+C handler
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_clone.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    // Spinner only in verbose mode
    let spinner = if config.verbose {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    println!(
        "Starting {} build of {}...",
        config.mode.as_str(),
        config.layout.root.display()
    );

    let plan = config.plan();
    let result = run_build(&plan, &SystemRunner, &shutdown, &mut |stage| {
        match &spinner {
            Some(pb) => {
                pb.println(stage.message());
                pb.set_message(stage.message());
            }
            None => println!("{}", stage.message()),
        }
    });

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let report = match result {
        Ok(report) => report,
        Err(BuildError::Cancelled) => {
            eprintln!("\nBuild cancelled");
            return Ok(ExitCode::from(130));
        }
        Err(e) => {
            return Err(e).with_context(|| {
                format!("{} build failed", plan.mode.as_str())
            })
        }
    };

    print_summary(&report, &plan.layout.output);
    Ok(ExitCode::SUCCESS)
}

fn print_summary(report: &BuildReport, output: &std::path::Path) {
    println!(
        "Build completed successfully! {} files ({} bytes) in {:.2}s -> {}",
        report.copied.files,
        report.copied.bytes,
        report.duration.as_secs_f64(),
        output.display()
    );

    if report.installed {
        println!("  dependencies: installed");
    }

    match &report.minify {
        Some(MinifyOutcome::Minified(files)) => println!("  minified: {} file(s)", files.len()),
        Some(MinifyOutcome::Fallback { reason, copied }) => println!(
            "  minified: none, copied {} file(s) unminified ({reason})",
            copied.files
        ),
        None => {}
    }

    if report.templates > 0 {
        println!("  templates: {} rewritten", report.templates);
    }
}
