#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod render;

use std::process::ExitCode;

use args::Args;
use clap::Parser;
use pictor_config::{Config, CredentialResolver};
use pictor_imagegen::Generator;
use render::TerminalRenderer;

/// Filter used when neither the command line nor the configuration sets one
const DEFAULT_LOG_FILTER: &str = "warn";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let mut config = Config::load_or_default(&args.config)?;
    if let Some(secrets) = &args.secrets {
        config.secrets_file.clone_from(secrets);
    }

    let log_filter = args
        .log_filter
        .as_deref()
        .or(config.telemetry.log_filter.as_deref())
        .unwrap_or(DEFAULT_LOG_FILTER);
    pictor_telemetry::init(&config.telemetry, log_filter)?;

    tracing::info!(
        config_path = %args.config.display(),
        secrets_file = %config.secrets_file.display(),
        "starting pictor"
    );

    let resolver = CredentialResolver::from_config(&config);

    let mut generator = Generator::new(config.imagegen, resolver);
    if let Some(backend) = args.backend {
        generator = generator.with_backend(backend);
    }
    if args.raw_errors {
        generator = generator.with_classification(false);
    }

    let mut renderer = TerminalRenderer::stdout(&args.out_dir);
    let report = generator.generate(&args.inputs(), &mut renderer).await?;
    let saved = renderer.finish()?;

    if report.is_noop() {
        eprintln!("Please enter a prompt.");
        return Ok(ExitCode::SUCCESS);
    }

    let failed = report.failures().count();
    if failed > 0 {
        if report.halted_early() {
            eprintln!(
                "stopped after {} of {} images; {failed} failed",
                report.attempted(),
                report.requested
            );
        } else {
            eprintln!("{failed} of {} images failed", report.requested);
        }
        return Ok(ExitCode::FAILURE);
    }

    tracing::info!(images = saved.len(), out_dir = %args.out_dir.display(), "pictor finished");
    Ok(ExitCode::SUCCESS)
}
