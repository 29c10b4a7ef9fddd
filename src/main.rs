//! Lectern worker entry point.

use anyhow::Result;
use clap::Parser;
use lectern::cli::{resolve_log_level, Cli, Commands};
use lectern::config::Settings;
use lectern::job::LectureJob;
use lectern::pipeline::Pipeline;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging: -v flags override the configured level,
    // RUST_LOG overrides both.
    let log_level = resolve_log_level(cli.verbose, &settings.general.log_level);

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("lectern={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match &cli.command {
        Commands::Process {
            lecture_id,
            url,
            owner,
            strict_coverage,
            job_file,
        } => {
            let job = match job_file {
                Some(path) => {
                    let payload = std::fs::read_to_string(path)?;
                    serde_json::from_str::<LectureJob>(&payload)?
                }
                None => {
                    // clap guarantees both are present when job_file is absent
                    let mut job = LectureJob::new(
                        lecture_id.clone().unwrap_or_default(),
                        url.clone().unwrap_or_default(),
                    );
                    job.owner_id = owner.clone();
                    job.strict_coverage = *strict_coverage;
                    job
                }
            };
            job.validate()?;

            let pipeline = Pipeline::new(settings)?;
            match pipeline.run(&job).await {
                Ok(summary) => {
                    eprintln!(
                        "  Done: {} chunk(s), {} word(s){}",
                        summary.chunk_count,
                        summary.transcript_words,
                        if summary.degraded {
                            " (degraded notes)"
                        } else {
                            ""
                        }
                    );
                }
                Err(failure) => {
                    eprintln!("  Failed at stage={}: {}", failure.stage, failure.source);
                    return Err(failure.into());
                }
            }
        }

        Commands::Doctor => {
            run_doctor(&settings).await;
        }
    }

    Ok(())
}

/// Preflight checks for external requirements.
async fn run_doctor(settings: &Settings) {
    let ffmpeg = tokio::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false);
    println!(
        "  ffmpeg:          {}",
        if ffmpeg { "ok" } else { "MISSING (install ffmpeg)" }
    );

    let api_key = lectern::openai::is_api_key_configured();
    println!(
        "  OPENAI_API_KEY:  {}",
        if api_key { "set" } else { "NOT SET" }
    );

    let scratch = settings.scratch_dir();
    let writable = std::fs::create_dir_all(&scratch).is_ok();
    println!(
        "  scratch dir:     {} ({})",
        scratch.display(),
        if writable { "writable" } else { "NOT WRITABLE" }
    );
}
