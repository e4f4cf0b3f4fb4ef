use super::args::Cli;
use crate::exit_codes;
use anyhow::Context;
use depot_core::{MergeAction, RunReport, StoreConfig, SubmissionOutcome, SubmissionProcessor};
use std::path::Path;

pub fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = build_config(&cli)?;
    let processor = SubmissionProcessor::new(config);

    let report = processor
        .run()
        .context("store processing aborted, index left unchanged")?;

    print_report(&report);

    if let Some(path) = &cli.report {
        if let Err(e) = write_report(&report, path) {
            eprintln!("error: {e:#}");
            return Ok(exit_codes::REPORT_FAILED);
        }
    }

    if cli.strict && report.has_rejections() {
        return Ok(exit_codes::REJECTIONS);
    }
    Ok(exit_codes::SUCCESS)
}

fn write_report(report: &RunReport, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write report: {}", path.display()))
}

fn build_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    let root = match &cli.store_root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("failed to determine working directory")?,
    };
    let mut config = StoreConfig::from_env(root);
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url.clone());
    }
    if let Some(ext) = &cli.payload_ext {
        config = config.with_payload_extension(ext.clone());
    }
    Ok(config)
}

fn print_report(report: &RunReport) {
    if report.outcomes.is_empty() {
        eprintln!("No new submissions to process.");
        return;
    }

    for outcome in &report.outcomes {
        match outcome {
            SubmissionOutcome::Published {
                bundle_id,
                action,
                version,
                ..
            } => {
                let verb = match action {
                    MergeAction::Added => "added",
                    MergeAction::Updated => "updated",
                };
                eprintln!("published: {} {} ({})", bundle_id, version, verb);
            }
            SubmissionOutcome::Denied { denial, .. } => {
                eprintln!("denied: {}", denial);
            }
            SubmissionOutcome::Failed { bundle_id, message } => {
                eprintln!("failed: {}: {}", bundle_id, message);
            }
        }
    }

    eprintln!(
        "store index updated: {} published, {} denied, {} failed",
        report.published(),
        report.denied(),
        report.failed()
    );
}
