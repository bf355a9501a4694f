use clap::Parser;
use cli::args::Cli;
use cli::report;
use cli::signals;
use importer_core::config::{AppConfig, MetadataBackend};
use importer_core::hashing::HashAlgorithm;
use importer_core::models::TransferMode;
use importer_core::pipeline::ImportReport;
use importer_core::scanner::WalkSummary;
use importer_core::stats::RunSummary;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::Level;

#[test]
fn flags_override_config() {
    let cli = Cli::try_parse_from([
        "media-import",
        "--from",
        "/media/card",
        "--to",
        "/photos",
        "--move",
        "--dry-run",
        "--max-procs",
        "3",
        "--try-exiftool",
        "--hash",
        "blake3",
        "--exclude",
        "*.THM",
        "-vv",
    ])
    .unwrap();

    let mut cfg = AppConfig::default();
    cfg.scan.exclude.push("**/.Trashes/**".into());
    cli.apply(&mut cfg);

    assert_eq!(cfg.metadata.backend, MetadataBackend::Auto);
    assert_eq!(cli.log_level(), Level::TRACE);
    let settings = cfg.settings().unwrap();
    assert_eq!(settings.from.to_str(), Some("/media/card"));
    assert_eq!(settings.mode, TransferMode::Move);
    assert!(settings.dry_run);
    assert_eq!(settings.max_procs, 3);
    assert_eq!(settings.hash, HashAlgorithm::Blake3);
    assert_eq!(settings.exclude, vec!["**/.Trashes/**".to_string(), "*.THM".to_string()]);
}

#[test]
fn missing_roots_leave_settings_empty() {
    let cli = Cli::try_parse_from(["media-import", "--from", "/media/card"]).unwrap();
    let mut cfg = AppConfig::default();
    cli.apply(&mut cfg);
    assert!(cfg.settings().is_none());
    assert_eq!(cli.log_level(), Level::INFO);
}

#[test]
fn exiftool_flags_are_exclusive() {
    assert!(Cli::try_parse_from(["media-import", "--exiftool", "--try-exiftool"]).is_err());
    let cli = Cli::try_parse_from(["media-import", "--exiftool", "-q"]).unwrap();
    let mut cfg = AppConfig::default();
    cli.apply(&mut cfg);
    assert_eq!(cfg.metadata.backend, MetadataBackend::Exiftool);
    assert_eq!(cli.log_level(), Level::WARN);
}

#[test]
fn unknown_hash_is_rejected() {
    assert!(Cli::try_parse_from(["media-import", "--hash", "md5"]).is_err());
}

fn sample_report() -> ImportReport {
    ImportReport {
        summary: RunSummary {
            copied: 4,
            moved: 0,
            skipped: 1,
            no_metadata: 2,
            failed: 0,
        },
        walk: WalkSummary {
            files: 7,
            unreadable: 1,
        },
        submitted: 7,
        cancelled: false,
    }
}

#[test]
fn text_report() {
    let text = report::render(&sample_report(), false).unwrap();
    assert_eq!(
        text,
        "Copied: 4, Moved: 0, Skipped: 1, Without metadata: 2, Failed: 0\nUnreadable entries: 1"
    );
}

#[test]
fn json_report() {
    let json = report::render(&sample_report(), true).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["summary"]["copied"], 4);
    assert_eq!(value["summary"]["no_metadata"], 2);
    assert_eq!(value["walk"]["unreadable"], 1);
    assert_eq!(value["cancelled"], false);
}

#[tokio::test]
async fn second_interrupt_aborts() {
    let cancel = Arc::new(AtomicBool::new(false));
    let mut seen = 0;
    let abort = signals::watch(
        || {
            seen += 1;
            std::future::ready(Ok(()))
        },
        cancel.clone(),
    )
    .await;

    assert!(abort);
    assert_eq!(seen, 2);
    assert!(cancel.load(Ordering::Relaxed));
}

#[tokio::test]
async fn interrupts_unavailable_leave_run_alone() {
    let cancel = Arc::new(AtomicBool::new(false));
    let abort = signals::watch(
        || std::future::ready(Err(io::Error::new(io::ErrorKind::Other, "no signal handler"))),
        cancel.clone(),
    )
    .await;

    assert!(!abort);
    assert!(!cancel.load(Ordering::Relaxed));
}
