use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use cli::args::Cli;
use cli::report;
use cli::signals;
use importer_core::config;
use importer_core::pipeline;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    let mut cfg = config::load(cli.config.as_deref()).context("load config")?;
    cli.apply(&mut cfg);

    let Some(settings) = cfg.settings() else {
        println!("{}", report::BANNER);
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let provider = pipeline::build_registry(&cfg.metadata)
        .get(None)
        .context("select metadata backend")?;

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if signals::watch(tokio::signal::ctrl_c, cancel).await {
                std::process::exit(signals::ABORT_EXIT_CODE);
            }
        });
    }

    let report = pipeline::run(settings, provider, cancel).await?;
    println!("{}", report::render(&report, cli.json)?);
    Ok(())
}
