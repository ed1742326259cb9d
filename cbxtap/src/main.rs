//! Command line entry point for the cbxtap tap.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use cbxtap::auth::acquire_session_token;
use cbxtap::catalog::{discover, RestClient};
use cbxtap::config::TapConfig;
use cbxtap::singer::MessageWriter;
use cbxtap::state::TapState;
use cbxtap::sync::sync;
use cbxtap::Result;

/// Singer-style incremental tap for the CBX1 REST API.
#[derive(Parser, Debug)]
#[command(name = "cbxtap", version, about)]
struct Cli {
    /// Path to the JSON config file.
    #[arg(long)]
    config: PathBuf,

    /// Path to a Singer state file.
    #[arg(long)]
    state: Option<PathBuf>,

    /// Print the catalog document instead of syncing.
    #[arg(long)]
    discover: bool,
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = TapConfig::from_file(&cli.config)?;
    let token = acquire_session_token(&config)?;
    let client = RestClient::new(&config, token)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if cli.discover {
        let catalog = discover(&client);
        serde_json::to_writer_pretty(&mut out, &catalog)?;
        out.write_all(b"\n")?;
        return Ok(());
    }

    let mut state = match &cli.state {
        Some(path) => TapState::from_file(path)?,
        None => TapState::default(),
    };

    let mut writer = MessageWriter::new(&mut out);
    let report = sync(&client, &config, &mut state, &mut writer)?;
    writer.flush()?;

    let total: usize = report.counts.iter().map(|(_, count)| count).sum();
    log::info!(
        "sync complete: {total} records across {} streams",
        report.counts.len()
    );

    Ok(())
}
