//! Logdisk script runner
//!
//! Drives a simulated log-structured storage device from a command script.

use anyhow::Context;
use clap::Parser;
use logdisk::Session;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "logdisk")]
#[command(version)]
#[command(about = "Log-structured storage device simulator")]
struct Args {
    /// Command script to run (reads stdin when omitted)
    script: Option<PathBuf>,

    /// Emit reports as JSON lines instead of console text
    #[arg(long)]
    json: bool,

    /// Suppress report output, keeping only the exit status
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    info!("logdisk {} starting", logdisk::VERSION);

    let mut session = Session::new();
    match &args.script {
        Some(path) => {
            info!("running script {}", path.display());
            let file = File::open(path)
                .with_context(|| format!("cannot open script {}", path.display()))?;
            run(&mut session, BufReader::new(file), &args)
        }
        None => {
            info!("running script from stdin");
            let stdin = io::stdin();
            run(&mut session, stdin.lock(), &args)
        }
    }
}

fn run<R: BufRead>(session: &mut Session, reader: R, args: &Args) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in reader.lines() {
        let line = line.context("failed to read script line")?;
        let reports = match session.execute_line(&line) {
            Ok(reports) => reports,
            Err(err) => {
                if !args.quiet {
                    writeln!(out, "{err}")?;
                    writeln!(out, "Terminating...")?;
                }
                return Err(err.into());
            }
        };
        for report in reports {
            if args.quiet {
                continue;
            }
            if args.json {
                let json = serde_json::to_string(&report).context("failed to encode report")?;
                writeln!(out, "{json}")?;
            } else {
                writeln!(out, "{report}")?;
            }
        }
    }
    Ok(())
}
