//! ProtocolAI command-line entry point.
//!
//! # Responsibility
//! - Provide smoke checks (`ping`, `version`) for core crate wiring.
//! - Export stored documents as the plain-text sync payload.
//! - Run the HTTP relay in front of the agent bridge.

mod export;
mod relay;

use clap::{Parser, Subcommand};
use protocolai_core::{default_log_level, init_logging, EditorConfig};
use std::error::Error;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "protocolai", version, about = "ProtocolAI editor core tools")]
struct Cli {
    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, global = true, env = "PROTOCOLAI_LOG_DIR")]
    log_dir: Option<String>,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, global = true, env = "PROTOCOLAI_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the core crate links.
    Ping,
    /// Print the core crate version.
    Version,
    /// Print a stored document as its sync payload.
    Export {
        /// SQLite database holding the document slot.
        #[arg(long, env = "PROTOCOLAI_DB")]
        db: PathBuf,
        /// Document id; defaults to the first document.
        #[arg(long)]
        doc: Option<String>,
        /// Append the heading outline after the payload.
        #[arg(long)]
        toc: bool,
    },
    /// Serve `POST /api/agent-sync` and forward bodies to the agent bridge.
    Relay {
        #[arg(long, env = "PROTOCOLAI_RELAY_ADDR", default_value = "127.0.0.1:3000")]
        listen: String,
        /// Agent bridge address; overrides PROTOCOLAI_BRIDGE_ADDR.
        #[arg(long)]
        bridge: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("Error: {err}");
            process::exit(2);
        }
    }

    if let Err(err) = run_command(cli.command) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run_command(command: Commands) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Ping => {
            println!("protocolai_core ping={}", protocolai_core::ping());
        }
        Commands::Version => {
            println!("protocolai_core version={}", protocolai_core::core_version());
        }
        Commands::Export { db, doc, toc } => {
            print!("{}", export::render(&db, doc.as_deref(), toc)?);
        }
        Commands::Relay { listen, bridge } => {
            let mut config = EditorConfig::from_env()?;
            if let Some(addr) = bridge {
                config.bridge.addr = addr;
            }
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(relay::serve(&listen, config.bridge))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn parses_export_flags() {
        let cli = Cli::parse_from(["protocolai", "export", "--db", "/tmp/p.db", "--toc"]);
        match cli.command {
            Commands::Export { db, doc, toc } => {
                assert_eq!(db.to_str(), Some("/tmp/p.db"));
                assert_eq!(doc, None);
                assert!(toc);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn relay_bridge_flag_is_optional() {
        let cli = Cli::parse_from(["protocolai", "relay", "--listen", "127.0.0.1:0"]);
        assert!(matches!(
            cli.command,
            Commands::Relay { ref listen, bridge: None } if listen == "127.0.0.1:0"
        ));
    }
}
