//! AT command engine host (`atcmd`)
//!
//! `atcmd console` reads commands from stdin; `atcmd serve` exposes one engine
//! channel per TCP port.

use std::path::PathBuf;

use anyhow::Context;
use atcmd_core::{Engine, Transport};
use atcmd_runner::config::{RunnerConfig, TransportKind};
use atcmd_runner::console::{run_lines, stdout_emitter};
use atcmd_runner::demo::demo_commands;
use atcmd_runner::AtServer;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "atcmd", version, about = "AT command engine host")]
struct Args {
    /// YAML configuration file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read commands from stdin, one per line
    Console {
        /// Lines are bare commands without the `AT+` header
        #[arg(long)]
        raw: bool,
    },
    /// Serve engine channels over TCP
    Serve {
        /// Listen on these ports instead of the configured listeners
        #[arg(long, short)]
        port: Vec<u16>,

        /// Listeners given with --port expect bare commands
        #[arg(long)]
        raw: bool,

        /// Bind address
        #[arg(long)]
        bind: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    let mut config = match &args.config {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };
    atcmd_metrics::describe_metrics();

    match args.command {
        Command::Console { raw } => {
            let mut engine = Engine::new(config.engine, demo_commands())?;
            let transport = if raw { Transport::Raw } else { Transport::Uart };
            let ch = engine.alloc_channel(transport, stdout_emitter)?;
            tracing::info!("{} commands available on ch {}", engine.command_count(), ch);

            let stdin = std::io::stdin();
            let count = run_lines(&mut engine, ch, stdin.lock())?;
            tracing::debug!("processed {} lines", count);
        }
        Command::Serve { port, raw, bind } => {
            let kind = if raw { TransportKind::Raw } else { TransportKind::Uart };
            config.override_ports(&port, kind);
            if let Some(bind) = bind {
                config.bind = bind;
            }

            let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
            runtime.block_on(serve(config))?;
        }
    }

    Ok(())
}

async fn serve(config: RunnerConfig) -> anyhow::Result<()> {
    let engine = Engine::new(config.engine, demo_commands())?;
    tracing::info!(
        "atcmd v{} serving {} commands",
        env!("CARGO_PKG_VERSION"),
        engine.command_count()
    );

    let mut server = AtServer::new(engine, config.bind);
    for listener in config.listeners {
        server
            .add_listener(listener)
            .with_context(|| format!("cannot serve port {}", listener.port))?;
    }
    let tasks = server.start().await?;
    server.print_listener_table();

    shutdown_signal().await;
    tracing::info!("Shutdown signal received...");
    for task in tasks {
        task.abort();
    }
    Ok(())
}

fn init_tracing(verbosity: u8) -> anyhow::Result<()> {
    let mut filter = EnvFilter::from_default_env();

    // Only apply defaults if RUST_LOG is not set
    if std::env::var("RUST_LOG").is_err() {
        let level = match verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        filter = filter.add_directive(level.parse()?);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
    }
}
