//! TCP Server Module
//!
//! Exposes engine channels over TCP, one port per channel, so a host can
//! talk to the engine the way it would talk to a device's UART. Each
//! listener serves one client at a time; frames emitted on the channel are
//! written back to that client.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use atcmd_core::{ChannelId, Engine};
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::codec::LineCodec;
use crate::config::{ListenerConfig, TransportKind};
use crate::error::RunnerResult;

/// Engine shared between listeners. The lock is the single-flight guard.
pub type SharedEngine = Arc<Mutex<Engine>>;

// ============================================================================
// Types
// ============================================================================

/// A listener bound to an engine channel.
#[derive(Debug, Clone)]
pub struct ListenerInfo {
    pub channel: ChannelId,
    pub transport: TransportKind,
    /// Requested port (0 picks a free one).
    pub port: u16,
    /// Bound address, known once started.
    pub local_addr: Option<SocketAddr>,
}

struct Pending {
    info: ListenerInfo,
    tx_receiver: mpsc::UnboundedReceiver<Vec<u8>>,
}

/// TCP front end for an [`Engine`].
pub struct AtServer {
    engine: SharedEngine,
    bind: String,
    pending: Vec<Pending>,
    listeners: Vec<ListenerInfo>,
}

impl AtServer {
    pub fn new(engine: Engine, bind: impl Into<String>) -> Self {
        AtServer {
            engine: Arc::new(Mutex::new(engine)),
            bind: bind.into(),
            pending: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// Allocate a channel for `listener`. Its frames are queued until a
    /// client is connected.
    pub fn add_listener(&mut self, listener: ListenerConfig) -> RunnerResult<ChannelId> {
        let (tx_sender, tx_receiver) = mpsc::unbounded_channel::<Vec<u8>>();
        let channel = self
            .engine
            .lock()
            .alloc_channel(listener.transport.into(), move |ch, data| {
                if tx_sender.send(data.to_vec()).is_err() {
                    log::warn!("ch {}: listener gone, dropping {} bytes", ch, data.len());
                }
            })?;

        self.pending.push(Pending {
            info: ListenerInfo {
                channel,
                transport: listener.transport,
                port: listener.port,
                local_addr: None,
            },
            tx_receiver,
        });
        Ok(channel)
    }

    /// Bind every listener and spawn its accept loop.
    pub async fn start(&mut self) -> RunnerResult<Vec<JoinHandle<()>>> {
        let mut tasks = Vec::with_capacity(self.pending.len());
        for pending in self.pending.drain(..) {
            let mut info = pending.info;
            let listener = TcpListener::bind((self.bind.as_str(), info.port)).await?;
            let addr = listener.local_addr()?;
            info.local_addr = Some(addr);
            tracing::info!("ch {} ({:?}) listening on {}", info.channel, info.transport, addr);

            let engine = self.engine.clone();
            let channel = info.channel;
            let tx_receiver = pending.tx_receiver;
            tasks.push(tokio::spawn(async move {
                if let Err(e) = run_listener(listener, channel, engine, tx_receiver).await {
                    tracing::error!("listener for ch {} failed: {}", channel, e);
                }
            }));
            self.listeners.push(info);
        }
        Ok(tasks)
    }

    /// Started listeners.
    pub fn listeners(&self) -> &[ListenerInfo] {
        &self.listeners
    }

    pub fn engine(&self) -> SharedEngine {
        self.engine.clone()
    }

    /// Print the listener table to stderr.
    pub fn print_listener_table(&self) {
        eprintln!();
        eprintln!("┌{}┬{}┬{}┐", "─".repeat(9), "─".repeat(11), "─".repeat(24));
        eprintln!("│ {:^7} │ {:^9} │ {:^22} │", "Channel", "Transport", "Address");
        eprintln!("├{}┼{}┼{}┤", "─".repeat(9), "─".repeat(11), "─".repeat(24));
        for info in &self.listeners {
            let addr = info
                .local_addr
                .map(|a| a.to_string())
                .unwrap_or_else(|| "-".to_string());
            eprintln!(
                "│ {:7} │ {:9} │ {:22} │",
                info.channel.to_string(),
                format!("{:?}", info.transport),
                addr
            );
        }
        eprintln!("└{}┴{}┴{}┘", "─".repeat(9), "─".repeat(11), "─".repeat(24));
        eprintln!();
    }
}

/// Accept clients on one listener, one at a time.
async fn run_listener(
    listener: TcpListener,
    channel: ChannelId,
    engine: SharedEngine,
    mut tx_receiver: mpsc::UnboundedReceiver<Vec<u8>>,
) -> io::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        tracing::debug!("ch {}: client {} connected", channel, peer);

        // Frames for a previous client are stale.
        while tx_receiver.try_recv().is_ok() {}

        let result = handle_connection(stream, channel, &engine, &mut tx_receiver).await;
        if let Err(e) = result {
            tracing::warn!("ch {}: connection error from {}: {}", channel, peer, e);
        }
        tracing::debug!("ch {}: client {} disconnected", channel, peer);
    }
}

/// Serve a single client until it disconnects.
async fn handle_connection(
    mut stream: TcpStream,
    channel: ChannelId,
    engine: &SharedEngine,
    tx_receiver: &mut mpsc::UnboundedReceiver<Vec<u8>>,
) -> io::Result<()> {
    let (mut reader, mut writer) = stream.split();
    let mut read_buf = [0u8; 1024];
    let mut codec = LineCodec::new();

    loop {
        tokio::select! {
            // Client -> engine
            result = reader.read(&mut read_buf) => {
                let n = result?;
                if n == 0 {
                    return Ok(());
                }
                codec.push(&read_buf[..n]);
                while let Some(line) = codec.decode_line() {
                    let result = engine.lock().process(channel, &line);
                    if let Err(e) = result {
                        tracing::debug!("ch {}: {}", channel, e);
                    }
                }
            }

            // Engine -> client
            Some(data) = tx_receiver.recv() => {
                writer.write_all(&data).await?;
                writer.flush().await?;
            }
        }
    }
}
