//! Adapter runtime integration.
//!
//! Bridges the sync game loop with the async TCP server.

use std::sync::Arc;

use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use hole_match_types::GameAction;

use crate::protocol::{ErrorCode, ObservationMessage};
use crate::server::{run_server, ConnectionStats, ServerConfig};

/// Command delivered to the game loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub action: GameAction,
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    Ack {
        client_id: usize,
        seq: u64,
    },
    Error {
        client_id: usize,
        seq: u64,
        code: ErrorCode,
        message: String,
    },
    /// Sent to every client that asked for observations.
    Observation(Box<ObservationMessage>),
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    stats: Arc<ConnectionStats>,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `None` if `HOLE_MATCH_AI_DISABLED` is set or the runtime could
    /// not be created.
    pub fn start_from_env() -> Option<Self> {
        if ServerConfig::is_disabled() {
            log::info!("adapter disabled via HOLE_MATCH_AI_DISABLED");
            return None;
        }
        Self::start(ServerConfig::from_env())
    }

    pub fn start(config: ServerConfig) -> Option<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let stats = Arc::new(ConnectionStats::default());

        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("could not start adapter runtime: {e}");
                return None;
            }
        };
        let server_stats = Arc::clone(&stats);
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, server_stats, None).await {
                log::error!("adapter stopped: {e:#}");
            }
        });

        Some(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            stats,
        })
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    pub fn stats(&self) -> &ConnectionStats {
        &self.stats
    }
}
