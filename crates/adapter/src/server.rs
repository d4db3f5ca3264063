//! TCP server for the AI adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::protocol::*;
use crate::runtime::{InboundCommand, OutboundMessage};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_pending_commands: usize,
    pub log_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            max_pending_commands: 10,
            log_path: None,
        }
    }
}

impl ServerConfig {
    /// Read `HOLE_MATCH_AI_*` environment variables.
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("HOLE_MATCH_AI_HOST").unwrap_or(defaults.host);
        let port = env::var("HOLE_MATCH_AI_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("HOLE_MATCH_AI_MAX_PENDING")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_pending_commands);
        let log_path = env::var("HOLE_MATCH_AI_LOG_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            host,
            port,
            max_pending_commands,
            log_path,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid adapter address {}:{}", self.host, self.port))
    }

    /// Check if the adapter is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("HOLE_MATCH_AI_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Connection counters readable from the game thread without locking.
#[derive(Debug, Default)]
pub struct ConnectionStats {
    clients: AtomicU16,
    streaming: AtomicU16,
    /// Controller client id, 0 when nobody controls.
    controller: AtomicUsize,
}

impl ConnectionStats {
    pub fn client_count(&self) -> u16 {
        self.clients.load(Ordering::Relaxed)
    }

    pub fn streaming_count(&self) -> u16 {
        self.streaming.load(Ordering::Relaxed)
    }

    pub fn controller_id(&self) -> Option<usize> {
        match self.controller.load(Ordering::Relaxed) {
            0 => None,
            id => Some(id),
        }
    }
}

/// Handle to a connected client
struct ClientHandle {
    id: usize,
    addr: SocketAddr,
    stream_observations: bool,
    handshaken: bool,
    last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
enum ClientOutbound {
    Line(Arc<str>),
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
}

/// Shared server state
struct ServerState {
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>,
    stats: Arc<ConnectionStats>,
}

impl ServerState {
    fn new(stats: Arc<ConnectionStats>) -> Self {
        Self {
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
            stats,
        }
    }

    fn publish_stats(&self, clients: &[ClientHandle], controller: Option<usize>) {
        let streaming = clients
            .iter()
            .filter(|c| c.handshaken && c.stream_observations)
            .count();
        self.stats
            .clients
            .store(clients.len() as u16, Ordering::Relaxed);
        self.stats.streaming.store(streaming as u16, Ordering::Relaxed);
        self.stats
            .controller
            .store(controller.unwrap_or(0), Ordering::Relaxed);
    }

    async fn send_to(&self, client_id: usize, msg: ClientOutbound) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(msg);
        }
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .is_some_and(|c| c.handshaken)
    }

    /// Accept `seq` only when it is strictly greater than the last one.
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }
}

/// Start the TCP server. The bound address is reported through `ready_tx`.
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    stats: Arc<ConnectionStats>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let wire_log_tx = config.log_path.clone().map(spawn_wire_log);

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind adapter on {addr}"))?;
    let bound = listener.local_addr()?;
    log::info!("adapter listening on {bound}");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(stats));
    tokio::spawn(dispatch_outbound(Arc::clone(&state), out_rx));

    let mut client_id_counter = 0usize;
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        log::info!("client {client_id} connected from {addr}");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        let wire_log_tx = wire_log_tx.clone();
        tokio::spawn(async move {
            if let Err(e) =
                handle_client(socket, addr, client_id, &state, command_tx, wire_log_tx).await
            {
                log::warn!("client {client_id} error: {e:#}");
            }
            remove_client(&state, client_id).await;
            log::info!("client {client_id} disconnected");
        });
    }
}

/// Mirror every outbound line to a file.
fn spawn_wire_log(path: String) -> mpsc::UnboundedSender<Arc<str>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Arc<str>>();
    tokio::spawn(async move {
        use tokio::fs::OpenOptions;

        let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
            Ok(f) => f,
            Err(e) => {
                log::warn!("wire log {path} unavailable: {e}");
                return;
            }
        };
        while let Some(line) = rx.recv().await {
            if file.write_all(line.as_bytes()).await.is_err()
                || file.write_all(b"\n").await.is_err()
            {
                break;
            }
        }
        let _ = file.flush().await;
    });
    tx
}

/// Route messages produced by the game loop to their clients.
async fn dispatch_outbound(
    state: Arc<ServerState>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
) {
    while let Some(msg) = out_rx.recv().await {
        match msg {
            OutboundMessage::Ack { client_id, seq } => {
                state
                    .send_to(client_id, ClientOutbound::Ack(create_ack(seq)))
                    .await;
            }
            OutboundMessage::Error {
                client_id,
                seq,
                code,
                message,
            } => {
                let err = create_error(seq, code, &message);
                state.send_to(client_id, ClientOutbound::Error(err)).await;
            }
            OutboundMessage::Observation(obs) => {
                let line: Arc<str> = match serde_json::to_string(&obs) {
                    Ok(s) => s.into(),
                    Err(e) => {
                        log::error!("observation serialization failed: {e}");
                        continue;
                    }
                };
                let clients = state.clients.read().await;
                for c in clients.iter().filter(|c| c.handshaken && c.stream_observations) {
                    let _ = c.tx.send(ClientOutbound::Line(Arc::clone(&line)));
                }
            }
        }
    }
}

/// Serialize outbound messages as JSON lines.
async fn write_loop(
    mut writer: tokio::io::WriteHalf<TcpStream>,
    mut rx: mpsc::UnboundedReceiver<ClientOutbound>,
    wire_log_tx: Option<mpsc::UnboundedSender<Arc<str>>>,
) {
    while let Some(msg) = rx.recv().await {
        let line: Arc<str> = match msg {
            ClientOutbound::Line(line) => line,
            ClientOutbound::Welcome(m) => to_line(&m),
            ClientOutbound::Ack(m) => to_line(&m),
            ClientOutbound::Error(m) => to_line(&m),
        };
        if line.is_empty() {
            continue;
        }
        if let Some(log_tx) = wire_log_tx.as_ref() {
            let _ = log_tx.send(Arc::clone(&line));
        }
        if writer.write_all(line.as_bytes()).await.is_err()
            || writer.write_all(b"\n").await.is_err()
            || writer.flush().await.is_err()
        {
            break;
        }
    }
}

fn to_line<T: serde::Serialize>(msg: &T) -> Arc<str> {
    serde_json::to_string(msg).map(Arc::from).unwrap_or_else(|e| {
        log::error!("message serialization failed: {e}");
        Arc::from("")
    })
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: &Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
    wire_log_tx: Option<mpsc::UnboundedSender<Arc<str>>>,
) -> anyhow::Result<()> {
    let (reader, writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);
    let (tx, rx) = mpsc::unbounded_channel::<ClientOutbound>();

    {
        let controller = state.controller.read().await;
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            addr,
            stream_observations: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
        state.publish_stats(&clients, *controller);
    }

    let write_task = tokio::spawn(write_loop(writer, rx, wire_log_tx));

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let reply = match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => on_hello(state, client_id, hello).await,
            Ok(ParsedMessage::Command(cmd)) => {
                on_command(state, client_id, &cmd, &command_tx).await
            }
            Ok(ParsedMessage::Control(ctrl)) => on_control(state, client_id, &ctrl).await,
            Ok(ParsedMessage::Unknown { seq }) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, seq).await
                {
                    Some(seq_error(seq))
                } else {
                    Some(ClientOutbound::Error(create_error(
                        seq,
                        ErrorCode::InvalidCommand,
                        "Unknown message type",
                    )))
                }
            }
            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                Some(ClientOutbound::Error(create_error(
                    seq,
                    ErrorCode::InvalidCommand,
                    &format!("JSON parse error: {e}"),
                )))
            }
        };
        if let Some(reply) = reply {
            let _ = tx.send(reply);
        }
    }

    drop(tx);
    remove_client(state, client_id).await;
    let _ = write_task.await;
    Ok(())
}

fn seq_error(seq: u64) -> ClientOutbound {
    ClientOutbound::Error(create_error(
        seq,
        ErrorCode::InvalidCommand,
        "seq must be strictly increasing",
    ))
}

async fn on_hello(
    state: &Arc<ServerState>,
    client_id: usize,
    hello: HelloMessage,
) -> Option<ClientOutbound> {
    let major = PROTOCOL_VERSION.split('.').next().unwrap_or("1");
    if hello.protocol_version.split('.').next() != Some(major) {
        return Some(ClientOutbound::Error(create_error(
            hello.seq,
            ErrorCode::ProtocolMismatch,
            &format!("Unsupported protocol version {}", hello.protocol_version),
        )));
    }

    let mut controller = state.controller.write().await;
    let mut clients = state.clients.write().await;
    let client = clients.iter_mut().find(|c| c.id == client_id)?;
    client.handshaken = true;
    client.stream_observations = hello.requested.stream_observations;
    client.last_seq = Some(hello.seq);

    if controller.is_none() {
        *controller = Some(client_id);
        log::info!("client {client_id} ({}) is now controller", hello.client.name);
    }
    let role = if *controller == Some(client_id) {
        AssignedRole::Controller
    } else {
        AssignedRole::Observer
    };
    log::debug!("client {client_id} at {} said hello", client.addr);

    state.publish_stats(&clients, *controller);
    Some(ClientOutbound::Welcome(create_welcome(
        hello.seq,
        client_id as u64,
        role,
        controller.map(|id| id as u64),
    )))
}

async fn on_command(
    state: &Arc<ServerState>,
    client_id: usize,
    cmd: &CommandMessage,
    command_tx: &mpsc::Sender<InboundCommand>,
) -> Option<ClientOutbound> {
    let error = |code, message: &str| {
        Some(ClientOutbound::Error(create_error(cmd.seq, code, message)))
    };

    if !state.is_handshaken(client_id).await {
        return error(ErrorCode::HandshakeRequired, "Send hello before commands");
    }
    if !state.check_and_update_seq(client_id, cmd.seq).await {
        return Some(seq_error(cmd.seq));
    }
    if *state.controller.read().await != Some(client_id) {
        return error(ErrorCode::NotController, "Only the controller may send commands");
    }
    let action = match cmd.to_action() {
        Ok(action) => action,
        Err((code, message)) => return error(code, &message),
    };

    let inbound = InboundCommand {
        client_id,
        seq: cmd.seq,
        action,
    };
    match command_tx.try_send(inbound) {
        // Acked by the game loop once applied.
        Ok(()) => None,
        Err(mpsc::error::TrySendError::Full(_)) => {
            error(ErrorCode::Backpressure, "Command queue full")
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            error(ErrorCode::LevelOver, "Game loop is gone")
        }
    }
}

async fn on_control(
    state: &Arc<ServerState>,
    client_id: usize,
    ctrl: &ControlMessage,
) -> Option<ClientOutbound> {
    let error = |code, message: &str| {
        Some(ClientOutbound::Error(create_error(ctrl.seq, code, message)))
    };

    if !state.is_handshaken(client_id).await {
        return error(ErrorCode::HandshakeRequired, "Send hello before control");
    }
    if !state.check_and_update_seq(client_id, ctrl.seq).await {
        return Some(seq_error(ctrl.seq));
    }

    let mut controller = state.controller.write().await;
    let reply = match ctrl.action.as_str() {
        "claim" => match *controller {
            None => {
                *controller = Some(client_id);
                log::info!("client {client_id} claimed control");
                Some(ClientOutbound::Ack(create_ack(ctrl.seq)))
            }
            Some(id) if id == client_id => Some(ClientOutbound::Ack(create_ack(ctrl.seq))),
            Some(_) => error(ErrorCode::ControllerActive, "Controller already assigned"),
        },
        "release" => {
            if *controller == Some(client_id) {
                *controller = None;
                log::info!("client {client_id} released control");
                Some(ClientOutbound::Ack(create_ack(ctrl.seq)))
            } else {
                error(ErrorCode::NotController, "Only the controller may release")
            }
        }
        other => error(
            ErrorCode::InvalidCommand,
            &format!("Unknown control action: {other}"),
        ),
    };
    let clients = state.clients.read().await;
    state.publish_stats(&clients, *controller);
    reply
}

/// Drop a client; a departing controller hands over to the lowest remaining
/// handshaken id.
async fn remove_client(state: &Arc<ServerState>, client_id: usize) {
    let mut controller = state.controller.write().await;
    let mut clients = state.clients.write().await;
    clients.retain(|c| c.id != client_id);

    if *controller == Some(client_id) {
        *controller = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
        match *controller {
            Some(next) => log::info!("client {next} promoted to controller"),
            None => log::info!("controller {client_id} left, no controller"),
        }
    }
    state.publish_stats(&clients, *controller);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_parses_to_an_address() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().port(), 7878);
    }

    #[test]
    fn bad_host_is_reported() {
        let config = ServerConfig {
            host: "not a host".into(),
            ..ServerConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn stats_report_no_controller_as_none() {
        let stats = ConnectionStats::default();
        assert_eq!(stats.controller_id(), None);
        stats.controller.store(3, Ordering::Relaxed);
        assert_eq!(stats.controller_id(), Some(3));
    }

    #[test]
    fn from_env_does_not_panic() {
        let _config = ServerConfig::from_env();
    }

    fn handle(id: usize, handshaken: bool) -> ClientHandle {
        let (tx, _rx) = mpsc::unbounded_channel();
        ClientHandle {
            id,
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            stream_observations: true,
            handshaken,
            last_seq: None,
            tx,
        }
    }

    #[test]
    fn seq_must_strictly_increase() {
        let state = ServerState::new(Arc::new(ConnectionStats::default()));
        tokio_test::block_on(async {
            state.clients.write().await.push(handle(1, true));
            assert!(state.check_and_update_seq(1, 5).await);
            assert!(!state.check_and_update_seq(1, 5).await);
            assert!(!state.check_and_update_seq(1, 4).await);
            assert!(state.check_and_update_seq(1, 6).await);
        });
    }

    #[test]
    fn removing_controller_promotes_lowest_handshaken_client() {
        let stats = Arc::new(ConnectionStats::default());
        let state = Arc::new(ServerState::new(Arc::clone(&stats)));
        tokio_test::block_on(async {
            {
                let mut clients = state.clients.write().await;
                clients.push(handle(1, true));
                clients.push(handle(2, false));
                clients.push(handle(4, true));
                clients.push(handle(3, true));
            }
            *state.controller.write().await = Some(1);

            remove_client(&state, 1).await;
            assert_eq!(*state.controller.read().await, Some(3));
            assert_eq!(stats.controller_id(), Some(3));
            assert_eq!(stats.client_count(), 3);
            assert_eq!(stats.streaming_count(), 2);

            // Non-controller leaving keeps the controller.
            remove_client(&state, 4).await;
            assert_eq!(*state.controller.read().await, Some(3));

            remove_client(&state, 3).await;
            assert_eq!(*state.controller.read().await, None);
            assert_eq!(stats.controller_id(), None);
        });
    }
}
