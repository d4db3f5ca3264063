//! Adapter - remote control of the matching game over a TCP socket
//!
//! External agents (bots, test harnesses, tools) connect and drive the game
//! with the same taps a player makes.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7878)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Observation Streaming**: Server sends a level snapshot whenever the
//!    visible state changes
//! 5. **Commanding**: Controller sends `tap` / `restart` / `next`
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: handshake with client info and requested capabilities
//! - **command**: `tap` a column, `restart` the level or load the `next` one
//! - **control**: `claim` or `release` controller status
//!
//! ## Server → Client
//!
//! - **welcome**: assigned role and the current controller
//! - **observation**: level snapshot plus a stable `state_hash`
//! - **ack**: the command was applied
//! - **error**: code and message (`not_eligible`, `no_container`, `backpressure`, ...)
//!
//! Sequence numbers must be strictly increasing per client. When the
//! controller disconnects, the lowest remaining client id takes over.
//!
//! # Environment Variables
//!
//! - `HOLE_MATCH_AI_HOST`: Bind address (default: "127.0.0.1")
//! - `HOLE_MATCH_AI_PORT`: Port number (default: 7878)
//! - `HOLE_MATCH_AI_MAX_PENDING`: Bounded command queue length (default: 10)
//! - `HOLE_MATCH_AI_LOG_PATH`: Mirror outbound lines to this file
//! - `HOLE_MATCH_AI_DISABLED`: Set to "1" or "true" to disable the adapter
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"client":{"name":"bot","version":"0.1"},"protocol_version":"1.0.0"}
//! Server -> Client: {"type":"welcome","seq":1,"role":"controller","client_id":1,...}
//! Server -> Client: {"type":"observation","seq":1,"level_index":0,"state_hash":"...","level":{...}}
//! Client -> Server: {"type":"command","seq":2,"action":"tap","column":0}
//! Server -> Client: {"type":"ack","seq":2,"status":"ok"}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use protocol::{
    build_observation, parse_message, state_hash, AssignedRole, ErrorCode, ObservationMessage,
    ParsedMessage, PROTOCOL_VERSION,
};
pub use runtime::{Adapter, InboundCommand, OutboundMessage};
pub use server::{run_server, ConnectionStats, ServerConfig};
