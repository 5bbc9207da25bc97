//! # wtwire - Watchtower Wire Protocol
//!
//! Binary message codec for the watchtower client-server protocol: a
//! Lightning node outsources breach-remedy monitoring to a remote tower by
//! opening sessions and streaming encrypted state updates to it.
//!
//! ## Features
//!
//! - **Closed message set**: eight message kinds behind one [`Message`] enum
//! - **Bounded decoding**: every length is checked before use; no decode of
//!   untrusted bytes can panic or read past its payload
//! - **Exact round-trip**: `decode(encode(m)) == m` for every decoded `m`
//! - **Version-aware limits**: per-kind payload ceilings are a pure function
//!   of the negotiated protocol version
//! - **Sync and async**: `std::io` and `tokio::io` framers with identical
//!   semantics
//!
//! ## Protocol Overview
//!
//! ```text
//! Client                                   Tower
//!    |                                       |
//!    |------------- Init ------------------->|  Features + chain hash
//!    |<------------ Init --------------------|
//!    |                                       |
//!    |------------- CreateSession ---------->|  Policy: blob type, max updates,
//!    |<------------ CreateSessionReply ------|  rewards, sweep fee rate
//!    |                                       |
//!    |============= StateUpdate ===========>|  seq, hint, encrypted blob
//!    |<============ StateUpdateReply ========|  last applied
//!    |                                       |
//!    |------------- DeleteSession ---------->|
//!    |<------------ DeleteSessionReply ------|
//!    |                                       |
//!    |<------------ Error ------------------>|  Either direction
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use wtwire::wire::{read_message, write_message, BreachHint, Message, StateUpdate};
//!
//! let update = Message::StateUpdate(StateUpdate {
//!     seq_num: 1,
//!     last_applied: 0,
//!     is_complete: false,
//!     hint: BreachHint([0xAB; 16]),
//!     encrypted_blob: vec![0u8; 64],
//! });
//!
//! let mut buf = Vec::new();
//! let written = write_message(&mut buf, &update, 0).unwrap();
//! assert_eq!(written, buf.len());
//!
//! let decoded = read_message(&mut buf.as_slice(), 0).unwrap();
//! assert_eq!(decoded, update);
//! ```
//!
//! ## Modules
//!
//! - [`wire`]: Message types, framing and validation
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod config;
pub mod error;
pub mod wire;

// Re-exports for convenience
pub use config::Config;
pub use error::{Result, WtError};
pub use wire::{
    decode_message, encode_message, read_message, write_message, Message, MessageType,
    ProtocolVersion, WireError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
