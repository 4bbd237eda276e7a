//! Parley relay server library.
//!
//! Rooms, chat delivery tracking, call coordination and WebRTC signaling
//! relay over a WebSocket event protocol.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;

pub use config::ServerConfig;
