//! Infrastructure layer: wire DTOs, delivery, storage and room tasks.

pub mod dto;
pub mod message_pusher;
pub mod repository;
pub mod room;
