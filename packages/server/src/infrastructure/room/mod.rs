//! Room ownership: one task per live room, reached through a directory.

mod actor;
pub mod directory;

pub use directory::RoomDirectory;
