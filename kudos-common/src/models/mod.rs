// File: kudos-common/src/models/mod.rs
pub mod platform;
pub mod streamer;

pub use platform::Platform;
pub use streamer::{AvatarId, Link, ScoreTone, Streamer, AVATAR_COUNT};
