// File: kudos-common/src/models/platform.rs

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Streaming platforms a streamer profile can link to.
///
/// The declaration order is the canonical enumeration order used when a
/// fresh link form lists the platforms still available.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitch,
    Youtube,
    Kick,
    Tiktok,
    Rumble,
}

impl Platform {
    /// Every platform, in enumeration order.
    pub const ALL: [Platform; 5] = [
        Platform::Twitch,
        Platform::Youtube,
        Platform::Kick,
        Platform::Tiktok,
        Platform::Rumble,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitch => "twitch",
            Platform::Youtube => "youtube",
            Platform::Kick => "kick",
            Platform::Tiktok => "tiktok",
            Platform::Rumble => "rumble",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "twitch" => Ok(Platform::Twitch),
            "youtube" => Ok(Platform::Youtube),
            "kick" => Ok(Platform::Kick),
            "tiktok" => Ok(Platform::Tiktok),
            "rumble" => Ok(Platform::Rumble),
            _ => Err(format!("Unknown platform: {}", s)),
        }
    }
}
