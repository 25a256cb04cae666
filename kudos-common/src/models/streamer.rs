// File: kudos-common/src/models/streamer.rs

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::models::platform::Platform;

/// Number of avatar images a streamer can be shown with.
pub const AVATAR_COUNT: u8 = 2;

/// Index into the fixed avatar set. Out-of-range ids coming from the store are
/// folded back into the set by [`AvatarId::slot`].
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[serde(transparent)]
pub struct AvatarId(pub u8);

impl AvatarId {
    pub fn random() -> Self {
        AvatarId(rand::rng().random_range(0..AVATAR_COUNT))
    }

    pub fn slot(&self) -> u8 {
        self.0 % AVATAR_COUNT
    }
}

/// A (platform, URL) pair attached to a streamer.
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
pub struct Link {
    pub platform: Platform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Link {
    pub fn new(platform: Platform, link: &str) -> Self {
        Self {
            platform,
            link: Some(link.to_string()),
        }
    }
}

/// A content creator profile as stored by the roster backend.
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Streamer {
    pub streamer_id: i64,
    pub name: String,
    pub description: String,
    pub score: i64,
    pub links: Vec<Link>,
    pub avatar_id: AvatarId,
}

impl Streamer {
    /// Builds a brand-new record: fresh clock-derived id, zero score and a
    /// random avatar.
    pub fn new(name: &str, description: &str, links: Vec<Link>) -> Self {
        Self {
            streamer_id: Self::fresh_id(),
            name: name.to_string(),
            description: description.to_string(),
            score: 0,
            links,
            avatar_id: AvatarId::random(),
        }
    }

    /// Identity for a record that has never been persisted: current Unix time
    /// in milliseconds.
    pub fn fresh_id() -> i64 {
        Utc::now().timestamp_millis()
    }

    pub fn with_score(&self, score: i64) -> Self {
        Self {
            score,
            ..self.clone()
        }
    }

    pub fn platforms(&self) -> impl Iterator<Item = Platform> + '_ {
        self.links.iter().map(|l| l.platform)
    }
}

/// How a score is rendered: above zero, below zero, or neither.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ScoreTone {
    Positive,
    Negative,
    Neutral,
}

impl ScoreTone {
    pub fn of(score: i64) -> Self {
        match score {
            s if s > 0 => ScoreTone::Positive,
            s if s < 0 => ScoreTone::Negative,
            _ => ScoreTone::Neutral,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_camel_case_on_the_wire() {
        let s = Streamer {
            streamer_id: 1700000000000,
            name: "limmy".into(),
            description: "scottish".into(),
            score: -3,
            links: vec![Link::new(Platform::Twitch, "https://twitch.tv/limmy")],
            avatar_id: AvatarId(1),
        };
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["streamerId"], 1700000000000i64);
        assert_eq!(v["avatarId"], 1);
        assert_eq!(v["links"][0]["platform"], "twitch");

        let back: Streamer = serde_json::from_value(v).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn link_without_url_deserializes() {
        let l: Link = serde_json::from_str(r#"{"platform":"kick"}"#).unwrap();
        assert_eq!(l.platform, Platform::Kick);
        assert!(l.link.is_none());
    }

    #[test]
    fn new_streamer_defaults() {
        let s = Streamer::new("asmon", "desc", vec![]);
        assert_eq!(s.score, 0);
        assert!(s.avatar_id.0 < AVATAR_COUNT);
        assert!(s.streamer_id > 0);
    }

    #[test]
    fn avatar_slot_folds_out_of_range_ids() {
        assert_eq!(AvatarId(0).slot(), 0);
        assert_eq!(AvatarId(5).slot(), 1);
    }

    #[test]
    fn score_tone() {
        assert_eq!(ScoreTone::of(3), ScoreTone::Positive);
        assert_eq!(ScoreTone::of(-1), ScoreTone::Negative);
        assert_eq!(ScoreTone::of(0), ScoreTone::Neutral);
    }
}
