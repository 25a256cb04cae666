// File: kudos-core/tests/test_utils/helpers.rs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use async_trait::async_trait;
use kudos_common::models::{AvatarId, Link, Platform, Streamer};
use kudos_core::stores::MemoryStreamerStore;
use kudos_core::{Error, RosterSync, SaveFailurePolicy, StreamerStore, VoteSettings};

pub fn streamer(id: i64, score: i64) -> Streamer {
    Streamer {
        streamer_id: id,
        name: format!("streamer-{}", id),
        description: "plays games".into(),
        score,
        links: vec![Link::new(Platform::Twitch, "https://twitch.tv/someone")],
        avatar_id: AvatarId(1),
    }
}

pub fn settings(policy: SaveFailurePolicy) -> VoteSettings {
    VoteSettings {
        debounce: Duration::from_millis(300),
        save_policy: policy,
    }
}

/// Memory-backed store that records every write attempt and can be told to
/// fail or stall.
#[derive(Default)]
pub struct RecordingStore {
    inner: MemoryStreamerStore,
    updates: Mutex<Vec<Streamer>>,
    creates: Mutex<Vec<Streamer>>,
    fail_next: AtomicUsize,
    delay: Mutex<Option<Duration>>,
}

impl RecordingStore {
    pub fn with_streamers(streamers: impl IntoIterator<Item = Streamer>) -> Self {
        Self {
            inner: MemoryStreamerStore::with_streamers(streamers),
            ..Default::default()
        }
    }

    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Every update attempted, including failed ones.
    pub fn updates(&self) -> Vec<Streamer> {
        self.updates.lock().unwrap().clone()
    }

    pub fn update_scores(&self) -> Vec<i64> {
        self.updates().iter().map(|s| s.score).collect()
    }

    pub fn creates(&self) -> Vec<Streamer> {
        self.creates.lock().unwrap().clone()
    }

    fn should_fail(&self) -> bool {
        self.fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    async fn stall(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
    }
}

#[async_trait]
impl StreamerStore for RecordingStore {
    async fn list_streamers(&self) -> Result<Vec<Streamer>, Error> {
        self.inner.list_streamers().await
    }

    async fn fetch_streamer(&self, streamer_id: i64) -> Result<Streamer, Error> {
        self.inner.fetch_streamer(streamer_id).await
    }

    async fn create_streamer(&self, streamer: &Streamer) -> Result<(), Error> {
        self.creates.lock().unwrap().push(streamer.clone());
        self.stall().await;
        if self.should_fail() {
            return Err(Error::Persistence("injected create failure".into()));
        }
        self.inner.create_streamer(streamer).await
    }

    async fn update_streamer(&self, streamer: &Streamer) -> Result<(), Error> {
        self.updates.lock().unwrap().push(streamer.clone());
        self.stall().await;
        if self.should_fail() {
            return Err(Error::Persistence("injected update failure".into()));
        }
        self.inner.update_streamer(streamer).await
    }
}

#[derive(Default)]
pub struct CountingSync {
    calls: AtomicUsize,
}

impl CountingSync {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RosterSync for CountingSync {
    async fn sync_streamers(&self) -> Result<(), Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
