// File: kudos-core/src/stores/memory.rs

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;
use kudos_common::models::Streamer;
use crate::{Error, StreamerStore};

/// Process-local roster backend, keyed by `streamer_id`.
#[derive(Default)]
pub struct MemoryStreamerStore {
    streamers: DashMap<i64, Streamer>,
}

impl MemoryStreamerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_streamers(streamers: impl IntoIterator<Item = Streamer>) -> Self {
        let store = Self::new();
        for s in streamers {
            store.streamers.insert(s.streamer_id, s);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.streamers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streamers.is_empty()
    }
}

#[async_trait]
impl StreamerStore for MemoryStreamerStore {
    async fn list_streamers(&self) -> Result<Vec<Streamer>, Error> {
        let mut all: Vec<Streamer> = self.streamers.iter().map(|e| e.value().clone()).collect();
        all.sort_by_key(|s| s.streamer_id);
        Ok(all)
    }

    async fn fetch_streamer(&self, streamer_id: i64) -> Result<Streamer, Error> {
        self.streamers
            .get(&streamer_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| Error::NotFound(format!("streamer {}", streamer_id)))
    }

    async fn create_streamer(&self, streamer: &Streamer) -> Result<(), Error> {
        match self.streamers.entry(streamer.streamer_id) {
            Entry::Occupied(_) => Err(Error::Persistence(format!(
                "streamer {} already exists",
                streamer.streamer_id
            ))),
            Entry::Vacant(slot) => {
                debug!("memory store: created streamer {}", streamer.streamer_id);
                slot.insert(streamer.clone());
                Ok(())
            }
        }
    }

    async fn update_streamer(&self, streamer: &Streamer) -> Result<(), Error> {
        match self.streamers.get_mut(&streamer.streamer_id) {
            Some(mut existing) => {
                debug!("memory store: updated streamer {}", streamer.streamer_id);
                *existing = streamer.clone();
                Ok(())
            }
            None => Err(Error::NotFound(format!("streamer {}", streamer.streamer_id))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kudos_common::models::{Link, Platform};

    fn sample(id: i64) -> Streamer {
        Streamer {
            streamer_id: id,
            name: format!("s{}", id),
            description: "d".into(),
            score: 0,
            links: vec![Link::new(Platform::Kick, "https://kick.com/x")],
            avatar_id: Default::default(),
        }
    }

    #[tokio::test]
    async fn create_update_fetch() -> Result<(), Error> {
        let store = MemoryStreamerStore::new();
        store.create_streamer(&sample(2)).await?;
        store.create_streamer(&sample(1)).await?;
        assert!(store.create_streamer(&sample(1)).await.is_err());

        store.update_streamer(&sample(2).with_score(7)).await?;
        assert_eq!(store.fetch_streamer(2).await?.score, 7);

        let ids: Vec<i64> = store.list_streamers().await?.iter().map(|s| s.streamer_id).collect();
        assert_eq!(ids, vec![1, 2]);
        Ok(())
    }

    #[tokio::test]
    async fn missing_records() {
        let store = MemoryStreamerStore::new();
        assert!(matches!(store.fetch_streamer(9).await, Err(Error::NotFound(_))));
        assert!(matches!(store.update_streamer(&sample(9)).await, Err(Error::NotFound(_))));
    }
}
