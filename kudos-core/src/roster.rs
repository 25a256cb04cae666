// File: kudos-core/src/roster.rs

use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info};
use kudos_common::models::Streamer;
use crate::votes::VoteWidget;
use crate::{Error, RosterSync, StreamerStore};

/// The streamer list view: last fetched roster plus a channel that sees every
/// refresh. Vote widgets and forms call back into it after a successful save.
pub struct Roster {
    store: Arc<dyn StreamerStore>,
    snapshot: watch::Sender<Vec<Streamer>>,
}

impl Roster {
    pub fn new(store: Arc<dyn StreamerStore>) -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self { store, snapshot: tx }
    }

    pub fn store(&self) -> Arc<dyn StreamerStore> {
        self.store.clone()
    }

    /// Re-pulls the whole roster and publishes it. Safe to call repeatedly.
    pub async fn sync(&self) -> Result<Vec<Streamer>, Error> {
        let streamers = self.store.list_streamers().await?;
        debug!("Roster synced: {} streamer(s)", streamers.len());
        self.snapshot.send_replace(streamers.clone());
        Ok(streamers)
    }

    pub fn snapshot(&self) -> Vec<Streamer> {
        self.snapshot.borrow().clone()
    }

    pub fn get(&self, streamer_id: i64) -> Option<Streamer> {
        self.snapshot
            .borrow()
            .iter()
            .find(|s| s.streamer_id == streamer_id)
            .cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Streamer>> {
        self.snapshot.subscribe()
    }

    /// Hands a widget its record from the current snapshot. Returns whether
    /// the streamer was found.
    pub fn refresh_widget(&self, widget: &mut VoteWidget) -> Result<bool, Error> {
        match self.get(widget.streamer_id()) {
            Some(fresh) => {
                widget.resync(fresh)?;
                Ok(true)
            }
            None => {
                info!("Streamer {} no longer in roster", widget.streamer_id());
                Ok(false)
            }
        }
    }
}

#[async_trait]
impl RosterSync for Roster {
    async fn sync_streamers(&self) -> Result<(), Error> {
        self.sync().await.map(|_| ())
    }
}
