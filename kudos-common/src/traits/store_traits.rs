use async_trait::async_trait;
use crate::error::Error;
use crate::models::streamer::Streamer;

/// The roster backend. Writes are full-record replacements keyed by
/// `streamer_id`; last write wins.
#[async_trait]
pub trait StreamerStore: Send + Sync {
    async fn list_streamers(&self) -> Result<Vec<Streamer>, Error>;
    async fn fetch_streamer(&self, streamer_id: i64) -> Result<Streamer, Error>;
    async fn create_streamer(&self, streamer: &Streamer) -> Result<(), Error>;
    async fn update_streamer(&self, streamer: &Streamer) -> Result<(), Error>;
}

/// Completion hook: asks the surrounding list view to re-pull the roster.
/// Callers never wait on it for correctness.
#[async_trait]
pub trait RosterSync: Send + Sync {
    async fn sync_streamers(&self) -> Result<(), Error>;
}

/// A sync hook that does nothing, for forms opened outside a list view.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSync;

#[async_trait]
impl RosterSync for NoopSync {
    async fn sync_streamers(&self) -> Result<(), Error> {
        Ok(())
    }
}
