// File: kudos-core/src/persist.rs

use std::fmt;
use tokio::time::sleep;
use tracing::{debug, warn};
use kudos_common::models::Streamer;
use crate::config::SaveFailurePolicy;
use crate::{Error, StreamerStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update,
}

impl fmt::Display for WriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteKind::Create => write!(f, "create"),
            WriteKind::Update => write!(f, "update"),
        }
    }
}

/// Writes `record` once, then keeps retrying if the policy says so.
/// Returns the last error when every attempt failed; what the caller does with
/// it (drop, alert, return) is up to the caller.
pub async fn write_with_policy(
    store: &dyn StreamerStore,
    kind: WriteKind,
    record: &Streamer,
    policy: SaveFailurePolicy,
) -> Result<(), Error> {
    write_with_policy_unless(store, kind, record, policy, &|| false).await
}

/// Like [`write_with_policy`], but gives up retrying as soon as `superseded`
/// reports that a newer record is waiting to be written.
pub async fn write_with_policy_unless(
    store: &dyn StreamerStore,
    kind: WriteKind,
    record: &Streamer,
    policy: SaveFailurePolicy,
    superseded: &(dyn Fn() -> bool + Send + Sync),
) -> Result<(), Error> {
    let (retries, mut backoff) = match policy {
        SaveFailurePolicy::Retry { attempts, backoff } => (attempts, backoff),
        _ => (0, Default::default()),
    };

    let mut attempt = 0;
    loop {
        let result = match kind {
            WriteKind::Create => store.create_streamer(record).await,
            WriteKind::Update => store.update_streamer(record).await,
        };
        match result {
            Ok(()) => {
                debug!("{} streamer_id={} ok after {} attempt(s)", kind, record.streamer_id, attempt + 1);
                return Ok(());
            }
            Err(e) if attempt < retries && !superseded() => {
                attempt += 1;
                warn!(
                    "{} streamer_id={} failed ({}); retry {}/{} in {:?}",
                    kind, record.streamer_id, e, attempt, retries, backoff
                );
                sleep(backoff).await;
                backoff *= 2;
                if superseded() {
                    debug!("{} streamer_id={} superseded; not retrying", kind, record.streamer_id);
                    return Err(e);
                }
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use async_trait::async_trait;
    use kudos_common::models::AvatarId;

    /// Fails every update and counts the attempts.
    #[derive(Default)]
    struct DownStore {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl StreamerStore for DownStore {
        async fn list_streamers(&self) -> Result<Vec<Streamer>, Error> {
            Ok(vec![])
        }
        async fn fetch_streamer(&self, streamer_id: i64) -> Result<Streamer, Error> {
            Err(Error::NotFound(format!("streamer {}", streamer_id)))
        }
        async fn create_streamer(&self, _streamer: &Streamer) -> Result<(), Error> {
            Err(Error::Persistence("down".into()))
        }
        async fn update_streamer(&self, _streamer: &Streamer) -> Result<(), Error> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(Error::Persistence("down".into()))
        }
    }

    fn record() -> Streamer {
        Streamer {
            streamer_id: 3,
            name: "n".into(),
            description: "d".into(),
            score: 4,
            links: vec![],
            avatar_id: AvatarId(0),
        }
    }

    fn retry() -> SaveFailurePolicy {
        SaveFailurePolicy::Retry { attempts: 3, backoff: Duration::from_millis(100) }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_attempts_run_out() {
        let store = DownStore::default();
        let result = write_with_policy(&store, WriteKind::Update, &record(), retry()).await;
        assert!(matches!(result, Err(Error::Persistence(_))));
        assert_eq!(store.attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_write_stops_retrying() {
        let store = DownStore::default();
        let newer = AtomicBool::new(false);
        let superseded = || newer.swap(true, Ordering::SeqCst);

        let result =
            write_with_policy_unless(&store, WriteKind::Update, &record(), retry(), &superseded).await;
        assert!(result.is_err());
        // first attempt, one retry armed, then the newer record shows up
        assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
    }
}
