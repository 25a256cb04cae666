//! src/votes/mod.rs
//!
//! Optimistic up/down voting with coalesced writes.
//!
//! A [`VoteWidget`] shows its score change the instant a vote is cast, and
//! persists the result only after the configured quiescence window has passed
//! since the *last* vote. Each widget owns one background task holding at most
//! one deadline; every vote replaces that deadline, so a burst of clicks ends
//! in a single `update_streamer` call carrying the net score.
//!
//! Expired deadlines hand their record to a second per-widget task that saves
//! one record at a time, so a widget's writes reach the store in vote order.
//! Older saves still waiting in that queue are skipped, and a failing save
//! stops retrying once a newer one is queued behind it.
//!
//! Dropping (or [`VoteWidget::unmount`]ing) the widget closes the command
//! channel. The task then exits without flushing, so an armed-but-unexpired
//! write is discarded. A save that already started is left to finish.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};
use kudos_common::models::{ScoreTone, Streamer};
use crate::config::{SaveFailurePolicy, VoteSettings};
use crate::persist::{write_with_policy_unless, WriteKind};
use crate::{Error, RosterSync, StreamerStore};

/// A vote flush that failed under [`SaveFailurePolicy::Alert`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceAlert {
    pub streamer_id: i64,
    /// The score that could not be saved (still displayed).
    pub score: i64,
    pub message: String,
}

#[derive(Debug)]
enum VoteCommand {
    /// Replace any armed flush with one for `score` at `deadline`.
    Arm {
        generation: u64,
        score: i64,
        deadline: Instant,
    },
    /// Fresh record from the list view; later flushes save on top of it.
    Refresh(Streamer),
}

pub struct VoteWidget {
    streamer_id: i64,
    baseline: i64,
    pending: i64,
    /// Number of votes cast through this widget.
    generation: u64,
    settings: VoteSettings,
    commands: mpsc::UnboundedSender<VoteCommand>,
    /// Highest vote generation whose score the store has accepted.
    flushed: watch::Receiver<u64>,
    alerts: Option<mpsc::UnboundedReceiver<PersistenceAlert>>,
}

impl VoteWidget {
    /// Mounts a widget for `streamer`, seeding the pending score from the
    /// persisted one. Must be called inside a tokio runtime.
    pub fn mount(
        streamer: Streamer,
        store: Arc<dyn StreamerStore>,
        sync: Arc<dyn RosterSync>,
        settings: VoteSettings,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (flushed_tx, flushed_rx) = watch::channel(0u64);
        let (alert_tx, alert_rx) = mpsc::unbounded_channel();

        let streamer_id = streamer.streamer_id;
        let score = streamer.score;
        debug!("Mounting vote widget for streamer {} at score {}", streamer_id, score);

        let (job_tx, job_rx) = mpsc::unbounded_channel();
        let queued = Arc::new(AtomicU64::new(0));
        let flusher = Flusher {
            store,
            sync,
            policy: settings.save_policy,
            flushed: flushed_tx,
            alerts: alert_tx,
            queued: queued.clone(),
        };
        tokio::spawn(run_flush_worker(job_rx, flusher));
        tokio::spawn(run_debounce_loop(streamer, cmd_rx, FlushQueue { jobs: job_tx, queued }));

        Self {
            streamer_id,
            baseline: score,
            pending: score,
            generation: 0,
            settings,
            commands: cmd_tx,
            flushed: flushed_rx,
            alerts: Some(alert_rx),
        }
    }

    /// Applies a +1 / -1 vote. The new score is returned (and visible through
    /// [`score`](Self::score)) immediately; the write is deferred.
    pub fn vote(&mut self, delta: i64) -> Result<i64, Error> {
        if delta != 1 && delta != -1 {
            return Err(Error::InvalidVote(delta));
        }
        let score = self.pending + delta;
        let generation = self.generation + 1;
        let deadline = Instant::now() + self.settings.debounce;

        self.commands
            .send(VoteCommand::Arm { generation, score, deadline })
            .map_err(|_| Error::WidgetClosed)?;

        self.pending = score;
        self.generation = generation;
        Ok(score)
    }

    pub fn upvote(&mut self) -> Result<i64, Error> {
        self.vote(1)
    }

    pub fn downvote(&mut self) -> Result<i64, Error> {
        self.vote(-1)
    }

    /// Takes in a freshly fetched record for this streamer.
    ///
    /// The baseline always follows the server. The displayed score only does
    /// when no vote is waiting to be (or failed to be) persisted; otherwise the
    /// local value keeps shadowing it.
    pub fn resync(&mut self, streamer: Streamer) -> Result<(), Error> {
        if streamer.streamer_id != self.streamer_id {
            return Err(Error::NotFound(format!(
                "vote widget for {} got record {}",
                self.streamer_id, streamer.streamer_id
            )));
        }
        self.baseline = streamer.score;
        if self.has_unflushed_votes() {
            debug!(
                "Streamer {}: keeping pending score {} over server score {}",
                self.streamer_id, self.pending, streamer.score
            );
        } else {
            self.pending = streamer.score;
        }
        self.commands
            .send(VoteCommand::Refresh(streamer))
            .map_err(|_| Error::WidgetClosed)
    }

    pub fn score(&self) -> i64 {
        self.pending
    }

    pub fn baseline(&self) -> i64 {
        self.baseline
    }

    pub fn streamer_id(&self) -> i64 {
        self.streamer_id
    }

    pub fn tone(&self) -> ScoreTone {
        ScoreTone::of(self.pending)
    }

    pub fn has_unflushed_votes(&self) -> bool {
        *self.flushed.borrow() < self.generation
    }

    /// Receiver for failed flushes when the policy is `Alert`. Can be taken
    /// once.
    pub fn take_alerts(&mut self) -> Option<mpsc::UnboundedReceiver<PersistenceAlert>> {
        self.alerts.take()
    }

    /// Tears the widget down. Any armed flush is cancelled, not fired.
    pub fn unmount(self) {
        if self.has_unflushed_votes() {
            info!(
                "Unmounting vote widget for streamer {} with unsaved score {}",
                self.streamer_id, self.pending
            );
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ArmedFlush {
    generation: u64,
    score: i64,
    deadline: Instant,
}

#[derive(Debug)]
struct FlushJob {
    record: Streamer,
    generation: u64,
}

/// Sending half of a widget's save queue.
struct FlushQueue {
    jobs: mpsc::UnboundedSender<FlushJob>,
    /// Highest generation handed to the worker.
    queued: Arc<AtomicU64>,
}

impl FlushQueue {
    fn push(&self, record: Streamer, generation: u64) {
        self.queued.fetch_max(generation, Ordering::SeqCst);
        let streamer_id = record.streamer_id;
        if self.jobs.send(FlushJob { record, generation }).is_err() {
            warn!("Flush worker for streamer {} is gone; score not saved", streamer_id);
        }
    }
}

async fn run_debounce_loop(
    mut record: Streamer,
    mut commands: mpsc::UnboundedReceiver<VoteCommand>,
    queue: FlushQueue,
) {
    let mut armed: Option<ArmedFlush> = None;

    loop {
        let deadline = armed.map(|a| a.deadline).unwrap_or_else(Instant::now);

        tokio::select! {
            biased;

            cmd = commands.recv() => match cmd {
                Some(VoteCommand::Arm { generation, score, deadline }) => {
                    armed = Some(ArmedFlush { generation, score, deadline });
                }
                Some(VoteCommand::Refresh(fresh)) => {
                    record = fresh;
                }
                None => {
                    if let Some(a) = armed {
                        debug!(
                            "Vote widget for {} closed; discarding armed flush of score {}",
                            record.streamer_id, a.score
                        );
                    }
                    return;
                }
            },

            _ = sleep_until(deadline), if armed.is_some() => {
                if let Some(a) = armed.take() {
                    queue.push(record.with_score(a.score), a.generation);
                }
            }
        }
    }
}

/// Saves queued records one at a time. Outlives the widget until the queue
/// is drained, so a dispatched save is never cut short by an unmount.
async fn run_flush_worker(mut jobs: mpsc::UnboundedReceiver<FlushJob>, flusher: Flusher) {
    while let Some(mut job) = jobs.recv().await {
        // Each job carries an absolute score; only the newest one matters.
        while let Ok(newer) = jobs.try_recv() {
            debug!(
                "Streamer {}: skipping queued score {} for {}",
                job.record.streamer_id, job.record.score, newer.record.score
            );
            job = newer;
        }
        flusher.flush(job.record, job.generation).await;
    }
}

struct Flusher {
    store: Arc<dyn StreamerStore>,
    sync: Arc<dyn RosterSync>,
    policy: SaveFailurePolicy,
    flushed: watch::Sender<u64>,
    alerts: mpsc::UnboundedSender<PersistenceAlert>,
    queued: Arc<AtomicU64>,
}

impl Flusher {
    async fn flush(&self, record: Streamer, generation: u64) {
        debug!("Flushing score {} for streamer {}", record.score, record.streamer_id);

        let superseded = || self.queued.load(Ordering::SeqCst) > generation;
        let result = write_with_policy_unless(
            self.store.as_ref(),
            WriteKind::Update,
            &record,
            self.policy,
            &superseded,
        )
        .await;

        match result {
            Ok(()) => {
                self.flushed.send_modify(|g| *g = (*g).max(generation));
                if let Err(e) = self.sync.sync_streamers().await {
                    warn!("Roster sync after vote on {} failed: {}", record.streamer_id, e);
                }
            }
            Err(e) if superseded() => {
                debug!(
                    "Dropping failed save of score {} for streamer {}: newer score queued ({})",
                    record.score, record.streamer_id, e
                );
            }
            Err(e) => {
                // The optimistic score stays on screen either way.
                error!("Saving score {} for streamer {} failed: {}", record.score, record.streamer_id, e);
                if self.policy == SaveFailurePolicy::Alert {
                    let _ = self.alerts.send(PersistenceAlert {
                        streamer_id: record.streamer_id,
                        score: record.score,
                        message: e.to_string(),
                    });
                }
            }
        }
    }
}
