// File: kudos-core/src/form.rs

use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use kudos_common::models::{Platform, Streamer};
use crate::config::SaveFailurePolicy;
use crate::links::{FieldId, LinkError, PlatformSlotAllocator};
use crate::persist::{write_with_policy, WriteKind};
use crate::{Error, RosterSync, StreamerStore};

/// A single problem that blocks submission, rendered next to its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("name is required")]
    NameRequired,

    #[error("description is required")]
    DescriptionRequired,

    #[error("At least one proper link must be added")]
    NoLinks,

    #[error("{platform} link (row {index}): {error}")]
    Link {
        index: usize,
        field: FieldId,
        platform: Platform,
        error: LinkError,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("streamer form has {} invalid field(s)", .errors.len())]
pub struct FormErrors {
    pub errors: Vec<FieldError>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The error to show next to link field `id`, if any.
    pub fn for_link(&self, id: FieldId) -> Option<&LinkError> {
        self.errors.iter().find_map(|e| match e {
            FieldError::Link { field, error, .. } if *field == id => Some(error),
            _ => None,
        })
    }

    pub fn contains(&self, wanted: &FieldError) -> bool {
        self.errors.contains(wanted)
    }
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] FormErrors),

    /// The store write failed (after any retries the policy allows).
    #[error("saving streamer failed: {0}")]
    Persistence(#[source] Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(Streamer),
    Updated(Streamer),
}

impl SubmitOutcome {
    pub fn streamer(&self) -> &Streamer {
        match self {
            SubmitOutcome::Created(s) | SubmitOutcome::Updated(s) => s,
        }
    }
}

/// Create/edit form for one streamer.
pub struct StreamerForm {
    initial: Option<Streamer>,
    name: String,
    description: String,
    links: PlatformSlotAllocator,
    save_policy: SaveFailurePolicy,
}

impl Default for StreamerForm {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamerForm {
    /// Blank form for a new streamer.
    pub fn new() -> Self {
        Self {
            initial: None,
            name: String::new(),
            description: String::new(),
            links: PlatformSlotAllocator::new(),
            save_policy: SaveFailurePolicy::default(),
        }
    }

    /// Form pre-filled from an existing record.
    pub fn edit(streamer: Streamer) -> Self {
        Self {
            name: streamer.name.clone(),
            description: streamer.description.clone(),
            links: PlatformSlotAllocator::from_links(&streamer.links),
            initial: Some(streamer),
            save_policy: SaveFailurePolicy::default(),
        }
    }

    /// Fetches a record and opens it for editing.
    pub async fn load(store: &dyn StreamerStore, streamer_id: i64) -> Result<Self, Error> {
        let streamer = store.fetch_streamer(streamer_id).await?;
        Ok(Self::edit(streamer))
    }

    pub fn with_save_policy(mut self, policy: SaveFailurePolicy) -> Self {
        self.save_policy = policy;
        self
    }

    pub fn is_edit(&self) -> bool {
        self.initial.is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    pub fn links(&self) -> &PlatformSlotAllocator {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut PlatformSlotAllocator {
        &mut self.links
    }

    /// Runs every check and, if all pass, builds the record to persist.
    /// Existing records keep their id, score and avatar; new ones get a
    /// fresh id, zero score and a random avatar.
    pub fn validate(&mut self) -> Result<Streamer, FormErrors> {
        let mut errors = Vec::new();
        let name = self.name.trim();
        let description = self.description.trim();
        if name.is_empty() {
            errors.push(FieldError::NameRequired);
        }
        if description.is_empty() {
            errors.push(FieldError::DescriptionRequired);
        }
        let links = match self.links.check_submission() {
            Ok(links) => links,
            Err(link_errors) => {
                errors.extend(link_errors);
                Vec::new()
            }
        };
        if !errors.is_empty() {
            return Err(FormErrors { errors });
        }

        Ok(match &self.initial {
            Some(existing) => Streamer {
                streamer_id: existing.streamer_id,
                name: name.to_string(),
                description: description.to_string(),
                score: existing.score,
                links,
                avatar_id: existing.avatar_id,
            },
            None => Streamer::new(name, description, links),
        })
    }

    /// Validates and persists the form: exactly one create or update call
    /// when valid, none otherwise. The roster is asked to re-sync afterwards
    /// without waiting for it.
    pub async fn submit(
        &mut self,
        store: &dyn StreamerStore,
        sync: Arc<dyn RosterSync>,
    ) -> Result<SubmitOutcome, SubmitError> {
        let record = self.validate()?;
        let kind = if self.is_edit() { WriteKind::Update } else { WriteKind::Create };

        if let Err(e) = write_with_policy(store, kind, &record, self.save_policy).await {
            error!("Streamer form {} for {} failed: {}", kind, record.streamer_id, e);
            return Err(SubmitError::Persistence(e));
        }
        info!("Streamer form {}d streamer {} ({})", kind, record.streamer_id, record.name);

        tokio::spawn(async move {
            if let Err(e) = sync.sync_streamers().await {
                warn!("Roster sync after form submit failed: {}", e);
            }
        });

        // Later submits from this form update the saved record.
        self.initial = Some(record.clone());
        Ok(match kind {
            WriteKind::Create => SubmitOutcome::Created(record),
            WriteKind::Update => SubmitOutcome::Updated(record),
        })
    }
}
