// src/lib.rs

pub mod config;
pub mod http;
pub mod persist;
pub mod stores;
pub mod votes;
pub mod links;
pub mod form;
pub mod roster;

pub use kudos_common::error::Error;
pub use kudos_common::models;
pub use kudos_common::traits::{NoopSync, RosterSync, StreamerStore};
pub use config::{KudosConfig, RetrySettings, SaveFailurePolicy, VoteSettings};
pub use http::{DefaultHttpClient, HttpClient};
pub use votes::{PersistenceAlert, VoteWidget};
pub use links::{FieldId, FieldState, LinkError, LinkField, PlatformSlotAllocator};
pub use form::{FieldError, FormErrors, StreamerForm, SubmitError, SubmitOutcome};
pub use roster::Roster;
