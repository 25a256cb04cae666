//! src/links/mod.rs
//!
//! Link fields of the streamer form and the pool of platforms they draw from.
//!
//! Every platform is, at all times, either in the pool (`available`) or owned
//! by exactly one field. Fields carry an identity handed out by the allocator
//! that never changes and is never reused, so removing a row from the middle
//! does not shift anybody else's identity.

pub mod validate;

use std::fmt;
use tracing::{debug, warn};
use kudos_common::models::{Link, Platform};
use crate::form::FieldError;
use crate::Error;

pub use validate::{validate_link, LinkError};

/// Stable identity of a link field within one allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(u64);

impl FieldId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-field lifecycle. Removal is terminal and simply drops the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldState {
    Created,
    Editing,
    Valid,
    Invalid(LinkError),
}

#[derive(Debug, Clone)]
pub struct LinkField {
    id: FieldId,
    platform: Platform,
    value: Option<String>,
    state: FieldState,
}

impl LinkField {
    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn state(&self) -> &FieldState {
        &self.state
    }

    /// Validates the current value without changing state.
    pub fn check(&self) -> Result<(), LinkError> {
        validate_link(self.value.as_deref()).map(|_| ())
    }

    fn settle(&mut self) -> Result<(), LinkError> {
        let result = self.check();
        self.state = match &result {
            Ok(()) => FieldState::Valid,
            Err(e) => FieldState::Invalid(e.clone()),
        };
        result
    }
}

#[derive(Debug, Clone)]
pub struct PlatformSlotAllocator {
    available: Vec<Platform>,
    fields: Vec<LinkField>,
    selected: Option<Platform>,
    next_id: u64,
}

impl Default for PlatformSlotAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformSlotAllocator {
    /// No fields; every platform available.
    pub fn new() -> Self {
        Self {
            available: Platform::ALL.to_vec(),
            fields: Vec::new(),
            selected: Platform::ALL.first().copied(),
            next_id: 0,
        }
    }

    /// Seeds one field per existing link; the pool is whatever is left.
    pub fn from_links(links: &[Link]) -> Self {
        let mut alloc = Self::new();
        for link in links {
            if !alloc.available.contains(&link.platform) {
                warn!("Ignoring duplicate {} link in existing record", link.platform);
                continue;
            }
            alloc.take_platform(link.platform);
            let id = alloc.next_field_id();
            alloc.fields.push(LinkField {
                id,
                platform: link.platform,
                value: link.link.clone(),
                state: FieldState::Created,
            });
        }
        alloc.selected = alloc.available.first().copied();
        alloc
    }

    pub fn available(&self) -> &[Platform] {
        &self.available
    }

    pub fn fields(&self) -> &[LinkField] {
        &self.fields
    }

    pub fn field(&self, id: FieldId) -> Option<&LinkField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// The platform the "add platform" control currently points at.
    pub fn selected(&self) -> Option<Platform> {
        self.selected
    }

    /// Whether the "add platform" control should be enabled.
    pub fn can_add(&self) -> bool {
        !self.available.is_empty()
    }

    pub fn select(&mut self, platform: Platform) -> Result<(), Error> {
        if !self.available.contains(&platform) {
            return Err(Error::InvalidPlatform(platform));
        }
        self.selected = Some(platform);
        Ok(())
    }

    /// Appends an empty field for `platform`, taking it out of the pool.
    pub fn add_field(&mut self, platform: Platform) -> Result<FieldId, Error> {
        if !self.available.contains(&platform) {
            return Err(Error::InvalidPlatform(platform));
        }
        self.take_platform(platform);
        let id = self.next_field_id();
        self.fields.push(LinkField {
            id,
            platform,
            value: None,
            state: FieldState::Created,
        });
        self.selected = self.available.first().copied();
        debug!("Added {} link field {}; {} platform(s) left", platform, id, self.available.len());
        Ok(id)
    }

    pub fn add_selected_field(&mut self) -> Result<FieldId, Error> {
        let platform = self.selected.ok_or(Error::NoPlatformAvailable)?;
        self.add_field(platform)
    }

    /// Removes a field in any state and returns its platform to the pool.
    pub fn remove_field(&mut self, id: FieldId) -> Result<Platform, Error> {
        let pos = self
            .fields
            .iter()
            .position(|f| f.id == id)
            .ok_or(Error::UnknownField(id.0))?;
        let field = self.fields.remove(pos);
        self.available.push(field.platform);
        if self.selected.is_none() {
            self.selected = Some(field.platform);
        }
        debug!("Removed {} link field {}", field.platform, id);
        Ok(field.platform)
    }

    /// Stores a new raw value and re-validates it. Returns the current
    /// problem with the value, if any; the field stays in `Editing` until
    /// [`blur`](Self::blur) or a submission check settles it.
    pub fn set_value(&mut self, id: FieldId, raw: &str) -> Result<Option<LinkError>, Error> {
        let field = self.field_mut(id)?;
        field.value = Some(raw.to_string());
        field.state = FieldState::Editing;
        Ok(field.check().err())
    }

    /// Validates `raw` as the value of field `id`, without storing it.
    pub fn validate_field(&self, id: FieldId, raw: Option<&str>) -> Result<Option<LinkError>, Error> {
        self.field(id).ok_or(Error::UnknownField(id.0))?;
        Ok(validate_link(raw).err())
    }

    /// Settles an edited field into `Valid` or `Invalid`.
    pub fn blur(&mut self, id: FieldId) -> Result<&FieldState, Error> {
        let field = self.field_mut(id)?;
        let _ = field.settle();
        Ok(&field.state)
    }

    /// Submission-time check: at least one field, every field valid.
    /// Settles every field's state and returns the links to persist.
    pub fn check_submission(&mut self) -> Result<Vec<Link>, Vec<FieldError>> {
        if self.fields.is_empty() {
            return Err(vec![FieldError::NoLinks]);
        }

        let mut errors = Vec::new();
        for (index, field) in self.fields.iter_mut().enumerate() {
            if let Err(error) = field.settle() {
                errors.push(FieldError::Link {
                    index,
                    field: field.id,
                    platform: field.platform,
                    error,
                });
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(self
            .fields
            .iter()
            .map(|f| Link {
                platform: f.platform,
                link: f.value.as_deref().map(|v| v.trim().to_string()),
            })
            .collect())
    }

    fn field_mut(&mut self, id: FieldId) -> Result<&mut LinkField, Error> {
        self.fields
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(Error::UnknownField(id.0))
    }

    fn take_platform(&mut self, platform: Platform) {
        self.available.retain(|p| *p != platform);
    }

    fn next_field_id(&mut self) -> FieldId {
        let id = FieldId(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn assert_partition(alloc: &PlatformSlotAllocator) {
        let mut seen: Vec<Platform> = alloc.available().to_vec();
        seen.extend(alloc.fields().iter().map(|f| f.platform()));
        let unique: BTreeSet<Platform> = seen.iter().copied().collect();
        assert_eq!(seen.len(), Platform::ALL.len(), "duplicate or lost platform: {:?}", seen);
        assert_eq!(unique, Platform::ALL.iter().copied().collect());
    }

    #[test]
    fn fresh_allocator_offers_everything() {
        let alloc = PlatformSlotAllocator::new();
        assert_eq!(alloc.available(), &Platform::ALL);
        assert_eq!(alloc.selected(), Some(Platform::Twitch));
        assert!(alloc.fields().is_empty());
        assert!(alloc.can_add());
    }

    #[test]
    fn seeding_from_links_removes_used_platforms() {
        let alloc = PlatformSlotAllocator::from_links(&[
            Link::new(Platform::Youtube, "https://youtube.com/x"),
            Link::new(Platform::Kick, "https://kick.com/x"),
            Link::new(Platform::Kick, "https://kick.com/dup"),
        ]);
        assert_eq!(alloc.fields().len(), 2);
        assert_eq!(alloc.available(), &[Platform::Twitch, Platform::Tiktok, Platform::Rumble]);
        assert_eq!(alloc.selected(), Some(Platform::Twitch));
        assert_partition(&alloc);
    }

    #[test]
    fn add_resets_selection_to_first_available() -> Result<(), Error> {
        let mut alloc = PlatformSlotAllocator::new();
        alloc.select(Platform::Kick)?;
        alloc.add_selected_field()?;
        assert_eq!(alloc.selected(), Some(Platform::Twitch));
        assert!(!alloc.available().contains(&Platform::Kick));
        assert_partition(&alloc);
        Ok(())
    }

    #[test]
    fn exhausting_the_pool_disables_adding() -> Result<(), Error> {
        let mut alloc = PlatformSlotAllocator::new();
        for _ in 0..Platform::ALL.len() {
            alloc.add_selected_field()?;
        }
        assert!(!alloc.can_add());
        assert_eq!(alloc.selected(), None);
        assert!(matches!(alloc.add_selected_field(), Err(Error::NoPlatformAvailable)));
        assert!(matches!(alloc.add_field(Platform::Rumble), Err(Error::InvalidPlatform(Platform::Rumble))));
        assert_eq!(alloc.fields().len(), 5);

        // freeing one makes it the selection again
        let id = alloc.fields()[2].id();
        let freed = alloc.remove_field(id)?;
        assert_eq!(alloc.selected(), Some(freed));
        assert_partition(&alloc);
        Ok(())
    }

    #[test]
    fn identities_survive_mid_list_removal() -> Result<(), Error> {
        let mut alloc = PlatformSlotAllocator::new();
        let a = alloc.add_field(Platform::Twitch)?;
        let b = alloc.add_field(Platform::Youtube)?;
        let c = alloc.add_field(Platform::Kick)?;
        alloc.set_value(c, "https://kick.com/c")?;

        alloc.remove_field(b)?;
        assert_eq!(alloc.fields().iter().map(|f| f.id()).collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(alloc.field(c).and_then(|f| f.value()), Some("https://kick.com/c"));
        assert!(matches!(alloc.remove_field(b), Err(Error::UnknownField(_))));
        Ok(())
    }

    #[test]
    fn field_state_machine() -> Result<(), Error> {
        let mut alloc = PlatformSlotAllocator::new();
        let id = alloc.add_field(Platform::Tiktok)?;
        assert_eq!(alloc.field(id).map(|f| f.state().clone()), Some(FieldState::Created));

        assert!(alloc.set_value(id, "nope")?.is_some());
        assert_eq!(alloc.field(id).map(|f| f.state().clone()), Some(FieldState::Editing));
        assert!(matches!(alloc.blur(id)?, FieldState::Invalid(LinkError::Malformed(_))));

        assert_eq!(alloc.set_value(id, "tiktok.com/@x")?, None);
        assert_eq!(alloc.blur(id)?, &FieldState::Valid);

        // removal works from any state
        alloc.set_value(id, "")?;
        alloc.remove_field(id)?;
        assert!(alloc.field(id).is_none());
        assert!(alloc.available().contains(&Platform::Tiktok));
        Ok(())
    }

    #[test]
    fn validate_field_requires_known_id() -> Result<(), Error> {
        let mut alloc = PlatformSlotAllocator::new();
        let id = alloc.add_field(Platform::Rumble)?;
        assert_eq!(alloc.validate_field(id, None)?, Some(LinkError::Missing));
        assert_eq!(alloc.validate_field(id, Some("")).unwrap(), Some(LinkError::Empty));
        assert_eq!(alloc.validate_field(id, Some(" rumble.com/x ")).unwrap(), None);
        alloc.remove_field(id)?;
        assert!(alloc.validate_field(id, Some("rumble.com/x")).is_err());
        Ok(())
    }

    #[test]
    fn submission_check_reports_every_bad_field() -> Result<(), Error> {
        let mut alloc = PlatformSlotAllocator::new();
        assert_eq!(alloc.check_submission(), Err(vec![FieldError::NoLinks]));

        let a = alloc.add_field(Platform::Twitch)?;
        let b = alloc.add_field(Platform::Youtube)?;
        alloc.set_value(a, " https://twitch.tv/x ")?;

        let errors = alloc.check_submission().unwrap_err();
        assert_eq!(
            errors,
            vec![FieldError::Link {
                index: 1,
                field: b,
                platform: Platform::Youtube,
                error: LinkError::Missing,
            }]
        );
        assert_eq!(alloc.field(a).map(|f| f.state().clone()), Some(FieldState::Valid));

        alloc.set_value(b, "youtube.com/@x")?;
        let links = alloc.check_submission().unwrap();
        assert_eq!(links[0], Link::new(Platform::Twitch, "https://twitch.tv/x"));
        assert_eq!(links[1], Link::new(Platform::Youtube, "youtube.com/@x"));
        Ok(())
    }
}
