// Lab events (meetings, instrument bookings). Updated through the merge policy.

use crate::shared::concurrency::conflict_policy::ConflictPolicy;
use crate::shared::core::record::{RecordPatch, VersionedRecord, double_option, require_non_blank};
use serde::{Deserialize, Serialize};

pub const CONFLICT_POLICY: ConflictPolicy = ConflictPolicy::MergeOnConflict;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub version: u64,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub starts_at: i64,
    pub ends_at: i64,
    pub attendee_ids: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    pub starts_at: i64,
    pub ends_at: i64,
    #[serde(default)]
    pub attendee_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    pub starts_at: Option<i64>,
    pub ends_at: Option<i64>,
    pub attendee_ids: Option<Vec<String>>,
}

fn require_interval(starts_at: i64, ends_at: i64) -> Result<(), String> {
    if ends_at < starts_at {
        return Err("ends_at must not be before starts_at".into());
    }
    Ok(())
}

impl VersionedRecord for Event {
    type Draft = EventDraft;
    type Patch = EventPatch;

    const KIND: &'static str = "event";
    const INITIAL_VERSION: u64 = 1;

    fn from_draft(id: String, draft: EventDraft, now: i64) -> Result<Self, String> {
        require_non_blank("title", &draft.title)?;
        require_interval(draft.starts_at, draft.ends_at)?;
        Ok(Self {
            id,
            version: Self::INITIAL_VERSION,
            title: draft.title,
            description: draft.description,
            location: draft.location,
            starts_at: draft.starts_at,
            ends_at: draft.ends_at,
            attendee_ids: draft.attendee_ids,
            created_at: now,
            updated_at: now,
        })
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn touch(&mut self, now: i64) {
        self.updated_at = now;
    }

    fn validate(&self) -> Result<(), String> {
        require_interval(self.starts_at, self.ends_at)
    }
}

impl RecordPatch<Event> for EventPatch {
    /// Checks the interval when both ends are sent. A one-sided move is checked against the
    /// stored record once merged.
    fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            require_non_blank("title", title)?;
        }
        if let (Some(starts_at), Some(ends_at)) = (self.starts_at, self.ends_at) {
            require_interval(starts_at, ends_at)?;
        }
        Ok(())
    }

    fn apply_to(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title = title.clone();
        }
        if let Some(description) = &self.description {
            event.description = description.clone();
        }
        if let Some(location) = &self.location {
            event.location = location.clone();
        }
        if let Some(starts_at) = self.starts_at {
            event.starts_at = starts_at;
        }
        if let Some(ends_at) = self.ends_at {
            event.ends_at = ends_at;
        }
        if let Some(attendee_ids) = &self.attendee_ids {
            event.attendee_ids = attendee_ids.clone();
        }
    }

    fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("title", self.title.is_some()),
            ("description", self.description.is_some()),
            ("location", self.location.is_some()),
            ("starts_at", self.starts_at.is_some()),
            ("ends_at", self.ends_at.is_some()),
            ("attendee_ids", self.attendee_ids.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, present)| present.then_some(field))
        .collect()
    }
}
