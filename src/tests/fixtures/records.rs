// Minimal versioned record used by tests of the shared concurrency layer, so those tests do not
// depend on any resource module. `make_event` covers the one cross-field rule.

use crate::modules::events::core::event::Event;
use crate::shared::core::record::{RecordPatch, VersionedRecord, require_non_blank};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub version: u64,
    pub title: String,
    pub status: String,
    pub priority: String,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoteDraft {
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotePatch {
    pub title: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl VersionedRecord for Note {
    type Draft = NoteDraft;
    type Patch = NotePatch;

    const KIND: &'static str = "note";
    const INITIAL_VERSION: u64 = 1;

    fn from_draft(id: String, draft: Self::Draft, now: i64) -> Result<Self, String> {
        require_non_blank("title", &draft.title)?;
        Ok(Self {
            id,
            version: Self::INITIAL_VERSION,
            title: draft.title,
            status: "To Do".into(),
            priority: "low".into(),
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
}

impl RecordPatch<Note> for NotePatch {
    fn validate(&self) -> Result<(), String> {
        match &self.title {
            Some(title) => require_non_blank("title", title),
            None => Ok(()),
        }
    }

    fn apply_to(&self, record: &mut Note) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(status) = &self.status {
            record.status = status.clone();
        }
        if let Some(priority) = &self.priority {
            record.priority = priority.clone();
        }
    }

    fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.priority.is_some() {
            fields.push("priority");
        }
        fields
    }
}

pub fn make_note(id: &str, version: u64) -> Note {
    Note {
        id: id.to_string(),
        version,
        title: "Calibrate the centrifuge".into(),
        status: "To Do".into(),
        priority: "low".into(),
        updated_at: 0,
    }
}

/// Event spanning 1000..2000, for tests of rules checked on the merged record.
pub fn make_event(id: &str, version: u64) -> Event {
    Event {
        id: id.to_string(),
        version,
        title: "Safety briefing".into(),
        description: String::new(),
        location: None,
        starts_at: 1_000,
        ends_at: 2_000,
        attendee_ids: Vec::new(),
        created_at: 0,
        updated_at: 0,
    }
}
