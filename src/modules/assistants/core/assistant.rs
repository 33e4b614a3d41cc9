// Lab assistants: staff profiles linked to a user account.

use crate::shared::concurrency::conflict_policy::ConflictPolicy;
use crate::shared::core::record::{
    RecordPatch, VersionedRecord, double_option, require_email, require_non_blank,
};
use serde::{Deserialize, Serialize};

pub const CONFLICT_POLICY: ConflictPolicy = ConflictPolicy::RejectOnConflict;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistantStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assistant {
    pub id: String,
    pub version: u64,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: AssistantStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantDraft {
    pub user_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: AssistantStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    pub status: Option<AssistantStatus>,
}

impl VersionedRecord for Assistant {
    type Draft = AssistantDraft;
    type Patch = AssistantPatch;

    const KIND: &'static str = "assistant";
    const INITIAL_VERSION: u64 = 0;

    fn from_draft(id: String, draft: AssistantDraft, now: i64) -> Result<Self, String> {
        require_non_blank("user_id", &draft.user_id)?;
        require_non_blank("name", &draft.name)?;
        require_email("email", &draft.email)?;
        Ok(Self {
            id,
            version: Self::INITIAL_VERSION,
            user_id: draft.user_id,
            name: draft.name,
            email: draft.email,
            phone: draft.phone,
            status: draft.status,
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
}

impl RecordPatch<Assistant> for AssistantPatch {
    fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            require_non_blank("name", name)?;
        }
        if let Some(email) = &self.email {
            require_email("email", email)?;
        }
        Ok(())
    }

    fn apply_to(&self, assistant: &mut Assistant) {
        if let Some(name) = &self.name {
            assistant.name = name.clone();
        }
        if let Some(email) = &self.email {
            assistant.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            assistant.phone = phone.clone();
        }
        if let Some(status) = self.status {
            assistant.status = status;
        }
    }

    fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("name", self.name.is_some()),
            ("email", self.email.is_some()),
            ("phone", self.phone.is_some()),
            ("status", self.status.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, present)| present.then_some(field))
        .collect()
    }
}
