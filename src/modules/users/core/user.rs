use crate::shared::concurrency::conflict_policy::ConflictPolicy;
use crate::shared::core::record::{RecordPatch, VersionedRecord, require_email, require_non_blank};
use serde::{Deserialize, Serialize};

pub const CONFLICT_POLICY: ConflictPolicy = ConflictPolicy::RejectOnConflict;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    #[default]
    Member,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub version: u64,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserDraft {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<UserRole>,
}

impl VersionedRecord for User {
    type Draft = UserDraft;
    type Patch = UserPatch;

    const KIND: &'static str = "user";
    const INITIAL_VERSION: u64 = 0;

    fn from_draft(id: String, draft: UserDraft, now: i64) -> Result<Self, String> {
        require_email("email", &draft.email)?;
        require_non_blank("name", &draft.name)?;
        Ok(Self {
            id,
            version: Self::INITIAL_VERSION,
            email: draft.email,
            name: draft.name,
            role: draft.role,
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

impl RecordPatch<User> for UserPatch {
    fn validate(&self) -> Result<(), String> {
        if let Some(email) = &self.email {
            require_email("email", email)?;
        }
        if let Some(name) = &self.name {
            require_non_blank("name", name)?;
        }
        Ok(())
    }

    fn apply_to(&self, user: &mut User) {
        if let Some(email) = &self.email {
            user.email = email.clone();
        }
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(role) = self.role {
            user.role = role;
        }
    }

    fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("email", self.email.is_some()),
            ("name", self.name.is_some()),
            ("role", self.role.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, present)| present.then_some(field))
        .collect()
    }
}
