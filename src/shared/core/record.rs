// Versioned records and partial patches shared by every resource.
//
// Purpose
// - Describe what the concurrency layer needs from a resource, without knowing its fields.
//
// Responsibilities
// - Expose the identifier and the optimistic concurrency token of a record.
// - Build a record from a creation draft.
// - Apply only the fields a client explicitly sent.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

pub trait VersionedRecord: Clone + Send + Sync + Serialize + 'static {
    type Draft: DeserializeOwned + Send + 'static;
    type Patch: RecordPatch<Self> + DeserializeOwned + Send + Sync + 'static;

    /// Resource name used in serializer keys, errors and logs.
    const KIND: &'static str;
    const INITIAL_VERSION: u64;

    fn from_draft(id: String, draft: Self::Draft, now: i64) -> Result<Self, String>;

    fn id(&self) -> &str;
    fn version(&self) -> u64;
    fn set_version(&mut self, version: u64);
    fn touch(&mut self, now: i64);

    /// Rules spanning several fields, checked on the merged record before it is written.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Marks a committed update: exactly one version step and a fresh timestamp.
    fn advance(&mut self, now: i64) {
        let next = self.version() + 1;
        self.set_version(next);
        self.touch(now);
    }
}

pub trait RecordPatch<R>: Send + Sync {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    /// Writes the present fields onto `record`; absent fields stay untouched.
    fn apply_to(&self, record: &mut R);

    fn changed_fields(&self) -> Vec<&'static str>;
}

/// Deserializes a nullable patch field so that an explicit `null` becomes
/// `Some(None)` while a missing field stays `None` through `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub fn require_non_blank(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be blank"));
    }
    Ok(())
}

pub fn require_email(field: &str, value: &str) -> Result<(), String> {
    require_non_blank(field, value)?;
    if !value.contains('@') {
        return Err(format!("{field} must be an email address"));
    }
    Ok(())
}
