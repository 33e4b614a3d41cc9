// Lab tasks. Edited by many people at once, so updates go through the merge policy.

use crate::shared::concurrency::conflict_policy::ConflictPolicy;
use crate::shared::core::record::{RecordPatch, VersionedRecord, double_option, require_non_blank};
use serde::{Deserialize, Serialize};

pub const CONFLICT_POLICY: ConflictPolicy = ConflictPolicy::MergeOnConflict;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub version: u64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub tags: Vec<String>,
    pub assignee_id: Option<String>,
    pub due_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub due_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_at: Option<Option<i64>>,
}

impl VersionedRecord for Task {
    type Draft = TaskDraft;
    type Patch = TaskPatch;

    const KIND: &'static str = "task";
    const INITIAL_VERSION: u64 = 1;

    fn from_draft(id: String, draft: TaskDraft, now: i64) -> Result<Self, String> {
        require_non_blank("title", &draft.title)?;
        Ok(Self {
            id,
            version: Self::INITIAL_VERSION,
            title: draft.title,
            description: draft.description,
            status: draft.status,
            priority: draft.priority,
            tags: draft.tags,
            assignee_id: draft.assignee_id,
            due_at: draft.due_at,
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

impl RecordPatch<Task> for TaskPatch {
    fn validate(&self) -> Result<(), String> {
        match &self.title {
            Some(title) => require_non_blank("title", title),
            None => Ok(()),
        }
    }

    fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(tags) = &self.tags {
            task.tags = tags.clone();
        }
        if let Some(assignee_id) = &self.assignee_id {
            task.assignee_id = assignee_id.clone();
        }
        if let Some(due_at) = self.due_at {
            task.due_at = due_at;
        }
    }

    fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("title", self.title.is_some()),
            ("description", self.description.is_some()),
            ("status", self.status.is_some()),
            ("priority", self.priority.is_some()),
            ("tags", self.tags.is_some()),
            ("assignee_id", self.assignee_id.is_some()),
            ("due_at", self.due_at.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, present)| present.then_some(field))
        .collect()
    }
}

#[cfg(test)]
mod task_tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn task() -> Task {
        let draft: TaskDraft = serde_json::from_str(
            r#"{"title":"Prepare buffer","tags":["wet-lab"],"assignee_id":"a-1","due_at":1700000000000}"#,
        )
        .unwrap();
        Task::from_draft("t-1".into(), draft, 0).unwrap()
    }

    #[rstest]
    fn it_should_start_new_tasks_at_version_one(task: Task) {
        assert_eq!(task.version, 1);
        assert_eq!(task.status, TaskStatus::ToDo);
        assert_eq!(task.priority, TaskPriority::Medium);
    }

    #[rstest]
    #[case(r#""To Do""#, TaskStatus::ToDo)]
    #[case(r#""In Progress""#, TaskStatus::InProgress)]
    #[case(r#""Done""#, TaskStatus::Done)]
    fn it_should_use_display_names_for_statuses(#[case] json: &str, #[case] status: TaskStatus) {
        assert_eq!(serde_json::from_str::<TaskStatus>(json).unwrap(), status);
        assert_eq!(serde_json::to_string(&status).unwrap(), json);
    }

    #[rstest]
    fn it_should_apply_only_present_fields(mut task: Task) {
        let patch: TaskPatch = serde_json::from_str(r#"{"priority":"high"}"#).unwrap();
        patch.apply_to(&mut task);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.status, TaskStatus::ToDo);
        assert_eq!(task.assignee_id.as_deref(), Some("a-1"));
    }

    #[rstest]
    fn it_should_unassign_on_explicit_null(mut task: Task) {
        let patch: TaskPatch =
            serde_json::from_str(r#"{"assignee_id":null,"due_at":null}"#).unwrap();
        patch.apply_to(&mut task);
        assert_eq!(task.assignee_id, None);
        assert_eq!(task.due_at, None);
        assert_eq!(patch.changed_fields(), vec!["assignee_id", "due_at"]);
    }

    #[rstest]
    fn it_should_reject_a_blank_title() {
        let patch = TaskPatch {
            title: Some("   ".into()),
            ..TaskPatch::default()
        };
        assert_eq!(patch.validate().unwrap_err(), "title must not be blank");
    }
}
