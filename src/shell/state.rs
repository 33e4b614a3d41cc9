use crate::modules::assistants::core::assistant::{self, Assistant};
use crate::modules::events::core::event::{self, Event};
use crate::modules::tasks::core::task::{self, Task};
use crate::modules::users::core::user::{self, User};
use crate::shared::application::record_service::RecordService;
use crate::shared::concurrency::conflict_policy::ConflictPolicy;
use crate::shared::core::record::VersionedRecord;
use crate::shared::infrastructure::entity_repository::in_memory::InMemoryEntityRepository;
use crate::shared::infrastructure::keyed_serializer::KeyedSerializer;
use crate::shell::config::AppConfig;
use std::sync::Arc;

pub type InMemoryService<R> = RecordService<R, InMemoryEntityRepository<R>>;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<InMemoryService<User>>,
    pub assistants: Arc<InMemoryService<Assistant>>,
    pub tasks: Arc<InMemoryService<Task>>,
    pub events: Arc<InMemoryService<Event>>,
    /// One serializer for the whole process; keys are namespaced per resource.
    pub serializer: Arc<KeyedSerializer<String>>,
}

impl AppState {
    pub fn in_memory(config: &AppConfig) -> Self {
        let serializer = Arc::new(match config.operation_timeout {
            Some(timeout) => KeyedSerializer::with_operation_timeout(timeout),
            None => KeyedSerializer::new(),
        });
        Self {
            users: in_memory_service(&serializer, user::CONFLICT_POLICY),
            assistants: in_memory_service(&serializer, assistant::CONFLICT_POLICY),
            tasks: in_memory_service(&serializer, task::CONFLICT_POLICY),
            events: in_memory_service(&serializer, event::CONFLICT_POLICY),
            serializer,
        }
    }
}

fn in_memory_service<R: VersionedRecord>(
    serializer: &Arc<KeyedSerializer<String>>,
    policy: ConflictPolicy,
) -> Arc<InMemoryService<R>> {
    Arc::new(RecordService::new(
        Arc::new(InMemoryEntityRepository::new()),
        serializer.clone(),
        policy,
    ))
}
