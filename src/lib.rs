pub mod shared {
    pub mod core {
        pub mod record;
    }
    pub mod application {
        pub mod errors;
        pub mod record_service;
    }
    pub mod concurrency {
        pub mod auto_merge;
        pub mod conflict_policy;
        pub mod version_gate;
    }
    pub mod infrastructure {
        pub mod entity_repository;
        pub mod keyed_serializer;
    }
    pub mod inbound {
        pub mod http;
    }
}

pub mod modules {
    pub mod users {
        pub mod core {
            pub mod user;
        }
    }
    pub mod assistants {
        pub mod core {
            pub mod assistant;
        }
    }
    pub mod tasks {
        pub mod core {
            pub mod task;
        }
    }
    pub mod events {
        pub mod core {
            pub mod event;
        }
    }
}

pub mod shell;
