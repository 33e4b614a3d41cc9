// Composition root for the lab management backend.
//
// Responsibilities
// - Read config from environment.
// - Instantiate the repositories, the shared keyed serializer and one service per resource.
// - Expose every resource router plus health and lock diagnostics over HTTP.

pub mod config;
pub mod http;
pub mod state;
