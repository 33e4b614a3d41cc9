pub mod concurrency;
pub mod records;
pub mod state;
