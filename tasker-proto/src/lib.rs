//! Shared wire model for the `Tasker` remote task store.

pub mod task;
