//! `Tasker`: intent-driven task list client.
//!
//! Local task state changes only through [`intent::Intent`]s fed to the pure
//! [`store::reduce`] function. The [`sync::SyncEngine`] turns command intents
//! into calls against a [`remote::RemoteStore`] and reports each outcome as
//! another intent plus a [`notify::Notification`].

pub mod config;
pub mod intent;
pub mod notify;
pub mod paging;
pub mod remote;
pub mod store;
pub mod sync;
pub mod views;
