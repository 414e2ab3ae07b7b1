//! Local state store for the Twitos social demo.
//!
//! The whole application state (users, posts, notifications, theme and the
//! session) lives in one [`Snapshot`] that is persisted as a single JSON
//! record in a key-value [`Slot`]. [`App`] owns the snapshot and saves it
//! after every change; the modules below hold the operations themselves as
//! functions over `&mut Snapshot`.

pub mod app;
pub mod auth;
pub mod config;
pub mod core;
pub mod follow;
pub mod models;
pub mod notifications;
pub mod posts;
pub mod users;

pub use app::App;
pub use auth::NewUser;
pub use config::Config;
pub use crate::core::db::RecordStore;
pub use crate::core::errors::{StoreError, StoreResult};
pub use crate::core::slot::{FileSlot, MemorySlot, Slot, SpinSlot};
pub use models::{Comment, Notification, NotificationKind, Post, Snapshot, Theme, User};
pub use users::ProfileUpdate;
