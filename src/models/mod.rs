pub mod models;

pub use models::{Comment, Notification, NotificationKind, Post, Snapshot, Theme, User};
