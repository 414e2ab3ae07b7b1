use serde::{Serialize, Deserialize};
use std::fmt;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub username: String,
    /// Absent for guest accounts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub photo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    pub joined: i64,
    #[serde(default)]
    pub following: Vec<String>,
    #[serde(default)]
    pub followers: Vec<String>,
}

impl User {
    pub fn is_guest(&self) -> bool {
        self.password.is_none()
    }

    /// "March 2025" style label for the profile header.
    pub fn joined_label(&self) -> String {
        chrono::DateTime::from_timestamp_millis(self.joined)
            .map(|dt| dt.format("%B %Y").to_string())
            .unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub id: u64,
    pub user: String,
    pub text: String,
    pub timestamp: i64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub id: u64,
    pub user: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub reposts: Vec<String>,
    pub timestamp: i64,
}

impl Post {
    pub fn is_liked_by(&self, username: &str) -> bool {
        self.likes.iter().any(|u| u == username)
    }

    pub fn is_reposted_by(&self, username: &str) -> bool {
        self.reposts.iter().any(|u| u == username)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Comment,
    Follow,
    Repost,
}

impl NotificationKind {
    pub fn message(self) -> &'static str {
        match self {
            NotificationKind::Like => "liked your post.",
            NotificationKind::Comment => "commented on your post.",
            NotificationKind::Follow => "started following you.",
            NotificationKind::Repost => "reposted your post.",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotificationKind::Like => "like",
            NotificationKind::Comment => "comment",
            NotificationKind::Follow => "follow",
            NotificationKind::Repost => "repost",
        };
        f.write_str(name)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub from_user: String,
    pub to_user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<u64>,
    pub timestamp: i64,
    #[serde(default)]
    pub read: bool,
}

impl Notification {
    /// Display line, e.g. "asha liked your post."
    pub fn describe(&self) -> String {
        format!("{} {}", self.from_user, self.kind.message())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub current_user: Option<String>,
}

impl Snapshot {
    pub fn user(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    pub fn user_mut(&mut self, username: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.username == username)
    }

    pub fn post(&self, id: u64) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    pub fn post_mut(&mut self, id: u64) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| p.id == id)
    }

    pub fn session_user(&self) -> Option<&str> {
        let name = self.current_user.as_deref()?;
        self.user(name).map(|u| u.username.as_str())
    }

    pub(crate) fn next_post_id(&self, now: i64) -> u64 {
        next_id(now, self.posts.iter().map(|p| p.id))
    }

    pub(crate) fn next_comment_id(&self, now: i64) -> u64 {
        next_id(now, self.posts.iter().flat_map(|p| p.comments.iter().map(|c| c.id)))
    }

    pub(crate) fn next_notification_id(&self, now: i64) -> u64 {
        next_id(now, self.notifications.iter().map(|n| n.id))
    }
}

// Millisecond ids, bumped past the largest id already issued.
fn next_id(now: i64, existing: impl Iterator<Item = u64>) -> u64 {
    let base = u64::try_from(now).unwrap_or(0);
    match existing.max() {
        Some(max) if max >= base => max.saturating_add(1),
        _ => base,
    }
}
