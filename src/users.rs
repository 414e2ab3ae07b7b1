use tracing::{debug, info};
use crate::core::errors::{StoreError, StoreResult};
use crate::models::{Snapshot, User};

/// Editable profile fields. A `username` different from the current one
/// renames the account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub username: String,
    pub bio: String,
    pub photo: String,
    pub banner: Option<String>,
}

impl From<&User> for ProfileUpdate {
    fn from(user: &User) -> Self {
        ProfileUpdate {
            username: user.username.clone(),
            bio: user.bio.clone(),
            photo: user.photo.clone(),
            banner: user.banner.clone(),
        }
    }
}

pub fn get_user<'a>(snapshot: &'a Snapshot, username: &str) -> Option<&'a User> {
    snapshot.user(username)
}

pub fn search_users<'a>(snapshot: &'a Snapshot, term: &str) -> Vec<&'a User> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }
    snapshot
        .users
        .iter()
        .filter(|u| u.username.to_lowercase().contains(&term))
        .collect()
}

pub fn update_profile(snapshot: &mut Snapshot, username: &str, update: ProfileUpdate) -> StoreResult<()> {
    if snapshot.user(username).is_none() {
        return Err(StoreError::NotFound("User not found".to_string()));
    }

    if update.username != username {
        if update.username.trim().is_empty() {
            return Err(StoreError::BadRequest("Username is required".to_string()));
        }
        if snapshot.user(&update.username).is_some() {
            return Err(StoreError::Conflict("Username already taken".to_string()));
        }
        rename_user(snapshot, username, &update.username);
    }

    let user = snapshot
        .user_mut(&update.username)
        .ok_or_else(|| StoreError::NotFound("User not found".to_string()))?;
    user.bio = update.bio;
    user.photo = update.photo;
    user.banner = update.banner.filter(|b| !b.is_empty());
    debug!(user = %user.username, "profile updated");
    Ok(())
}

// Callers check that `new` is free first.
pub(crate) fn rename_user(snapshot: &mut Snapshot, old: &str, new: &str) {
    let swap = |name: &mut String| {
        if name.as_str() == old {
            *name = new.to_string();
        }
    };

    for user in &mut snapshot.users {
        swap(&mut user.username);
        user.following.iter_mut().for_each(swap);
        user.followers.iter_mut().for_each(swap);
    }

    for post in &mut snapshot.posts {
        swap(&mut post.user);
        post.likes.iter_mut().for_each(swap);
        post.reposts.iter_mut().for_each(swap);
        for comment in &mut post.comments {
            swap(&mut comment.user);
        }
    }

    for n in &mut snapshot.notifications {
        swap(&mut n.from_user);
        swap(&mut n.to_user);
    }

    if let Some(current) = snapshot.current_user.as_mut() {
        swap(current);
    }

    info!(from = old, to = new, "user renamed");
}
