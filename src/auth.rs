use rand::Rng;
use tracing::info;
use crate::config::*;
use crate::core::errors::{StoreError, StoreResult};
use crate::core::helpers::{avatar_url, hash_password, verify_password};
use crate::models::{Snapshot, User};

/// Sign-up form contents. `password: None` creates a guest account.
#[derive(Clone, Debug, Default)]
pub struct NewUser {
    pub username: String,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub photo: Option<String>,
    pub banner: Option<String>,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        NewUser {
            username: username.into(),
            password: Some(password.into()),
            ..Default::default()
        }
    }

    pub fn guest(username: impl Into<String>) -> Self {
        NewUser {
            username: username.into(),
            ..Default::default()
        }
    }
}

/// Logs `username` in. A guest account only accepts an absent password.
pub fn login(snapshot: &mut Snapshot, username: &str, password: Option<&str>) -> StoreResult<()> {
    let user = snapshot.user(username).ok_or(StoreError::Unauthorized)?;

    let accepted = match (user.password.as_deref(), password) {
        (Some(stored), Some(supplied)) => verify_password(supplied, stored),
        (None, None) => true,
        _ => false,
    };
    if !accepted {
        return Err(StoreError::Unauthorized);
    }

    let name = user.username.clone();
    snapshot.current_user = Some(name);
    info!(user = username, "logged in");
    Ok(())
}

pub fn logout(snapshot: &mut Snapshot) -> bool {
    match snapshot.current_user.take() {
        Some(name) => {
            info!(user = %name, "logged out");
            true
        }
        None => false,
    }
}

fn validate_new_user(candidate: &NewUser) -> StoreResult<()> {
    if candidate.username.trim().is_empty() {
        return Err(StoreError::BadRequest("Username is required".to_string()));
    }
    if let Some(password) = &candidate.password {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(StoreError::BadRequest(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
    }
    Ok(())
}

pub fn signup(snapshot: &mut Snapshot, candidate: NewUser, config: &Config, now: i64) -> StoreResult<()> {
    validate_new_user(&candidate)?;

    if snapshot.user(&candidate.username).is_some() {
        return Err(StoreError::Conflict("Username already taken".to_string()));
    }

    let password = match &candidate.password {
        Some(p) => Some(hash_password(p, config)?),
        None => None,
    };
    let photo = candidate
        .photo
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| avatar_url(&candidate.username));
    let bio = candidate.bio.unwrap_or_else(|| DEFAULT_BIO.to_string());

    let user = User {
        username: candidate.username,
        password,
        bio,
        photo,
        banner: candidate.banner.filter(|b| !b.is_empty()),
        joined: now,
        following: Vec::new(),
        followers: Vec::new(),
    };

    info!(user = %user.username, guest = user.is_guest(), "signed up");
    snapshot.current_user = Some(user.username.clone());
    snapshot.users.push(user);
    Ok(())
}

pub fn continue_as_guest<R: Rng>(
    snapshot: &mut Snapshot,
    config: &Config,
    now: i64,
    rng: &mut R,
) -> StoreResult<String> {
    for _ in 0..GUEST_NAME_ATTEMPTS {
        let username = format!("guest{}", rng.gen_range(0..GUEST_NAME_RANGE));
        if snapshot.user(&username).is_some() {
            continue;
        }
        let candidate = NewUser {
            bio: Some(GUEST_BIO.to_string()),
            ..NewUser::guest(username.clone())
        };
        signup(snapshot, candidate, config, now)?;
        return Ok(username);
    }
    Err(StoreError::Conflict("No free guest name".to_string()))
}
