use tracing::{debug, info, warn};
use crate::config::*;
use crate::core::errors::StoreResult;
use crate::core::helpers::{default_photo, hash_password, now_millis};
use crate::core::slot::Slot;
use crate::models::{Post, Snapshot, Theme, User};

pub struct RecordStore<S: Slot> {
    slot: S,
    config: Config,
}

impl<S: Slot> RecordStore<S> {
    pub fn new(slot: S, config: Config) -> Self {
        RecordStore { slot, config }
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn key(&self) -> &str {
        &self.config.db_key
    }

    /// Returns the stored snapshot, or seeds and stores the defaults when the
    /// slot is empty or holds a record that does not parse. A slot that fails
    /// to read gets in-memory defaults only, so the record it holds survives.
    pub fn load(&self) -> Snapshot {
        match self.slot.get(self.key()) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Snapshot>(&bytes) {
                Ok(mut snapshot) => {
                    drop_dangling_session(&mut snapshot);
                    return snapshot;
                }
                Err(e) => warn!(key = self.key(), error = %e, "stored record is corrupt, rebuilding defaults"),
            },
            Ok(None) => {}
            Err(e) => {
                warn!(key = self.key(), error = %format!("{:#}", e), "failed to read stored record, using defaults");
                return default_snapshot(now_millis(), &self.config);
            }
        }

        let snapshot = default_snapshot(now_millis(), &self.config);
        match self.save(&snapshot) {
            Ok(()) => info!(key = self.key(), "seeded default snapshot"),
            Err(e) => warn!(key = self.key(), error = %e, "failed to store default snapshot"),
        }
        snapshot
    }

    pub fn save(&self, snapshot: &Snapshot) -> StoreResult<()> {
        let bytes = serde_json::to_vec(snapshot)?;
        self.slot.set(self.key(), &bytes)?;
        debug!(
            key = self.key(),
            users = snapshot.users.len(),
            posts = snapshot.posts.len(),
            notifications = snapshot.notifications.len(),
            "snapshot saved"
        );
        Ok(())
    }

    pub fn reset(&self) -> StoreResult<()> {
        self.slot.delete(self.key())?;
        info!(key = self.key(), "stored record erased");
        Ok(())
    }
}

fn drop_dangling_session(snapshot: &mut Snapshot) {
    if let Some(name) = snapshot.current_user.as_deref() {
        if snapshot.user(name).is_none() {
            warn!(user = name, "stored session names an unknown user, clearing it");
            snapshot.current_user = None;
        }
    }
}

pub fn default_snapshot(now: i64, config: &Config) -> Snapshot {
    let password = match hash_password(SEED_PASSWORD, config) {
        Ok(hash) => hash,
        Err(e) => {
            // verify_password accepts plaintext records, so the seed still logs in
            warn!(error = %format!("{:#}", e), "failed to hash seed credential");
            SEED_PASSWORD.to_string()
        }
    };

    let seed_user = User {
        username: SEED_USERNAME.to_string(),
        password: Some(password),
        bio: SEED_BIO.to_string(),
        photo: default_photo(),
        banner: None,
        joined: now,
        following: Vec::new(),
        followers: Vec::new(),
    };

    let seed_post = Post {
        id: 1,
        user: SEED_USERNAME.to_string(),
        text: SEED_POST_TEXT.to_string(),
        image: None,
        likes: Vec::new(),
        comments: Vec::new(),
        reposts: Vec::new(),
        timestamp: now - SEED_POST_AGE_MS,
    };

    Snapshot {
        users: vec![seed_user],
        posts: vec![seed_post],
        notifications: Vec::new(),
        theme: Theme::Light,
        current_user: None,
    }
}
