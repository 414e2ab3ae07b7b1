use tracing::{debug, info};
use crate::auth::{self, NewUser};
use crate::config::Config;
use crate::core::db::RecordStore;
use crate::core::errors::StoreResult;
use crate::core::helpers::now_millis;
use crate::core::slot::Slot;
use crate::follow;
use crate::models::{Notification, Post, Snapshot, Theme, User};
use crate::notifications;
use crate::posts;
use crate::users::{self, ProfileUpdate};

/// A mutation runs against a copy of the snapshot and only replaces it once
/// the copy is saved. Calls that do not apply write nothing.
pub struct App<S: Slot> {
    store: RecordStore<S>,
    snapshot: Snapshot,
    config: Config,
}

impl<S: Slot> App<S> {
    pub fn open(slot: S, config: Config) -> Self {
        let store = RecordStore::new(slot, config.clone());
        let snapshot = store.load();
        debug!(session = ?snapshot.current_user, "app opened");
        App { store, snapshot, config }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn store(&self) -> &RecordStore<S> {
        &self.store
    }

    // `applied` decides from the result whether `next` has to be saved.
    fn transact<T>(
        &mut self,
        op: impl FnOnce(&mut Snapshot, &Config) -> StoreResult<T>,
        applied: impl FnOnce(&T) -> bool,
    ) -> StoreResult<T> {
        let mut next = self.snapshot.clone();
        let out = op(&mut next, &self.config)?;
        if applied(&out) {
            self.store.save(&next)?;
            self.snapshot = next;
        }
        Ok(out)
    }

    // === Theme ===

    pub fn theme(&self) -> Theme {
        self.snapshot.theme
    }

    pub fn toggle_theme(&mut self) -> StoreResult<Theme> {
        self.transact(
            |snap, _| {
                snap.theme = snap.theme.toggled();
                Ok(snap.theme)
            },
            |_| true,
        )
    }

    // === Session & identity ===

    pub fn current_user(&self) -> Option<&User> {
        let name = self.snapshot.session_user()?;
        self.snapshot.user(name)
    }

    pub fn login(&mut self, username: &str, password: Option<&str>) -> StoreResult<()> {
        self.transact(|snap, _| auth::login(snap, username, password), |_| true)
    }

    pub fn logout(&mut self) -> StoreResult<()> {
        self.transact(|snap, _| Ok(auth::logout(snap)), |was_active| *was_active)
            .map(|_| ())
    }

    pub fn signup(&mut self, candidate: NewUser) -> StoreResult<()> {
        self.transact(
            |snap, config| auth::signup(snap, candidate, config, now_millis()),
            |_| true,
        )
    }

    pub fn continue_as_guest(&mut self) -> StoreResult<String> {
        self.transact(
            |snap, config| auth::continue_as_guest(snap, config, now_millis(), &mut rand::thread_rng()),
            |_| true,
        )
    }

    pub fn update_profile(&mut self, username: &str, update: ProfileUpdate) -> StoreResult<()> {
        self.transact(|snap, _| users::update_profile(snap, username, update), |_| true)
    }

    pub fn get_user(&self, username: &str) -> Option<&User> {
        users::get_user(&self.snapshot, username)
    }

    pub fn users(&self) -> &[User] {
        &self.snapshot.users
    }

    pub fn search_users(&self, term: &str) -> Vec<&User> {
        users::search_users(&self.snapshot, term)
    }

    // === Posts ===

    pub fn create_post(&mut self, author: &str, text: &str, image: Option<String>) -> StoreResult<Option<u64>> {
        self.transact(
            |snap, _| Ok(posts::create_post(snap, author, text, image, now_millis())),
            Option::is_some,
        )
    }

    pub fn toggle_like(&mut self, post_id: u64) -> StoreResult<Option<bool>> {
        self.transact(
            |snap, _| Ok(posts::toggle_like(snap, post_id, now_millis())),
            Option::is_some,
        )
    }

    pub fn toggle_repost(&mut self, post_id: u64) -> StoreResult<Option<bool>> {
        self.transact(
            |snap, _| Ok(posts::toggle_repost(snap, post_id, now_millis())),
            Option::is_some,
        )
    }

    pub fn add_comment(&mut self, post_id: u64, text: &str) -> StoreResult<Option<u64>> {
        self.transact(
            |snap, _| Ok(posts::add_comment(snap, post_id, text, now_millis())),
            Option::is_some,
        )
    }

    pub fn post(&self, post_id: u64) -> Option<&Post> {
        self.snapshot.post(post_id)
    }

    pub fn feed(&self) -> Vec<&Post> {
        posts::feed(&self.snapshot)
    }

    /// Empty when logged out.
    pub fn home_feed(&self) -> Vec<&Post> {
        match self.snapshot.session_user() {
            Some(name) => posts::home_feed(&self.snapshot, name),
            None => Vec::new(),
        }
    }

    pub fn posts_by(&self, username: &str) -> Vec<&Post> {
        posts::posts_by(&self.snapshot, username)
    }

    pub fn liked_by(&self, username: &str) -> Vec<&Post> {
        posts::liked_by(&self.snapshot, username)
    }

    pub fn search_posts(&self, term: &str) -> Vec<&Post> {
        posts::search_posts(&self.snapshot, term)
    }

    pub fn trending_hashtags(&self, limit: usize) -> Vec<(String, usize)> {
        posts::trending_hashtags(&self.snapshot, limit)
    }

    // === Social graph ===

    pub fn toggle_follow(&mut self, target: &str) -> StoreResult<Option<bool>> {
        self.transact(
            |snap, _| Ok(follow::toggle_follow(snap, target, now_millis())),
            Option::is_some,
        )
    }

    pub fn is_following(&self, target: &str) -> bool {
        match self.snapshot.session_user() {
            Some(name) => follow::is_following(&self.snapshot, name, target),
            None => false,
        }
    }

    pub fn followers_of(&self, username: &str) -> &[String] {
        follow::followers_of(&self.snapshot, username)
    }

    pub fn following_of(&self, username: &str) -> &[String] {
        follow::following_of(&self.snapshot, username)
    }

    // === Notifications ===

    pub fn notifications(&self) -> Vec<&Notification> {
        match self.snapshot.session_user() {
            Some(name) => notifications::notifications_for(&self.snapshot, name),
            None => Vec::new(),
        }
    }

    pub fn unread_count(&self) -> usize {
        match self.snapshot.session_user() {
            Some(name) => notifications::unread_count(&self.snapshot, name),
            None => 0,
        }
    }

    pub fn mark_notifications_read(&mut self) -> StoreResult<usize> {
        self.transact(
            |snap, _| {
                let Some(name) = snap.session_user().map(str::to_string) else {
                    return Ok(0);
                };
                Ok(notifications::mark_all_read(snap, &name))
            },
            |changed| *changed > 0,
        )
    }

    // === Maintenance ===

    pub fn reset(&mut self) -> StoreResult<()> {
        self.store.reset()?;
        self.snapshot = self.store.load();
        info!("app data reset");
        Ok(())
    }
}
