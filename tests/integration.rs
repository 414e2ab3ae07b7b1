use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use twitos::core::db::default_snapshot;
use twitos::{
    App, Config, FileSlot, MemorySlot, NewUser, NotificationKind, ProfileUpdate, RecordStore,
    Slot, Snapshot, StoreError, Theme,
};

fn cheap_config() -> Config {
    Config {
        hash_memory_kib: 256,
        hash_iterations: 1,
        ..Config::default()
    }
}

fn open(slot: &MemorySlot) -> App<MemorySlot> {
    App::open(slot.clone(), cheap_config())
}

fn stored(slot: &MemorySlot) -> Snapshot {
    let bytes = slot.get("twitosDB").unwrap().expect("record stored");
    serde_json::from_slice(&bytes).unwrap()
}

#[test]
fn test_seed_scenario() {
    let slot = MemorySlot::new();
    let mut app = open(&slot);

    // 1. First run seeds naitik and one post
    assert_eq!(app.users().len(), 1);
    assert!(app.get_user("naitik").is_some());
    let p1 = app.feed()[0].id;
    assert_eq!(app.post(p1).unwrap().user, "naitik");
    assert!(app.current_user().is_none());

    // 2. Sign up asha
    app.signup(NewUser::new("asha", "asha01")).unwrap();
    assert_eq!(app.current_user().unwrap().username, "asha");

    // 3. Like the seed post
    assert_eq!(app.toggle_like(p1).unwrap(), Some(true));
    assert_eq!(app.post(p1).unwrap().likes, vec!["asha"]);
    let ledger = &app.snapshot().notifications;
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].kind, NotificationKind::Like);
    assert_eq!(ledger[0].from_user, "asha");
    assert_eq!(ledger[0].to_user, "naitik");
    assert!(!ledger[0].read);

    // 4. Follow naitik
    assert_eq!(app.toggle_follow("naitik").unwrap(), Some(true));
    assert_eq!(app.following_of("asha"), ["naitik".to_string()]);
    assert_eq!(app.followers_of("naitik"), ["asha".to_string()]);
    let follows: Vec<_> = app
        .snapshot()
        .notifications
        .iter()
        .filter(|n| n.kind == NotificationKind::Follow)
        .collect();
    assert_eq!(follows.len(), 1);
    assert_eq!(follows[0].to_user, "naitik");

    // 5. Unfollow restores both lists without notifying
    assert_eq!(app.toggle_follow("naitik").unwrap(), Some(false));
    assert!(app.following_of("asha").is_empty());
    assert!(app.followers_of("naitik").is_empty());
    assert_eq!(app.snapshot().notifications.len(), 2);

    // every step was persisted
    assert_eq!(&stored(&slot), app.snapshot());
}

#[test]
fn test_state_survives_reopen() {
    let slot = MemorySlot::new();
    let mut app = open(&slot);

    app.signup(NewUser::new("asha", "asha01")).unwrap();
    let id = app.create_post("asha", "hello #Twitos", None).unwrap().unwrap();
    app.add_comment(id, "first!").unwrap().unwrap();
    app.toggle_theme().unwrap();
    let before = app.snapshot().clone();
    drop(app);

    let app = open(&slot);
    assert_eq!(app.snapshot(), &before);
    assert_eq!(app.current_user().unwrap().username, "asha");
    assert_eq!(app.theme(), Theme::Dark);
}

#[test]
fn test_load_is_idempotent() {
    let slot = MemorySlot::new();
    let store = RecordStore::new(slot.clone(), cheap_config());

    let first = store.load();
    let second = store.load();
    assert_eq!(first, second);
}

#[test]
fn test_save_then_load_round_trip() {
    let store = RecordStore::new(MemorySlot::new(), cheap_config());
    let mut snapshot = default_snapshot(1_700_000_000_000, &cheap_config());
    snapshot.theme = Theme::Dark;
    snapshot.current_user = Some("naitik".to_string());

    store.save(&snapshot).unwrap();
    assert_eq!(store.load(), snapshot);
}

#[test]
fn test_corrupt_record_falls_back_to_defaults() {
    let slot = MemorySlot::new();
    slot.set("twitosDB", b"{not json").unwrap();

    let app = open(&slot);
    assert_eq!(app.users().len(), 1);
    assert_eq!(app.users()[0].username, "naitik");
    // the corrupt record was replaced
    assert_eq!(&stored(&slot), app.snapshot());
}

/// `MemorySlot` whose reads or writes can be made to fail.
#[derive(Clone, Default)]
struct FlakySlot {
    inner: MemorySlot,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl FlakySlot {
    fn set_fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    fn set_fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }
}

impl Slot for FlakySlot {
    fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("read refused");
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.inner.delete(key)
    }
}

#[test]
fn test_failed_save_leaves_state_unchanged() {
    let slot = FlakySlot::default();
    let mut app = App::open(slot.clone(), cheap_config());
    let before = app.snapshot().clone();

    // 1. Writes start failing: the signup is rejected and not applied
    slot.set_fail_writes(true);
    let err = app.signup(NewUser::new("asha", "asha01")).unwrap_err();
    assert!(matches!(err, StoreError::Internal(_)), "got {:?}", err);
    assert!(app.current_user().is_none());
    assert_eq!(app.users().len(), 1);
    assert!(app.get_user("asha").is_none());

    assert!(app.toggle_theme().is_err());
    assert_eq!(app.theme(), Theme::Light);
    assert_eq!(app.snapshot(), &before);

    // 2. The same signup succeeds once writes work again
    slot.set_fail_writes(false);
    app.signup(NewUser::new("asha", "asha01")).unwrap();
    assert_eq!(app.current_user().unwrap().username, "asha");
    assert_eq!(stored(&slot.inner), *app.snapshot());

    // 3. A failed post keeps the feed and the stored record as they were
    slot.set_fail_writes(true);
    assert!(app.create_post("asha", "lost", None).is_err());
    assert_eq!(app.feed().len(), 1);
    assert_eq!(stored(&slot.inner).posts.len(), 1);
}

#[test]
fn test_unreadable_slot_is_not_overwritten() {
    let slot = FlakySlot::default();
    let mut record = default_snapshot(1_700_000_000_000, &cheap_config());
    record.theme = Theme::Dark;
    let bytes = serde_json::to_vec(&record).unwrap();
    slot.inner.set("twitosDB", &bytes).unwrap();

    slot.set_fail_reads(true);
    let app = App::open(slot.clone(), cheap_config());

    // defaults in memory, stored record untouched
    assert_eq!(app.theme(), Theme::Light);
    assert_eq!(app.users()[0].username, "naitik");
    assert_eq!(slot.inner.get("twitosDB").unwrap(), Some(bytes));

    slot.set_fail_reads(false);
    let app = App::open(slot.clone(), cheap_config());
    assert_eq!(app.theme(), Theme::Dark);
}

#[test]
fn test_dangling_session_is_dropped_on_load() {
    let slot = MemorySlot::new();
    let mut snapshot = default_snapshot(1_700_000_000_000, &cheap_config());
    snapshot.current_user = Some("ghost".to_string());
    slot.set("twitosDB", &serde_json::to_vec(&snapshot).unwrap()).unwrap();

    let app = open(&slot);
    assert!(app.current_user().is_none());
    assert_eq!(app.snapshot().current_user, None);
}

#[test]
fn test_plaintext_record_logs_in() {
    let slot = MemorySlot::new();
    let record = serde_json::json!({
        "users": [{
            "username": "naitik",
            "password": "123456",
            "bio": "Twitos creator ✨",
            "photo": "",
            "joined": 1_700_000_000_000i64,
            "following": [],
            "followers": []
        }],
        "posts": [],
        "notifications": [],
        "theme": "light",
        "currentUser": null
    });
    slot.set("twitosDB", &serde_json::to_vec(&record).unwrap()).unwrap();

    let mut app = open(&slot);
    app.login("naitik", Some("123456")).unwrap();
    assert_eq!(app.current_user().unwrap().username, "naitik");
}

#[test]
fn test_seed_login_and_logout() {
    let slot = MemorySlot::new();
    let mut app = open(&slot);

    assert_eq!(app.login("naitik", Some("654321")), Err(StoreError::Unauthorized));
    assert_eq!(app.login("nobody", Some("123456")), Err(StoreError::Unauthorized));

    app.login("naitik", Some("123456")).unwrap();
    assert_eq!(stored(&slot).current_user.as_deref(), Some("naitik"));

    app.logout().unwrap();
    assert!(app.current_user().is_none());
    assert_eq!(stored(&slot).current_user, None);
}

#[test]
fn test_guest_flow() {
    let slot = MemorySlot::new();
    let mut app = open(&slot);

    let name = app.continue_as_guest().unwrap();
    assert!(app.get_user(&name).unwrap().is_guest());
    app.logout().unwrap();

    assert_eq!(app.login(&name, Some("x")), Err(StoreError::Unauthorized));
    app.login(&name, None).unwrap();
    assert_eq!(app.current_user().unwrap().username, name);
}

#[test]
fn test_signup_conflict_leaves_users_unchanged() {
    let slot = MemorySlot::new();
    let mut app = open(&slot);
    let before = app.users().to_vec();

    let err = app.signup(NewUser::new("naitik", "another")).unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
    assert_eq!(app.users(), before.as_slice());
    assert_eq!(stored(&slot).users, before);
}

#[test]
fn test_logged_out_writes_are_noops() {
    let slot = MemorySlot::new();
    let mut app = open(&slot);
    let p1 = app.feed()[0].id;
    let before = stored(&slot);

    assert_eq!(app.create_post("naitik", "sneaky", None).unwrap(), None);
    assert_eq!(app.toggle_like(p1).unwrap(), None);
    assert_eq!(app.toggle_repost(p1).unwrap(), None);
    assert_eq!(app.add_comment(p1, "hi").unwrap(), None);
    assert_eq!(app.toggle_follow("naitik").unwrap(), None);
    assert_eq!(app.mark_notifications_read().unwrap(), 0);

    assert_eq!(app.snapshot(), &before);
    assert!(app.home_feed().is_empty());
    assert!(app.notifications().is_empty());
}

#[test]
fn test_notifications_screen_flow() {
    let slot = MemorySlot::new();
    let mut app = open(&slot);
    let p1 = app.feed()[0].id;

    app.signup(NewUser::new("asha", "asha01")).unwrap();
    app.toggle_like(p1).unwrap();
    app.add_comment(p1, "welcome!").unwrap();
    app.toggle_follow("naitik").unwrap();
    app.logout().unwrap();

    app.login("naitik", Some("123456")).unwrap();
    assert_eq!(app.unread_count(), 3);
    let lines: Vec<String> = app.notifications().iter().map(|n| n.describe()).collect();
    assert!(lines.contains(&"asha started following you.".to_string()));

    assert_eq!(app.mark_notifications_read().unwrap(), 3);
    assert_eq!(app.mark_notifications_read().unwrap(), 0);
    assert_eq!(app.unread_count(), 0);
    assert!(stored(&slot).notifications.iter().all(|n| n.read));
}

#[test]
fn test_update_profile_with_rename() {
    let slot = MemorySlot::new();
    let mut app = open(&slot);
    let p1 = app.feed()[0].id;
    app.signup(NewUser::new("asha", "asha01")).unwrap();
    app.toggle_like(p1).unwrap();

    let update = ProfileUpdate {
        username: "asha_k".to_string(),
        bio: "renamed".to_string(),
        ..ProfileUpdate::from(app.current_user().unwrap())
    };
    app.update_profile("asha", update).unwrap();

    assert_eq!(app.current_user().unwrap().username, "asha_k");
    assert_eq!(app.current_user().unwrap().bio, "renamed");
    assert_eq!(app.post(p1).unwrap().likes, vec!["asha_k"]);
    assert_eq!(stored(&slot).current_user.as_deref(), Some("asha_k"));

    // credentials moved with the account
    app.logout().unwrap();
    app.login("asha_k", Some("asha01")).unwrap();
}

#[test]
fn test_reset_restores_defaults() {
    let slot = MemorySlot::new();
    let mut app = open(&slot);
    app.signup(NewUser::new("asha", "asha01")).unwrap();

    app.reset().unwrap();
    assert_eq!(app.users().len(), 1);
    assert!(app.current_user().is_none());
    assert_eq!(stored(&slot).users.len(), 1);
}

#[test]
fn test_persisted_record_shape() {
    let slot = MemorySlot::new();
    let mut app = open(&slot);
    let p1 = app.feed()[0].id;
    let guest = app.continue_as_guest().unwrap();
    app.toggle_like(p1).unwrap();

    let bytes = slot.get("twitosDB").unwrap().unwrap();
    let record: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(record["theme"], "light");
    assert_eq!(record["currentUser"], guest.as_str());
    let n = &record["notifications"][0];
    assert_eq!(n["type"], "like");
    assert_eq!(n["fromUser"], guest.as_str());
    assert_eq!(n["toUser"], "naitik");
    assert_eq!(n["postId"], p1);
    assert_eq!(n["read"], false);

    let users = record["users"].as_array().unwrap();
    let guest_record = users.iter().find(|u| u["username"] == guest.as_str()).unwrap();
    assert!(guest_record.get("password").is_none());
    assert!(guest_record.get("banner").is_none());
    assert!(record["posts"][0].get("image").is_none());
}

#[test]
fn test_search_and_trending() {
    let slot = MemorySlot::new();
    let mut app = open(&slot);
    app.signup(NewUser::new("asha", "asha01")).unwrap();
    app.create_post("asha", "Loving #Twitos already", None).unwrap();

    assert_eq!(app.search_posts("twitos").len(), 2);
    assert_eq!(app.trending_hashtags(5), vec![("#Twitos".to_string(), 2)]);
    assert_eq!(app.search_users("ash").len(), 1);
    assert_eq!(app.home_feed().len(), 1);
    assert!(!app.is_following("naitik"));
}

#[test]
fn test_file_slot_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let username = format!("file_{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);

    {
        let mut app = App::open(FileSlot::new(dir.path()), cheap_config());
        app.signup(NewUser::new(username.clone(), "secret1")).unwrap();
        app.create_post(&username, "stored on disk", None).unwrap().unwrap();
    }

    let slot = FileSlot::new(dir.path());
    let path = slot.path_for("twitosDB");
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let app = App::open(slot, cheap_config());
    assert_eq!(app.current_user().unwrap().username, username);
    assert_eq!(app.posts_by(&username).len(), 1);
}

#[test]
fn test_file_slot_reset_deletes_file() {
    let dir = tempfile::tempdir().unwrap();
    let slot = FileSlot::new(dir.path());
    slot.set("k", b"{}").unwrap();
    assert_eq!(slot.get("k").unwrap().as_deref(), Some(&b"{}"[..]));

    slot.delete("k").unwrap();
    assert_eq!(slot.get("k").unwrap(), None);
    // deleting twice is fine
    slot.delete("k").unwrap();
}

#[test]
fn test_custom_db_key() {
    let slot = MemorySlot::new();
    let config = Config {
        db_key: "otherDB".to_string(),
        ..cheap_config()
    };

    let _app = App::open(slot.clone(), config);
    assert!(slot.contains("otherDB"));
    assert!(!slot.contains("twitosDB"));
}
