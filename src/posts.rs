use std::collections::HashMap;
use std::sync::OnceLock;
use regex::Regex;
use tracing::debug;
use crate::config::*;
use crate::models::{Comment, NotificationKind, Post, Snapshot};
use crate::notifications::notify;

/// Publishes a post by `author`, who must be the active session. Text may be
/// empty only when an image is attached.
pub fn create_post(
    snapshot: &mut Snapshot,
    author: &str,
    text: &str,
    image: Option<String>,
    now: i64,
) -> Option<u64> {
    if snapshot.session_user() != Some(author) {
        return None;
    }

    let image = image.filter(|i| !i.is_empty());
    if text.trim().is_empty() && image.is_none() {
        return None;
    }
    if text.chars().count() > MAX_POST_LENGTH {
        return None;
    }

    let id = snapshot.next_post_id(now);
    let post = Post {
        id,
        user: author.to_string(),
        text: text.to_string(),
        image,
        likes: Vec::new(),
        comments: Vec::new(),
        reposts: Vec::new(),
        timestamp: now,
    };

    // newest first
    snapshot.posts.insert(0, post);
    debug!(id, author, "post created");
    Some(id)
}

/// Likes or unlikes `post_id` as the session user. Returns whether the post
/// is now liked, or `None` without a session or post.
pub fn toggle_like(snapshot: &mut Snapshot, post_id: u64, now: i64) -> Option<bool> {
    toggle_reaction(snapshot, post_id, now, Reaction::Like)
}

pub fn toggle_repost(snapshot: &mut Snapshot, post_id: u64, now: i64) -> Option<bool> {
    toggle_reaction(snapshot, post_id, now, Reaction::Repost)
}

#[derive(Clone, Copy)]
enum Reaction {
    Like,
    Repost,
}

impl Reaction {
    fn members(self, post: &mut Post) -> &mut Vec<String> {
        match self {
            Reaction::Like => &mut post.likes,
            Reaction::Repost => &mut post.reposts,
        }
    }

    fn kind(self) -> NotificationKind {
        match self {
            Reaction::Like => NotificationKind::Like,
            Reaction::Repost => NotificationKind::Repost,
        }
    }
}

// Only the add transition notifies the author.
fn toggle_reaction(
    snapshot: &mut Snapshot,
    post_id: u64,
    now: i64,
    reaction: Reaction,
) -> Option<bool> {
    let actor = snapshot.session_user()?.to_string();
    let post = snapshot.post_mut(post_id)?;
    let set = reaction.members(post);

    let added = if let Some(pos) = set.iter().position(|u| *u == actor) {
        set.remove(pos);
        false
    } else {
        set.push(actor.clone());
        true
    };
    let author = post.user.clone();

    let kind = reaction.kind();
    if added {
        notify(snapshot, kind, &actor, &author, Some(post_id), now);
    }
    debug!(post_id, user = %actor, kind = %kind, added, "reaction toggled");
    Some(added)
}

pub fn add_comment(snapshot: &mut Snapshot, post_id: u64, text: &str, now: i64) -> Option<u64> {
    let actor = snapshot.session_user()?.to_string();
    if text.trim().is_empty() {
        return None;
    }
    snapshot.post(post_id)?;

    let id = snapshot.next_comment_id(now);
    let post = snapshot.post_mut(post_id)?;
    post.comments.push(Comment {
        id,
        user: actor.clone(),
        text: text.to_string(),
        timestamp: now,
    });
    let author = post.user.clone();

    notify(snapshot, NotificationKind::Comment, &actor, &author, Some(post_id), now);
    debug!(post_id, comment_id = id, user = %actor, "comment added");
    Some(id)
}

fn newest_first(mut posts: Vec<&Post>) -> Vec<&Post> {
    posts.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
    posts
}

pub fn feed(snapshot: &Snapshot) -> Vec<&Post> {
    newest_first(snapshot.posts.iter().collect())
}

pub fn home_feed<'a>(snapshot: &'a Snapshot, username: &str) -> Vec<&'a Post> {
    let following: &[String] = snapshot
        .user(username)
        .map(|u| u.following.as_slice())
        .unwrap_or(&[]);
    newest_first(
        snapshot
            .posts
            .iter()
            .filter(|p| p.user == username || following.contains(&p.user))
            .collect(),
    )
}

pub fn posts_by<'a>(snapshot: &'a Snapshot, username: &str) -> Vec<&'a Post> {
    newest_first(snapshot.posts.iter().filter(|p| p.user == username).collect())
}

pub fn liked_by<'a>(snapshot: &'a Snapshot, username: &str) -> Vec<&'a Post> {
    newest_first(snapshot.posts.iter().filter(|p| p.is_liked_by(username)).collect())
}

pub fn search_posts<'a>(snapshot: &'a Snapshot, term: &str) -> Vec<&'a Post> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return Vec::new();
    }
    newest_first(
        snapshot
            .posts
            .iter()
            .filter(|p| p.text.to_lowercase().contains(&term) || p.user.to_lowercase().contains(&term))
            .collect(),
    )
}

fn hashtag_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"#\w+").expect("Regex should compile")
    })
}

/// Hashtags used across all posts, most used first, ties alphabetical.
/// Tags are counted case-insensitively and reported as first written.
pub fn trending_hashtags(snapshot: &Snapshot, limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, (String, usize)> = HashMap::new();
    for post in &snapshot.posts {
        for m in hashtag_regex().find_iter(&post.text) {
            let entry = counts
                .entry(m.as_str().to_lowercase())
                .or_insert_with(|| (m.as_str().to_string(), 0));
            entry.1 += 1;
        }
    }

    let mut tags: Vec<(String, usize)> = counts.into_values().collect();
    tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    tags.truncate(limit);
    tags
}
