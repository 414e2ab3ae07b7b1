use tracing::debug;
use crate::models::{NotificationKind, Snapshot};
use crate::notifications::notify;

/// Updates the actor's `following` and the target's `followers` together.
/// `None` without a session, for self-follows and for unknown targets.
pub fn toggle_follow(snapshot: &mut Snapshot, target: &str, now: i64) -> Option<bool> {
    let actor = snapshot.session_user()?.to_string();
    if actor == target {
        return None;
    }
    snapshot.user(target)?;

    let following = {
        let me = snapshot.user_mut(&actor)?;
        match me.following.iter().position(|u| u == target) {
            Some(pos) => {
                me.following.remove(pos);
                false
            }
            None => {
                me.following.push(target.to_string());
                true
            }
        }
    };

    let them = snapshot.user_mut(target)?;
    them.followers.retain(|u| *u != actor);
    if following {
        them.followers.push(actor.clone());
        notify(snapshot, NotificationKind::Follow, &actor, target, None, now);
    }

    debug!(from = %actor, to = target, following, "follow toggled");
    Some(following)
}

pub fn is_following(snapshot: &Snapshot, username: &str, target: &str) -> bool {
    snapshot
        .user(username)
        .map(|u| u.following.iter().any(|f| f == target))
        .unwrap_or(false)
}

pub fn following_of<'a>(snapshot: &'a Snapshot, username: &str) -> &'a [String] {
    snapshot
        .user(username)
        .map(|u| u.following.as_slice())
        .unwrap_or(&[])
}

pub fn followers_of<'a>(snapshot: &'a Snapshot, username: &str) -> &'a [String] {
    snapshot
        .user(username)
        .map(|u| u.followers.as_slice())
        .unwrap_or(&[])
}
