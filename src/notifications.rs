use tracing::debug;
use crate::models::{Notification, NotificationKind, Snapshot};

/// Appends a notification from `from` to `to`. Self-actions never notify.
pub(crate) fn notify(
    snapshot: &mut Snapshot,
    kind: NotificationKind,
    from: &str,
    to: &str,
    post_id: Option<u64>,
    now: i64,
) -> bool {
    if from == to {
        return false;
    }

    let notification = Notification {
        id: snapshot.next_notification_id(now),
        kind,
        from_user: from.to_string(),
        to_user: to.to_string(),
        post_id,
        timestamp: now,
        read: false,
    };
    debug!(kind = %kind, from, to, id = notification.id, "notification created");
    snapshot.notifications.push(notification);
    true
}

/// Marks every notification addressed to `username` as read and returns how
/// many changed.
pub fn mark_all_read(snapshot: &mut Snapshot, username: &str) -> usize {
    let mut changed = 0;
    for n in snapshot
        .notifications
        .iter_mut()
        .filter(|n| n.to_user == username && !n.read)
    {
        n.read = true;
        changed += 1;
    }
    changed
}

pub fn notifications_for<'a>(snapshot: &'a Snapshot, username: &str) -> Vec<&'a Notification> {
    let mut list: Vec<&Notification> = snapshot
        .notifications
        .iter()
        .filter(|n| n.to_user == username)
        .collect();
    list.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
    list
}

pub fn unread_count(snapshot: &Snapshot, username: &str) -> usize {
    snapshot
        .notifications
        .iter()
        .filter(|n| n.to_user == username && !n.read)
        .count()
}
