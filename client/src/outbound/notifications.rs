//! In-memory notification centre.
//!
//! Notifications are kept with their creation time and drop out of
//! [`NotificationCentre::active`] once their time to live has elapsed.
//! Each one can also be dismissed early by id.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use tracing::debug;

use crate::domain::Notification;
use crate::domain::ports::Notifier;

/// Default time a notification stays visible.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_millis(3_000);

/// Identifier handed out for every published notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A notification that has not yet expired or been dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveNotification {
    /// Identifier used to dismiss the notification.
    pub id: NotificationId,
    /// Content to render.
    pub notification: Notification,
    /// When the notification stops being shown.
    pub expires_at: DateTime<Utc>,
}

/// Notification surface shared by every screen.
pub struct NotificationCentre {
    clock: Arc<dyn Clock + Send + Sync>,
    ttl: TimeDelta,
    entries: Mutex<Vec<ActiveNotification>>,
    next_id: AtomicU64,
}

impl NotificationCentre {
    /// Centre using the default time to live.
    pub fn new(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self::with_ttl(clock, DEFAULT_NOTIFICATION_TTL)
    }

    /// Centre keeping notifications for `ttl`.
    pub fn with_ttl(clock: Arc<dyn Clock + Send + Sync>, ttl: Duration) -> Self {
        Self {
            clock,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Publish a notification and return its id.
    pub fn publish(&self, notification: Notification) -> NotificationId {
        let id = NotificationId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let expires_at = self
            .clock
            .utc()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        debug!(%id, kind = notification.kind().as_str(), "notification published");
        self.lock_entries().push(ActiveNotification {
            id,
            notification,
            expires_at,
        });
        id
    }

    /// Notifications still visible, newest first. Expired entries are
    /// pruned.
    pub fn active(&self) -> Vec<ActiveNotification> {
        let now = self.clock.utc();
        let mut entries = self.lock_entries();
        entries.retain(|entry| entry.expires_at > now);
        entries.iter().rev().cloned().collect()
    }

    /// Remove a notification before it expires.
    ///
    /// Returns `false` when the id is unknown or already gone.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        let mut entries = self.lock_entries();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        entries.len() != before
    }

    /// Take every visible notification, oldest first, leaving the centre
    /// empty.
    pub fn drain(&self) -> Vec<ActiveNotification> {
        let now = self.clock.utc();
        let mut entries = self.lock_entries();
        entries.retain(|entry| entry.expires_at > now);
        std::mem::take(&mut *entries)
    }

    fn lock_entries(&self) -> MutexGuard<'_, Vec<ActiveNotification>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for NotificationCentre {
    fn notify(&self, notification: Notification) {
        self.publish(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NotificationKind;
    use crate::test_support::MutableClock;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    struct Fixture {
        clock: Arc<MutableClock>,
        centre: NotificationCentre,
    }

    #[fixture]
    fn setup() -> Fixture {
        let start = Utc
            .with_ymd_and_hms(2026, 1, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp");
        let clock = Arc::new(MutableClock::new(start));
        let centre = NotificationCentre::new(clock.clone());
        Fixture { clock, centre }
    }

    #[rstest]
    fn lists_newest_first(setup: Fixture) {
        setup.centre.notify(Notification::success("first"));
        setup.centre.notify(Notification::error("second"));

        let messages: Vec<_> = setup
            .centre
            .active()
            .into_iter()
            .map(|entry| entry.notification.message().to_owned())
            .collect();

        assert_eq!(messages, vec!["second".to_owned(), "first".to_owned()]);
    }

    #[rstest]
    #[case::before_ttl(2_999, 1)]
    #[case::at_ttl(3_000, 0)]
    #[case::after_ttl(10_000, 0)]
    fn expires_after_the_time_to_live(
        setup: Fixture,
        #[case] elapsed_ms: u64,
        #[case] expected: usize,
    ) {
        setup.centre.notify(Notification::success("saved"));
        setup.clock.advance(Duration::from_millis(elapsed_ms));

        assert_eq!(setup.centre.active().len(), expected);
    }

    #[rstest]
    fn dismiss_removes_only_the_target(setup: Fixture) {
        let first = setup.centre.publish(Notification::success("first"));
        let second = setup.centre.publish(Notification::error("second"));

        assert!(setup.centre.dismiss(first));
        assert!(!setup.centre.dismiss(first), "already dismissed");

        let active = setup.centre.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second);
        assert_eq!(active[0].notification.kind(), NotificationKind::Error);
    }

    #[rstest]
    fn drain_returns_oldest_first_and_empties(setup: Fixture) {
        setup.centre.notify(Notification::success("first"));
        setup.centre.notify(Notification::success("second"));

        let drained = setup.centre.drain();

        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].notification.message(), "first");
        assert!(setup.centre.active().is_empty());
    }

    #[test]
    fn custom_ttl_is_honoured() {
        let clock = Arc::new(MutableClock::new(Utc::now()));
        let centre = NotificationCentre::with_ttl(clock.clone(), Duration::from_millis(500));
        centre.notify(Notification::error("boom"));

        clock.advance(Duration::from_millis(499));
        assert_eq!(centre.active().len(), 1);
        clock.advance(Duration::from_millis(1));
        assert!(centre.active().is_empty());
    }
}
