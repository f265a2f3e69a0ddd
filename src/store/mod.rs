//! In-memory submission store
//!
//! An append-only, ordered list of accepted registrations. Consumers can
//! follow appends either through synchronous callbacks or a broadcast
//! channel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::record::RegistrationRecord;

type Subscriber = Arc<dyn Fn(&Submission) + Send + Sync>;

/// An accepted registration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub record: RegistrationRecord,
}

/// Append-only list of submissions
pub struct SubmissionStore {
    submissions: Mutex<Vec<Submission>>,
    subscribers: Mutex<HashMap<Uuid, Subscriber>>,
    update_tx: broadcast::Sender<Submission>,
}

impl SubmissionStore {
    pub fn new() -> Self {
        let (update_tx, _) = broadcast::channel(32);
        Self {
            submissions: Mutex::new(Vec::new()),
            subscribers: Mutex::new(HashMap::new()),
            update_tx,
        }
    }

    /// Convenience for the common shared-ownership case.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Append a record to the end of the list and notify subscribers.
    pub fn append(&self, record: RegistrationRecord) -> Submission {
        let submission = Submission {
            id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            record,
        };

        match serde_json::to_string(&submission.record) {
            Ok(json) => log::info!("Accepted submission {}: {}", submission.id, json),
            Err(e) => log::info!("Accepted submission {} (unserializable: {})", submission.id, e),
        }

        lock(&self.submissions).push(submission.clone());

        // Err only means there are no receivers.
        let _ = self.update_tx.send(submission.clone());

        // Callbacks run unlocked so they may subscribe or unsubscribe.
        let callbacks: Vec<Subscriber> = lock(&self.subscribers).values().cloned().collect();
        for callback in callbacks {
            callback(&submission);
        }

        submission
    }

    /// Snapshot of every submission, oldest first.
    pub fn list(&self) -> Vec<Submission> {
        lock(&self.submissions).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.submissions).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.submissions).is_empty()
    }

    /// Register a callback run after every append.
    pub fn subscribe(&self, callback: Box<dyn Fn(&Submission) + Send + Sync>) -> Uuid {
        let id = Uuid::new_v4();
        lock(&self.subscribers).insert(id, Arc::from(callback));
        id
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn unsubscribe(&self, id: Uuid) -> bool {
        lock(&self.subscribers).remove(&id).is_some()
    }

    /// Receiver for appends made after this call.
    pub fn updates(&self) -> broadcast::Receiver<Submission> {
        self.update_tx.subscribe()
    }
}

impl Default for SubmissionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Poisoned locks are recovered; both guarded values stay consistent across a panic.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Sex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn make_record(name: &str) -> RegistrationRecord {
        RegistrationRecord {
            name: name.to_string(),
            dob: 40,
            sex: Sex::Male,
            mobile: None,
            gov_id_type: None,
            gov_id: None,
            address: None,
            state: None,
            city: None,
            country: None,
            pin_code: None,
        }
    }

    #[test]
    fn test_append_preserves_order() {
        let store = SubmissionStore::new();
        assert!(store.is_empty());

        store.append(make_record("Anil"));
        store.append(make_record("Bina"));
        store.append(make_record("Chetan"));

        let names: Vec<String> = store.list().into_iter().map(|s| s.record.name).collect();
        assert_eq!(names, vec!["Anil", "Bina", "Chetan"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let store = SubmissionStore::new();
        store.append(make_record("Anil"));
        let before = store.list();
        store.append(make_record("Bina"));
        assert_eq!(before.len(), 1);
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn test_subscribers_see_each_append() {
        let store = SubmissionStore::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let id = store.subscribe(Box::new(move |_: &Submission| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        store.append(make_record("Anil"));
        assert!(store.unsubscribe(id));
        store.append(make_record("Bina"));

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(!store.unsubscribe(id));
    }

    #[test]
    fn test_subscriber_can_unsubscribe_itself() {
        let store = SubmissionStore::shared();
        let own_id = Arc::new(Mutex::new(None::<Uuid>));
        let calls = Arc::new(AtomicUsize::new(0));

        let inner = store.clone();
        let slot = own_id.clone();
        let counter = calls.clone();
        let id = store.subscribe(Box::new(move |_: &Submission| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = *lock(&slot) {
                inner.unsubscribe(id);
            }
        }));
        *lock(&own_id) = Some(id);

        store.append(make_record("Anil"));
        store.append(make_record("Bina"));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!store.unsubscribe(id));
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_updates_channel_receives_appends() {
        let store = SubmissionStore::new();
        let mut rx = store.updates();

        let appended = store.append(make_record("Devika"));
        let received = rx.recv().await.unwrap();
        assert_eq!(received, appended);
        assert_eq!(received.record.name, "Devika");
    }
}
