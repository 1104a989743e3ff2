//! In-flight Deduplication
//!
//! Collapses concurrent work on the same key into one execution whose
//! result every caller observes.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::watch;

/// Registry of in-flight work keyed by string.
///
/// The first caller for a key becomes the leader and runs the work; callers
/// arriving while it runs become followers and wait for the leader's value.
/// The key is released as soon as the leader finishes or is dropped, so a
/// later caller starts fresh.
pub struct InflightGroup<T> {
    calls: Mutex<HashMap<String, watch::Receiver<Option<T>>>>,
}

/// How a caller took part in a flight.
enum Role<T> {
    Leader(watch::Sender<Option<T>>),
    Follower(watch::Receiver<Option<T>>),
}

impl<T: Clone> InflightGroup<T> {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Run `work` for `key` unless another caller already is.
    ///
    /// Returns the value and whether it was shared from another caller's
    /// flight. Returns `None` when the leader went away without producing a
    /// value.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> Option<(T, bool)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let role = {
            let mut calls = self.calls.lock();
            match calls.get(key) {
                Some(rx) => Role::Follower(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(None);
                    calls.insert(key.to_string(), rx);
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Follower(mut rx) => {
                tracing::debug!("joining in-flight resolution for {}", key);
                let value = match rx.wait_for(Option::is_some).await {
                    Ok(value) => value.clone(),
                    Err(_) => None,
                };
                value.map(|v| (v, true))
            }
            Role::Leader(tx) => {
                let _guard = FlightGuard { group: self, key };
                let value = work().await;
                tx.send_replace(Some(value.clone()));
                Some((value, false))
            }
        }
    }

    /// Number of keys currently in flight.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<T: Clone> Default for InflightGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard releasing a key when its leader finishes or is dropped.
struct FlightGuard<'a, T> {
    group: &'a InflightGroup<T>,
    key: &'a str,
}

impl<T> Drop for FlightGuard<'_, T> {
    fn drop(&mut self) {
        self.group.calls.lock().remove(self.key);
    }
}
