//! Scripted WhoisTransport for unit tests.

use crate::domain::error::LookupError;
use crate::domain::ports::WhoisTransport;
use crate::domain::value_objects::WhoisHost;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Answers queries from a host -> response table and records every call.
///
/// Hosts are matched after scheme stripping. Unknown hosts fail as a
/// refused connection.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, Result<String, LookupError>>>,
    calls: Mutex<Vec<(String, String)>>,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, host: &str, body: &str) -> Self {
        self.set(host, Ok(body.to_string()));
        self
    }

    /// Hold every response for `delay`, honouring cancellation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set(&self, host: &str, response: Result<String, LookupError>) {
        self.responses.lock().insert(Self::key(host), response);
    }

    /// Hosts queried so far, in order.
    pub fn hosts(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(h, _)| h.clone()).collect()
    }

    /// Query lines' addresses, in order.
    pub fn ips(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(_, ip)| ip.clone()).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Calls made to `host`.
    pub fn calls_to(&self, host: &str) -> usize {
        let key = Self::key(host);
        self.calls.lock().iter().filter(|(h, _)| *h == key).count()
    }

    fn key(host: &str) -> String {
        WhoisHost::parse(host)
            .map(|h| h.to_string())
            .unwrap_or_else(|| host.to_string())
    }
}

#[async_trait]
impl WhoisTransport for MockTransport {
    async fn query(
        &self,
        cancel: &CancellationToken,
        host: &str,
        ip: &str,
    ) -> Result<String, LookupError> {
        if cancel.is_cancelled() {
            return Err(LookupError::Cancelled);
        }

        let key = Self::key(host);
        self.calls.lock().push((key.clone(), ip.to_string()));

        if let Some(delay) = self.delay {
            tokio::select! {
                _ = cancel.cancelled() => return Err(LookupError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.responses.lock().get(&key).cloned().unwrap_or_else(|| {
            Err(LookupError::dial(
                key,
                io::Error::new(io::ErrorKind::ConnectionRefused, "no such mock host"),
            ))
        })
    }
}
