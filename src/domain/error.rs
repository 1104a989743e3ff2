//! Lookup Errors
//!
//! Every failure a lookup can surface to its caller. The type is `Clone`
//! because one resolution outcome fans out to every member of a
//! deduplication group.

use std::io;
use std::sync::Arc;

/// Failure of a country lookup.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LookupError {
    /// The address could not be parsed as an IP.
    #[error("query is not an IP: {0:?}")]
    InvalidInput(String),

    /// Could not open a connection to the WHOIS host.
    #[error("cannot talk to {host:?}: {source}")]
    Dial {
        host: String,
        #[source]
        source: Arc<io::Error>,
    },

    /// The query line could not be written.
    #[error("cannot write query to {host:?}: {source}")]
    Write {
        host: String,
        #[source]
        source: Arc<io::Error>,
    },

    /// The response could not be read in full.
    #[error("cannot read response of {host:?}: {source}")]
    Read {
        host: String,
        #[source]
        source: Arc<io::Error>,
    },

    /// The governing cancellation token fired mid-flight.
    #[error("lookup cancelled")]
    Cancelled,

    /// No referral, redirect or country line could be found.
    ///
    /// Either the address is not allocated, or the registry answered in a
    /// format this parser does not understand.
    #[error("answer not found")]
    AnswerNotFound,

    /// The delegation chain grew past the configured hop limit.
    #[error("delegation chain exceeded {0} hops")]
    DelegationLimit(usize),

    /// The task resolving this address went away without an answer.
    #[error("in-flight resolution abandoned")]
    Abandoned,
}

impl LookupError {
    pub fn dial(host: impl Into<String>, source: io::Error) -> Self {
        Self::Dial {
            host: host.into(),
            source: Arc::new(source),
        }
    }

    pub fn write(host: impl Into<String>, source: io::Error) -> Self {
        Self::Write {
            host: host.into(),
            source: Arc::new(source),
        }
    }

    pub fn read(host: impl Into<String>, source: io::Error) -> Self {
        Self::Read {
            host: host.into(),
            source: Arc::new(source),
        }
    }

    /// True for dial, write and read failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Dial { .. } | Self::Write { .. } | Self::Read { .. })
    }

    /// Host involved in a transport failure.
    pub fn host(&self) -> Option<&str> {
        match self {
            Self::Dial { host, .. } | Self::Write { host, .. } | Self::Read { host, .. } => {
                Some(host)
            }
            _ => None,
        }
    }
}
