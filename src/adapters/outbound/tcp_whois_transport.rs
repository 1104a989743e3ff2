//! TCP WHOIS Transport
//!
//! Implements WhoisTransport over plain TCP (RFC 3912).

use crate::domain::error::LookupError;
use crate::domain::ports::WhoisTransport;
use crate::domain::value_objects::WhoisHost;
use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

/// TCP transport configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Maximum time to establish the connection
    pub connect_timeout: Duration,
    /// Responses longer than this are rejected
    pub max_response_bytes: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            max_response_bytes: 1024 * 1024,
        }
    }
}

/// Plain TCP WHOIS client.
///
/// One connection per query: connect, write the query line with CRLF, read
/// until the server closes. Each step races the cancellation token, and the
/// stream is dropped on every exit path.
pub struct TcpWhoisTransport {
    config: TransportConfig,
}

impl TcpWhoisTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    async fn exchange(
        &self,
        cancel: &CancellationToken,
        host: &WhoisHost,
        ip: &str,
    ) -> Result<String, LookupError> {
        let target = host.to_string();

        let connect = tokio::time::timeout(
            self.config.connect_timeout,
            TcpStream::connect((host.name(), host.port())),
        );
        let mut stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LookupError::Cancelled),
            res = connect => match res {
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) => return Err(LookupError::dial(target, e)),
                Err(_) => {
                    return Err(LookupError::dial(
                        target,
                        io::Error::new(io::ErrorKind::TimedOut, "connect timed out"),
                    ))
                }
            },
        };

        let line = format!("{}\r\n", host.query_line(ip));
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LookupError::Cancelled),
            res = stream.write_all(line.as_bytes()) => {
                res.map_err(|e| LookupError::write(target.as_str(), e))?;
            }
        }

        // One byte over the cap is enough to tell an oversized response apart.
        let limit = self.config.max_response_bytes as u64 + 1;
        let mut buf = Vec::new();
        let mut reader = (&mut stream).take(limit);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LookupError::Cancelled),
            res = reader.read_to_end(&mut buf) => {
                res.map_err(|e| LookupError::read(target.as_str(), e))?;
            }
        }

        if buf.len() > self.config.max_response_bytes {
            return Err(LookupError::read(
                target,
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "response exceeds {} bytes",
                        self.config.max_response_bytes
                    ),
                ),
            ));
        }

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl Default for TcpWhoisTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

#[async_trait]
impl WhoisTransport for TcpWhoisTransport {
    async fn query(
        &self,
        cancel: &CancellationToken,
        host: &str,
        ip: &str,
    ) -> Result<String, LookupError> {
        if cancel.is_cancelled() {
            return Err(LookupError::Cancelled);
        }

        let host = WhoisHost::parse(host).ok_or_else(|| {
            LookupError::dial(
                host,
                io::Error::new(io::ErrorKind::InvalidInput, "invalid WHOIS host"),
            )
        })?;

        tracing::debug!("querying {} for {}", host, ip);
        self.exchange(cancel, &host, ip).await
    }
}
