//! Line Front-End Adapter
//!
//! Reads one address per line, submits each to the dispatcher and writes
//! one result line per address.

use crate::domain::entities::{LookupRequest, LookupResult};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Line-oriented inbound adapter.
///
/// Every input line becomes a [`LookupRequest`] sent to the dispatcher's
/// queue. The answer is raced against `timeout`; whichever comes first is
/// printed. Lines are written as answers arrive, so output order follows
/// completion, not input.
pub struct LineFrontend {
    requests: mpsc::UnboundedSender<LookupRequest>,
    timeout: Duration,
}

impl LineFrontend {
    pub fn new(requests: mpsc::UnboundedSender<LookupRequest>, timeout: Duration) -> Self {
        Self { requests, timeout }
    }

    /// Run until the input ends or `cancel` fires, then wait for the
    /// outstanding answers (each bounded by the timeout) and return.
    pub async fn run<R, W>(self, reader: R, mut writer: W, cancel: CancellationToken) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        let mut lines = reader.lines();

        loop {
            let line = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                Some(rendered) = out_rx.recv() => {
                    write_line(&mut writer, &rendered).await?;
                    continue;
                }
                line = lines.next_line() => match line? {
                    Some(line) => line,
                    None => break,
                },
            };

            let address = line.trim().to_string();
            if address.is_empty() {
                continue;
            }

            let (request, response) = LookupRequest::new(line);
            if self.requests.send(request).is_err() {
                tracing::warn!("dispatcher is gone, dropping {}", address);
                break;
            }

            let out_tx = out_tx.clone();
            let timeout = self.timeout;
            tokio::spawn(async move {
                let rendered = match tokio::time::timeout(timeout, response).await {
                    Ok(Ok(result)) => format_result(&address, &result),
                    Ok(Err(_)) => format!("{} dropped", address),
                    Err(_) => format!("{} timeout", address),
                };
                let _ = out_tx.send(rendered);
            });
        }

        // The spawned waiters hold the remaining senders.
        drop(out_tx);
        while let Some(rendered) = out_rx.recv().await {
            write_line(&mut writer, &rendered).await?;
        }
        Ok(())
    }
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

/// Render `"<address> <country|-> <error|-> <cached>"`.
pub fn format_result(address: &str, result: &LookupResult) -> String {
    let country = if result.country.is_empty() {
        "-"
    } else {
        result.country.as_str()
    };
    let error = result
        .error
        .as_ref()
        .map(|e| e.to_string())
        .unwrap_or_else(|| "-".to_string());

    format!("{} {} {} {}", address, country, error, result.served_from_cache)
}
