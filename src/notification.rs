//! Inbound notifications and the sources that deliver them.

use std::{
    io::BufRead,
    path::PathBuf,
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    thread::JoinHandle,
    time::Duration,
};

use chrono::{DateTime, NaiveDateTime};
use tracing::{debug, warn};

use crate::foundation::error::{SwathError, SwathResult};

/// One "new image" message.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Notification {
    /// Topic selecting the processing profile.
    pub subject: String,
    /// Payload.
    pub data: NotificationData,
}

/// Notification payload.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NotificationData {
    /// Location of the source image; only the path part is used.
    pub uri: String,
    /// Nominal acquisition time, RFC 3339 or `%Y-%m-%dT%H:%M:%S` (UTC).
    pub start_time: String,
}

impl Notification {
    /// Build a notification.
    pub fn new(
        subject: impl Into<String>,
        uri: impl Into<String>,
        start_time: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            data: NotificationData {
                uri: uri.into(),
                start_time: start_time.into(),
            },
        }
    }

    /// Parse one JSON document.
    pub fn from_json(json: &str) -> SwathResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| SwathError::notification(format!("invalid notification: {e}")))
    }

    /// Start time as naive UTC.
    pub fn start_time(&self) -> SwathResult<NaiveDateTime> {
        parse_start_time(&self.data.start_time)
    }

    /// Filesystem path of the source image.
    pub fn path(&self) -> PathBuf {
        uri_to_path(&self.data.uri)
    }
}

/// RFC 3339 (converted to UTC) or a naive `%Y-%m-%dT%H:%M:%S[.f]` timestamp.
pub fn parse_start_time(raw: &str) -> SwathResult<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Ok(t.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| SwathError::notification(format!("unparseable start_time '{raw}'")))
}

/// Path part of `uri`; anything that is not a URL is taken as a plain path.
pub fn uri_to_path(uri: &str) -> PathBuf {
    match url::Url::parse(uri) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .unwrap_or_else(|()| PathBuf::from(url.path())),
        Ok(url) if url.cannot_be_a_base() => PathBuf::from(uri),
        Ok(url) => PathBuf::from(url.path()),
        Err(_) => PathBuf::from(uri),
    }
}

/// Result of one bounded wait on a [`NotificationSource`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Poll {
    /// A message arrived.
    Message(Notification),
    /// Nothing arrived within the timeout.
    Empty,
    /// The source is exhausted; nothing will ever arrive again.
    Closed,
}

/// Delivers notifications one at a time.
pub trait NotificationSource {
    /// Wait up to `timeout` for the next notification.
    fn poll(&mut self, timeout: Duration) -> Poll;
}

/// Source backed by an in-process channel.
#[derive(Debug)]
pub struct ChannelSource {
    rx: Receiver<Notification>,
}

impl ChannelSource {
    /// Wrap a receiver.
    pub fn new(rx: Receiver<Notification>) -> Self {
        Self { rx }
    }

    /// New channel: the sender feeds the returned source.
    pub fn channel() -> (Sender<Notification>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self::new(rx))
    }
}

impl NotificationSource for ChannelSource {
    fn poll(&mut self, timeout: Duration) -> Poll {
        match self.rx.recv_timeout(timeout) {
            Ok(msg) => Poll::Message(msg),
            Err(RecvTimeoutError::Timeout) => Poll::Empty,
            Err(RecvTimeoutError::Disconnected) => Poll::Closed,
        }
    }
}

/// Read JSON-lines notifications from `reader` on a background thread.
///
/// Blank lines are ignored and malformed ones logged and skipped. The channel closes at end of
/// input or when the receiving side goes away.
pub fn spawn_json_lines_reader<R>(reader: R, tx: Sender<Notification>) -> JoinHandle<()>
where
    R: BufRead + Send + 'static,
{
    std::thread::spawn(move || {
        for (lineno, line) in reader.lines().enumerate() {
            let line = match line {
                Ok(l) => l,
                Err(err) => {
                    warn!(%err, "failed to read notification input");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match Notification::from_json(&line) {
                Ok(msg) => {
                    if tx.send(msg).is_err() {
                        debug!("notification receiver dropped, stopping reader");
                        break;
                    }
                }
                Err(err) => warn!(line = lineno + 1, %err, "skipping malformed notification"),
            }
        }
    })
}

#[cfg(test)]
#[path = "../tests/unit/notification.rs"]
mod tests;
