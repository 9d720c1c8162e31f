//! Push-channel receiver for the service clock.
//!
//! The receiver keeps a single WebSocket open and republishes every text
//! frame through a `watch` channel, so observers only ever see the newest
//! value. Losing the connection is logged and otherwise silent.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::{
    net::TcpStream,
    sync::{oneshot, watch},
    task::JoinHandle,
};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::TransportError;

/// Lower bound for any reconnect delay.
pub const MIN_RECONNECT_DELAY: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconnectPolicy {
    /// Stop updating after the first disconnect.
    #[default]
    Never,
    /// Reconnect with a delay doubling from `initial` up to `max`.
    Backoff { initial: Duration, max: Duration },
}

impl ReconnectPolicy {
    /// Delay before the next attempt, given the delay used for the previous one.
    pub fn next_delay(&self, previous: Option<Duration>) -> Option<Duration> {
        match *self {
            Self::Never => None,
            Self::Backoff { initial, max } => {
                let max = max.max(MIN_RECONNECT_DELAY);
                Some(match previous {
                    None => initial.clamp(MIN_RECONNECT_DELAY, max),
                    Some(previous) => previous.saturating_mul(2).clamp(MIN_RECONNECT_DELAY, max),
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStatus {
    Connecting,
    Connected,
    Disconnected,
}

enum StreamEnd {
    Shutdown,
    Dropped,
}

pub struct ClockReceiver {
    value: watch::Receiver<Option<String>>,
    status: watch::Receiver<ClockStatus>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ClockReceiver {
    /// Opens the push connection in a background task. Must be called from
    /// within a tokio runtime.
    pub fn spawn(url: Url, policy: ReconnectPolicy) -> Self {
        let (value_tx, value) = watch::channel(None);
        let (status_tx, status) = watch::channel(ClockStatus::Connecting);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run_clock_stream(
            url,
            policy,
            value_tx,
            status_tx,
            shutdown_rx,
        ));
        Self {
            value,
            status,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    pub fn latest(&self) -> Option<String> {
        self.value.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.value.clone()
    }

    pub fn status(&self) -> ClockStatus {
        *self.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<ClockStatus> {
        self.status.clone()
    }

    /// Closes the connection and waits for the background task to finish.
    pub async fn close(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ClockReceiver {
    fn drop(&mut self) {
        // Dropping the sender resolves the receiver side, which ends the task.
        self.shutdown.take();
    }
}

/// Derives the WebSocket endpoint from an http(s) base url.
pub fn clock_url(base_url: &str, clock_path: &str) -> Result<Url, TransportError> {
    let mut url =
        Url::parse(base_url.trim()).map_err(|err| TransportError::invalid_url(base_url, err))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(TransportError::invalid_url(
                base_url,
                format!("unsupported scheme {other}"),
            ))
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| TransportError::invalid_url(base_url, "cannot switch to websocket scheme"))?;

    let path = clock_path.trim().trim_start_matches('/');
    let joined = format!("{}/{path}", url.path().trim_end_matches('/'));
    url.set_path(&joined);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

async fn run_clock_stream(
    url: Url,
    policy: ReconnectPolicy,
    value_tx: watch::Sender<Option<String>>,
    status_tx: watch::Sender<ClockStatus>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut delay = None;
    loop {
        status_tx.send_replace(ClockStatus::Connecting);
        let connected = tokio::select! {
            _ = &mut shutdown => break,
            result = connect_async(url.as_str()) => result,
        };

        match connected {
            Ok((stream, _)) => {
                info!(%url, "clock: connected");
                status_tx.send_replace(ClockStatus::Connected);
                delay = None;
                if let StreamEnd::Shutdown = pump_messages(stream, &value_tx, &mut shutdown).await
                {
                    break;
                }
                warn!(%url, "clock: connection lost; updates stopped");
            }
            Err(error) => warn!(%url, %error, "clock: connect failed"),
        }

        status_tx.send_replace(ClockStatus::Disconnected);
        let Some(next) = policy.next_delay(delay) else {
            return;
        };
        delay = Some(next);
        debug!(%url, delay_ms = next.as_millis() as u64, "clock: reconnect scheduled");
        tokio::select! {
            _ = &mut shutdown => break,
            _ = tokio::time::sleep(next) => {}
        }
    }

    status_tx.send_replace(ClockStatus::Disconnected);
    info!(%url, "clock: closed");
}

async fn pump_messages(
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    value_tx: &watch::Sender<Option<String>>,
    shutdown: &mut oneshot::Receiver<()>,
) -> StreamEnd {
    let (mut writer, mut reader) = stream.split();
    loop {
        tokio::select! {
            _ = &mut *shutdown => {
                let _ = writer.send(Message::Close(None)).await;
                return StreamEnd::Shutdown;
            }
            msg = reader.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    value_tx.send_replace(Some(text));
                }
                Some(Ok(Message::Close(_))) | None => return StreamEnd::Dropped,
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    warn!(%error, "clock: receive failed");
                    return StreamEnd::Dropped;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/clock_tests.rs"]
mod tests;
