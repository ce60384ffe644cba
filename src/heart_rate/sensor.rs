//! Sensor connection policy.
//!
//! [`run_sensor`] keeps a [`HeartRateFeed`] fed from whatever [`SensorLink`]
//! it is given:
//!
//! ```text
//! Scanning ──found──▶ Connecting ──subscribed──▶ Connected
//!    ▲                    │                         │
//!    │                 failed                  disconnected
//!    │                    ▼                         │
//!    └──── (retry delay) Disconnected ◀─────────────┘
//! ```
//!
//! A dropped connection zeroes the BPM and goes straight back to scanning.
//! Scan or connect failures wait for the retry delay first.

use std::future::Future;

use futures::{Stream, StreamExt};
use tokio::time::Duration;
use tracing::{info, warn};

use super::error::HeartRateError;
use super::{ConnectionState, HeartRateFeed};

/// Wait before scanning again after a failed scan or connection attempt.
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Transport that can find one heart-rate sensor and stream its measurements.
pub trait SensorLink {
    /// Raw measurement payloads from one connection. The stream ends when
    /// the sensor disconnects.
    type Session: Stream<Item = Vec<u8>> + Unpin;

    /// Waits until a sensor advertising the heart-rate service is found.
    fn scan(&mut self) -> impl Future<Output = Result<(), HeartRateError>>;

    /// Connects to the sensor found by the last scan and subscribes to its
    /// measurement notifications.
    fn connect(&mut self) -> impl Future<Output = Result<Self::Session, HeartRateError>>;
}

/// Drives `link` forever, publishing connection state and readings to `feed`.
///
/// Never returns; drop the future to stop it.
pub async fn run_sensor<L: SensorLink>(
    link: &mut L,
    feed: &HeartRateFeed,
    retry_delay: Duration,
) {
    loop {
        feed.set_state(ConnectionState::Scanning);
        if let Err(e) = link.scan().await {
            warn!("Heart rate scan failed: {}", e);
            feed.set_state(ConnectionState::Disconnected);
            tokio::time::sleep(retry_delay).await;
            continue;
        }

        feed.set_state(ConnectionState::Connecting);
        let mut session = match link.connect().await {
            Ok(session) => session,
            Err(e) => {
                warn!("Heart rate sensor connection failed: {}", e);
                feed.set_state(ConnectionState::Disconnected);
                tokio::time::sleep(retry_delay).await;
                continue;
            }
        };

        feed.set_state(ConnectionState::Connected);
        info!("Heart rate sensor connected");

        while let Some(payload) = session.next().await {
            // Malformed payloads are logged by the feed and skipped
            let _ = feed.record_measurement(&payload);
        }

        info!("Heart rate sensor disconnected, scanning again");
        feed.set_state(ConnectionState::Disconnected);
    }
}
