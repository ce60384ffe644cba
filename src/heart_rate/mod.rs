//! Heart-rate sensor collaborator.
//!
//! A [`SensorLink`] finds a sensor and streams raw measurement payloads;
//! [`run_sensor`] applies the reconnect policy and reports connection
//! changes and decoded readings to a [`HeartRateFeed`]. Display code
//! subscribes to the feed. Readings never influence the timer.

mod ble;
mod error;
mod measurement;
mod sensor;

pub use ble::{BleSensorLink, HEART_RATE_MEASUREMENT, HEART_RATE_SERVICE};
pub use error::HeartRateError;
pub use measurement::{decode_measurement, FLAG_VALUE_FORMAT_U16};
pub use sensor::{run_sensor, SensorLink, RETRY_DELAY};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Link state of the heart-rate sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Scanning,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Scanning => "scanning",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        }
    }
}

/// Latest state reported by the sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartRateReading {
    pub state: ConnectionState,
    /// Beats per minute, 0 when no data is available
    pub bpm: u16,
}

impl HeartRateReading {
    /// Returns the BPM if a measurement is available.
    pub fn bpm(&self) -> Option<u16> {
        (self.bpm > 0).then_some(self.bpm)
    }
}

/// Publishes sensor readings to any number of subscribers.
#[derive(Debug)]
pub struct HeartRateFeed {
    tx: watch::Sender<HeartRateReading>,
}

impl Default for HeartRateFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl HeartRateFeed {
    /// Creates a feed in the disconnected state.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(HeartRateReading::default());
        Self { tx }
    }

    /// Returns a receiver starting at the latest reading.
    ///
    /// Each call yields an independent receiver, so consumers can drop and
    /// resubscribe at any time.
    pub fn subscribe(&self) -> watch::Receiver<HeartRateReading> {
        self.tx.subscribe()
    }

    /// Returns the latest reading.
    pub fn current(&self) -> HeartRateReading {
        *self.tx.borrow()
    }

    /// Records a connection state change.
    ///
    /// Dropping to `Disconnected` clears the BPM value.
    pub fn set_state(&self, state: ConnectionState) {
        self.tx.send_modify(|reading| {
            reading.state = state;
            if state == ConnectionState::Disconnected {
                reading.bpm = 0;
            }
        });
        debug!("Heart rate sensor {}", state.as_str());
    }

    /// Decodes and publishes a raw measurement payload.
    ///
    /// On a malformed payload the previous reading is kept.
    pub fn record_measurement(&self, payload: &[u8]) -> Result<u16, HeartRateError> {
        match decode_measurement(payload) {
            Ok(bpm) => {
                self.tx.send_modify(|reading| reading.bpm = bpm);
                Ok(bpm)
            }
            Err(e) => {
                warn!("Ignoring heart rate measurement: {}", e);
                Err(e)
            }
        }
    }
}
