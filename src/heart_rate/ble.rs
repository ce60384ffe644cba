//! Bluetooth LE heart-rate sensors via btleplug.
//!
//! Scans for peripherals advertising the standard Heart Rate service and
//! streams notifications from its Heart Rate Measurement characteristic.

use std::pin::Pin;

use btleplug::api::{Central as _, CentralEvent, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::future::ready;
use futures::stream::{self, Stream, StreamExt};
use tracing::debug;
use uuid::Uuid;

use super::error::HeartRateError;
use super::sensor::SensorLink;

/// GATT Heart Rate service.
pub const HEART_RATE_SERVICE: Uuid = Uuid::from_u128(0x0000_180d_0000_1000_8000_0080_5f9b_34fb);

/// GATT Heart Rate Measurement characteristic.
pub const HEART_RATE_MEASUREMENT: Uuid = Uuid::from_u128(0x0000_2a37_0000_1000_8000_0080_5f9b_34fb);

fn bluetooth(e: btleplug::Error) -> HeartRateError {
    HeartRateError::Bluetooth(e.to_string())
}

/// [`SensorLink`] backed by the first Bluetooth adapter of the host.
pub struct BleSensorLink {
    adapter: Adapter,
    found: Option<Peripheral>,
}

impl BleSensorLink {
    /// Opens the first available Bluetooth adapter.
    ///
    /// # Errors
    ///
    /// Returns an error if the Bluetooth stack is unavailable or the host
    /// has no adapter.
    pub async fn new() -> Result<Self, HeartRateError> {
        let manager = Manager::new().await.map_err(bluetooth)?;
        let adapter = manager
            .adapters()
            .await
            .map_err(bluetooth)?
            .into_iter()
            .next()
            .ok_or(HeartRateError::NoAdapter)?;

        Ok(Self {
            adapter,
            found: None,
        })
    }

    async fn advertises_heart_rate(peripheral: &Peripheral) -> bool {
        match peripheral.properties().await {
            Ok(Some(properties)) => properties.services.contains(&HEART_RATE_SERVICE),
            _ => false,
        }
    }
}

impl std::fmt::Debug for BleSensorLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BleSensorLink")
            .field("found", &self.found.as_ref().map(|p| p.id()))
            .finish_non_exhaustive()
    }
}

/// Notification or disconnect seen during one connection.
enum LinkEvent {
    Measurement(Vec<u8>),
    Disconnected,
}

impl SensorLink for BleSensorLink {
    type Session = Pin<Box<dyn Stream<Item = Vec<u8>> + Send>>;

    async fn scan(&mut self) -> Result<(), HeartRateError> {
        let mut events = self.adapter.events().await.map_err(bluetooth)?;
        self.adapter
            .start_scan(ScanFilter {
                services: vec![HEART_RATE_SERVICE],
            })
            .await
            .map_err(bluetooth)?;
        debug!("Scanning for heart rate sensors");

        while let Some(event) = events.next().await {
            let CentralEvent::DeviceDiscovered(id) = event else {
                continue;
            };
            let peripheral = self.adapter.peripheral(&id).await.map_err(bluetooth)?;
            if Self::advertises_heart_rate(&peripheral).await {
                debug!("Found heart rate sensor {:?}", id);
                self.adapter.stop_scan().await.map_err(bluetooth)?;
                self.found = Some(peripheral);
                return Ok(());
            }
        }

        Err(HeartRateError::Bluetooth(
            "adapter event stream ended".to_string(),
        ))
    }

    async fn connect(&mut self) -> Result<Self::Session, HeartRateError> {
        let peripheral = self.found.take().ok_or(HeartRateError::NoSensor)?;
        let id = peripheral.id();

        // Subscribe before connecting so an early drop is not missed
        let events = self.adapter.events().await.map_err(bluetooth)?;

        peripheral.connect().await.map_err(bluetooth)?;
        peripheral.discover_services().await.map_err(bluetooth)?;
        let characteristic = peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == HEART_RATE_MEASUREMENT)
            .ok_or(HeartRateError::MissingCharacteristic)?;
        peripheral
            .subscribe(&characteristic)
            .await
            .map_err(bluetooth)?;
        let notifications = peripheral.notifications().await.map_err(bluetooth)?;

        let measurements = notifications
            .filter(|n| ready(n.uuid == HEART_RATE_MEASUREMENT))
            .map(|n| LinkEvent::Measurement(n.value));
        let disconnects = events
            .filter(move |event| {
                ready(matches!(event, CentralEvent::DeviceDisconnected(gone) if *gone == id))
            })
            .map(|_| LinkEvent::Disconnected);

        let session = stream::select(measurements, disconnects)
            .take_while(|event| ready(matches!(event, LinkEvent::Measurement(_))))
            .filter_map(|event| {
                ready(match event {
                    LinkEvent::Measurement(payload) => Some(payload),
                    LinkEvent::Disconnected => None,
                })
            });

        Ok(Box::pin(session))
    }
}
