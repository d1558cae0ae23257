//! BLE transport for the FlowerCare sensor.
//!
//! Only the realtime read path is implemented: scan for an advertising
//! device, connect, switch the data characteristic to realtime mode, read
//! the realtime and firmware frames, disconnect. History download and the
//! other vendor commands are out of scope.

use std::time::Duration;

use btleplug::api::{Central, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType};
use btleplug::platform::{Adapter, Manager, Peripheral};
use tracing::{debug, warn};
use uuid::{uuid, Uuid};

use crate::error::{Error, Result};
use crate::reading::SensorReading;

/// FlowerCare GATT data service.
pub const DATA_SERVICE: Uuid = uuid!("00001204-0000-1000-8000-00805f9b34fb");

/// Mode-switch characteristic (write [0xa0, 0x1f] for realtime data).
const MODE_CHARACTERISTIC: Uuid = uuid!("00001a00-0000-1000-8000-00805f9b34fb");

/// Realtime sensor data characteristic (16-byte frame).
const REALTIME_CHARACTERISTIC: Uuid = uuid!("00001a01-0000-1000-8000-00805f9b34fb");

/// Battery level and firmware version characteristic.
const FIRMWARE_CHARACTERISTIC: Uuid = uuid!("00001a02-0000-1000-8000-00805f9b34fb");

/// Command that switches the realtime characteristic to live readings.
const REALTIME_MODE: [u8; 2] = [0xa0, 0x1f];

/// Advertised local names of known device revisions.
const DEVICE_NAMES: [&str; 2] = ["Flower care", "Flower mate"];

/// How long to scan for advertisements before giving up.
const SCAN_WINDOW: Duration = Duration::from_secs(10);

/// BLE client for the FlowerCare sensor.
pub struct MiFloraSensor {
    adapter: Adapter,
}

impl MiFloraSensor {
    /// Opens the first available Bluetooth adapter.
    pub async fn new() -> Result<Self> {
        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or(Error::NoAdapter)?;
        debug!("Using Bluetooth adapter: {:?}", adapter);
        Ok(Self { adapter })
    }

    /// Scans for a FlowerCare device and reads one snapshot from it.
    ///
    /// Returns `Ok(None)` when no device advertised within the scan window.
    /// Transport errors during connect/read are returned as `Err` so the
    /// caller can decide whether a missing reading is retryable.
    pub async fn read(&self) -> Result<Option<SensorReading>> {
        self.adapter.start_scan(ScanFilter::default()).await?;
        tokio::time::sleep(SCAN_WINDOW).await;
        let device = self.discover().await;
        // Stop scanning even when discovery failed.
        if let Err(e) = self.adapter.stop_scan().await {
            debug!("Stopping scan failed: {}", e);
        }

        let Some(device) = device? else {
            warn!("No FlowerCare device found within scan window");
            return Ok(None);
        };

        let reading = self.read_device(&device).await;
        if let Err(e) = device.disconnect().await {
            debug!("Disconnect failed: {}", e);
        }
        reading.map(Some)
    }

    /// Finds the first scanned peripheral advertising a FlowerCare name.
    async fn discover(&self) -> Result<Option<Peripheral>> {
        for peripheral in self.adapter.peripherals().await? {
            let name = peripheral
                .properties()
                .await?
                .and_then(|props| props.local_name);
            if let Some(name) = name {
                if DEVICE_NAMES.iter().any(|known| name.starts_with(known)) {
                    debug!("Found sensor '{}' at {}", name, peripheral.address());
                    return Ok(Some(peripheral));
                }
            }
        }
        Ok(None)
    }

    /// Connects and reads the realtime and firmware frames.
    async fn read_device(&self, device: &Peripheral) -> Result<SensorReading> {
        device.connect().await?;
        device.discover_services().await?;

        let mode = find_characteristic(device, MODE_CHARACTERISTIC)?;
        device
            .write(&mode, &REALTIME_MODE, WriteType::WithResponse)
            .await?;

        let realtime = find_characteristic(device, REALTIME_CHARACTERISTIC)?;
        let frame = device.read(&realtime).await?;
        let (temperature, light, moisture, conductivity) = parse_realtime(&frame)?;

        let firmware_char = find_characteristic(device, FIRMWARE_CHARACTERISTIC)?;
        let frame = device.read(&firmware_char).await?;
        let (battery, firmware) = parse_firmware(&frame)?;

        Ok(SensorReading {
            address: device.address().to_string().to_lowercase(),
            firmware,
            temperature,
            light,
            moisture,
            conductivity,
            battery,
        })
    }
}

/// Looks up a characteristic by UUID after service discovery.
fn find_characteristic(device: &Peripheral, uuid: Uuid) -> Result<Characteristic> {
    device
        .characteristics()
        .into_iter()
        .find(|c| c.uuid == uuid)
        .ok_or(Error::CharacteristicNotFound(uuid))
}

/// Parses the 16-byte realtime frame.
///
/// Layout: temperature as i16 LE in 0.1 °C at offset 0, light as u32 LE in
/// lux at offset 3, moisture as u8 percent at offset 7, conductivity as
/// u16 LE in µS/cm at offset 8. The remaining bytes are padding.
fn parse_realtime(frame: &[u8]) -> Result<(f64, u32, u8, u16)> {
    if frame.len() < 10 {
        return Err(Error::ShortRead {
            expected: 10,
            actual: frame.len(),
        });
    }
    let temperature = i16::from_le_bytes([frame[0], frame[1]]) as f64 / 10.0;
    let light = u32::from_le_bytes([frame[3], frame[4], frame[5], frame[6]]);
    let moisture = frame[7];
    let conductivity = u16::from_le_bytes([frame[8], frame[9]]);
    Ok((temperature, light, moisture, conductivity))
}

/// Parses the firmware frame: battery percent at offset 0, ASCII firmware
/// version from offset 2 onward.
fn parse_firmware(frame: &[u8]) -> Result<(u8, String)> {
    if frame.len() < 3 {
        return Err(Error::ShortRead {
            expected: 3,
            actual: frame.len(),
        });
    }
    let battery = frame[0];
    let firmware = String::from_utf8_lossy(&frame[2..])
        .trim_end_matches('\0')
        .to_string();
    Ok((battery, firmware))
}
