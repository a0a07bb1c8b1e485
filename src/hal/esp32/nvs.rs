//! Config region stored as a single NVS blob.
//!
//! ESP-IDF has no raw EEPROM; NVS key/value storage stands in for it. The
//! whole region is mirrored in RAM and written back as one blob on
//! [`commit`](ByteStorage::commit), which NVS applies atomically.

use crate::traits::ByteStorage;
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
use esp_idf_svc::sys::EspError;
use log::debug;
use thiserror::Error;

/// NVS namespace holding the config blob.
pub const NVS_NAMESPACE: &str = "touch_relay";

/// Key of the config blob.
pub const NVS_KEY: &str = "netcfg";

/// Errors from [`Esp32NvsStorage`].
#[derive(Debug, Error)]
pub enum NvsStorageError {
    /// Access outside the region.
    #[error("access of {len} bytes at offset {offset} is out of range")]
    OutOfRange {
        /// Requested start offset.
        offset: usize,
        /// Requested length.
        len: usize,
    },

    /// The NVS driver reported an error.
    #[error("nvs: {0}")]
    Esp(#[from] EspError),
}

/// EEPROM-style region backed by one NVS blob.
///
/// # Example
///
/// ```ignore
/// use esp_idf_svc::nvs::EspDefaultNvsPartition;
/// use touch_relay::hal::esp32::Esp32NvsStorage;
/// use touch_relay::storage::{ConfigStore, CONFIG_REGION_SIZE};
///
/// let nvs = EspDefaultNvsPartition::take()?;
/// let storage = Esp32NvsStorage::new(nvs, CONFIG_REGION_SIZE)?;
/// let mut store = ConfigStore::new(storage);
/// let (net, source) = store.load_or_fallback();
/// ```
pub struct Esp32NvsStorage {
    nvs: EspNvs<NvsDefault>,
    shadow: Vec<u8>,
}

impl Esp32NvsStorage {
    /// Open the namespace and load the blob into RAM.
    ///
    /// A missing blob reads as erased (`0xFF`). A blob of a different size
    /// is padded or cut to `capacity`.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace cannot be opened or read.
    pub fn new(partition: EspDefaultNvsPartition, capacity: usize) -> Result<Self, EspError> {
        let nvs = EspNvs::new(partition, NVS_NAMESPACE, true)?;
        let mut shadow = vec![0xFF; capacity];

        let mut buf = vec![0u8; capacity];
        match nvs.get_blob(NVS_KEY, &mut buf) {
            Ok(Some(blob)) => {
                let n = blob.len().min(capacity);
                shadow[..n].copy_from_slice(&blob[..n]);
                debug!("nvs: loaded {} byte blob", blob.len());
            }
            Ok(None) => debug!("nvs: no config blob"),
            // ESP_ERR_NVS_INVALID_LENGTH: stored blob larger than the region
            Err(e) => debug!("nvs: unreadable config blob: {}", e),
        }

        Ok(Self { nvs, shadow })
    }

    fn range(&self, offset: usize, len: usize) -> Result<core::ops::Range<usize>, NvsStorageError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.shadow.len() => Ok(offset..end),
            _ => Err(NvsStorageError::OutOfRange { offset, len }),
        }
    }
}

impl ByteStorage for Esp32NvsStorage {
    type Error = NvsStorageError;

    fn capacity(&self) -> usize {
        self.shadow.len()
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), NvsStorageError> {
        let range = self.range(offset, buf.len())?;
        buf.copy_from_slice(&self.shadow[range]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), NvsStorageError> {
        let range = self.range(offset, data.len())?;
        self.shadow[range].copy_from_slice(data);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), NvsStorageError> {
        self.nvs.set_blob(NVS_KEY, &self.shadow)?;
        Ok(())
    }
}
