//! Persisted network configuration record.
//!
//! The record lives at the start of a small non-volatile region and uses a
//! fixed layout:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 2 | marker, both bytes [`RECORD_MARKER`] |
//! | 2 | 4 | local address octets |
//! | 6 | 4 | netmask octets |
//! | 10 | 4 | gateway octets |
//! | 14 | n+1 | SSID bytes, then `0x00` |
//! | 15+n | m+1 | password bytes, then `0x00` |
//!
//! The marker only distinguishes a written record from erased or foreign
//! bytes. It is not a checksum.
//!
//! # Example
//!
//! ```rust
//! use core::net::Ipv4Addr;
//! use touch_relay::config::NetworkConfig;
//! use touch_relay::hal::MockStorage;
//! use touch_relay::storage::ConfigStore;
//!
//! let mut store = ConfigStore::new(MockStorage::erased(64));
//! assert!(store.load().is_none());
//!
//! let cfg = NetworkConfig::new("workshop", "hunter22")
//!     .unwrap()
//!     .with_address(Ipv4Addr::new(192, 168, 1, 50));
//! store.save(&cfg).unwrap();
//! assert_eq!(store.load(), Some(cfg));
//! ```

use core::net::Ipv4Addr;

use log::{debug, info, warn};

use crate::config::{bounded_string, NetworkConfig};
use crate::error::{RecordError, StorageError};
use crate::traits::ByteStorage;

/// Value of both marker bytes in a valid record.
pub const RECORD_MARKER: u8 = 0b1010_0101;

/// Bytes reserved for the record.
pub const CONFIG_REGION_SIZE: usize = 64;

/// Size of the fixed part: marker plus three addresses.
pub const HEADER_LEN: usize = 2 + 3 * 4;

const TERMINATOR: u8 = 0;

// ============================================================================
// Encode / Decode
// ============================================================================

/// Number of bytes `config` occupies once encoded.
pub fn encoded_len(config: &NetworkConfig) -> usize {
    HEADER_LEN + config.ssid.len() + 1 + config.password.len() + 1
}

/// Encode `config` into the front of `buf`.
///
/// Returns the number of bytes written. Fails without touching `buf` if the
/// record does not fit or a string field holds a `0x00` byte.
pub fn encode(config: &NetworkConfig, buf: &mut [u8]) -> Result<usize, StorageError> {
    if config.ssid.as_bytes().contains(&TERMINATOR)
        || config.password.as_bytes().contains(&TERMINATOR)
    {
        return Err(StorageError::EmbeddedNul);
    }

    let needed = encoded_len(config);
    if needed > buf.len() {
        return Err(StorageError::OutOfSpace {
            needed,
            capacity: buf.len(),
        });
    }

    buf[0] = RECORD_MARKER;
    buf[1] = RECORD_MARKER;
    buf[2..6].copy_from_slice(&config.address.octets());
    buf[6..10].copy_from_slice(&config.netmask.octets());
    buf[10..14].copy_from_slice(&config.gateway.octets());

    let mut pos = HEADER_LEN;
    for field in [config.ssid.as_bytes(), config.password.as_bytes()] {
        buf[pos..pos + field.len()].copy_from_slice(field);
        pos += field.len();
        buf[pos] = TERMINATOR;
        pos += 1;
    }
    Ok(pos)
}

/// Decode a record from the front of `buf`.
pub fn decode(buf: &[u8]) -> Result<NetworkConfig, RecordError> {
    if buf.len() < HEADER_LEN || buf[0] != RECORD_MARKER || buf[1] != RECORD_MARKER {
        return Err(RecordError::InvalidMarker);
    }

    let address = read_address(&buf[2..6]);
    let netmask = read_address(&buf[6..10]);
    let gateway = read_address(&buf[10..14]);

    let (ssid, rest) = read_terminated(&buf[HEADER_LEN..])?;
    let (password, _) = read_terminated(rest)?;

    Ok(NetworkConfig {
        ssid: bounded_string(ssid).ok_or(RecordError::FieldTooLong)?,
        password: bounded_string(password).ok_or(RecordError::FieldTooLong)?,
        address,
        netmask,
        gateway,
    })
}

fn read_address(octets: &[u8]) -> Ipv4Addr {
    Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3])
}

/// Split off one `0x00`-terminated string; returns it and the bytes after
/// its terminator.
fn read_terminated(buf: &[u8]) -> Result<(&str, &[u8]), RecordError> {
    let end = buf
        .iter()
        .position(|b| *b == TERMINATOR)
        .ok_or(RecordError::MissingTerminator)?;
    let text = core::str::from_utf8(&buf[..end]).map_err(|_| RecordError::InvalidUtf8)?;
    Ok((text, &buf[end + 1..]))
}

// ============================================================================
// Config Store
// ============================================================================

/// Where the boot configuration came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigSource {
    /// A valid record was read from storage.
    Stored,
    /// No valid record; the fallback identity is in use.
    Fallback,
}

/// Reads and writes the [`NetworkConfig`] record in a [`ByteStorage`] region.
pub struct ConfigStore<S: ByteStorage> {
    storage: S,
    region_len: usize,
}

impl<S: ByteStorage> ConfigStore<S> {
    /// Use the first [`CONFIG_REGION_SIZE`] bytes of `storage` (or all of it,
    /// if smaller).
    pub fn new(storage: S) -> Self {
        let region_len = storage.capacity().min(CONFIG_REGION_SIZE);
        Self {
            storage,
            region_len,
        }
    }

    /// Size of the region the record must fit in.
    pub fn region_len(&self) -> usize {
        self.region_len
    }

    /// Persist `config`.
    ///
    /// The record is fully encoded before anything is written, so a config
    /// that does not fit leaves storage untouched.
    pub fn save(&mut self, config: &NetworkConfig) -> Result<(), StorageError> {
        let mut buf = [0u8; CONFIG_REGION_SIZE];
        let len = encode(config, &mut buf[..self.region_len])?;

        self.storage.write(0, &buf[..len]).map_err(|e| {
            warn!("config write failed: {:?}", e);
            StorageError::Backend
        })?;
        self.storage.commit().map_err(|e| {
            warn!("config commit failed: {:?}", e);
            StorageError::Backend
        })?;

        info!("config saved ({} bytes, ssid '{}')", len, config.ssid);
        Ok(())
    }

    /// Read the stored config, or `None` if there is no valid record.
    pub fn load(&mut self) -> Option<NetworkConfig> {
        let mut buf = [0u8; CONFIG_REGION_SIZE];
        let region = &mut buf[..self.region_len];
        if let Err(e) = self.storage.read(0, region) {
            warn!("config read failed: {:?}", e);
            return None;
        }

        match decode(region) {
            Ok(config) => Some(config),
            Err(e) => {
                debug!("no stored config: {}", e);
                None
            }
        }
    }

    /// Read the stored config, falling back to
    /// [`NetworkConfig::fallback`] when there is none.
    pub fn load_or_fallback(&mut self) -> (NetworkConfig, ConfigSource) {
        match self.load() {
            Some(config) => (config, ConfigSource::Stored),
            None => {
                info!("no valid config record, using fallback identity");
                (NetworkConfig::fallback(), ConfigSource::Fallback)
            }
        }
    }

    /// Access the underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Give the underlying storage back.
    pub fn into_inner(self) -> S {
        self.storage
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::MockStorage;

    fn sample() -> NetworkConfig {
        NetworkConfig::new("ssid", "pw")
            .unwrap()
            .with_address(Ipv4Addr::new(192, 168, 0, 10))
            .with_netmask(Ipv4Addr::new(255, 255, 255, 0))
            .with_gateway(Ipv4Addr::new(192, 168, 0, 1))
    }

    #[test]
    fn layout_matches_offsets() {
        let mut buf = [0xFFu8; CONFIG_REGION_SIZE];
        let len = encode(&sample(), &mut buf).unwrap();

        assert_eq!(len, 14 + 5 + 3);
        assert_eq!(&buf[0..2], &[0xA5, 0xA5]);
        assert_eq!(&buf[2..6], &[192, 168, 0, 10]);
        assert_eq!(&buf[6..10], &[255, 255, 255, 0]);
        assert_eq!(&buf[10..14], &[192, 168, 0, 1]);
        assert_eq!(&buf[14..19], b"ssid\0");
        assert_eq!(&buf[19..22], b"pw\0");
        // Untouched after the record
        assert_eq!(buf[22], 0xFF);
    }

    #[test]
    fn empty_strings_encode_as_bare_terminators() {
        let cfg = NetworkConfig::new("", "").unwrap();
        let mut buf = [0u8; CONFIG_REGION_SIZE];
        assert_eq!(encode(&cfg, &mut buf).unwrap(), HEADER_LEN + 2);
        assert_eq!(decode(&buf).unwrap(), cfg);
    }

    #[test]
    fn encode_rejects_oversized_record() {
        // 14 + 33 + 18 = 65 bytes
        let cfg = NetworkConfig::new(&"s".repeat(32), &"p".repeat(17)).unwrap();
        let mut buf = [0xEEu8; CONFIG_REGION_SIZE];
        assert_eq!(
            encode(&cfg, &mut buf),
            Err(StorageError::OutOfSpace {
                needed: 65,
                capacity: 64
            })
        );
        assert!(buf.iter().all(|b| *b == 0xEE));
    }

    #[test]
    fn encode_rejects_embedded_nul() {
        let mut cfg = sample();
        cfg.ssid = bounded_string("lab\0x").unwrap();
        let mut buf = [0xEEu8; CONFIG_REGION_SIZE];
        assert_eq!(encode(&cfg, &mut buf), Err(StorageError::EmbeddedNul));
        assert!(buf.iter().all(|b| *b == 0xEE));

        let mut cfg = sample();
        cfg.password = bounded_string("p\0w").unwrap();
        assert_eq!(encode(&cfg, &mut buf), Err(StorageError::EmbeddedNul));
    }

    #[test]
    fn encode_exact_fit() {
        // 14 + 33 + 17 = 64 bytes
        let cfg = NetworkConfig::new(&"s".repeat(32), &"p".repeat(16)).unwrap();
        let mut buf = [0u8; CONFIG_REGION_SIZE];
        assert_eq!(encode(&cfg, &mut buf), Ok(64));
        assert_eq!(decode(&buf).unwrap(), cfg);
    }

    #[test]
    fn decode_requires_both_marker_bytes() {
        let mut buf = [0u8; CONFIG_REGION_SIZE];
        encode(&sample(), &mut buf).unwrap();

        let mut bad = buf;
        bad[0] = 0xFF;
        assert_eq!(decode(&bad), Err(RecordError::InvalidMarker));

        let mut bad = buf;
        bad[1] = 0x00;
        assert_eq!(decode(&bad), Err(RecordError::InvalidMarker));
    }

    #[test]
    fn decode_erased_patterns() {
        assert_eq!(decode(&[0xFF; 64]), Err(RecordError::InvalidMarker));
        assert_eq!(decode(&[0x00; 64]), Err(RecordError::InvalidMarker));
        assert_eq!(decode(&[]), Err(RecordError::InvalidMarker));
    }

    #[test]
    fn decode_missing_terminator() {
        let mut buf = [b'x'; CONFIG_REGION_SIZE];
        buf[0] = RECORD_MARKER;
        buf[1] = RECORD_MARKER;
        assert_eq!(decode(&buf), Err(RecordError::MissingTerminator));

        // SSID terminated, password runs off the end
        buf[20] = 0;
        assert_eq!(decode(&buf), Err(RecordError::MissingTerminator));
    }

    #[test]
    fn decode_invalid_utf8() {
        let mut buf = [0u8; CONFIG_REGION_SIZE];
        encode(&sample(), &mut buf).unwrap();
        buf[14] = 0xC3; // lead byte with no continuation
        buf[15] = b'x';
        assert_eq!(decode(&buf), Err(RecordError::InvalidUtf8));
    }

    #[test]
    fn decode_field_too_long() {
        let mut buf = [b's'; CONFIG_REGION_SIZE];
        buf[0] = RECORD_MARKER;
        buf[1] = RECORD_MARKER;
        // 40-byte SSID, longer than MAX_SSID_LEN
        buf[54] = 0;
        buf[55] = 0;
        assert_eq!(decode(&buf), Err(RecordError::FieldTooLong));
    }

    // =========================================================================
    // ConfigStore Tests
    // =========================================================================

    #[test]
    fn store_round_trip() {
        let mut store = ConfigStore::new(MockStorage::erased(CONFIG_REGION_SIZE));
        store.save(&sample()).unwrap();
        assert_eq!(store.load(), Some(sample()));
        assert_eq!(store.storage().commits, 1);
    }

    #[test]
    fn store_erased_is_absent() {
        let mut store = ConfigStore::new(MockStorage::erased(CONFIG_REGION_SIZE));
        assert!(store.load().is_none());
        let (cfg, source) = store.load_or_fallback();
        assert_eq!(source, ConfigSource::Fallback);
        assert_eq!(cfg, NetworkConfig::fallback());
    }

    #[test]
    fn store_load_or_fallback_prefers_record() {
        let mut store = ConfigStore::new(MockStorage::erased(CONFIG_REGION_SIZE));
        store.save(&sample()).unwrap();
        assert_eq!(store.load_or_fallback(), (sample(), ConfigSource::Stored));
    }

    #[test]
    fn store_out_of_space_writes_nothing() {
        let mut store = ConfigStore::new(MockStorage::erased(CONFIG_REGION_SIZE));
        let cfg = NetworkConfig::new(&"s".repeat(32), &"p".repeat(40)).unwrap();
        assert!(matches!(
            store.save(&cfg),
            Err(StorageError::OutOfSpace { .. })
        ));
        assert_eq!(store.storage().writes, 0);
        assert!(store.load().is_none());
    }

    #[test]
    fn store_embedded_nul_writes_nothing() {
        let mut store = ConfigStore::new(MockStorage::erased(CONFIG_REGION_SIZE));
        store.save(&sample()).unwrap();

        let mut cfg = sample();
        cfg.ssid = bounded_string("lab\0x").unwrap();
        assert_eq!(store.save(&cfg), Err(StorageError::EmbeddedNul));
        assert_eq!(store.storage().writes, 1);
        assert_eq!(store.load(), Some(sample()));
    }

    #[test]
    fn store_uses_smaller_region() {
        let mut store = ConfigStore::new(MockStorage::erased(20));
        assert_eq!(store.region_len(), 20);
        assert!(store.save(&sample()).is_err());

        let short = NetworkConfig::new("ab", "c").unwrap();
        store.save(&short).unwrap();
        assert_eq!(store.load(), Some(short));
    }

    #[test]
    fn store_large_medium_uses_first_64_bytes() {
        let mut store = ConfigStore::new(MockStorage::erased(512));
        assert_eq!(store.region_len(), CONFIG_REGION_SIZE);
        store.save(&sample()).unwrap();
        assert_eq!(store.load(), Some(sample()));
    }

    #[test]
    fn store_backend_failures() {
        let mut store = ConfigStore::new(MockStorage::erased(CONFIG_REGION_SIZE).failing());
        assert_eq!(store.save(&sample()), Err(StorageError::Backend));
        assert!(store.load().is_none());
    }
}
