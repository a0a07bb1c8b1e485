//! Non-volatile byte storage trait.
//!
//! Models an EEPROM-style region: a fixed number of addressable bytes that
//! survive a reboot. Writes may be buffered by the implementation and only
//! reach the medium on [`ByteStorage::commit`].
//!
//! Untouched storage reads as whatever the medium's erased state is
//! (`0xFF` for flash, `0x00` for some EEPROMs); callers must not assume
//! either.

/// Byte-addressable persistent storage.
///
/// # Implementation Notes
///
/// - `read` and `write` take absolute offsets into the region
/// - Out-of-range accesses must return an error, never wrap or truncate
/// - `commit` flushes buffered writes; implementations that write through
///   can return `Ok(())`
pub trait ByteStorage {
    /// Error type for storage operations.
    type Error: core::fmt::Debug;

    /// Total number of addressable bytes.
    fn capacity(&self) -> usize;

    /// Fill `buf` from the region starting at `offset`.
    fn read(&mut self, offset: usize, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `data` into the region starting at `offset`.
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush pending writes to the medium.
    fn commit(&mut self) -> Result<(), Self::Error>;
}
