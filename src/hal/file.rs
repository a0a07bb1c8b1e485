//! File-backed [`ByteStorage`] for the desktop simulator.
//!
//! The whole region is held in memory. Writes only reach the file on
//! [`commit`](ByteStorage::commit), so a crash between write and commit
//! leaves the previous contents on disk.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use log::debug;

use crate::traits::ByteStorage;

/// A fixed-size region persisted to a single file.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    data: Vec<u8>,
}

impl FileStorage {
    /// Open (or start) a region of `capacity` bytes at `path`.
    ///
    /// A missing file reads as erased flash (`0xFF`). An existing file is
    /// padded or cut to `capacity`.
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut data = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} not found, starting erased", path.display());
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        data.resize(capacity, 0xFF);
        Ok(Self { path, data })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn range(&self, offset: usize, len: usize) -> io::Result<std::ops::Range<usize>> {
        match offset.checked_add(len) {
            Some(end) if end <= self.data.len() => Ok(offset..end),
            _ => Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "{} bytes at offset {} exceed region of {}",
                    len,
                    offset,
                    self.data.len()
                ),
            )),
        }
    }
}

impl ByteStorage for FileStorage {
    type Error = io::Error;

    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn read(&mut self, offset: usize, buf: &mut [u8]) -> io::Result<()> {
        let range = self.range(offset, buf.len())?;
        buf.copy_from_slice(&self.data[range]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> io::Result<()> {
        let range = self.range(offset, data.len())?;
        self.data[range].copy_from_slice(data);
        Ok(())
    }

    fn commit(&mut self) -> io::Result<()> {
        fs::write(&self.path, &self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "touch-relay-{}-{}.bin",
            name,
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn missing_file_reads_erased() {
        let path = scratch("missing");
        let mut mem = FileStorage::open(&path, 8).unwrap();
        let mut buf = [0u8; 8];
        mem.read(0, &mut buf).unwrap();
        assert_eq!(buf, [0xFF; 8]);
        assert!(!path.exists());
    }

    #[test]
    fn commit_persists() {
        let path = scratch("commit");
        let mut mem = FileStorage::open(&path, 8).unwrap();
        mem.write(1, &[1, 2, 3]).unwrap();
        mem.commit().unwrap();

        let mut reopened = FileStorage::open(&path, 8).unwrap();
        let mut buf = [0u8; 5];
        reopened.read(0, &mut buf).unwrap();
        assert_eq!(buf, [0xFF, 1, 2, 3, 0xFF]);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn uncommitted_write_is_lost() {
        let path = scratch("uncommitted");
        let mut mem = FileStorage::open(&path, 4).unwrap();
        mem.write(0, &[7]).unwrap();
        drop(mem);

        let mut reopened = FileStorage::open(&path, 4).unwrap();
        let mut buf = [0u8; 1];
        reopened.read(0, &mut buf).unwrap();
        assert_eq!(buf, [0xFF]);
    }

    #[test]
    fn out_of_range() {
        let path = scratch("range");
        let mut mem = FileStorage::open(&path, 4).unwrap();
        assert!(mem.write(3, &[0, 0]).is_err());
        let mut buf = [0u8; 5];
        assert!(mem.read(0, &mut buf).is_err());
    }
}
