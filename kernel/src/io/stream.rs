//! Disk Streams
//!
//! A [`DiskStream`] turns a sector-addressed device into a byte-addressed
//! reader with a cursor. Drivers keep one stream per access pattern so the
//! cursors never disturb each other.
//!
//! Reads are served a sector at a time into a scratch buffer; only the
//! requested bytes are copied to the caller. Nothing is cached between
//! calls.

use alloc::sync::Arc;
use alloc::vec::Vec;

use super::block::BlockDevice;
use crate::fs::vfs::{FsResult, FsStatus};

/// Byte cursor over a block device.
pub struct DiskStream {
    device: Arc<dyn BlockDevice>,
    sector_size: usize,
    pos: u64,
}

impl DiskStream {
    /// Create a stream positioned at byte 0 of `device`.
    pub fn new(device: Arc<dyn BlockDevice>) -> Self {
        let sector_size = device.sector_size();
        Self {
            device,
            sector_size,
            pos: 0,
        }
    }

    /// Move the cursor to absolute byte offset `pos`. Never fails.
    pub fn seek(&mut self, pos: u64) {
        self.pos = pos;
    }

    /// Fill `out` with the bytes at the cursor and advance past them.
    ///
    /// A read may span any number of sectors. If the device fails the
    /// cursor is left wherever the last complete sector left it.
    pub fn read(&mut self, out: &mut [u8]) -> FsResult<()> {
        if out.is_empty() {
            return Ok(());
        }

        let sector_size = self.sector_size;
        let mut scratch = Vec::new();
        scratch
            .try_reserve_exact(sector_size)
            .map_err(|_| FsStatus::OutOfMemory)?;
        scratch.resize(sector_size, 0);

        let mut done = 0;
        while done < out.len() {
            let lba = self.pos / sector_size as u64;
            let offset = (self.pos % sector_size as u64) as usize;

            self.device.read_sectors(lba, 1, &mut scratch)?;

            let chunk = (sector_size - offset).min(out.len() - done);
            out[done..done + chunk].copy_from_slice(&scratch[offset..offset + chunk]);
            done += chunk;
            self.pos += chunk as u64;
        }

        Ok(())
    }

    /// Read a little-endian `u16` at the cursor.
    pub fn read_u16(&mut self) -> FsResult<u16> {
        let mut bytes = [0u8; 2];
        self.read(&mut bytes)?;
        Ok(u16::from_le_bytes(bytes))
    }
}
