//! RAM Disk Driver
//!
//! Provides an in-memory block device. Used to mount disk images that were
//! loaded by the bootloader, and by the test suite to mount hand-built or
//! `fatfs`-formatted FAT16 images.
//!
//! # Features
//! - Arbitrary sector size (512 by default)
//! - Read-only: the image is never modified once wrapped
//! - No persistence

use alloc::vec::Vec;

use super::block::{BlockDevice, BlockStatus, SECTOR_SIZE};

/// An in-memory block device over a byte image.
#[derive(Debug, Clone)]
pub struct RamDisk {
    data: Vec<u8>,
    sector_size: usize,
}

impl RamDisk {
    /// Create a zero-filled RAM disk of `sector_count` 512-byte sectors.
    pub fn new(sector_count: usize) -> Self {
        Self {
            data: alloc::vec![0u8; sector_count * SECTOR_SIZE],
            sector_size: SECTOR_SIZE,
        }
    }

    /// Wrap an existing image with 512-byte sectors.
    pub fn from_image(image: Vec<u8>) -> Self {
        Self::with_sector_size(image, SECTOR_SIZE)
    }

    /// Wrap an existing image with a custom sector size.
    ///
    /// Trailing bytes that do not fill a whole sector are unreachable.
    pub fn with_sector_size(image: Vec<u8>, sector_size: usize) -> Self {
        Self {
            data: image,
            sector_size: sector_size.max(1),
        }
    }

    /// Number of whole sectors on the disk.
    pub fn sector_count(&self) -> u64 {
        (self.data.len() / self.sector_size) as u64
    }
}

impl BlockDevice for RamDisk {
    fn sector_size(&self) -> usize {
        self.sector_size
    }

    fn read_sectors(&self, lba: u64, count: u32, buf: &mut [u8]) -> Result<(), BlockStatus> {
        let end_lba = lba
            .checked_add(count as u64)
            .ok_or(BlockStatus::InvalidParameter)?;
        if end_lba > self.sector_count() {
            return Err(BlockStatus::InvalidParameter);
        }

        let len = count as usize * self.sector_size;
        if buf.len() < len {
            return Err(BlockStatus::InvalidParameter);
        }

        let offset = lba as usize * self.sector_size;
        buf[..len].copy_from_slice(&self.data[offset..offset + len]);
        Ok(())
    }
}
