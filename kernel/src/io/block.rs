//! Block Device Abstraction Layer
//!
//! Provides a unified interface for sector-addressed devices. Everything
//! above this layer (disks, byte streams, filesystem drivers) only ever
//! talks to a device through [`BlockDevice`].
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    File System Layer                         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Disk / DiskStream (byte addressing)             │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Block Device Abstraction                      │
//! │        read_sectors(lba, count, buf)  sector_size()          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┴───────────────────┐
//!          ▼                                       ▼
//! ┌─────────────────┐                     ┌─────────────────┐
//! │    ATA/PIO      │                     │     RAM disk     │
//! └─────────────────┘                     └─────────────────┘
//! ```

/// Default sector size
pub const SECTOR_SIZE: usize = 512;

/// Block device status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BlockStatus {
    /// Device not found
    NotFound = 1,
    /// I/O error
    IoError = 2,
    /// Invalid parameter (out-of-range LBA, short buffer)
    InvalidParameter = 3,
    /// Device busy
    Busy = 4,
    /// Media not present
    NoMedia = 5,
    /// Timeout
    Timeout = 7,
    /// Not ready
    NotReady = 8,
    /// Bad sector
    BadSector = 9,
}

impl core::fmt::Display for BlockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            BlockStatus::NotFound => "device not found",
            BlockStatus::IoError => "device i/o error",
            BlockStatus::InvalidParameter => "invalid parameter",
            BlockStatus::Busy => "device busy",
            BlockStatus::NoMedia => "no media",
            BlockStatus::Timeout => "timeout",
            BlockStatus::NotReady => "device not ready",
            BlockStatus::BadSector => "bad sector",
        };
        f.write_str(text)
    }
}

/// A sector-addressed device.
///
/// Reads take `&self` so one device can back several independent byte
/// streams at once; implementations serialize internally if the hardware
/// needs it.
pub trait BlockDevice: Send + Sync {
    /// Bytes per sector. Constant for the lifetime of the device.
    fn sector_size(&self) -> usize;

    /// Read `count` sectors starting at `lba` into `buf`.
    ///
    /// `buf` must hold at least `count * sector_size()` bytes.
    fn read_sectors(&self, lba: u64, count: u32, buf: &mut [u8]) -> Result<(), BlockStatus>;
}
