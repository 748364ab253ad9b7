//! Disk Objects
//!
//! A [`Disk`] pairs a block device with the filesystem volume that claimed
//! it. The filesystem registry binds the volume once, at attach time; after
//! that the disk is only ever read from.
//!
//! # Device Naming
//! Disks are numbered in attach order. Disk `N` is addressed by paths of
//! the form `N:/...`.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;

use super::block::BlockDevice;
use crate::fs::vfs::Volume;

/// Disk number, equal to the drive digit of a path.
pub type DiskId = usize;

/// A physical or RAM disk and the volume mounted on it.
pub struct Disk {
    id: DiskId,
    sector_size: usize,
    device: Arc<dyn BlockDevice>,
    volume: Option<Box<dyn Volume>>,
}

impl Disk {
    pub fn new(id: DiskId, device: Arc<dyn BlockDevice>) -> Self {
        Self {
            id,
            sector_size: device.sector_size(),
            device,
            volume: None,
        }
    }

    pub fn id(&self) -> DiskId {
        self.id
    }

    /// Bytes per sector of the underlying device.
    pub fn sector_size(&self) -> usize {
        self.sector_size
    }

    pub fn device(&self) -> &Arc<dyn BlockDevice> {
        &self.device
    }

    pub(crate) fn bind(&mut self, volume: Box<dyn Volume>) {
        self.volume = Some(volume);
    }

    /// The volume bound to this disk, if any driver claimed it.
    pub fn volume(&self) -> Option<&dyn Volume> {
        self.volume.as_deref()
    }

    /// Name of the filesystem bound to this disk.
    pub fn filesystem_name(&self) -> Option<&str> {
        self.volume.as_ref().map(|v| v.filesystem_name())
    }
}

impl fmt::Debug for Disk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disk")
            .field("id", &self.id)
            .field("sector_size", &self.sector_size)
            .field("filesystem", &self.filesystem_name())
            .finish()
    }
}
