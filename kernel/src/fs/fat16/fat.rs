//! FAT16 Allocation Table
//!
//! Each FAT16 table entry is a little-endian `u16` indexed by cluster
//! number. A file's data is the chain that starts at the first cluster in
//! its directory entry and follows table entries until an end-of-chain
//! marker. Clusters 0 and 1 never hold data; cluster 2 is the first sector
//! after the root directory.

use super::file::Fat16Private;
use crate::fs::vfs::{FsResult, FsStatus};

/// Bytes per FAT16 table entry
pub const FAT16_ENTRY_SIZE: u32 = 2;

/// Special FAT16 cluster values
pub mod cluster_values {
    /// Free cluster
    pub const FREE: u16 = 0x0000;
    /// Reserved cluster
    pub const RESERVED: u16 = 0x0001;
    /// First cluster number that maps to the data region
    pub const FIRST_DATA: u16 = 0x0002;
    /// Reserved range (minimum)
    pub const RESERVED_MIN: u16 = 0xFFF0;
    /// Reserved range (maximum)
    pub const RESERVED_MAX: u16 = 0xFFF6;
    /// Bad cluster
    pub const BAD: u16 = 0xFFF7;
    /// End of chain (minimum value)
    pub const EOC_MIN: u16 = 0xFFF8;
    /// End of chain (standard value)
    pub const EOC: u16 = 0xFFFF;

    /// Check if cluster is end of chain
    pub fn is_eoc(cluster: u16) -> bool {
        cluster >= EOC_MIN
    }

    pub fn is_bad(cluster: u16) -> bool {
        cluster == BAD
    }

    /// Check if cluster is valid data cluster
    pub fn is_valid(cluster: u16) -> bool {
        (FIRST_DATA..RESERVED_MIN).contains(&cluster)
    }
}

/// Meaning of one FAT entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterLink {
    Free,
    Reserved,
    Bad,
    EndOfChain,
    /// The chain continues at this cluster
    Next(u16),
}

impl ClusterLink {
    pub fn classify(entry: u16) -> Self {
        use cluster_values::*;
        match entry {
            FREE => ClusterLink::Free,
            RESERVED => ClusterLink::Reserved,
            e if is_valid(e) => ClusterLink::Next(e),
            e if is_bad(e) => ClusterLink::Bad,
            e if is_eoc(e) => ClusterLink::EndOfChain,
            _ => ClusterLink::Reserved,
        }
    }
}

impl Fat16Private {
    /// Cluster size in bytes
    pub fn cluster_bytes(&self) -> u32 {
        self.header.bpb.cluster_size()
    }

    /// Number of entries one FAT copy can hold; bounds any chain walk.
    pub(super) fn max_clusters(&self) -> usize {
        self.header.bpb.sectors_per_fat as usize * self.sector_size as usize
            / FAT16_ENTRY_SIZE as usize
    }

    /// First sector of a data cluster.
    pub fn cluster_to_sector(&self, cluster: u16) -> FsResult<u32> {
        let index = cluster
            .checked_sub(cluster_values::FIRST_DATA)
            .ok_or(FsStatus::IoError)?;
        Ok(self.data_start_sector + index as u32 * self.header.bpb.sectors_per_cluster as u32)
    }

    /// Read the table entry for `cluster` from the first FAT copy.
    pub fn get_fat_entry(&mut self, cluster: u16) -> FsResult<u16> {
        let fat_start = self.header.fat_start_sector() as u64 * self.sector_size as u64;
        self.fat_stream
            .seek(fat_start + cluster as u64 * FAT16_ENTRY_SIZE as u64);
        self.fat_stream.read_u16()
    }

    /// Follow one link of a chain.
    ///
    /// Returns `None` at end of chain. A free, reserved or bad link inside
    /// a chain means the table is corrupt.
    pub(super) fn next_cluster(&mut self, cluster: u16) -> FsResult<Option<u16>> {
        let entry = self.get_fat_entry(cluster)?;
        match ClusterLink::classify(entry) {
            ClusterLink::Next(next) => Ok(Some(next)),
            ClusterLink::EndOfChain => Ok(None),
            link => {
                log::warn!("fat16: cluster {} links to {:?} ({:#06x})", cluster, link, entry);
                Err(FsStatus::IoError)
            }
        }
    }

    /// Cluster holding byte `offset` of the chain that starts at `start`.
    pub fn cluster_for_offset(&mut self, start: u16, offset: u32) -> FsResult<u16> {
        if !cluster_values::is_valid(start) {
            log::warn!("fat16: chain starts at invalid cluster {:#06x}", start);
            return Err(FsStatus::IoError);
        }

        let clusters_ahead = offset / self.cluster_bytes();
        let mut cluster = start;
        for _ in 0..clusters_ahead {
            cluster = self.next_cluster(cluster)?.ok_or_else(|| {
                log::warn!("fat16: offset {} is past the end of chain {}", offset, start);
                FsStatus::IoError
            })?;
        }
        Ok(cluster)
    }

    /// Fill `out` from byte `offset` of the chain that starts at `start`.
    ///
    /// Spans as many clusters as needed, following the chain one link per
    /// boundary.
    pub fn read_at(&mut self, start: u16, offset: u32, out: &mut [u8]) -> FsResult<()> {
        if out.is_empty() {
            return Ok(());
        }

        let cluster_bytes = self.cluster_bytes();
        let sector_size = self.sector_size as u64;
        let mut cluster = self.cluster_for_offset(start, offset)?;
        let mut within = offset % cluster_bytes;
        let mut done = 0;

        loop {
            let sector = self.cluster_to_sector(cluster)?;
            let chunk = ((cluster_bytes - within) as usize).min(out.len() - done);
            self.cluster_stream
                .seek(sector as u64 * sector_size + within as u64);
            self.cluster_stream.read(&mut out[done..done + chunk])?;
            done += chunk;

            if done == out.len() {
                return Ok(());
            }

            cluster = self.next_cluster(cluster)?.ok_or(FsStatus::IoError)?;
            within = 0;
        }
    }
}
