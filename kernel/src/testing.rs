//! Hand-built FAT16 images for unit tests.
//!
//! The builder lays a volume out the way a formatter would (boot sector,
//! two FAT copies, fixed root directory, data region) but lets tests
//! choose cluster placement, inject raw directory records and corrupt FAT
//! entries.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::fs::fat16::{Fat16Private, FAT16_SIGNATURE};
use crate::io::{RamDisk, SECTOR_SIZE};

const RESERVED_SECTORS: usize = 1;
const FAT_COPIES: usize = 2;

/// Directory a new record goes into.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Parent {
    Root,
    /// Subdirectory, by first cluster
    Cluster(u16),
}

/// Encode one 32-byte directory record.
pub(crate) fn raw_entry(name: &[u8; 8], ext: &[u8; 3], attr: u8, cluster: u16, size: u32) -> [u8; 32] {
    let mut raw = [0u8; 32];
    raw[..8].copy_from_slice(name);
    raw[8..11].copy_from_slice(ext);
    raw[11] = attr;
    raw[26..28].copy_from_slice(&cluster.to_le_bytes());
    raw[28..32].copy_from_slice(&size.to_le_bytes());
    raw
}

pub(crate) struct ImageBuilder {
    sectors_per_cluster: u8,
    root_dir_entries: u16,
    signature: u8,
    data_clusters: u16,
    root: Vec<[u8; 32]>,
    dirs: BTreeMap<u16, Vec<[u8; 32]>>,
    dir_chains: BTreeMap<u16, Vec<u16>>,
    fat: BTreeMap<u16, u16>,
    data: BTreeMap<u16, Vec<u8>>,
    used: BTreeSet<u16>,
}

impl ImageBuilder {
    pub(crate) fn new() -> Self {
        Self {
            sectors_per_cluster: 1,
            root_dir_entries: 16,
            signature: FAT16_SIGNATURE,
            data_clusters: 64,
            root: Vec::new(),
            dirs: BTreeMap::new(),
            dir_chains: BTreeMap::new(),
            fat: BTreeMap::new(),
            data: BTreeMap::new(),
            used: BTreeSet::new(),
        }
    }

    pub(crate) fn sectors_per_cluster(mut self, spc: u8) -> Self {
        self.sectors_per_cluster = spc;
        self
    }

    pub(crate) fn root_dir_entries(mut self, entries: u16) -> Self {
        self.root_dir_entries = entries;
        self
    }

    pub(crate) fn signature(mut self, signature: u8) -> Self {
        self.signature = signature;
        self
    }

    fn layout_spc(&self) -> usize {
        self.sectors_per_cluster.max(1) as usize
    }

    fn cluster_bytes(&self) -> usize {
        SECTOR_SIZE * self.layout_spc()
    }

    fn alloc_chain(&mut self, clusters: usize) -> Vec<u16> {
        let mut chain = Vec::new();
        let mut candidate = 2u16;
        while chain.len() < clusters {
            if !self.used.contains(&candidate) {
                chain.push(candidate);
            }
            candidate += 1;
        }
        chain
    }

    fn link_chain(&mut self, chain: &[u16]) {
        for pair in chain.windows(2) {
            self.fat.insert(pair[0], pair[1]);
        }
        if let Some(&last) = chain.last() {
            self.fat.insert(last, 0xFFFF);
        }
        self.used.extend(chain.iter().copied());
    }

    fn store(&mut self, chain: &[u16], bytes: &[u8]) {
        let cluster_bytes = self.cluster_bytes();
        for (cluster, chunk) in chain.iter().zip(bytes.chunks(cluster_bytes)) {
            self.data.insert(*cluster, chunk.to_vec());
        }
    }

    pub(crate) fn push_raw(&mut self, parent: Parent, entry: [u8; 32]) {
        match parent {
            Parent::Root => self.root.push(entry),
            Parent::Cluster(cluster) => self
                .dirs
                .get_mut(&cluster)
                .expect("parent directory was not added")
                .push(entry),
        }
    }

    /// Add a file in freshly allocated clusters; returns its first cluster.
    pub(crate) fn add_file(&mut self, parent: Parent, name: &[u8; 8], ext: &[u8; 3], data: &[u8]) -> u16 {
        let clusters = data.len().div_ceil(self.cluster_bytes());
        let chain = self.alloc_chain(clusters);
        self.add_file_with_chain(parent, name, ext, data, &chain)
    }

    /// Add a file stored in exactly the clusters of `chain`, in order.
    pub(crate) fn add_file_with_chain(
        &mut self,
        parent: Parent,
        name: &[u8; 8],
        ext: &[u8; 3],
        data: &[u8],
        chain: &[u16],
    ) -> u16 {
        assert!(chain.len() * self.cluster_bytes() >= data.len());
        self.link_chain(chain);
        self.store(chain, data);
        let first = chain.first().copied().unwrap_or(0);
        self.push_raw(parent, raw_entry(name, ext, 0x20, first, data.len() as u32));
        first
    }

    /// Add a subdirectory of `clusters` clusters with `.` and `..`
    /// records; returns its first cluster.
    pub(crate) fn add_dir(&mut self, parent: Parent, name: &[u8; 8], clusters: usize) -> u16 {
        let chain = self.alloc_chain(clusters.max(1));
        self.link_chain(&chain);
        let first = chain[0];
        let parent_cluster = match parent {
            Parent::Root => 0,
            Parent::Cluster(cluster) => cluster,
        };
        self.dirs.insert(
            first,
            alloc::vec![
                raw_entry(b".       ", b"   ", 0x10, first, 0),
                raw_entry(b"..      ", b"   ", 0x10, parent_cluster, 0),
            ],
        );
        self.dir_chains.insert(first, chain);
        self.push_raw(parent, raw_entry(name, b"   ", 0x10, first, 0));
        first
    }

    /// Overwrite a FAT entry in both copies.
    pub(crate) fn set_fat(&mut self, cluster: u16, value: u16) {
        self.fat.insert(cluster, value);
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let spc = self.layout_spc();
        let max_cluster = self
            .used
            .iter()
            .copied()
            .max()
            .unwrap_or(0)
            .max(self.data_clusters + 1) as usize;
        let fat_sectors = ((max_cluster + 1) * 2).div_ceil(SECTOR_SIZE);
        let root_start = RESERVED_SECTORS + FAT_COPIES * fat_sectors;
        let root_sectors = (self.root_dir_entries as usize * 32).div_ceil(SECTOR_SIZE);
        let data_start = root_start + root_sectors;
        let total_sectors = data_start + (max_cluster - 1) * spc;

        let mut image = alloc::vec![0u8; total_sectors * SECTOR_SIZE];

        // Boot sector
        image[0..3].copy_from_slice(&[0xEB, 0x3C, 0x90]);
        image[3..11].copy_from_slice(b"MSWIN4.1");
        image[11..13].copy_from_slice(&(SECTOR_SIZE as u16).to_le_bytes());
        image[13] = self.sectors_per_cluster;
        image[14..16].copy_from_slice(&(RESERVED_SECTORS as u16).to_le_bytes());
        image[16] = FAT_COPIES as u8;
        image[17..19].copy_from_slice(&self.root_dir_entries.to_le_bytes());
        if total_sectors < 0x10000 {
            image[19..21].copy_from_slice(&(total_sectors as u16).to_le_bytes());
        } else {
            image[32..36].copy_from_slice(&(total_sectors as u32).to_le_bytes());
        }
        image[21] = 0xF8;
        image[22..24].copy_from_slice(&(fat_sectors as u16).to_le_bytes());
        image[24..26].copy_from_slice(&32u16.to_le_bytes());
        image[26..28].copy_from_slice(&64u16.to_le_bytes());
        image[36] = 0x80;
        image[38] = self.signature;
        image[39..43].copy_from_slice(&0x1234_5678u32.to_le_bytes());
        image[43..54].copy_from_slice(b"TESTVOL    ");
        image[54..62].copy_from_slice(b"FAT16   ");
        image[510] = 0x55;
        image[511] = 0xAA;

        // FAT copies
        for copy in 0..FAT_COPIES {
            let base = (RESERVED_SECTORS + copy * fat_sectors) * SECTOR_SIZE;
            image[base..base + 2].copy_from_slice(&0xFFF8u16.to_le_bytes());
            image[base + 2..base + 4].copy_from_slice(&0xFFFFu16.to_le_bytes());
            for (&cluster, &value) in &self.fat {
                let at = base + cluster as usize * 2;
                image[at..at + 2].copy_from_slice(&value.to_le_bytes());
            }
        }

        // Root directory
        assert!(self.root.len() <= self.root_dir_entries as usize, "root directory overflow");
        for (i, entry) in self.root.iter().enumerate() {
            let at = root_start * SECTOR_SIZE + i * 32;
            image[at..at + 32].copy_from_slice(entry);
        }

        let cluster_offset = |cluster: u16| (data_start + (cluster as usize - 2) * spc) * SECTOR_SIZE;
        let per_cluster = self.cluster_bytes() / 32;

        // Subdirectories
        for (first, entries) in &self.dirs {
            let chain = &self.dir_chains[first];
            assert!(entries.len() <= chain.len() * per_cluster, "subdirectory overflow");
            for (i, entry) in entries.iter().enumerate() {
                let at = cluster_offset(chain[i / per_cluster]) + (i % per_cluster) * 32;
                image[at..at + 32].copy_from_slice(entry);
            }
        }

        // File data
        for (&cluster, bytes) in &self.data {
            let at = cluster_offset(cluster);
            image[at..at + bytes.len()].copy_from_slice(bytes);
        }

        image
    }

    /// Build the image and mount it straight into driver state.
    pub(crate) fn mount_private(&self) -> Fat16Private {
        match Fat16Private::mount(Arc::new(RamDisk::from_image(self.build()))) {
            Ok(private) => private,
            Err(status) => panic!("test image failed to mount: {status}"),
        }
    }
}
