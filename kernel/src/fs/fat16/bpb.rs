//! FAT16 BIOS Parameter Block (BPB)
//!
//! The BPB is located in the boot sector (sector 0) and contains
//! essential file system parameters.
//!
//! # Boot Sector Layout (first 62 bytes, little-endian)
//! - Bytes 0-2: Jump instruction
//! - Bytes 3-10: OEM name
//! - Bytes 11-35: BPB (BIOS Parameter Block)
//! - Bytes 36-61: Extended BPB (FAT12/16 specific)

/// Extended boot signature of a FAT12/16 volume
pub const FAT16_SIGNATURE: u8 = 0x29;

pub(super) fn le16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

pub(super) fn le32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

pub(super) fn array<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}

/// Space-padded on-disk text, trimmed.
fn padded_str(bytes: &[u8]) -> &str {
    let len = bytes
        .iter()
        .rposition(|&b| b != b' ' && b != 0)
        .map_or(0, |i| i + 1);
    core::str::from_utf8(&bytes[..len]).unwrap_or("")
}

/// BIOS Parameter Block (common to FAT12/16/32), including the jump
/// instruction and OEM name that precede it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiosParameterBlock {
    pub jump: [u8; 3],
    pub oem_name: [u8; 8],
    /// Bytes per sector (usually 512)
    pub bytes_per_sector: u16,
    /// Sectors per cluster (power of 2: 1, 2, 4, ... 128)
    pub sectors_per_cluster: u8,
    /// Reserved sectors (including boot sector)
    pub reserved_sectors: u16,
    /// Number of FATs (usually 2)
    pub fat_copies: u8,
    /// Root directory entries
    pub root_dir_entries: u16,
    /// Total sectors (16-bit, 0 when `total_sectors_32` is used)
    pub total_sectors_16: u16,
    /// Media type (0xF8 for fixed disk)
    pub media_type: u8,
    pub sectors_per_fat: u16,
    pub sectors_per_track: u16,
    pub num_heads: u16,
    pub hidden_sectors: u32,
    /// Total sectors (32-bit)
    pub total_sectors_32: u32,
}

impl BiosParameterBlock {
    /// Encoded size in bytes
    pub const SIZE: usize = 36;

    pub fn parse(bytes: &[u8; Self::SIZE]) -> Self {
        Self {
            jump: array(bytes, 0),
            oem_name: array(bytes, 3),
            bytes_per_sector: le16(bytes, 11),
            sectors_per_cluster: bytes[13],
            reserved_sectors: le16(bytes, 14),
            fat_copies: bytes[16],
            root_dir_entries: le16(bytes, 17),
            total_sectors_16: le16(bytes, 19),
            media_type: bytes[21],
            sectors_per_fat: le16(bytes, 22),
            sectors_per_track: le16(bytes, 24),
            num_heads: le16(bytes, 26),
            hidden_sectors: le32(bytes, 28),
            total_sectors_32: le32(bytes, 32),
        }
    }

    /// Total sector count, whichever field carries it.
    pub fn total_sectors(&self) -> u32 {
        if self.total_sectors_16 != 0 {
            self.total_sectors_16 as u32
        } else {
            self.total_sectors_32
        }
    }

    /// Cluster size in bytes
    pub fn cluster_size(&self) -> u32 {
        self.bytes_per_sector as u32 * self.sectors_per_cluster as u32
    }

    pub fn oem_name_str(&self) -> &str {
        padded_str(&self.oem_name)
    }
}

/// Extended BPB of a FAT12/16 volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtendedBpb {
    pub drive_number: u8,
    /// Windows NT flags
    pub nt_flags: u8,
    /// Extended boot signature (0x29)
    pub signature: u8,
    pub volume_id: u32,
    pub volume_label: [u8; 11],
    /// File system type string ("FAT16   ")
    pub fs_type: [u8; 8],
}

impl ExtendedBpb {
    /// Encoded size in bytes
    pub const SIZE: usize = 26;

    pub fn parse(bytes: &[u8; Self::SIZE]) -> Self {
        Self {
            drive_number: bytes[0],
            nt_flags: bytes[1],
            signature: bytes[2],
            volume_id: le32(bytes, 3),
            volume_label: array(bytes, 7),
            fs_type: array(bytes, 18),
        }
    }

    pub fn volume_label_str(&self) -> &str {
        padded_str(&self.volume_label)
    }

    pub fn fs_type_str(&self) -> &str {
        padded_str(&self.fs_type)
    }
}

/// Primary and extended header of a FAT16 volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fat16Header {
    pub bpb: BiosParameterBlock,
    pub extended: ExtendedBpb,
}

impl Fat16Header {
    /// Encoded size in bytes
    pub const SIZE: usize = BiosParameterBlock::SIZE + ExtendedBpb::SIZE;

    pub fn parse(bytes: &[u8; Self::SIZE]) -> Self {
        Self {
            bpb: BiosParameterBlock::parse(&array(bytes, 0)),
            extended: ExtendedBpb::parse(&array(bytes, BiosParameterBlock::SIZE)),
        }
    }

    /// Whether the extended boot signature marks a FAT12/16 volume.
    pub fn has_valid_signature(&self) -> bool {
        self.extended.signature == FAT16_SIGNATURE
    }

    /// First sector of the first FAT
    pub fn fat_start_sector(&self) -> u32 {
        self.bpb.reserved_sectors as u32
    }

    /// First sector of the root directory region
    pub fn root_dir_start_sector(&self) -> u32 {
        self.bpb.reserved_sectors as u32
            + self.bpb.fat_copies as u32 * self.bpb.sectors_per_fat as u32
    }

    /// Root directory size in bytes
    pub fn root_dir_bytes(&self) -> u32 {
        self.bpb.root_dir_entries as u32 * super::dir::DIR_ENTRY_SIZE as u32
    }

    /// Root directory size in sectors, rounded up.
    pub fn root_dir_sectors(&self) -> u32 {
        let sector_size = (self.bpb.bytes_per_sector as u32).max(1);
        self.root_dir_bytes().div_ceil(sector_size)
    }

    /// One past the last root directory sector. The data region (cluster 2)
    /// starts here.
    pub fn root_dir_end_sector(&self) -> u32 {
        self.root_dir_start_sector() + self.root_dir_sectors()
    }
}
