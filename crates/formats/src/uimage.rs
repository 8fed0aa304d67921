use std::convert::TryInto;

use log::debug;

use types::PhysAddr;
use vm::memory::GuestMemory;

use crate::{ImageError, LoadedImage};

pub const UIMAGE_MAGIC: u32 = 0x2705_1956;

const HEADER_LEN: usize = 64;

const IH_OS_LINUX: u8 = 5;
const IH_TYPE_KERNEL: u8 = 2;
const IH_COMP_NONE: u8 = 0;

/// The fixed 64-byte U-Boot legacy image header. All multi-byte fields
/// are big-endian on the wire regardless of the target.
#[derive(Debug, Clone, Copy)]
pub struct UImageHeader {
    pub size: u32,
    pub load: u32,
    pub entry: u32,
    pub os: u8,
    pub arch: u8,
    pub image_type: u8,
    pub comp: u8,
}

impl UImageHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.len() < HEADER_LEN {
            return Err(ImageError::Truncated {
                need: HEADER_LEN,
                have: bytes.len(),
            });
        }

        let be32 = |off: usize| u32::from_be_bytes(bytes[off..off + 4].try_into().unwrap());
        if be32(0) != UIMAGE_MAGIC {
            return Err(ImageError::BadMagic);
        }

        Ok(Self {
            size: be32(12),
            load: be32(16),
            entry: be32(20),
            os: bytes[28],
            arch: bytes[29],
            image_type: bytes[30],
            comp: bytes[31],
        })
    }
}

/// Load a U-Boot legacy kernel image at its header-declared load
/// address.
///
/// Only uncompressed kernel payloads are accepted; compressed payloads
/// are rejected rather than silently misloaded. The header's OS field
/// doubles as the "general-purpose OS kernel" marker.
pub fn load(bytes: &[u8], mem: &GuestMemory) -> Result<LoadedImage, ImageError> {
    let header = UImageHeader::parse(bytes)?;

    if header.image_type != IH_TYPE_KERNEL {
        return Err(ImageError::UnsupportedType(header.image_type));
    }
    if header.comp != IH_COMP_NONE {
        return Err(ImageError::UnsupportedCompression(header.comp));
    }

    let data_len = header.size as usize;
    if HEADER_LEN + data_len > bytes.len() {
        return Err(ImageError::Truncated {
            need: HEADER_LEN + data_len,
            have: bytes.len(),
        });
    }
    if header.load as usize + data_len > mem.size() {
        return Err(ImageError::OutOfRange {
            addr: header.load,
            size: data_len,
        });
    }

    debug!(
        "uimage: load=0x{:08x} entry=0x{:08x} size=0x{:x} os={}",
        header.load, header.entry, data_len, header.os
    );
    mem.write_bytes(
        PhysAddr::new(header.load),
        &bytes[HEADER_LEN..HEADER_LEN + data_len],
    );

    Ok(LoadedImage {
        entry: PhysAddr::new(header.entry),
        size: data_len,
        kernel_hint: Some(header.os == IH_OS_LINUX),
    })
}
