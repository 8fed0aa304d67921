use types::PhysAddr;
use vm::memory::GuestMemory;

use crate::{ImageError, LoadedImage};

/// Copy a flat binary to `dest`, refusing anything larger than `limit`
/// bytes. There is no format to inspect, so the entry point is simply
/// `dest` and no kernel hint is produced.
pub fn load(
    bytes: &[u8],
    mem: &GuestMemory,
    dest: PhysAddr,
    limit: usize,
) -> Result<LoadedImage, ImageError> {
    if bytes.len() > limit || dest.as_usize() + bytes.len() > mem.size() {
        return Err(ImageError::OutOfRange {
            addr: dest.as_u32(),
            size: bytes.len(),
        });
    }

    mem.write_bytes(dest, bytes);

    Ok(LoadedImage {
        entry: dest,
        size: bytes.len(),
        kernel_hint: None,
    })
}
