use goblin::elf::header::EM_ARM;
use goblin::elf::program_header::PT_LOAD;
use goblin::elf::Elf;
use log::debug;

use types::PhysAddr;
use vm::memory::GuestMemory;

use crate::{ImageError, LoadedImage};

/// Load an ARM ELF executable into guest memory at its physical load
/// addresses.
///
/// Every `PT_LOAD` segment is copied to `p_paddr`; the `p_memsz` tail
/// beyond `p_filesz` is zeroed explicitly so a reload over a warm
/// machine never keeps stale bytes. The entry point comes straight from
/// the ELF header; whether the image is an OS kernel is left to the
/// caller (`kernel_hint = None`).
pub fn load(bytes: &[u8], mem: &GuestMemory) -> Result<LoadedImage, ImageError> {
    let elf = Elf::parse(bytes)?;

    if elf.header.e_machine != EM_ARM {
        return Err(ImageError::WrongMachine(elf.header.e_machine));
    }
    if elf.little_endian != mem.order().is_little() {
        return Err(ImageError::WrongEndian);
    }

    let mut low = u64::MAX;
    let mut high = 0u64;
    for ph in elf.program_headers.iter() {
        if ph.p_type != PT_LOAD || ph.p_memsz == 0 {
            continue;
        }

        let dest = ph.p_paddr;
        let file_off = ph.p_offset as usize;
        let file_len = ph.p_filesz as usize;
        let mem_len = ph.p_memsz as usize;

        if dest + ph.p_memsz > mem.size() as u64 {
            return Err(ImageError::OutOfRange {
                addr: dest as u32,
                size: mem_len,
            });
        }
        if file_off + file_len > bytes.len() {
            return Err(ImageError::Truncated {
                need: file_off + file_len,
                have: bytes.len(),
            });
        }

        debug!(
            "elf segment: paddr=0x{:08x} filesz=0x{:x} memsz=0x{:x}",
            dest, file_len, mem_len
        );
        mem.write_bytes(PhysAddr::new(dest as u32), &bytes[file_off..file_off + file_len]);
        if mem_len > file_len {
            mem.write_bytes(
                PhysAddr::new((dest as usize + file_len) as u32),
                &vec![0u8; mem_len - file_len],
            );
        }

        low = low.min(dest);
        high = high.max(dest + ph.p_memsz);
    }

    if high == 0 {
        return Err(ImageError::NoLoadableSegments);
    }

    Ok(LoadedImage {
        entry: PhysAddr::new(elf.header.e_entry as u32),
        size: (high - low) as usize,
        kernel_hint: None,
    })
}
