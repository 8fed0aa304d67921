use std::fs;
use std::path::Path;

use log::{debug, info};

use types::{INITRD_LOAD_OFFSET, KERNEL_LOAD_OFFSET};
use vm::memory::GuestMemory;

use crate::config::BootConfig;
use crate::error::BootError;
use crate::smp::SecondaryBoot;
use crate::trampoline::write_trampoline;

/// ELF payloads on this architecture are mostly bare-metal images; only
/// a filename that says so is treated as a general-purpose kernel.
fn elf_kernel_hint(path: &Path) -> bool {
    path.to_string_lossy().contains("vmlinux")
}

/// Load the kernel (and initrd, for OS-style boots) into guest memory
/// and fix `entry`, `is_linux` and `initrd_size` on the config.
///
/// Format detection tries ELF, then U-Boot legacy image, then falls
/// back to a flat binary at `loader_start + KERNEL_LOAD_OFFSET`. For
/// OS-style boots this also writes the bootstrap trampoline and, on
/// multi-core boards, the parked-CPU boot code — once, before any core
/// can fetch from either address.
pub fn load_kernel(cfg: &mut BootConfig, mem: &GuestMemory) -> Result<(), BootError> {
    let path = cfg.kernel_filename.clone().ok_or(BootError::NoKernel)?;

    if cfg.cpu_count == 0 {
        cfg.cpu_count = 1;
    }

    let bytes = fs::read(&path).map_err(|source| BootError::Read {
        path: path.clone(),
        source,
    })?;

    // First reader that accepts the image wins. Individual rejections
    // are not errors; only exhausting the chain is.
    let (entry, is_linux) = match formats::elf::load(&bytes, mem) {
        Ok(img) => (img.entry, elf_kernel_hint(&path)),
        Err(elf_err) => match formats::uimage::load(&bytes, mem) {
            Ok(img) => (img.entry, img.kernel_hint.unwrap_or(false)),
            Err(uimage_err) => {
                debug!(
                    "'{}': not ELF ({elf_err}), not U-Boot ({uimage_err}); loading as flat binary",
                    path.display()
                );
                let dest = cfg.loader_start.offset(KERNEL_LOAD_OFFSET);
                let limit = (cfg.ram_size as usize).saturating_sub(KERNEL_LOAD_OFFSET as usize);
                let img = formats::raw::load(&bytes, mem, dest, limit).map_err(|source| {
                    BootError::Kernel {
                        path: path.clone(),
                        source,
                    }
                })?;
                (img.entry, true)
            }
        },
    };

    cfg.entry = entry;

    if is_linux {
        cfg.initrd_size = match cfg.initrd_filename.clone() {
            Some(initrd) => load_initrd(cfg, mem, &initrd)?,
            None => 0,
        };

        write_trampoline(cfg, mem);
        if cfg.cpu_count > 1 {
            cfg.secondary_boot.write_boot_code(cfg, mem);
        }
    }
    cfg.is_linux = is_linux;

    info!(
        "kernel '{}': entry={} linux={} initrd_size={}",
        path.display(),
        cfg.entry,
        cfg.is_linux,
        cfg.initrd_size
    );
    Ok(())
}

fn load_initrd(cfg: &BootConfig, mem: &GuestMemory, path: &Path) -> Result<u32, BootError> {
    let bytes = fs::read(path).map_err(|source| BootError::Read {
        path: path.to_owned(),
        source,
    })?;
    let limit = (cfg.ram_size as usize).saturating_sub(INITRD_LOAD_OFFSET as usize);
    let img = formats::raw::load(&bytes, mem, cfg.initrd_addr(), limit).map_err(|source| {
        BootError::Initrd {
            path: path.to_owned(),
            source,
        }
    })?;
    Ok(img.size as u32)
}
