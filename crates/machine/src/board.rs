//! The flat-RAM development board.
//!
//! A single contiguous RAM bank at guest address zero and no device
//! models. The secondary-CPU wake addresses are therefore plain RAM
//! words near the top of the bank; real platforms override them (or the
//! whole bring-up strategy) with their own device addresses.

use types::PhysAddr;

/// Machine type reported to the kernel in r1.
pub const BOARD_ID: u32 = 0x183;

/// Secondary bring-up addresses derived from the RAM size.
pub struct SmpLayout {
    /// Parked-CPU boot code, in the last RAM page.
    pub loader: PhysAddr,
    /// Modeled GIC CPU-interface word.
    pub gic_cpu_if: PhysAddr,
    /// Boot register the kernel publishes start addresses through.
    pub bootreg: PhysAddr,
}

pub fn smp_layout(ram_size: u64) -> SmpLayout {
    let top = ram_size as u32;
    SmpLayout {
        loader: PhysAddr::new(top - 0x1000),
        gic_cpu_if: PhysAddr::new(top - 8),
        bootreg: PhysAddr::new(top - 4),
    }
}
