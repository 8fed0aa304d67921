//! Secondary-core bring-up.
//!
//! The default protocol follows the realview/vexpress convention: each
//! secondary signals the GIC CPU interface, then sits in a wfi loop
//! polling a shared boot register until the primary's guest software
//! publishes a non-zero start address there. Boards whose wake
//! mechanism differs substitute their own [`SecondaryBoot`].

use vm::cpu::Cpu;
use vm::memory::GuestMemory;

use crate::config::BootConfig;

/// Bring-up strategy for every core except the primary.
pub trait SecondaryBoot {
    /// Write the parked-CPU boot code once at `smp_loader_start`,
    /// during loading, before any core can fetch from there.
    fn write_boot_code(&self, cfg: &BootConfig, mem: &GuestMemory);

    /// Per-core reset behaviour: bring the core to wherever it waits
    /// for its wake-up.
    fn reset_cpu(&self, cpu: &mut Cpu, cfg: &BootConfig, mem: &GuestMemory);
}

/// GIC-assisted spin table over a shared boot register.
pub struct GicSpinTable;

const SPIN_TABLE_CODE: [u32; 11] = [
    0xe59f_201c, // ldr  r2, gic_cpu_if
    0xe59f_001c, // ldr  r0, bootreg
    0xe3a0_1001, // mov  r1, #1
    0xe582_1000, // str  r1, [r2]      ; enable this CPU's interface
    0xe320_f003, // wfi
    0xe590_1000, // ldr  r1, [r0]
    0xe111_0001, // tst  r1, r1
    0x0aff_fffb, // beq  <wfi>
    0xe12f_ff11, // bx   r1
    0,           // gic_cpu_if: GIC CPU interface base
    0,           // bootreg: where the start address is published
];

/// Spin-table footprint in guest memory, in bytes.
pub const SPIN_TABLE_LEN: usize = SPIN_TABLE_CODE.len() * 4;

impl SecondaryBoot for GicSpinTable {
    fn write_boot_code(&self, cfg: &BootConfig, mem: &GuestMemory) {
        let mut code = SPIN_TABLE_CODE;
        code[9] = cfg.gic_cpu_if_addr.as_u32();
        code[10] = cfg.smp_bootreg_addr.as_u32();

        for (n, word) in code.iter().enumerate() {
            mem.store_u32(cfg.smp_loader_start.offset(n as u32 * 4), *word);
        }
    }

    fn reset_cpu(&self, cpu: &mut Cpu, cfg: &BootConfig, mem: &GuestMemory) {
        mem.store_u32(cfg.smp_bootreg_addr, 0);
        cpu.set_pc(cfg.smp_loader_start);
    }
}
