use std::cell::RefCell;
use std::rc::{Rc, Weak};

use types::PhysAddr;
use vm::cpu::Cpu;
use vm::memory::GuestMemory;
use vm::reset::ResetRegistry;

use crate::atags;
use crate::config::BootConfig;
use crate::smp::SecondaryBoot;

/// Reset one core.
///
/// Preconditions guaranteed by the machine, not by this function: a
/// core is reset before it may fetch, so the parameter block written on
/// the primary's path happens-before any instruction fetch; primary and
/// secondary reset writes touch disjoint memory (parameter block vs.
/// boot register), so no cross-core ordering is needed. Nothing here
/// can fail, and replays overwrite the same bytes.
pub fn do_cpu_reset(cpu: &mut Cpu, info: Option<&BootConfig>, mem: &GuestMemory) {
    cpu.core_reset();

    let Some(info) = info else {
        // No boot semantics attached; bare core reset.
        return;
    };

    if !info.is_linux {
        // Entry-address parity selects the instruction set.
        cpu.set_pc(PhysAddr::new(info.entry.as_u32() & !1));
        cpu.thumb = info.entry.as_u32() & 1 != 0;
    } else if cpu.index == 0 {
        cpu.set_pc(info.loader_start);
        if info.use_legacy_params {
            atags::write_legacy(info, mem);
        } else {
            atags::write_tagged(info, mem);
        }
    } else {
        info.secondary_boot.reset_cpu(cpu, info, mem);
    }
}

/// Register the dispatcher with the reset sequencer, once per core.
///
/// Each callback holds the boot description weakly; if the machine ever
/// drops it, resets degrade to bare core resets.
pub fn install_reset_hooks(
    boot: &Rc<BootConfig>,
    cpus: &[Rc<RefCell<Cpu>>],
    mem: &GuestMemory,
    resets: &ResetRegistry,
) {
    for cpu in cpus {
        let cpu = Rc::clone(cpu);
        let boot: Weak<BootConfig> = Rc::downgrade(boot);
        let mem = mem.clone();
        resets.register(Box::new(move || {
            let info = boot.upgrade();
            do_cpu_reset(&mut cpu.borrow_mut(), info.as_deref(), &mem);
        }));
    }
}
