use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use log::debug;

use bootloader::{do_cpu_reset, install_reset_hooks, load_kernel, BootConfig, BootError};
use types::{ByteOrder, PhysAddr};
use vm::{Cpu, GuestMemory, ResetRegistry};

use crate::board;

/// Board-level knobs exposed to whoever constructs the machine.
#[derive(Debug, Clone)]
pub struct MachineConfig {
    pub ram_size: u64,
    pub cpu_count: u32,
    pub board_id: u32,
    pub big_endian: bool,
    pub kernel: Option<PathBuf>,
    pub initrd: Option<PathBuf>,
    pub cmdline: Option<String>,
    pub use_legacy_params: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            ram_size: 0x0800_0000, // 128 MiB
            cpu_count: 1,
            board_id: board::BOARD_ID,
            big_endian: false,
            kernel: None,
            initrd: None,
            cmdline: None,
            use_legacy_params: false,
        }
    }
}

/// The assembled machine. Construction runs the whole load path; all
/// later boot-state writes happen inside [`Machine::reset`].
pub struct Machine {
    memory: GuestMemory,
    cpus: Vec<Rc<RefCell<Cpu>>>,
    resets: ResetRegistry,
    boot: Option<Rc<BootConfig>>,
}

impl Machine {
    pub fn new(config: MachineConfig) -> Result<Self, BootError> {
        let order = if config.big_endian {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        };
        let memory = GuestMemory::new(config.ram_size as usize, order);
        let cpus: Vec<_> = (0..config.cpu_count.max(1) as usize)
            .map(|n| Rc::new(RefCell::new(Cpu::new(n, config.big_endian))))
            .collect();
        let resets = ResetRegistry::new();

        let boot = if config.kernel.is_some() {
            let mut boot =
                BootConfig::new(config.board_id, config.ram_size, PhysAddr::new(0));
            boot.kernel_filename = config.kernel;
            boot.initrd_filename = config.initrd;
            boot.kernel_cmdline = config.cmdline;
            boot.cpu_count = config.cpu_count;
            boot.use_legacy_params = config.use_legacy_params;

            let smp = board::smp_layout(config.ram_size);
            boot.smp_loader_start = smp.loader;
            boot.gic_cpu_if_addr = smp.gic_cpu_if;
            boot.smp_bootreg_addr = smp.bootreg;

            load_kernel(&mut boot, &memory)?;

            // Frozen from here on; the hooks only ever read it.
            let boot = Rc::new(boot);
            install_reset_hooks(&boot, &cpus, &memory, &resets);
            Some(boot)
        } else {
            // No kernel requested: plain core resets.
            for cpu in &cpus {
                let cpu = Rc::clone(cpu);
                let mem = memory.clone();
                resets.register(Box::new(move || {
                    do_cpu_reset(&mut cpu.borrow_mut(), None, &mem);
                }));
            }
            None
        };

        debug!(
            "machine assembled: {} CPU(s), {} MiB RAM",
            cpus.len(),
            config.ram_size >> 20
        );
        Ok(Self {
            memory,
            cpus,
            resets,
            boot,
        })
    }

    /// Full machine reset: every registered callback runs in
    /// registration order, CPU 0 first. The host lets no core fetch
    /// before its reset callback has returned.
    pub fn reset(&self) {
        self.resets.reset_all();
    }

    pub fn memory(&self) -> &GuestMemory {
        &self.memory
    }

    pub fn cpus(&self) -> &[Rc<RefCell<Cpu>>] {
        &self.cpus
    }

    pub fn boot_info(&self) -> Option<&BootConfig> {
        self.boot.as_deref()
    }
}
