use std::path::PathBuf;

use types::PhysAddr;

use crate::smp::{GicSpinTable, SecondaryBoot};

/// Capacity of the scratch buffer handed to a board tag producer. The
/// producer must not claim more than this; the encoder checks.
pub const BOARD_TAG_BUF_LEN: usize = 0x1000;

/// Board-specific ATAG producer: fills the scratch buffer and returns
/// the number of bytes used.
pub type BoardTagFn = Box<dyn Fn(&BootConfig, &mut [u8]) -> usize>;

/// Everything the boot path needs to know about the board and the
/// requested guest.
///
/// Board setup code populates this once and passes it to
/// [`crate::load_kernel`], which fixes `entry`, `is_linux` and
/// `initrd_size`. From then on the config is frozen (the machine wraps
/// it in `Rc`) and only read by the reset dispatcher.
pub struct BootConfig {
    /// Numeric machine type handed to the kernel in r1.
    pub board_id: u32,
    pub ram_size: u64,
    /// Guest physical base where the trampoline, the parameter block
    /// and the raw-image fallback slot live.
    pub loader_start: PhysAddr,

    pub kernel_filename: Option<PathBuf>,
    pub initrd_filename: Option<PathBuf>,
    pub kernel_cmdline: Option<String>,

    /// Emit an ATAG_REVISION record when set.
    pub atag_revision: Option<u32>,
    /// Board-specific tag record producer, if the board has one.
    pub atag_board: Option<BoardTagFn>,

    /// Zero is normalized to one during loading.
    pub cpu_count: u32,
    /// Encode the legacy fixed parameter struct instead of the tag list.
    pub use_legacy_params: bool,

    /// Where the parked-CPU boot code is written. Only meaningful when
    /// `cpu_count > 1`; must not overlap anything the image readers
    /// touch.
    pub smp_loader_start: PhysAddr,
    pub gic_cpu_if_addr: PhysAddr,
    pub smp_bootreg_addr: PhysAddr,

    /// Secondary-core bring-up strategy; boards with a non-standard
    /// wake mechanism substitute their own.
    pub secondary_boot: Box<dyn SecondaryBoot>,

    /// Fixed exactly once by the loader, read-only afterwards.
    pub entry: PhysAddr,
    pub is_linux: bool,
    pub initrd_size: u32,
}

impl BootConfig {
    pub fn new(board_id: u32, ram_size: u64, loader_start: PhysAddr) -> Self {
        Self {
            board_id,
            ram_size,
            loader_start,
            kernel_filename: None,
            initrd_filename: None,
            kernel_cmdline: None,
            atag_revision: None,
            atag_board: None,
            cpu_count: 1,
            use_legacy_params: false,
            smp_loader_start: PhysAddr::new(0),
            gic_cpu_if_addr: PhysAddr::new(0),
            smp_bootreg_addr: PhysAddr::new(0),
            secondary_boot: Box::new(GicSpinTable),
            entry: PhysAddr::new(0),
            is_linux: false,
            initrd_size: 0,
        }
    }

    /// Guest address of the kernel parameter block.
    pub fn args_addr(&self) -> PhysAddr {
        self.loader_start.offset(types::KERNEL_ARGS_OFFSET)
    }

    /// Guest address of the initrd, when one is loaded.
    pub fn initrd_addr(&self) -> PhysAddr {
        self.loader_start.offset(types::INITRD_LOAD_OFFSET)
    }
}
