//! Kernel parameter block encoders.
//!
//! Two mutually exclusive layouts at `loader_start + KERNEL_ARGS_OFFSET`:
//! the ATAG tagged list, and the legacy fixed struct kept for guest
//! bootstraps that predate the tag protocol. Both are pure functions of
//! the frozen [`BootConfig`], so replaying them on every reset rewrites
//! the same bytes.

use bitflags::bitflags;

use types::PhysAddr;
use vm::memory::GuestMemory;

use crate::config::{BOARD_TAG_BUF_LEN, BootConfig};

const ATAG_NONE: u32 = 0x0000_0000;
const ATAG_CORE: u32 = 0x5441_0001;
const ATAG_MEM: u32 = 0x5441_0002;
const ATAG_INITRD2: u32 = 0x5442_0005;
const ATAG_REVISION: u32 = 0x5441_0007;
const ATAG_CMDLINE: u32 = 0x5441_0009;
const ATAG_BOARD: u32 = 0x414f_4d50;

bitflags! {
    /// Ramdisk flags in the legacy parameter struct.
    struct RamdiskFlags: u32 {
        const READONLY = 1;
        const LOAD = 4;
        const PROMPT = 8;
    }
}

/// Sequential word writer over guest memory.
struct Cursor<'m> {
    mem: &'m GuestMemory,
    p: PhysAddr,
}

impl<'m> Cursor<'m> {
    fn new(mem: &'m GuestMemory, p: PhysAddr) -> Self {
        Self { mem, p }
    }

    fn word(&mut self, val: u32) {
        self.mem.store_u32(self.p, val);
        self.p = self.p.offset(4);
    }

    fn pos(&self) -> PhysAddr {
        self.p
    }

    fn advance(&mut self, bytes: u32) {
        self.p = self.p.offset(bytes);
    }
}

/// Encode the ATAG list. Tag order: CORE, MEM, then the optional
/// INITRD2 / REVISION / CMDLINE / board records, then the terminator.
pub fn write_tagged(cfg: &BootConfig, mem: &GuestMemory) {
    let mut p = Cursor::new(mem, cfg.args_addr());

    // ATAG_CORE: flags, page size, root device
    p.word(5);
    p.word(ATAG_CORE);
    p.word(1);
    p.word(0x1000);
    p.word(0);

    // ATAG_MEM, one record covering the whole contiguous bank
    p.word(4);
    p.word(ATAG_MEM);
    p.word(cfg.ram_size as u32);
    p.word(cfg.loader_start.as_u32());

    if cfg.initrd_size > 0 {
        p.word(4);
        p.word(ATAG_INITRD2);
        p.word(cfg.initrd_addr().as_u32());
        p.word(cfg.initrd_size);
    }

    if let Some(rev) = cfg.atag_revision {
        p.word(3);
        p.word(ATAG_REVISION);
        p.word(rev);
    }

    if let Some(cmdline) = cfg.kernel_cmdline.as_deref().filter(|s| !s.is_empty()) {
        let payload_words = (cmdline.len() >> 2) + 1;
        p.word((payload_words + 2) as u32);
        p.word(ATAG_CMDLINE);
        mem.write_bytes(p.pos(), cmdline.as_bytes());
        mem.store_u8(p.pos().offset(cmdline.len() as u32), 0);
        p.advance(payload_words as u32 * 4);
    }

    if let Some(produce) = &cfg.atag_board {
        let mut buf = [0u8; BOARD_TAG_BUF_LEN];
        let len = produce(cfg, &mut buf);
        assert!(
            len <= BOARD_TAG_BUF_LEN,
            "board tag producer claimed {len} bytes, scratch buffer holds {BOARD_TAG_BUF_LEN}"
        );
        let len = (len + 3) & !3;
        p.word(((len + 8) >> 2) as u32);
        p.word(ATAG_BOARD);
        mem.write_bytes(p.pos(), &buf[..len]);
        p.advance(len as u32);
    }

    // ATAG_NONE terminates the list
    p.word(0);
    p.word(ATAG_NONE);
}

/// Encode the legacy fixed parameter struct: typed fields in a fixed
/// order, zero padding out to 1280 bytes, then the raw command line.
pub fn write_legacy(cfg: &BootConfig, mem: &GuestMemory) {
    let base = cfg.args_addr();
    let mut p = Cursor::new(mem, base);

    p.word(4096); // page size
    p.word((cfg.ram_size / 4096) as u32); // nr_pages
    p.word(0); // ramdisk size
    p.word((RamdiskFlags::READONLY | RamdiskFlags::LOAD | RamdiskFlags::PROMPT).bits());
    p.word(31 << 8); // root device: /dev/mtdblock0

    // video_num_cols/rows, video_x/y, memc_control_reg and the packed
    // per-char byte fields: no display is described on this path
    for _ in 0..6 {
        p.word(0);
    }

    // pages_in_bank[4], pages_in_vram
    for _ in 0..5 {
        p.word(0);
    }

    // initrd_start, initrd_size
    if cfg.initrd_size > 0 {
        p.word(cfg.initrd_addr().as_u32());
    } else {
        p.word(0);
    }
    p.word(cfg.initrd_size);

    // rd_start, system_rev, system_serial_low/high, mem_fclk_21285
    for _ in 0..5 {
        p.word(0);
    }

    // the kernel expects the command line right after the reserved
    // 256 + 1024 byte region
    while p.pos().as_u32() < base.as_u32() + 256 + 1024 {
        p.word(0);
    }

    match cfg.kernel_cmdline.as_deref() {
        Some(s) => {
            mem.write_bytes(p.pos(), s.as_bytes());
            mem.store_u8(p.pos().offset(s.len() as u32), 0);
        }
        None => p.word(0),
    }
}
