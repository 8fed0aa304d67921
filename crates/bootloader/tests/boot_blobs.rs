//! Decode the emitted machine-code blobs with a deliberately small ARM
//! stepper: just the handful of instructions the trampoline and the
//! spin table use (mov/ldr/str/tst/beq/bx/wfi). The product crates ship
//! no execution engine; this model exists only to check that the
//! encoded words do what the boot protocol promises.

use bootloader::config::BootConfig;
use bootloader::smp::{SecondaryBoot, SPIN_TABLE_LEN};
use bootloader::trampoline::write_trampoline;
use types::{ByteOrder, PhysAddr};
use vm::memory::GuestMemory;

struct MiniArm {
    regs: [u32; 16],
    z: bool,
    thumb: bool,
}

impl MiniArm {
    fn new(pc: u32) -> Self {
        let mut regs = [0xcafe_f00d; 16];
        regs[15] = pc;
        Self {
            regs,
            z: false,
            thumb: false,
        }
    }

    fn pc(&self) -> u32 {
        self.regs[15]
    }

    fn step(&mut self, mem: &GuestMemory) {
        let pc = self.regs[15];
        let insn = mem.load_u32(PhysAddr::new(pc));

        let taken = match insn >> 28 {
            0x0 => self.z, // eq
            0xe => true,   // al
            cond => panic!("unhandled condition {cond:#x} at 0x{pc:08x}"),
        };
        if !taken {
            self.regs[15] = pc + 4;
            return;
        }

        if insn & 0x0fe0_0000 == 0x03a0_0000 {
            // mov rd, #imm8 (no rotation in these blobs)
            let rd = ((insn >> 12) & 0xf) as usize;
            self.regs[rd] = insn & 0xff;
        } else if insn & 0x0fff_ffff == 0x0320_f003 {
            // wfi: the wake-up is modeled by the caller simply stepping on
        } else if insn & 0x0fff_0000 == 0x059f_0000 {
            // ldr rd, [pc, #imm12]: literal pool, pc reads as insn + 8
            let rd = ((insn >> 12) & 0xf) as usize;
            let imm = insn & 0xfff;
            self.regs[rd] = mem.load_u32(PhysAddr::new(pc + 8 + imm));
            if rd == 15 {
                return;
            }
        } else if insn & 0x0ff0_0fff == 0x0590_0000 {
            // ldr rd, [rn]
            let rn = ((insn >> 16) & 0xf) as usize;
            let rd = ((insn >> 12) & 0xf) as usize;
            self.regs[rd] = mem.load_u32(PhysAddr::new(self.regs[rn]));
        } else if insn & 0x0ff0_0fff == 0x0580_0000 {
            // str rd, [rn]
            let rn = ((insn >> 16) & 0xf) as usize;
            let rd = ((insn >> 12) & 0xf) as usize;
            mem.store_u32(PhysAddr::new(self.regs[rn]), self.regs[rd]);
        } else if insn & 0x0ff0_0ff0 == 0x0110_0000 {
            // tst rn, rm
            let rn = ((insn >> 16) & 0xf) as usize;
            let rm = (insn & 0xf) as usize;
            self.z = self.regs[rn] & self.regs[rm] == 0;
        } else if insn & 0x0f00_0000 == 0x0a00_0000 {
            // b <label>, 24-bit signed word offset
            let off = (((insn & 0x00ff_ffff) << 8) as i32) >> 6;
            self.regs[15] = (pc as i64 + 8 + off as i64) as u32;
            return;
        } else if insn & 0x0fff_fff0 == 0x012f_ff10 {
            // bx rm
            let target = self.regs[(insn & 0xf) as usize];
            self.thumb = target & 1 != 0;
            self.regs[15] = target & !1;
            return;
        } else {
            panic!("unhandled instruction 0x{insn:08x} at 0x{pc:08x}");
        }
        self.regs[15] = pc + 4;
    }
}

fn smp_config(loader: u32, gic: u32, bootreg: u32) -> BootConfig {
    let mut cfg = BootConfig::new(0x183, 0x10_0000, PhysAddr::new(0));
    cfg.cpu_count = 2;
    cfg.smp_loader_start = PhysAddr::new(loader);
    cfg.gic_cpu_if_addr = PhysAddr::new(gic);
    cfg.smp_bootreg_addr = PhysAddr::new(bootreg);
    cfg
}

#[test]
fn trampoline_primes_boot_registers_and_jumps() {
    let cases = [
        (0x183u32, 0x0000_0000u32, 0x0001_0000u32),
        (0x08e0, 0x0004_0000, 0x0004_8000),
        (0xffff_ffff, 0x0000_8000, 0x000f_0000),
    ];

    for (board_id, loader, entry) in cases {
        let mem = GuestMemory::new(0x10_0000, ByteOrder::Little);
        let mut cfg = BootConfig::new(board_id, 0x10_0000, PhysAddr::new(loader));
        cfg.entry = PhysAddr::new(entry);
        write_trampoline(&cfg, &mem);

        let mut core = MiniArm::new(loader);
        for _ in 0..4 {
            core.step(&mem);
        }

        assert_eq!(core.regs[0], 0);
        assert_eq!(core.regs[1], board_id);
        assert_eq!(core.regs[2], loader + 0x100);
        assert_eq!(core.pc(), entry);
    }
}

#[test]
fn trampoline_words_are_stored_in_guest_byte_order() {
    let mem = GuestMemory::new(0x1000, ByteOrder::Big);
    let cfg = BootConfig::new(0x183, 0x1000, PhysAddr::new(0));
    write_trampoline(&cfg, &mem);

    // mov r0, #0 as a big-endian guest fetches it
    assert_eq!(&mem.bytes()[0..4], &[0xe3, 0xa0, 0x00, 0x00]);
    assert_eq!(&mem.bytes()[16..20], &[0x00, 0x00, 0x01, 0x83]);
}

#[test]
fn spin_table_parks_until_boot_register_published() {
    let mem = GuestMemory::new(0x10_0000, ByteOrder::Little);
    let cfg = smp_config(0x8000, 0x9000, 0x9100);
    cfg.secondary_boot.write_boot_code(&cfg, &mem);

    // literal words patched with the board addresses
    assert_eq!(mem.load_u32(PhysAddr::new(0x8000 + 9 * 4)), 0x9000);
    assert_eq!(mem.load_u32(PhysAddr::new(0x8000 + 10 * 4)), 0x9100);

    let mut core = MiniArm::new(0x8000);
    for _ in 0..40 {
        core.step(&mem);
        let pc = core.pc();
        assert!(
            pc >= 0x8000 && pc < 0x8000 + SPIN_TABLE_LEN as u32,
            "core escaped the spin loop at 0x{pc:08x}"
        );
    }

    // it signalled the interrupt controller on the way in
    assert_eq!(mem.load_u32(PhysAddr::new(0x9000)), 1);

    // an external actor publishes the start address
    mem.store_u32(PhysAddr::new(0x9100), 0x4_4320);
    for _ in 0..10 {
        core.step(&mem);
        if core.pc() == 0x4_4320 {
            break;
        }
    }
    assert_eq!(core.pc(), 0x4_4320);
    assert!(!core.thumb);
}

#[test]
fn spin_table_honors_thumb_start_addresses() {
    let mem = GuestMemory::new(0x10_0000, ByteOrder::Little);
    let cfg = smp_config(0x8000, 0x9000, 0x9100);
    cfg.secondary_boot.write_boot_code(&cfg, &mem);
    mem.store_u32(PhysAddr::new(0x9100), 0x4_4321);

    let mut core = MiniArm::new(0x8000);
    for _ in 0..20 {
        core.step(&mem);
        if core.pc() == 0x4_4320 {
            break;
        }
    }
    assert_eq!(core.pc(), 0x4_4320);
    assert!(core.thumb);
}
