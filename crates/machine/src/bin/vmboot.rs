use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use bootloader::trampoline::TRAMPOLINE_LEN;
use machine::{Machine, MachineConfig};
use vm::GuestMemory;

/// Boot a guest kernel image and dump the boot state the loader produced.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Kernel image (ELF, U-Boot image or flat binary)
    #[arg(short, long)]
    kernel: PathBuf,

    /// Initial ramdisk
    #[arg(long)]
    initrd: Option<PathBuf>,

    /// Kernel command line
    #[arg(short, long)]
    append: Option<String>,

    /// Number of CPUs
    #[arg(long, default_value_t = 1)]
    cpus: u32,

    /// RAM size in MiB
    #[arg(long, default_value_t = 128)]
    ram_mb: u64,

    /// Encode the legacy parameter struct instead of the ATAG list
    #[arg(long)]
    legacy_params: bool,
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let machine = Machine::new(MachineConfig {
        ram_size: args.ram_mb << 20,
        cpu_count: args.cpus,
        kernel: Some(args.kernel.clone()),
        initrd: args.initrd,
        cmdline: args.append,
        use_legacy_params: args.legacy_params,
        ..MachineConfig::default()
    })
    .with_context(|| format!("booting '{}'", args.kernel.display()))?;

    machine.reset();

    for cpu in machine.cpus() {
        let cpu = cpu.borrow();
        println!(
            "cpu{}: pc=0x{:08x} thumb={}",
            cpu.index,
            cpu.pc(),
            cpu.thumb
        );
    }

    if let Some(info) = machine.boot_info() {
        println!("entry      = {}", info.entry);
        println!("linux boot = {}", info.is_linux);
        println!("initrd     = {} bytes", info.initrd_size);

        if info.is_linux {
            println!();
            println!("trampoline @ {}:", info.loader_start);
            dump(machine.memory(), info.loader_start.as_usize(), TRAMPOLINE_LEN);
            println!();
            println!("kernel args @ {}:", info.args_addr());
            dump(machine.memory(), info.args_addr().as_usize(), 0x90);
        }
    }
    Ok(())
}

fn dump(mem: &GuestMemory, start: usize, len: usize) {
    let bytes = mem.bytes();
    for addr in (start..start + len).step_by(16) {
        let line = &bytes[addr..(start + len).min(addr + 16)];

        let hex: Vec<String> = line.iter().map(|b| format!("{:02x}", b)).collect();
        let ascii: String = line
            .iter()
            .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
            .collect();

        println!("{:08x}  {:<47}  |{}|", addr, hex.join(" "), ascii);
    }
}
