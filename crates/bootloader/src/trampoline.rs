use vm::memory::GuestMemory;

use crate::config::BootConfig;

/// Three instructions and a three-word literal pool: zero r0, load the
/// board id into r1 and the parameter-block address into r2, then jump
/// through the entry word.
const TRAMPOLINE: [u32; 7] = [
    0xe3a0_0000, // mov  r0, #0
    0xe59f_1004, // ldr  r1, [pc, #4]
    0xe59f_2004, // ldr  r2, [pc, #4]
    0xe59f_f004, // ldr  pc, [pc, #4]
    0,           // board id
    0,           // address of kernel parameter block
    0,           // kernel entry point
];

/// Trampoline footprint in guest memory, in bytes.
pub const TRAMPOLINE_LEN: usize = TRAMPOLINE.len() * 4;

/// Patch and store the trampoline at `loader_start`, word by word in
/// guest byte order. Built in a fresh local buffer on every call so
/// machines in the same process never share scratch state.
pub fn write_trampoline(cfg: &BootConfig, mem: &GuestMemory) {
    let mut code = TRAMPOLINE;
    code[4] = cfg.board_id;
    code[5] = cfg.args_addr().as_u32();
    code[6] = cfg.entry.as_u32();

    for (n, word) in code.iter().enumerate() {
        mem.store_u32(cfg.loader_start.offset(n as u32 * 4), *word);
    }
}
