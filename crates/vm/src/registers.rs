#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Register {
    R0 = 0,   // argument / scratch; boot protocol: must be zero
    R1 = 1,   // boot protocol: machine type (board id)
    R2 = 2,   // boot protocol: address of the kernel parameter block
    R3 = 3,   // argument / scratch
    R4 = 4,   // callee-saved
    R5 = 5,   // callee-saved
    R6 = 6,   // callee-saved
    R7 = 7,   // callee-saved
    R8 = 8,   // callee-saved
    R9 = 9,   // platform register
    R10 = 10, // callee-saved
    R11 = 11, // frame pointer
    R12 = 12, // intra-procedure scratch

    Sp = 13, // r13: stack pointer
    Lr = 14, // r14: link register
    Pc = 15, // r15: program counter
}
