use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("bad magic")]
    BadMagic,

    #[error("truncated image ({need} bytes needed, {have} present)")]
    Truncated { need: usize, have: usize },

    #[error("not an ARM image (machine {0:#x})")]
    WrongMachine(u16),

    #[error("image byte order does not match the guest")]
    WrongEndian,

    #[error("no loadable segments")]
    NoLoadableSegments,

    #[error("unsupported image type {0}")]
    UnsupportedType(u8),

    #[error("unsupported compression type {0}")]
    UnsupportedCompression(u8),

    #[error("image does not fit in guest memory (0x{addr:08x} + {size} bytes)")]
    OutOfRange { addr: u32, size: usize },

    #[error("elf: {0}")]
    Elf(#[from] goblin::error::Error),
}
