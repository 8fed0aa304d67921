//! Guest kernel loading and multi-core bring-up.
//!
//! This crate owns the boot path of the machine:
//! - detects the kernel image format and places it in guest memory,
//! - synthesizes the bootstrap trampoline that primes r0-r2 and jumps
//!   to the kernel,
//! - encodes the kernel parameter block (ATAG list or the legacy fixed
//!   struct),
//! - parks secondary cores on a spin table until the kernel wakes them,
//! - replays all of the above from the per-CPU reset dispatcher.
//!
//! Everything fallible happens once, at load time. The reset path only
//! rewrites already-validated state and cannot fail.

pub mod atags;
pub mod config;
pub mod image;
pub mod reset;
pub mod smp;
pub mod trampoline;

mod error;

pub use config::{BoardTagFn, BootConfig, BOARD_TAG_BUF_LEN};
pub use error::BootError;
pub use image::load_kernel;
pub use reset::{do_cpu_reset, install_reset_hooks};
pub use smp::{GicSpinTable, SecondaryBoot};
