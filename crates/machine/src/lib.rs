//! Machine orchestration: guest RAM plus the modeled cores, with the
//! boot subsystem wired into the reset sequencer.

pub mod board;
pub mod machine;

pub use machine::{Machine, MachineConfig};
