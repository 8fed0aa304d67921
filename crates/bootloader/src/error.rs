use std::path::PathBuf;

use formats::ImageError;
use thiserror::Error;

/// Fatal boot configuration errors. Every variant surfaces at machine
/// construction, before any CPU runs; there is no guest to salvage.
#[derive(Debug, Error)]
pub enum BootError {
    #[error("kernel image must be specified")]
    NoKernel,

    #[error("could not read '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not load kernel '{}'", path.display())]
    Kernel {
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    #[error("could not load initrd '{}'", path.display())]
    Initrd {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
}
