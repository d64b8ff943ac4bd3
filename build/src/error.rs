use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Model(#[from] model::error::Error),
    #[error("the register map must be packed before generation")]
    Unpacked,
    #[error("generation refused: the register map emitted {0} warnings")]
    Warnings(usize),
    #[error("failed to serialize the core descriptor: {0}")]
    Descriptor(#[from] serde_yaml::Error),
    #[error("failed to write \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
