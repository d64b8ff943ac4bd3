use thiserror::Error;

use crate::diagnostic::{Diagnostic, Diagnostics};

/// Elaborates errors that may be emitted while building a register map.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("malformed vlnv \"{vlnv}\": {reason}")]
    Vlnv { vlnv: String, reason: &'static str },
    #[error("register map validation failed\n{}", Diagnostic::report(.0))]
    Validation(Diagnostics),
}

impl From<Diagnostics> for Error {
    fn from(diagnostics: Diagnostics) -> Self {
        Self::Validation(diagnostics)
    }
}
