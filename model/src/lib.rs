pub mod access_vector;
pub mod diagnostic;
pub mod error;
pub mod field;
pub mod model;
pub mod register;
pub mod report;
pub mod vlnv;

use colored::Colorize as _;
pub use access_vector::AccessVector;
pub use field::{Field, access::Access};
pub use model::Model;
pub use register::Register;
pub use vlnv::Vlnv;

use crate::diagnostic::Diagnostic;

#[doc(hidden)]
pub trait Node {
    type Index;
}

/// Validate a register map and print its diagnostics.
///
/// Returns `true` when the map is free of errors and warnings.
pub fn validate(model: &Model) -> bool {
    let diagnostics = model.validate();

    if !diagnostics.is_empty() {
        eprintln!("{}", Diagnostic::report(&diagnostics));
    }

    let (warning_count, error_count) = diagnostic::tally(&diagnostics);

    if error_count == 0 {
        eprint!("{}. ", "Validated".green().bold());
    }
    eprintln!("emitted {warning_count} warnings and {error_count} errors");

    diagnostics.is_empty()
}
