pub mod bus;
pub mod descriptor;
pub mod error;
pub mod template;
pub mod verilog;
pub mod wrapper;

use std::{
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use log::info;
use model::{Model, diagnostic};

pub use error::Error;

use crate::descriptor::CoreDescriptor;

/// Render every artifact of a packed register map, keyed by file name:
/// the wrapper (`<name>.sv`), its instantiation template (`<name>.vh`) and
/// the core descriptor (`<core-name>.core`).
pub fn render(model: &Model) -> Result<IndexMap<String, String>, Error> {
    if !model.is_packed() {
        return Err(Error::Unpacked);
    }

    let name = model.vlnv().module_name();
    let source = format!("{name}.sv");
    let include = format!("{name}.vh");
    let core = format!("{}.core", model.vlnv().core_name());

    let descriptor = CoreDescriptor::new(model, &source, &include).render()?;

    Ok([
        (source, wrapper::render(model)),
        (include, template::render(model)),
        (core, descriptor),
    ]
    .into())
}

/// Validate, render, and write every artifact into `out_dir`.
///
/// Nothing is written unless the register map is free of errors and
/// warnings and every artifact rendered.
pub fn generate(model: &Model, out_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, Error> {
    generate_with(model, out_dir, render)
}

fn generate_with(
    model: &Model,
    out_dir: impl AsRef<Path>,
    output: impl FnOnce(&Model) -> Result<IndexMap<String, String>, Error>,
) -> Result<Vec<PathBuf>, Error> {
    if !model.is_packed() {
        return Err(Error::Unpacked);
    }

    let diagnostics = model.validate();

    match diagnostic::tally(&diagnostics) {
        (_, 1..) => return Err(model::error::Error::Validation(diagnostics).into()),
        (warnings @ 1.., _) => return Err(Error::Warnings(warnings)),
        (..) => {}
    }

    let artifacts = output(model)?;
    let out_dir = out_dir.as_ref();

    fs::create_dir_all(out_dir).map_err(|source| Error::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();

    for (path, contents) in artifacts {
        let dest_path = out_dir.join(path);

        fs::write(&dest_path, contents).map_err(|source| Error::Io {
            path: dest_path.clone(),
            source,
        })?;

        info!("wrote {}", dest_path.display());
        written.push(dest_path);
    }

    Ok(written)
}
