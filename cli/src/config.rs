//! The FuseSoC generator configuration.
//!
//! ```yaml
//! vlnv: acme:csr:uart_csr:1.0
//! files_root: /path/to/core
//! parameters:
//!   instance: uart0
//!   registers:
//!     ctrl: {width: 8, type: rw}
//!     irq: {width: 1, type: w1c, count: 4}
//! ```
//!
//! `files_root` is accepted and ignored. Field properties are read as raw
//! YAML so that every malformed property is reported as a diagnostic
//! instead of stopping at the first deserializer error.

use std::{
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use model::{
    Field, Model, Vlnv,
    diagnostic::{Context, Diagnostic, Diagnostics},
    field::Property,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("configuration is missing the required key \"{0}\"")]
    MissingKey(&'static str),
    #[error("configuration key \"{key}\" must be {expected}")]
    InvalidKey {
        key: &'static str,
        expected: &'static str,
    },
    #[error(transparent)]
    Model(#[from] model::error::Error),
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    vlnv: Option<String>,
    parameters: Option<Mapping>,
}

/// Field name to its raw declaration: a mapping of properties, or null for a
/// field with default properties.
type RawRegisters = IndexMap<String, Value>;

#[derive(Debug, Clone)]
pub struct Config {
    pub vlnv: Vlnv,
    pub instance: Option<String>,
    pub fields: Vec<Field>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();

        debug!("loading configuration from {}", path.display());

        let source = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;

        source.parse()
    }

    pub fn into_model(self) -> Model {
        Model::new(self.vlnv, self.instance).with_fields(self.fields)
    }
}

impl std::str::FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = serde_yaml::from_str::<RawConfig>(s)?;

        let vlnv = raw.vlnv.ok_or(Error::MissingKey("vlnv"))?.parse()?;
        let parameters = raw.parameters.ok_or(Error::MissingKey("parameters"))?;

        let instance = match parameters.get("instance") {
            None => return Err(Error::MissingKey("parameters.instance")),
            Some(Value::Null) => None,
            Some(Value::String(instance)) => Some(instance.clone()),
            Some(..) => {
                return Err(Error::InvalidKey {
                    key: "parameters.instance",
                    expected: "a string or null",
                });
            }
        };

        let registers = match parameters.get("registers") {
            None => return Err(Error::MissingKey("parameters.registers")),
            Some(Value::Null) => RawRegisters::new(),
            Some(registers) => serde_yaml::from_value(registers.clone())?,
        };

        let fields = fields(registers)?;

        Ok(Self {
            vlnv,
            instance,
            fields,
        })
    }
}

/// Build every declared field, collecting the diagnostics of all of them.
fn fields(registers: RawRegisters) -> Result<Vec<Field>, Error> {
    let mut fields = Vec::new();
    let mut diagnostics = Diagnostics::new();

    for (ident, declaration) in registers {
        let properties = match declaration {
            Value::Null => Mapping::new(),
            Value::Mapping(properties) => properties,
            other => {
                diagnostics.insert(Diagnostic::invalid_property(
                    &ident,
                    "a mapping of properties",
                    &property(other),
                    Context::field(&ident),
                ));
                continue;
            }
        };

        let properties = properties
            .into_iter()
            .map(|(key, value)| (property_key(key), property(value)));

        match Field::from_properties(&ident, properties) {
            Ok(field) => fields.push(field),
            Err(errors) => diagnostics.extend(errors),
        }
    }

    if !diagnostics.is_empty() {
        return Err(model::error::Error::Validation(diagnostics).into());
    }

    Ok(fields)
}

fn property_key(key: Value) -> String {
    match key {
        Value::String(key) => key,
        other => match property(other) {
            Property::Integer(key) => key.to_string(),
            Property::Text(key) => key,
            Property::Other(kind) => kind,
        },
    }
}

fn property(value: Value) -> Property {
    match value {
        Value::Number(number) => match number.as_i64() {
            Some(integer) => Property::Integer(integer),
            None => Property::Other(format!("the number {number}")),
        },
        Value::String(text) => Property::Text(text),
        Value::Null => Property::Other("null".to_string()),
        Value::Bool(value) => Property::Other(format!("the boolean {value}")),
        Value::Sequence(..) => Property::Other("a sequence".to_string()),
        Value::Mapping(..) => Property::Other("a mapping".to_string()),
        Value::Tagged(..) => Property::Other("a tagged value".to_string()),
    }
}
