use std::{fmt::Display, str::FromStr};

use crate::error::Error;

/// A FuseSoC `vendor:library:name[:version]` identifier.
///
/// The name segment may carry a legacy `-version` suffix, in which case the
/// generated module is named after the part before the first `-` while the
/// core file keeps the full segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Vlnv {
    raw: String,
    pub vendor: String,
    pub library: String,
    pub name: String,
    pub version: Option<String>,
}

impl Vlnv {
    /// Base name of the generated wrapper module and its sources.
    pub fn module_name(&self) -> &str {
        self.name
            .split_once('-')
            .map_or(self.name.as_str(), |(name, _)| name)
    }

    /// Base name of the generated core descriptor.
    pub fn core_name(&self) -> &str {
        &self.name
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for Vlnv {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason| Error::Vlnv {
            vlnv: s.to_string(),
            reason,
        };

        let mut segments = s.split(':');

        let (Some(vendor), Some(library), Some(name)) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(malformed("expected vendor:library:name[:version]"));
        };

        let version = segments.next().map(str::to_string);

        if segments.next().is_some() {
            return Err(malformed("too many segments"));
        }

        let vlnv = Self {
            raw: s.to_string(),
            vendor: vendor.to_string(),
            library: library.to_string(),
            name: name.to_string(),
            version,
        };

        if vlnv.module_name().is_empty() {
            return Err(malformed("the name segment is empty"));
        }

        if !is_identifier(vlnv.module_name()) {
            return Err(malformed("the module name is not a Verilog identifier"));
        }

        if vlnv.core_name().contains(['/', '\\']) {
            return Err(malformed("the name segment contains a path separator"));
        }

        Ok(vlnv)
    }
}

/// A simple Verilog identifier: `[A-Za-z_][A-Za-z0-9_$]*`.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();

    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

impl Display for Vlnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
