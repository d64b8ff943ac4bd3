//! The FuseSoC CAPI2 core descriptor listing the generated sources.

use indexmap::IndexMap;
use serde::Serialize;

use model::Model;

/// The marker line every CAPI2 core file starts with.
pub const CAPI2: &str = "CAPI=2:";

const VERILOG_SOURCE: &str = "verilogSource";
const FILESET: &str = "rtl";
const TARGET: &str = "default";

#[derive(Debug, Serialize)]
pub struct CoreDescriptor {
    name: String,
    filesets: IndexMap<String, Fileset>,
    targets: IndexMap<String, Target>,
}

#[derive(Debug, Serialize)]
struct Fileset {
    files: Vec<IndexMap<String, SourceFile>>,
}

#[derive(Debug, Serialize)]
struct SourceFile {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    is_include_file: bool,
    file_type: &'static str,
}

#[derive(Debug, Serialize)]
struct Target {
    filesets: Vec<String>,
}

impl CoreDescriptor {
    /// Describe the wrapper source and its instantiation template.
    pub fn new(model: &Model, source: &str, include: &str) -> Self {
        let files = [(source, false), (include, true)]
            .into_iter()
            .map(|(path, is_include_file)| {
                IndexMap::from([(
                    path.to_string(),
                    SourceFile {
                        is_include_file,
                        file_type: VERILOG_SOURCE,
                    },
                )])
            })
            .collect();

        Self {
            name: model.vlnv().to_string(),
            filesets: IndexMap::from([(FILESET.to_string(), Fileset { files })]),
            targets: IndexMap::from([(
                TARGET.to_string(),
                Target {
                    filesets: vec![FILESET.to_string()],
                },
            )]),
        }
    }

    pub fn render(&self) -> Result<String, serde_yaml::Error> {
        Ok(format!("{CAPI2}\n{}", serde_yaml::to_string(self)?))
    }
}
