use std::fmt::Display;

use crate::model::Model;

/// The register map as a listing, one line per placed replica:
///
/// ```text
/// ro:0x0000:	status:0:4
/// rw:0x0004:	ctrl:0:8
/// 		mode:8:2
/// ```
///
/// The register header appears once, on the line of its first occupant.
#[derive(Debug, Clone, Copy)]
pub struct Report<'cx> {
    model: &'cx Model,
}

impl<'cx> Report<'cx> {
    pub fn new(model: &'cx Model) -> Self {
        Self { model }
    }
}

impl Display for Report<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for register in self.model.registers() {
            for (i, (field, occupant)) in register.occupants().enumerate() {
                if i == 0 {
                    write!(f, "{}", register.register)?;
                } else {
                    f.write_str("\t")?;
                }

                writeln!(
                    f,
                    "\t{}:{}:{}",
                    field.replica_name(occupant.replica),
                    occupant.offset,
                    occupant.width
                )?;
            }
        }

        Ok(())
    }
}
