pub mod access;

use std::fmt::Display;

use derive_more::{AsRef, Deref};

use crate::{
    Node,
    diagnostic::{Context, Diagnostic, Diagnostics},
    field::access::{Access, Direction},
    model::View,
    register::{REGISTER_WIDTH, RegisterIndex, RegisterNode},
};

/// Property keys a field declaration may carry.
pub const PROPERTIES: [&str; 3] = ["width", "type", "count"];

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Deref)]
pub struct FieldIndex(pub(crate) usize);

#[derive(Debug, Clone, Deref, AsRef)]
pub struct FieldNode {
    #[deref]
    #[as_ref]
    pub(crate) field: Field,
    pub(crate) slots: Vec<BitSlot>,
}

impl Node for FieldNode {
    type Index = FieldIndex;
}

/// The placement of one replica of a field.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct BitSlot {
    pub register: RegisterIndex,
    pub offset: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub ident: String,
    pub width: u8,
    pub access: Access,
    pub count: u32,
}

/// A raw property value, as read from a field declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    Integer(i64),
    Text(String),
    /// Any other value, described by its kind (e.g. "a sequence").
    Other(String),
}

impl Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "integer {value}"),
            Self::Text(value) => write!(f, "text \"{value}\""),
            Self::Other(kind) => f.write_str(kind),
        }
    }
}

impl Field {
    pub fn new(ident: impl AsRef<str>, width: u8, access: Access) -> Self {
        Self {
            ident: ident.as_ref().to_string(),
            width,
            access,
            count: 1,
        }
    }

    /// Replicate the field `count` times.
    pub fn count(self, count: u32) -> Self {
        Self { count, ..self }
    }

    /// Build a field from its declared properties.
    ///
    /// Missing properties take their defaults: a full-width (32-bit)
    /// read-write field with a single replica. Every violated constraint is
    /// collected; the field is only produced when there are none.
    pub fn from_properties<I, K>(ident: impl AsRef<str>, properties: I) -> Result<Self, Diagnostics>
    where
        I: IntoIterator<Item = (K, Property)>,
        K: AsRef<str>,
    {
        let mut field = Self::new(ident, REGISTER_WIDTH, Access::default());
        let context = Context::field(&field.ident);
        let mut diagnostics = Diagnostics::new();

        for (key, value) in properties {
            let key = key.as_ref();

            match (key, value) {
                ("width", Property::Integer(width)) => {
                    if width > REGISTER_WIDTH as i64 {
                        diagnostics.insert(Diagnostic::width_exceeded(
                            width,
                            REGISTER_WIDTH,
                            context.clone(),
                        ));
                    } else if width < 1 {
                        diagnostics.insert(Diagnostic::zero_width(
                            width,
                            REGISTER_WIDTH,
                            context.clone(),
                        ));
                    } else {
                        field.width = width as u8;
                    }
                }
                ("type", Property::Text(keyword)) => match keyword.parse() {
                    Ok(access) => field.access = access,
                    Err(..) => {
                        diagnostics.insert(Diagnostic::invalid_access(&keyword, context.clone()));
                    }
                },
                ("count", Property::Integer(count)) => match u32::try_from(count) {
                    Ok(count) if count >= 1 => field.count = count,
                    _ => {
                        diagnostics.insert(Diagnostic::zero_count(count, context.clone()));
                    }
                },
                ("width" | "count", found) => {
                    diagnostics.insert(Diagnostic::invalid_property(
                        &key,
                        "an integer",
                        &found,
                        context.clone(),
                    ));
                }
                ("type", found) => {
                    diagnostics.insert(Diagnostic::invalid_property(
                        &key,
                        "an access type",
                        &found,
                        context.clone(),
                    ));
                }
                (unknown, _) => {
                    diagnostics.insert(Diagnostic::unknown_property(
                        &unknown,
                        PROPERTIES.iter(),
                        context.clone(),
                    ));
                }
            }
        }

        if diagnostics.is_empty() {
            Ok(field)
        } else {
            Err(diagnostics)
        }
    }

    /// Whether the field is declared as an array of replicas.
    pub fn is_replicated(&self) -> bool {
        self.count > 1
    }

    /// The name of one replica, as it appears in the layout report.
    pub fn replica_name(&self, replica: u32) -> String {
        if self.is_replicated() {
            format!("{}[{replica}]", self.ident)
        } else {
            self.ident.clone()
        }
    }

    /// The wrapper ports of this field, one per direction.
    pub fn ports(&self) -> Vec<FieldPort> {
        let bidirectional = self.access.is_bidirectional();

        self.access
            .directions()
            .iter()
            .map(|&direction| FieldPort {
                ident: if bidirectional {
                    format!("{}{}", self.ident, direction.suffix())
                } else {
                    self.ident.clone()
                },
                direction,
                width: self.width,
                count: self.count,
            })
            .collect()
    }

    pub fn validate(&self, context: &Context) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();

        if self.width > REGISTER_WIDTH {
            diagnostics.insert(Diagnostic::width_exceeded(
                self.width,
                REGISTER_WIDTH,
                context.clone(),
            ));
        }

        if self.width == 0 {
            diagnostics.insert(Diagnostic::zero_width(
                self.width,
                REGISTER_WIDTH,
                context.clone(),
            ));
        }

        if self.count == 0 {
            diagnostics.insert(Diagnostic::zero_count(self.count, context.clone()));
        }

        diagnostics
    }
}

/// One wrapper port exposed for a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPort {
    pub ident: String,
    pub direction: Direction,
    pub width: u8,
    pub count: u32,
}

impl FieldPort {
    /// The port reference for one replica (`foo_i` or `foo_i[2]`).
    pub fn replica(&self, replica: u32) -> String {
        if self.count > 1 {
            format!("{}[{replica}]", self.ident)
        } else {
            self.ident.clone()
        }
    }
}

/// One placed replica, resolved against its register.
#[derive(Debug, Clone)]
pub struct Placement<'cx> {
    pub replica: u32,
    pub register: View<'cx, RegisterNode>,
    pub offset: u8,
    pub width: u8,
}

impl Placement<'_> {
    /// Index of the owning register in the `csri`/`csro` word arrays.
    pub fn word(&self) -> usize {
        self.register.word()
    }

    pub fn msb(&self) -> u8 {
        self.offset + self.width - 1
    }

    /// Bit-slice of the owning register word, e.g. `[11:4]`.
    pub fn slice(&self) -> String {
        format!("[{}:{}]", self.msb(), self.offset)
    }
}

impl<'cx> View<'cx, FieldNode> {
    /// Every placed replica of this field, in replica order.
    pub fn placements(&self) -> impl Iterator<Item = Placement<'cx>> {
        let model = self.model;
        let node: &'cx FieldNode = self.node;
        let width = node.width;

        node.slots
            .iter()
            .enumerate()
            .map(move |(replica, slot)| Placement {
                replica: replica as u32,
                register: model.get_register(slot.register),
                offset: slot.offset,
                width,
            })
    }

    pub fn slots(&self) -> &'cx [BitSlot] {
        let node: &'cx FieldNode = self.node;
        &node.slots
    }

    pub fn validate_placement(&self, context: &Context) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        let placed = self.slots().len();

        if placed != self.count as usize {
            diagnostics.insert(Diagnostic::unplaced(
                &self.ident,
                placed,
                self.count,
                context.clone(),
            ));
        }

        diagnostics
    }
}
