use std::fmt::Display;

use derive_more::{AsRef, Deref};

use crate::{
    Node,
    diagnostic::{Context, Diagnostic, Diagnostics},
    field::{FieldIndex, FieldNode, access::Access},
    model::View,
};

/// Width of every register word, in bits.
pub const REGISTER_WIDTH: u8 = 32;

/// Byte stride between consecutive registers.
pub const REGISTER_STRIDE: u32 = (REGISTER_WIDTH / 8) as u32;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Deref)]
pub struct RegisterIndex(pub(crate) usize);

#[derive(Debug, Clone, Deref, AsRef)]
pub struct RegisterNode {
    #[deref]
    #[as_ref]
    pub(crate) register: Register,
    pub(crate) occupants: Vec<Occupant>,
}

impl Node for RegisterNode {
    type Index = RegisterIndex;
}

impl RegisterNode {
    pub(crate) fn new(register: Register) -> Self {
        Self {
            register,
            occupants: Vec::new(),
        }
    }

    /// Sum of the widths of every replica placed in this register.
    pub fn occupied_bits(&self) -> u32 {
        self.occupants.iter().map(|o| o.width as u32).sum()
    }
}

/// One field replica residing in a register.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct Occupant {
    pub field: FieldIndex,
    pub replica: u32,
    pub offset: u8,
    pub width: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub address: u32,
    pub access: Access,
}

impl Register {
    pub fn new(address: u32, access: Access) -> Self {
        Self { address, access }
    }

    /// Index of this register in the register engine's word arrays.
    pub fn word(&self) -> usize {
        (self.address / REGISTER_STRIDE) as usize
    }
}

impl Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:0x{:04x}:", self.access, self.address)
    }
}

impl<'cx> View<'cx, RegisterNode> {
    /// Use the model context to lookup every field replica placed here, in
    /// placement order.
    pub fn occupants(&self) -> impl Iterator<Item = (View<'cx, FieldNode>, Occupant)> {
        let model = self.model;
        let node: &'cx RegisterNode = self.node;

        node.occupants
            .iter()
            .map(move |occupant| (model.get_field(occupant.field), *occupant))
    }

    pub fn validate(&self, context: &Context) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        let new_context = context.clone().and(format!("register 0x{:04x}", self.address));

        let occupied = self.occupied_bits();

        if occupied > REGISTER_WIDTH as u32 {
            diagnostics.insert(Diagnostic::overflow(
                occupied,
                REGISTER_WIDTH,
                new_context.clone(),
            ));
        }

        for (field, occupant) in self.occupants() {
            if field.access != self.access {
                diagnostics.insert(Diagnostic::mixed_access(
                    &field.replica_name(occupant.replica),
                    field.access,
                    self.access,
                    new_context.clone(),
                ));
            }
        }

        let mut sorted = self.occupants().collect::<Vec<_>>();
        sorted.sort_by(|(_, lhs), (_, rhs)| lhs.offset.cmp(&rhs.offset));

        for (i, (field, occupant)) in sorted.iter().enumerate() {
            let end = occupant.offset as u32 + occupant.width as u32;

            for (other, other_occupant) in &sorted[i + 1..] {
                if end <= other_occupant.offset as u32 {
                    break;
                }

                let other_end = other_occupant.offset as u32 + other_occupant.width as u32;

                diagnostics.insert(Diagnostic::overlap(
                    &field.replica_name(occupant.replica),
                    &other.replica_name(other_occupant.replica),
                    &format!("{}...{}", other_occupant.offset, end.min(other_end) - 1),
                    new_context.clone(),
                ));
            }
        }

        diagnostics
    }
}
