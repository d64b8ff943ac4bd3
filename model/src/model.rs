use std::{cmp::Reverse, collections::HashSet};

use derive_more::{AsRef, Deref};
use log::{debug, warn};
use ters::ters;

use crate::{
    Node,
    access_vector::AccessVector,
    diagnostic::{self, Context, Diagnostic, Diagnostics},
    error::Error,
    field::{BitSlot, Field, FieldIndex, FieldNode},
    register::{
        Occupant, REGISTER_STRIDE, REGISTER_WIDTH, Register, RegisterIndex, RegisterNode,
    },
    report::Report,
    vlnv::Vlnv,
};

/// A register map: the declared fields and, once packed, the registers they
/// occupy.
#[ters]
#[derive(Debug, Clone)]
pub struct Model {
    #[get]
    vlnv: Vlnv,
    #[get]
    instance: Option<String>,

    fields: Vec<FieldNode>,
    /// Field visiting order. Declaration order until packed, packing order after.
    order: Vec<FieldIndex>,
    registers: Vec<RegisterNode>,
    packed: bool,
}

impl Model {
    pub fn new(vlnv: Vlnv, instance: Option<String>) -> Self {
        Self {
            vlnv,
            instance: instance.filter(|instance| !instance.is_empty()),
            fields: Default::default(),
            order: Default::default(),
            registers: Default::default(),
            packed: false,
        }
    }

    /// Add a field to the model.
    ///
    /// Any previous packing is discarded.
    pub fn add_field(&mut self, field: Field) -> FieldIndex {
        self.unpack();

        let index = FieldIndex(self.fields.len());

        self.fields.push(FieldNode {
            field,
            slots: Vec::new(),
        });
        self.order.push(index);

        index
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        for field in fields {
            self.add_field(field);
        }

        self
    }

    fn unpack(&mut self) {
        self.order.sort();
        self.registers.clear();

        for node in &mut self.fields {
            node.slots.clear();
        }

        self.packed = false;
    }

    /// Pack every field into 32-bit registers.
    ///
    /// Fields are visited ordered by access keyword, then by descending width;
    /// fields with equal keys keep their declaration order. Each replica is
    /// placed at the next free bit of the current register, and a new register
    /// is opened whenever the access kind changes or the replica would extend
    /// past bit 31.
    ///
    /// Fails without packing when any field is invalid.
    pub fn pack(&mut self) -> Result<(), Error> {
        self.unpack();

        let diagnostics = self.validate_declarations();

        if diagnostic::tally(&diagnostics).1 != 0 {
            return Err(Error::Validation(diagnostics));
        }

        let fields = &self.fields;
        self.order.sort_by_key(|index| {
            let field = &fields[**index].field;
            (field.access.keyword(), Reverse(field.width))
        });

        let mut current: Option<(RegisterIndex, u8)> = None;

        for &index in &self.order {
            let node = &mut self.fields[*index];

            for replica in 0..node.count {
                let (register, offset) = match current {
                    Some((register, offset))
                        if self.registers[*register].access == node.access
                            && offset as u32 + node.width as u32 <= REGISTER_WIDTH as u32 =>
                    {
                        (register, offset)
                    }
                    _ => {
                        let register = RegisterIndex(self.registers.len());
                        let address = register.0 as u32 * REGISTER_STRIDE;

                        debug!("allocated {} register at 0x{address:04x}", node.access);

                        self.registers
                            .push(RegisterNode::new(Register::new(address, node.access)));

                        (register, 0)
                    }
                };

                debug!(
                    "placed {} at 0x{:04x}[{}:{offset}]",
                    node.replica_name(replica),
                    self.registers[*register].address,
                    offset + node.width - 1,
                );

                node.slots.push(BitSlot { register, offset });
                self.registers[*register].occupants.push(Occupant {
                    field: index,
                    replica,
                    offset,
                    width: node.width,
                });

                current = Some((register, offset + node.width));
            }
        }

        self.packed = true;

        Ok(())
    }

    pub fn is_packed(&self) -> bool {
        self.packed
    }

    pub fn get_field(&self, index: FieldIndex) -> View<'_, FieldNode> {
        View {
            model: self,
            node: &self.fields[*index],
            index,
        }
    }

    pub fn try_get_field(&self, ident: &str) -> Option<View<'_, FieldNode>> {
        let index = self.fields.iter().position(|node| node.ident == ident)?;

        Some(self.get_field(FieldIndex(index)))
    }

    pub fn get_register(&self, index: RegisterIndex) -> View<'_, RegisterNode> {
        View {
            model: self,
            node: &self.registers[*index],
            index,
        }
    }

    /// Fields in packing order (declaration order if not yet packed).
    pub fn fields<'cx>(&'cx self) -> impl Iterator<Item = View<'cx, FieldNode>> {
        self.order.iter().map(|index| self.get_field(*index))
    }

    /// Registers in allocation order, which is also address order.
    pub fn registers<'cx>(&'cx self) -> impl Iterator<Item = View<'cx, RegisterNode>> {
        (0..self.registers.len()).map(|index| self.get_register(RegisterIndex(index)))
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn replica_count(&self) -> usize {
        self.fields.iter().map(|node| node.count as usize).sum()
    }

    pub fn register_count(&self) -> usize {
        self.registers.len()
    }

    /// The access code of every register, concatenated for the register engine.
    pub fn access_vector(&self) -> AccessVector {
        AccessVector::from_registers(self.registers.iter().map(|node| node.access))
    }

    /// A human readable listing of the register map.
    pub fn report(&self) -> Report<'_> {
        Report::new(self)
    }
}

impl Model {
    fn validate_declarations(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        let mut seen = HashSet::new();

        if self.fields.is_empty() {
            diagnostics.insert(Diagnostic::empty(Context::new()));
        }

        for node in &self.fields {
            let context = Context::field(&node.ident);

            if !seen.insert(node.ident.as_str()) {
                diagnostics.insert(Diagnostic::duplicate_field(&node.ident, context.clone()));
            }

            diagnostics.extend(node.validate(&context));
        }

        diagnostics
    }

    /// Validate the declared fields and, if packed, the register layout.
    pub fn validate(&self) -> Diagnostics {
        let mut diagnostics = self.validate_declarations();

        if !self.packed {
            return diagnostics;
        }

        if self.fields.is_empty() {
            warn!("model {} declares no fields", self.vlnv);
        }

        for (i, register) in self.registers().enumerate() {
            let expected = i as u32 * REGISTER_STRIDE;

            if register.address != expected {
                diagnostics.insert(Diagnostic::address_gap(
                    register.address,
                    expected,
                    Context::register(register.address),
                ));
            }

            diagnostics.extend(register.validate(&Context::new()));
        }

        for field in self.fields() {
            diagnostics.extend(field.validate_placement(&Context::field(&field.ident)));
        }

        diagnostics
    }
}

/// A view into the register map at a single node.
#[ters]
#[derive(Debug, Clone, Deref, AsRef)]
pub struct View<'cx, N: Node> {
    pub(crate) model: &'cx Model,
    #[get]
    pub(crate) index: N::Index,
    #[deref]
    #[as_ref]
    pub(crate) node: &'cx N,
}

impl<'cx, N: Node> View<'cx, N> {
    pub fn model(&self) -> &'cx Model {
        self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{diagnostic::Kind, field::access::Access};

    fn model(fields: impl IntoIterator<Item = Field>) -> Model {
        let mut model = Model::new("acme:csr:test:1.0".parse().unwrap(), None).with_fields(fields);
        model.pack().expect("expected fields to pack");
        model
    }

    /// (address, access, [(name, offset, width)])
    fn layout(model: &Model) -> Vec<(u32, Access, Vec<(String, u8, u8)>)> {
        model
            .registers()
            .map(|register| {
                (
                    register.address,
                    register.access,
                    register
                        .occupants()
                        .map(|(field, occupant)| {
                            (
                                field.replica_name(occupant.replica),
                                occupant.offset,
                                occupant.width,
                            )
                        })
                        .collect(),
                )
            })
            .collect()
    }

    fn entry(name: &str, offset: u8, width: u8) -> (String, u8, u8) {
        (name.to_string(), offset, width)
    }

    mod packing {
        use super::*;

        /// An empty model only warns, so it still packs (into nothing).
        #[test]
        fn empty() {
            let mut model = Model::new("acme:csr:test".parse().unwrap(), None);

            model.pack().expect("expected an empty model to pack");

            assert_eq!(model.register_count(), 0);
            assert!(model.access_vector().is_empty());
        }

        /// Access kinds are grouped in keyword order, so `ro` precedes `rw`.
        #[test]
        fn groups_by_access() {
            let model = model([
                Field::new("a", 8, Access::ReadWrite),
                Field::new("b", 8, Access::ReadWrite),
                Field::new("c", 4, Access::Read),
            ]);

            assert_eq!(
                layout(&model),
                [
                    (0, Access::Read, vec![entry("c", 0, 4)]),
                    (4, Access::ReadWrite, vec![entry("a", 0, 8), entry("b", 8, 8)]),
                ]
            );
        }

        #[test]
        fn full_width_fills_register() {
            let model = model([
                Field::new("x", 32, Access::Write),
                Field::new("y", 1, Access::Write),
            ]);

            assert_eq!(
                layout(&model),
                [
                    (0, Access::Write, vec![entry("x", 0, 32)]),
                    (4, Access::Write, vec![entry("y", 0, 1)]),
                ]
            );
        }

        #[test]
        fn replicas_are_consecutive() {
            let model = model([Field::new("z", 4, Access::ReadWrite).count(3)]);

            assert_eq!(
                layout(&model),
                [(
                    0,
                    Access::ReadWrite,
                    vec![entry("z[0]", 0, 4), entry("z[1]", 4, 4), entry("z[2]", 8, 4)]
                )]
            );
        }

        /// A replica landing exactly on bit 31 stays in the current register.
        #[test]
        fn exact_fill() {
            let model = model([
                Field::new("hi", 16, Access::ReadWrite),
                Field::new("lo", 16, Access::ReadWrite),
                Field::new("next", 1, Access::ReadWrite),
            ]);

            assert_eq!(
                layout(&model),
                [
                    (0, Access::ReadWrite, vec![entry("hi", 0, 16), entry("lo", 16, 16)]),
                    (4, Access::ReadWrite, vec![entry("next", 0, 1)]),
                ]
            );
        }

        /// Wider fields are placed first; equal widths keep declaration order.
        #[test]
        fn widest_first() {
            let model = model([
                Field::new("narrow", 4, Access::ReadWrite),
                Field::new("wide", 24, Access::ReadWrite),
                Field::new("first", 8, Access::ReadWrite),
                Field::new("second", 8, Access::ReadWrite),
            ]);

            assert_eq!(
                layout(&model),
                [
                    (0, Access::ReadWrite, vec![entry("wide", 0, 24), entry("first", 24, 8)]),
                    (4, Access::ReadWrite, vec![entry("second", 0, 8), entry("narrow", 8, 4)]),
                ]
            );
        }

        /// Replicas spill into a fresh register once the current one is full.
        #[test]
        fn replicas_spill() {
            let model = model([Field::new("lane", 12, Access::Read).count(3)]);

            assert_eq!(
                layout(&model),
                [
                    (0, Access::Read, vec![entry("lane[0]", 0, 12), entry("lane[1]", 12, 12)]),
                    (4, Access::Read, vec![entry("lane[2]", 0, 12)]),
                ]
            );
        }

        #[test]
        fn every_access_kind() {
            let model = model([
                Field::new("clear", 1, Access::WriteOneClear),
                Field::new("go", 1, Access::Write),
                Field::new("state", 2, Access::Read),
                Field::new("mode", 2, Access::ReadWrite),
            ]);

            assert_eq!(
                model.registers().map(|r| r.access).collect::<Vec<_>>(),
                [
                    Access::Read,
                    Access::ReadWrite,
                    Access::WriteOneClear,
                    Access::Write
                ]
            );
        }

        /// Adding a field after packing discards the stale layout.
        #[test]
        fn repack() {
            let mut model = model([Field::new("a", 8, Access::ReadWrite)]);

            model.add_field(Field::new("b", 8, Access::Read));
            assert!(!model.is_packed());
            assert_eq!(model.register_count(), 0);

            model.pack().unwrap();
            assert_eq!(model.register_count(), 2);
            assert_eq!(model.get_field(FieldIndex(0)).slots().len(), 1);
        }

        #[test]
        fn slots_resolve() {
            let model = model([
                Field::new("a", 8, Access::ReadWrite),
                Field::new("c", 4, Access::Read),
            ]);

            let a = model.try_get_field("a").unwrap();
            let placement = a.placements().next().unwrap();

            assert_eq!(placement.register.address, 4);
            assert_eq!(placement.word(), 1);
            assert_eq!(placement.slice(), "[7:0]");
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn rejects_invalid_fields() {
            let mut model = Model::new("acme:csr:test".parse().unwrap(), None).with_fields([
                Field::new("wide", 40, Access::ReadWrite),
                Field::new("none", 1, Access::Read).count(0),
            ]);

            let Err(Error::Validation(diagnostics)) = model.pack() else {
                panic!("expected validation to fail");
            };

            assert!(!model.is_packed());
            assert_eq!(
                diagnostics.iter().map(|d| *d.kind()).collect::<Vec<_>>(),
                [Kind::WidthExceeded, Kind::ZeroCount]
            );
        }

        #[test]
        fn rejects_duplicates() {
            let mut model = Model::new("acme:csr:test".parse().unwrap(), None).with_fields([
                Field::new("a", 1, Access::ReadWrite),
                Field::new("a", 2, Access::Read),
            ]);

            let Err(Error::Validation(diagnostics)) = model.pack() else {
                panic!("expected validation to fail");
            };

            assert!(
                diagnostics
                    .iter()
                    .any(|d| matches!(d.kind(), Kind::DuplicateField))
            );
        }

        #[test]
        fn packed_layout_is_clean() {
            let model = model([
                Field::new("a", 7, Access::ReadWrite).count(5),
                Field::new("b", 32, Access::Read),
                Field::new("c", 3, Access::WriteOneClear).count(11),
                Field::new("d", 17, Access::Write),
            ]);

            assert!(model.validate().is_empty());
        }

        #[test]
        fn empty_warns() {
            let model = Model::new("acme:csr:test".parse().unwrap(), None);
            let diagnostics = model.validate();

            assert_eq!(diagnostics.len(), 1);
            assert!(matches!(
                diagnostics.first().unwrap().rank(),
                diagnostic::Rank::Warning
            ));
        }
    }

    #[test]
    fn empty_instance_is_none() {
        let model = Model::new("acme:csr:test".parse().unwrap(), Some(String::new()));

        assert_eq!(model.instance(), &None);
    }
}
