use std::fmt::Display;

use colored::Colorize;
use derive_more::{AsRef, Deref};
use indexmap::{IndexMap, IndexSet};
use ters::ters;

use crate::field::access::Access;

/// Elaborates diagnostics that may be emitted during model validation.
#[ters]
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Diagnostic {
    #[get]
    rank: Rank,
    #[get]
    kind: Kind,
    #[get]
    message: String,
    notes: Vec<String>,
    #[get]
    context: Context,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Kind {
    // declaration
    WidthExceeded,
    ZeroWidth,
    InvalidAccess,
    ZeroCount,
    UnknownProperty,
    InvalidProperty,
    DuplicateField,

    // layout
    Overflow = 1000,
    MixedAccess,
    Overlap,
    AddressGap,
    Unplaced,

    // model
    Empty = 2000,
}

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum Rank {
    Warning,
    Error,
}

impl Diagnostic {
    pub fn new(rank: Rank, kind: Kind, message: impl Into<String>, context: Context) -> Self {
        Self {
            rank,
            kind,
            message: message.into(),
            notes: Default::default(),
            context,
        }
    }

    /// field width {width} exceeds the register width
    ///
    /// note: width must satisfy: 1 <= width <= 32
    pub fn width_exceeded(width: impl Display, limit: u8, context: Context) -> Self {
        let width = format!("{width}").bold();

        Self::new(
            Rank::Error,
            Kind::WidthExceeded,
            format!("field width {width} exceeds the {limit}-bit register width"),
            context,
        )
        .notes([format!("width must satisfy: 1 <= width <= {limit}")])
    }

    /// field width {width} is empty
    pub fn zero_width(width: impl Display, limit: u8, context: Context) -> Self {
        let width = format!("{width}").bold();

        Self::new(
            Rank::Error,
            Kind::ZeroWidth,
            format!("field width {width} does not occupy any bits"),
            context,
        )
        .notes([format!("width must satisfy: 1 <= width <= {limit}")])
    }

    /// invalid access type "foo", valid types: {ro, rw, wo, w1c}
    pub fn invalid_access(offending: &impl Display, context: Context) -> Self {
        let offending = format!("{offending}").bold();
        let valid = Access::keywords().join(", ");

        Self::new(
            Rank::Error,
            Kind::InvalidAccess,
            format!("invalid access type \"{offending}\", valid types: {{{valid}}}"),
            context,
        )
    }

    /// field count {count} must be at least 1
    pub fn zero_count(count: impl Display, context: Context) -> Self {
        let count = format!("{count}").bold();

        Self::new(
            Rank::Error,
            Kind::ZeroCount,
            format!("field count {count} must be at least 1"),
            context,
        )
    }

    /// unknown property "foo"
    ///
    /// note: known properties: [width, type, count]
    pub fn unknown_property<R: AsRef<str>>(
        offending: &impl Display,
        known: impl Iterator<Item = R>,
        context: Context,
    ) -> Self {
        let offending = format!("{offending}").bold();
        let known = known
            .map(|k| k.as_ref().bold().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        Self::new(
            Rank::Error,
            Kind::UnknownProperty,
            format!("unknown property \"{offending}\""),
            context,
        )
        .notes([format!("known properties: [{known}]")])
    }

    /// property "width" expects an integer, found text
    pub fn invalid_property(
        property: &impl Display,
        expected: &str,
        found: &impl Display,
        context: Context,
    ) -> Self {
        let property = format!("{property}").bold();

        Self::new(
            Rank::Error,
            Kind::InvalidProperty,
            format!("property \"{property}\" expects {expected}, found {found}"),
            context,
        )
    }

    /// field [foo] is declared more than once
    pub fn duplicate_field(offending: &impl Display, context: Context) -> Self {
        let offending = format!("{offending}").bold();

        Self::new(
            Rank::Error,
            Kind::DuplicateField,
            format!("field [{offending}] is declared more than once"),
            context,
        )
    }

    /// register occupies {occupied} bits, exceeding {limit}
    pub fn overflow(occupied: u32, limit: u8, context: Context) -> Self {
        let occupied = occupied.to_string().bold();

        Self::new(
            Rank::Error,
            Kind::Overflow,
            format!("register occupies {occupied} bits, exceeding the {limit}-bit register width"),
            context,
        )
    }

    /// field [foo] with access {offending} resides in a register with access {expected}
    pub fn mixed_access(
        offending: &impl Display,
        offending_access: Access,
        expected: Access,
        context: Context,
    ) -> Self {
        let offending = format!("{offending}").bold();
        let offending_access = offending_access.keyword().bold();
        let expected = expected.keyword().bold();

        Self::new(
            Rank::Error,
            Kind::MixedAccess,
            format!(
                "field [{offending}] with access {offending_access} resides in a register with access {expected}"
            ),
            context,
        )
    }

    /// fields [lhs] and [rhs] overlap, occupying {occupied}
    pub fn overlap(
        lhs: &impl Display,
        rhs: &impl Display,
        occupied: &impl Display,
        context: Context,
    ) -> Self {
        let lhs = format!("{lhs}").bold();
        let rhs = format!("{rhs}").bold();
        let occupied = format!("{occupied}").bold();

        Self::new(
            Rank::Error,
            Kind::Overlap,
            format!("fields [{lhs}] and [{rhs}] overlap, occupying {occupied}"),
            context,
        )
    }

    /// register is allocated at {found} but the next free address is {expected}
    pub fn address_gap(found: u32, expected: u32, context: Context) -> Self {
        let found = format!("0x{found:04x}").bold();
        let expected = format!("0x{expected:04x}").bold();

        Self::new(
            Rank::Error,
            Kind::AddressGap,
            format!("register is allocated at {found} but the next free address is {expected}"),
            context,
        )
    }

    /// field [foo] has {placed} of {count} replicas placed
    pub fn unplaced(offending: &impl Display, placed: usize, count: u32, context: Context) -> Self {
        let offending = format!("{offending}").bold();

        Self::new(
            Rank::Error,
            Kind::Unplaced,
            format!("field [{offending}] has {placed} of {count} replicas placed"),
            context,
        )
    }

    /// no fields are declared
    pub fn empty(context: Context) -> Self {
        Self::new(
            Rank::Warning,
            Kind::Empty,
            "no fields are declared, the register file would be empty",
            context,
        )
    }

    pub fn notes<I>(mut self, notes: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.notes
            .extend(notes.into_iter().map(|e| e.as_ref().to_string()));

        self
    }

    pub fn report(diagnostics: &Diagnostics) -> String {
        let mut diagnostic_groups = IndexMap::new();

        for diagnostic in diagnostics {
            diagnostic_groups
                .entry(diagnostic.context.clone())
                .or_insert(vec![])
                .push(diagnostic);
        }

        diagnostic_groups
            .iter()
            .map(|(context, diagnostics)| {
                let diagnostics = diagnostics
                    .iter()
                    .map(|diagnostic| diagnostic.to_string())
                    .collect::<Vec<_>>()
                    .join("\n");

                if context.is_empty() {
                    diagnostics.to_string()
                } else {
                    format!("in {context}:\n{diagnostics}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let notes = if !self.notes.is_empty() {
            format!(
                "\n{}",
                self.notes
                    .iter()
                    .map(|note| format!("  {}: {note}", "note".bright_blue().bold()))
                    .collect::<Vec<_>>()
                    .join("\n")
            )
        } else {
            String::new()
        };

        let code = format!("[E{:04}]", self.kind as u32);

        let header = match &self.rank {
            Rank::Warning => format!("warning{code}").yellow().bold(),
            Rank::Error => format!("error{code}").red().bold(),
        };

        write!(f, "{header}: {}{notes}", self.message)
    }
}

pub type Diagnostics = IndexSet<Diagnostic>;

impl From<Diagnostic> for Diagnostics {
    fn from(diagnostic: Diagnostic) -> Self {
        IndexSet::from([diagnostic])
    }
}

/// Count the warnings and errors in a set of diagnostics.
pub fn tally(diagnostics: &Diagnostics) -> (usize, usize) {
    diagnostics
        .iter()
        .fold((0, 0), |(warnings, errors), diagnostic| match diagnostic.rank {
            Rank::Warning => (warnings + 1, errors),
            Rank::Error => (warnings, errors + 1),
        })
}

/// Where in the model a diagnostic originates.
#[ters]
#[derive(Debug, Clone, PartialEq, Eq, Hash, AsRef, Deref)]
pub struct Context {
    #[get]
    path: Vec<String>,
}

#[expect(clippy::new_without_default)]
impl Context {
    pub fn new() -> Self {
        Context { path: Vec::new() }
    }

    pub fn and(mut self, segment: String) -> Self {
        self.path.push(segment);
        self
    }

    pub fn field(ident: impl Display) -> Self {
        Self::new().and(format!("field {ident}"))
    }

    pub fn register(address: u32) -> Self {
        Self::new().and(format!("register 0x{address:04x}"))
    }
}

impl Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            self.path
                .iter()
                .map(|segment| segment.bold().to_string())
                .collect::<Vec<_>>()
                .join("/")
        )
    }
}
