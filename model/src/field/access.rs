//! Every field declares one access kind, which fixes how software on the bus
//! and the hardware behind the register file may touch the field:
//!
//! | Kind  | Keyword | Code    | Software Access      | Hardware Ports      |
//! | ----- | ------- | ------- | -------------------- | ------------------- |
//! | ReadWrite     | `rw`  | `2'b00` | Read/Write           | `<f>_i` and `<f>_o` |
//! | Read          | `ro`  | `2'b01` | Read                 | `<f>` (input)       |
//! | Write         | `wo`  | `2'b10` | Write                | `<f>` (output)      |
//! | WriteOneClear | `w1c` | `2'b11` | Read/Write-1-to-clear | `<f>_i` and `<f>_o` |
//!
//! The 2-bit code is what the register engine consumes through its `ACCESS`
//! vector, one code per register.

use std::{fmt::Display, str::FromStr};

use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, Hash, PartialEq, Eq)]
pub enum Access {
    #[default]
    ReadWrite,
    Read,
    Write,
    WriteOneClear,
}

/// The direction of a hardware port, as seen from the generated wrapper.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Direction {
    /// Driven by user logic into the register file (`csri`).
    Input,
    /// Driven by the register file (`csro`) out to user logic.
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid access type \"{0}\", valid types: {{{valid}}}", valid = Access::keywords().join(", "))]
pub struct UnknownAccess(pub String);

impl Access {
    /// All access kinds, in keyword order.
    pub const ALL: [Self; 4] = [
        Self::Read,
        Self::ReadWrite,
        Self::Write,
        Self::WriteOneClear,
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::ReadWrite => "rw",
            Self::Read => "ro",
            Self::Write => "wo",
            Self::WriteOneClear => "w1c",
        }
    }

    pub fn keywords() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::keyword).collect()
    }

    /// The 2-bit access code understood by the register engine.
    pub fn code(&self) -> u8 {
        match self {
            Self::ReadWrite => 0b00,
            Self::Read => 0b01,
            Self::Write => 0b10,
            Self::WriteOneClear => 0b11,
        }
    }

    /// The port directions a field of this kind exposes on the wrapper.
    pub fn directions(&self) -> &'static [Direction] {
        match self {
            Self::ReadWrite | Self::WriteOneClear => &[Direction::Input, Direction::Output],
            Self::Read => &[Direction::Input],
            Self::Write => &[Direction::Output],
        }
    }

    /// Whether a field of this kind needs one port per direction.
    pub fn is_bidirectional(&self) -> bool {
        self.directions().len() > 1
    }
}

impl FromStr for Access {
    type Err = UnknownAccess;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|access| access.keyword() == s)
            .ok_or_else(|| UnknownAccess(s.to_string()))
    }
}

impl Display for Access {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

impl Direction {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }

    /// Suffix appended to the field name when the field is bidirectional.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Input => "_i",
            Self::Output => "_o",
        }
    }
}
