//! The access vector packs the 2-bit access code of every register into the
//! single `ACCESS` value consumed by the register engine.
//!
//! The vector is assembled by prepending each newly allocated register's code
//! to the front of a Verilog concatenation, so the first register ends up in
//! the least significant group. Group `i` (bits `2i+1:2i`) therefore always
//! describes the register at address `4 * i`, matching the engine's
//! `REGIN[i]`/`REGOUT[i]` word indexing.

use std::fmt::Display;

use crate::field::access::Access;

/// Bits per access code.
pub const CODE_WIDTH: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessVector {
    /// Indexed by register word.
    codes: Vec<Access>,
}

impl AccessVector {
    pub fn from_registers(accesses: impl IntoIterator<Item = Access>) -> Self {
        Self {
            codes: accesses.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn bit_len(&self) -> usize {
        self.codes.len() * CODE_WIDTH
    }

    /// The access kind encoded by group `i`, which belongs to register word `i`.
    pub fn group(&self, i: usize) -> Option<Access> {
        self.codes.get(i).copied()
    }

    /// Every group, least significant first.
    pub fn groups(&self) -> impl Iterator<Item = (usize, Access)> + '_ {
        self.codes.iter().copied().enumerate()
    }

    /// The vector spelled as a Verilog concatenation of per-register codes,
    /// e.g. `{2'b00,2'b01}`.
    pub fn concatenation(&self) -> String {
        let codes = self.codes.iter().fold(String::new(), |acc, access| {
            let code = format!("{CODE_WIDTH}'b{:02b}", access.code());

            if acc.is_empty() {
                code
            } else {
                format!("{code},{acc}")
            }
        });

        format!("{{{codes}}}")
    }

    /// The raw bits, most significant first.
    pub fn bits(&self) -> String {
        self.codes
            .iter()
            .rev()
            .map(|access| format!("{:02b}", access.code()))
            .collect()
    }
}

impl Display for AccessVector {
    /// A single sized literal, e.g. `4'b0001`. An empty vector is `'0`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_str("'0");
        }

        write!(f, "{}'b{}", self.bit_len(), self.bits())
    }
}
