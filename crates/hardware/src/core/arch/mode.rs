//! Processor Addressing Modes.
//!
//! This module defines the two addressing modes of a tile processor.
//! It implements the following:
//! 1. **Mode Classification:** REAL (local addresses used as-is) and VIRTUAL (translated).
//! 2. **Status Word:** Conversion to and from bit 0 of the status word.

/// Addressing mode of a processor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProcessorMode {
    /// Addresses are local physical addresses; the translator is bypassed.
    #[default]
    Real,
    /// Addresses are virtual and go through the translator.
    Virtual,
}

impl ProcessorMode {
    /// Status-word bit that is set in REAL mode.
    pub const STATUS_REAL_BIT: u64 = 1;

    /// Decodes the mode from a status word.
    pub const fn from_status(status: u64) -> Self {
        if status & Self::STATUS_REAL_BIT != 0 { Self::Real } else { Self::Virtual }
    }

    /// Encodes the mode into a status word.
    pub const fn to_status(self) -> u64 {
        match self {
            Self::Real => Self::STATUS_REAL_BIT,
            Self::Virtual => 0,
        }
    }

    /// The other mode.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Real => Self::Virtual,
            Self::Virtual => Self::Real,
        }
    }
}
