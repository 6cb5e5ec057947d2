//! Decoded instruction operands.
//!
//! An [`Operand`] is one value read from the byte stream by an
//! [`crate::disassembler::OperandRule`]. Besides the four value kinds (immediates, variable
//! references, string literals and jump targets) an operand list also records the composite
//! structure of an instruction: the sub-opcode selectors, the V5 argument list items and the
//! list terminators. Keeping those in the operand list is what makes every instruction
//! re-encodable byte for byte.

use std::fmt;

use bitflags::bitflags;

use crate::{
    disassembler::{rule::OpcodeDef, text::StringLiteral},
    file::io::write_le,
};

/// Storage width of an immediate or variable number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    /// One byte
    Byte,
    /// Two bytes, little-endian
    Word,
    /// Three bytes, little-endian (the V5 `delay` operand)
    Tri,
    /// Four bytes, little-endian
    DWord,
}

impl Width {
    /// Returns the encoded size in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Width::Byte => 1,
            Width::Word => 2,
            Width::Tri => 3,
            Width::DWord => 4,
        }
    }

    /// Interprets the low `size()` bytes of `raw` as a signed or unsigned value.
    #[must_use]
    pub const fn extend(self, raw: u32, signed: bool) -> i64 {
        match (self, signed) {
            (Width::Byte, false) => (raw & 0xFF) as i64,
            (Width::Byte, true) => raw as u8 as i8 as i64,
            (Width::Word, false) => (raw & 0xFFFF) as i64,
            (Width::Word, true) => raw as u16 as i16 as i64,
            (Width::Tri, _) => (raw & 0x00FF_FFFF) as i64,
            (Width::DWord, false) => raw as i64,
            (Width::DWord, true) => raw as i32 as i64,
        }
    }
}

bitflags! {
    /// Flag bits of an encoded variable word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VarFlags: u16 {
        /// Bit variable (room variable from HE80 on)
        const BIT = 0x8000;
        /// Script-local variable
        const LOCAL = 0x4000;
        /// V5 only: an index word follows and is added to the variable number
        const INDIRECT = 0x2000;
    }
}

/// Storage class of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Engine-wide variable
    Global,
    /// Variable private to the running script
    Local,
    /// Variable private to the current room (HE80+)
    Room,
    /// Single-bit flag variable
    Bit,
}

/// How the flag bits of a variable word map onto scopes for a version family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarEncoding {
    /// V5: bit, local and indirect flags
    Classic,
    /// V6 through HE72: bit and local flags
    Stack,
    /// HE80+: the bit flag selects room variables
    StackRoom,
}

impl VarEncoding {
    /// Splits an encoded variable word into its scope and index.
    ///
    /// The V5 indirection flag is ignored here; the decoder deals with it before calling this.
    #[must_use]
    pub fn split(self, raw: u16) -> (Scope, u16) {
        let raw = if self == VarEncoding::Classic {
            raw & !VarFlags::INDIRECT.bits()
        } else {
            raw
        };
        let flags = VarFlags::from_bits_truncate(raw);

        if flags.contains(VarFlags::BIT) {
            let scope = if self == VarEncoding::StackRoom {
                Scope::Room
            } else {
                Scope::Bit
            };
            (scope, raw & 0x7FFF)
        } else if flags.contains(VarFlags::LOCAL) {
            (Scope::Local, raw & 0x0FFF)
        } else {
            (Scope::Global, raw)
        }
    }

    /// Returns `true` if `raw` announces a nested index word.
    #[must_use]
    pub fn is_indirect(self, raw: u16) -> bool {
        self == VarEncoding::Classic && VarFlags::from_bits_truncate(raw).contains(VarFlags::INDIRECT)
    }
}

/// A reference to a script variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableRef {
    /// Storage class
    pub scope: Scope,
    /// Variable number within its scope
    pub index: u16,
    /// The variable word exactly as encoded
    pub raw: u16,
    /// Encoded width (byte variables exist only in V6 push/write forms)
    pub width: Width,
    /// V5 indexed variable: the index operand added to `index` at runtime
    pub nested: Option<Box<Operand>>,
}

impl VariableRef {
    /// Returns `true` for script-local variables.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.scope == Scope::Local
    }

    /// Returns `true` if both references name the same variable, whatever their encoding.
    #[must_use]
    pub fn same_slot(&self, other: &VariableRef) -> bool {
        self.scope == other.scope && self.index == other.index && self.nested == other.nested
    }

    /// Writes the encoded form, nested index word included.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match self.width {
            Width::Byte => out.push(self.raw as u8),
            _ => write_le(out, self.raw),
        }
        if let Some(nested) = &self.nested {
            nested.encode(out);
        }
    }
}

impl fmt::Display for VariableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.scope {
            Scope::Global => "V",
            Scope::Local => "L",
            Scope::Room => "R",
            Scope::Bit => "B",
        };
        write!(f, "{prefix}.{}", self.index)?;
        if let Some(nested) = &self.nested {
            write!(f, "[{nested}]")?;
        }
        Ok(())
    }
}

/// A relative jump displacement.
///
/// Only the displacement and the position right after the displacement field are stored; the
/// absolute target is always derived from those two, so it can never drift out of sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpTarget {
    /// Signed displacement as encoded
    pub relative: i32,
    /// Absolute offset immediately following the displacement field
    pub field_end: u32,
}

impl JumpTarget {
    /// Absolute target offset. May be negative or beyond the script for malformed input.
    #[must_use]
    pub fn resolved_absolute(&self) -> i64 {
        i64::from(self.field_end) + i64::from(self.relative)
    }
}

/// One sub-form of a composite opcode.
#[derive(Debug, Clone, PartialEq)]
pub struct SubOperation {
    /// The selector byte as encoded (parameter bits included)
    pub selector: u8,
    /// The nested table entry the selector resolved to
    pub def: &'static OpcodeDef,
    /// Operands of the sub-form
    pub operands: Vec<Operand>,
}

/// A single decoded operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// An integer constant
    Immediate {
        /// Encoded width
        width: Width,
        /// Whether the value was sign-extended
        signed: bool,
        /// The value
        value: i64,
    },
    /// A variable reference
    VariableRef(VariableRef),
    /// A NUL-terminated string with embedded control codes
    StringLiteral(StringLiteral),
    /// A relative jump
    JumpTarget(JumpTarget),
    /// A sub-opcode selector and the operands of its sub-form
    SubOp(SubOperation),
    /// A V5 argument list item: the mode byte and the value it announced
    VarArg {
        /// Mode byte as encoded; bit 7 selects a variable
        prefix: u8,
        /// The argument value
        value: Box<Operand>,
    },
    /// A list or loop terminator byte
    End(u8),
}

impl Operand {
    /// Appends the exact encoded bytes of this operand to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        match self {
            Operand::Immediate { width, value, .. } => {
                let bytes = (*value as u32).to_le_bytes();
                out.extend_from_slice(&bytes[..width.size()]);
            }
            Operand::VariableRef(var) => var.encode(out),
            Operand::StringLiteral(text) => text.encode(out),
            Operand::JumpTarget(jump) => write_le(out, jump.relative as i16),
            Operand::SubOp(sub) => {
                out.push(sub.selector);
                for operand in &sub.operands {
                    operand.encode(out);
                }
            }
            Operand::VarArg { prefix, value } => {
                out.push(*prefix);
                value.encode(out);
            }
            Operand::End(byte) => out.push(*byte),
        }
    }

    /// Returns the jump target if this operand is one.
    #[must_use]
    pub fn as_jump(&self) -> Option<&JumpTarget> {
        match self {
            Operand::JumpTarget(jump) => Some(jump),
            _ => None,
        }
    }

    /// Returns the value of an immediate operand.
    #[must_use]
    pub fn as_immediate(&self) -> Option<i64> {
        match self {
            Operand::Immediate { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Returns the variable of a variable reference operand.
    #[must_use]
    pub fn as_variable(&self) -> Option<&VariableRef> {
        match self {
            Operand::VariableRef(var) => Some(var),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Immediate { value, .. } => write!(f, "{value}"),
            Operand::VariableRef(var) => write!(f, "{var}"),
            Operand::StringLiteral(text) => write!(f, "\"{}\"", text.render()),
            Operand::JumpTarget(jump) => write!(f, "[{:04X}]", jump.resolved_absolute()),
            Operand::SubOp(sub) => {
                write!(f, "{}(", sub.def.name)?;
                for (i, operand) in sub.operands.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{operand}")?;
                }
                write!(f, ")")
            }
            Operand::VarArg { value, .. } => write!(f, "{value}"),
            Operand::End(byte) => write!(f, "<{byte:02X}>"),
        }
    }
}
