//! Decoded instructions and whole decoded scripts.

use std::{collections::BTreeMap, fmt, fmt::Write};

use crate::disassembler::{JumpTarget, OpcodeDef, Operand, Version};

/// One decoded instruction.
///
/// Instructions are immutable once decoded. Their operands hold everything needed to
/// re-encode the original bytes, see [`Instruction::encode`].
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Script offset of the opcode byte
    pub offset: u32,
    /// The opcode byte as encoded (parameter bits included)
    pub opcode: u8,
    /// Encoded size in bytes, opcode included
    pub size: u32,
    /// Table entry the opcode resolved to
    pub def: &'static OpcodeDef,
    /// Operands in encoding order
    pub operands: Vec<Operand>,
}

impl Instruction {
    /// Mnemonic of the instruction.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.def.name
    }

    /// Offset of the following instruction.
    #[must_use]
    pub fn next_offset(&self) -> u32 {
        self.offset + self.size
    }

    /// Appends the exact encoded bytes of this instruction to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.opcode);
        for operand in &self.operands {
            operand.encode(out);
        }
    }

    /// Returns every jump operand, including those nested in sub-forms.
    #[must_use]
    pub fn jumps(&self) -> Vec<JumpTarget> {
        fn collect(operands: &[Operand], out: &mut Vec<JumpTarget>) {
            for operand in operands {
                match operand {
                    Operand::JumpTarget(jump) => out.push(*jump),
                    Operand::SubOp(sub) => collect(&sub.operands, out),
                    _ => {}
                }
            }
        }

        let mut out = Vec::new();
        collect(&self.operands, &mut out);
        out
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:04X}] {}", self.offset, self.def.name)?;
        for (i, operand) in self
            .operands
            .iter()
            .filter(|operand| !matches!(operand, Operand::End(_)))
            .enumerate()
        {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{operand}")?;
        }
        Ok(())
    }
}

/// A fully decoded script.
///
/// Holds every instruction keyed by offset together with the decoded byte range. Offsets are
/// absolute: a program decoded with a non-zero base (the body of an object script, after its
/// verb table) reports offsets counted from the start of the header.
#[derive(Debug, Clone)]
pub struct DecodedProgram {
    pub(crate) base: u32,
    pub(crate) len: usize,
    pub(crate) version: Version,
    pub(crate) instructions: BTreeMap<u32, Instruction>,
}

impl DecodedProgram {
    /// Number of decoded bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if nothing was decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Offset of the first byte.
    #[must_use]
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Offset one past the last byte.
    #[must_use]
    pub fn end(&self) -> u32 {
        self.base + self.len as u32
    }

    /// Instruction-set version the program was decoded with.
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Number of instructions.
    #[must_use]
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    /// Iterates over the instructions in offset order.
    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.values()
    }

    /// Returns the instruction starting at `offset`.
    #[must_use]
    pub fn get(&self, offset: u32) -> Option<&Instruction> {
        self.instructions.get(&offset)
    }

    /// Returns `true` if an instruction starts at `offset`.
    #[must_use]
    pub fn contains(&self, offset: u32) -> bool {
        self.instructions.contains_key(&offset)
    }

    /// Re-encodes every instruction in offset order.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len);
        for instr in self.instructions.values() {
            instr.encode(&mut out);
        }
        out
    }

    /// Renders a disassembly listing, one instruction per line.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scummscope::{decode, Version};
    ///
    /// let program = decode(&[0x00, 0x05, 0x43, 0x00, 0x40], Version::V6)?;
    /// assert_eq!(program.listing(), "[0000] pushByte 5\n[0002] writeWordVar L.0\n");
    /// # Ok::<(), scummscope::Error>(())
    /// ```
    #[must_use]
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for instr in self.instructions.values() {
            let _ = writeln!(out, "{instr}");
        }
        out
    }
}

impl<'a> IntoIterator for &'a DecodedProgram {
    type Item = &'a Instruction;
    type IntoIter = std::collections::btree_map::Values<'a, u32, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.values()
    }
}
