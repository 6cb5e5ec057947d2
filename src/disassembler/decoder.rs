//! SCUMM bytecode decoding ("descumm").
//!
//! The decoder walks a script linearly from its first byte to its last, one instruction at a
//! time, and never guesses: an opcode missing from the version's table, an operand running past
//! the end of the script, a jump into the middle of an instruction or a decode that does not
//! re-encode to the very same bytes all abort the script.
//!
//! # Example: Decoding a Script
//!
//! ```rust
//! use scummscope::{decode, Version};
//!
//! // pushByte 5, writeWordVar L.0
//! let program = decode(&[0x00, 0x05, 0x43, 0x00, 0x40], Version::V6)?;
//! assert_eq!(program.instruction_count(), 2);
//! assert_eq!(program.get(2).unwrap().name(), "writeWordVar");
//! # Ok::<(), scummscope::Error>(())
//! ```
//!
//! # Example: Keeping Partial Results
//!
//! ```rust
//! use scummscope::{disassembler::Decoder, Error, Version};
//!
//! // pushByte 5, then an opcode V6 does not know
//! let data = [0x00, 0x05, 0xFF];
//! let mut decoder = Decoder::new(&data, 0, Version::V6);
//! assert!(matches!(decoder.decode_all(), Err(Error::UnknownOpcode { offset: 2, .. })));
//! assert_eq!(decoder.into_partial().len(), 1);
//! ```

use std::collections::BTreeMap;

use crate::{
    disassembler::{
        DecodedProgram, Instruction, JumpTarget, OpcodeDef, OpcodeTable, Operand, OperandRule,
        StringLiteral, SubOperation, VarEncoding, VariableRef, Version, Width,
    },
    Error, Parser, Result,
};

/// Terminator byte of selector loops and V5 argument lists.
const LIST_END: u8 = 0xFF;

/// A stateful decoder over one script body.
///
/// `base` is the script offset of the first byte of `data`; every offset the decoder reports,
/// jump targets included, is absolute.
pub struct Decoder<'a> {
    parser: Parser<'a>,
    base: u32,
    version: Version,
    table: &'static OpcodeTable,
    encoding: VarEncoding,
    instructions: BTreeMap<u32, Instruction>,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder for `data`, whose first byte sits at script offset `base`.
    #[must_use]
    pub fn new(data: &'a [u8], base: u32, version: Version) -> Self {
        Decoder {
            parser: Parser::new(data),
            base,
            version,
            table: OpcodeTable::for_version(version),
            encoding: version.var_encoding(),
            instructions: BTreeMap::new(),
        }
    }

    /// Instructions decoded so far, in offset order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.values()
    }

    /// Consumes the decoder and returns the instructions decoded so far.
    ///
    /// Used for diagnostics after a failed decode.
    #[must_use]
    pub fn into_partial(self) -> Vec<Instruction> {
        self.instructions.into_values().collect()
    }

    /// Consumes the decoder and returns the decoded program.
    #[must_use]
    pub fn into_program(self) -> DecodedProgram {
        DecodedProgram {
            base: self.base,
            len: self.parser.len(),
            version: self.version,
            instructions: self.instructions,
        }
    }

    /// Decodes every instruction from the current position to the end of the data.
    ///
    /// # Errors
    /// Returns [`Error::UnknownOpcode`] or [`Error::OutOfBounds`] for undecodable input. The
    /// instructions decoded before the failure are kept.
    pub fn decode_all(&mut self) -> Result<()> {
        while self.parser.has_more_data() {
            let instruction = self.decode_instruction()?;
            log::trace!("{instruction}");
            self.instructions.insert(instruction.offset, instruction);
        }

        log::debug!(
            "decoded {} instructions ({} bytes, {})",
            self.instructions.len(),
            self.parser.len(),
            self.version
        );
        Ok(())
    }

    /// Checks that every jump lands on the first byte of a decoded instruction.
    ///
    /// # Errors
    /// Returns [`Error::DanglingJumpTarget`] for the first jump that does not.
    pub fn validate_jumps(&self) -> Result<()> {
        for instr in self.instructions.values() {
            for jump in instr.jumps() {
                let target = jump.resolved_absolute();
                let lands = u32::try_from(target)
                    .map(|target| self.instructions.contains_key(&target))
                    .unwrap_or(false);
                if !lands {
                    return Err(Error::DanglingJumpTarget {
                        offset: instr.offset,
                        target,
                    });
                }
            }
        }
        Ok(())
    }

    /// Re-encodes the decoded instructions and compares them with the input.
    ///
    /// # Errors
    /// Returns [`Error::RoundTripMismatch`] at the first differing byte. This always means an
    /// opcode table entry is wrong, never that the input is.
    pub fn verify_round_trip(&self) -> Result<()> {
        let data = self.parser.data();
        let mut encoded = Vec::with_capacity(data.len());
        for instr in self.instructions.values() {
            instr.encode(&mut encoded);
        }

        let mismatch = data
            .iter()
            .zip(encoded.iter())
            .position(|(expected, actual)| expected != actual)
            .or_else(|| (data.len() != encoded.len()).then(|| data.len().min(encoded.len())));

        match mismatch {
            None => Ok(()),
            Some(position) => Err(Error::RoundTripMismatch {
                offset: self.base + position as u32,
                expected: data.get(position).copied().unwrap_or(0),
                actual: encoded.get(position).copied().unwrap_or(0),
            }),
        }
    }

    fn offset(&self) -> u32 {
        self.base + self.parser.pos() as u32
    }

    fn decode_instruction(&mut self) -> Result<Instruction> {
        let offset = self.offset();
        let opcode = self.parser.read_le::<u8>()?;
        let def = self.table.lookup(opcode, offset)?;

        let mut operands = Vec::new();
        self.read_operands(def.rule, opcode, &mut operands)?;

        Ok(Instruction {
            offset,
            opcode,
            size: self.offset() - offset,
            def,
            operands,
        })
    }

    /// Reads the operands described by `rule`. `mode` is the byte whose parameter bits decide
    /// between immediates and variables: the opcode, or the selector inside a sub-form.
    fn read_operands(&mut self, rule: OperandRule, mode: u8, out: &mut Vec<Operand>) -> Result<()> {
        match rule {
            OperandRule::None => {}
            OperandRule::Imm(width, signed) => out.push(self.read_immediate(width, signed)?),
            OperandRule::Var(width) => out.push(Operand::VariableRef(self.read_variable(width)?)),
            OperandRule::Str => {
                out.push(Operand::StringLiteral(StringLiteral::read(&mut self.parser)?));
            }
            OperandRule::Jump => {
                let relative = self.parser.read_le::<i16>()?;
                out.push(Operand::JumpTarget(JumpTarget {
                    relative: i32::from(relative),
                    field_end: self.offset(),
                }));
            }
            OperandRule::Param { bit, width } => {
                if mode & bit != 0 {
                    out.push(Operand::VariableRef(self.read_variable(Width::Word)?));
                } else {
                    out.push(self.read_immediate(width, width == Width::Word)?);
                }
            }
            OperandRule::Seq(rules) => {
                for rule in rules {
                    self.read_operands(*rule, mode, out)?;
                }
            }
            OperandRule::Sub { mask, table } => {
                out.push(Operand::SubOp(self.read_sub(mask, table)?));
            }
            OperandRule::Loop { mask, table } => loop {
                if self.parser.peek_byte()? == LIST_END {
                    self.parser.read_le::<u8>()?;
                    out.push(Operand::End(LIST_END));
                    break;
                }
                let sub = self.read_sub(mask, table)?;
                let terminal = sub.def.terminal;
                out.push(Operand::SubOp(sub));
                if terminal {
                    break;
                }
            },
            OperandRule::VarArgs => loop {
                let prefix = self.parser.read_le::<u8>()?;
                if prefix == LIST_END {
                    out.push(Operand::End(LIST_END));
                    break;
                }
                let value = if prefix & 0x80 != 0 {
                    Operand::VariableRef(self.read_variable(Width::Word)?)
                } else {
                    self.read_immediate(Width::Word, true)?
                };
                out.push(Operand::VarArg {
                    prefix,
                    value: Box::new(value),
                });
            },
        }
        Ok(())
    }

    fn read_sub(&mut self, mask: u8, table: &'static [OpcodeDef]) -> Result<SubOperation> {
        let offset = self.offset();
        let selector = self.parser.read_le::<u8>()?;
        let def = OpcodeDef::find(table, selector, mask).ok_or(Error::UnknownOpcode {
            opcode: selector,
            offset,
        })?;

        let mut operands = Vec::new();
        self.read_operands(def.rule, selector, &mut operands)?;

        Ok(SubOperation {
            selector,
            def,
            operands,
        })
    }

    fn read_immediate(&mut self, width: Width, signed: bool) -> Result<Operand> {
        let raw = match width {
            Width::Byte => u32::from(self.parser.read_le::<u8>()?),
            Width::Word => u32::from(self.parser.read_le::<u16>()?),
            Width::Tri => self.parser.read_u24_le()?,
            Width::DWord => self.parser.read_le::<u32>()?,
        };
        Ok(Operand::Immediate {
            width,
            signed,
            value: width.extend(raw, signed),
        })
    }

    fn read_variable(&mut self, width: Width) -> Result<VariableRef> {
        let raw = match width {
            Width::Byte => u16::from(self.parser.read_le::<u8>()?),
            _ => self.parser.read_le::<u16>()?,
        };
        let (scope, index) = self.encoding.split(raw);

        let nested = if width == Width::Word && self.encoding.is_indirect(raw) {
            let inner = self.parser.read_le::<u16>()?;
            let operand = if self.encoding.is_indirect(inner) {
                let (scope, index) = self.encoding.split(inner);
                Operand::VariableRef(VariableRef {
                    scope,
                    index,
                    raw: inner,
                    width: Width::Word,
                    nested: None,
                })
            } else {
                Operand::Immediate {
                    width: Width::Word,
                    signed: false,
                    value: i64::from(inner),
                }
            };
            Some(Box::new(operand))
        } else {
            None
        };

        Ok(VariableRef {
            scope,
            index,
            raw,
            width,
            nested,
        })
    }
}

/// Decodes a script whose first byte is at offset 0.
///
/// # Errors
/// See [`decode_at`].
pub fn decode(data: &[u8], version: Version) -> Result<DecodedProgram> {
    decode_at(data, 0, version)
}

/// Decodes a script body whose first byte sits at script offset `base`, validates every jump
/// and verifies the round trip.
///
/// # Errors
/// Returns [`Error::Empty`] for empty input, [`Error::UnknownOpcode`] or
/// [`Error::OutOfBounds`] for undecodable bytes, [`Error::DanglingJumpTarget`] for a jump
/// between instructions and [`Error::RoundTripMismatch`] if re-encoding differs.
pub fn decode_at(data: &[u8], base: u32, version: Version) -> Result<DecodedProgram> {
    if data.is_empty() {
        return Err(Error::Empty);
    }

    let mut decoder = Decoder::new(data, base, version);
    decoder.decode_all()?;
    decoder.validate_jumps()?;
    decoder.verify_round_trip()?;
    Ok(decoder.into_program())
}
