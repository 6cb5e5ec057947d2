//! SCUMM bytecode disassembler and instruction decoding engine.
//!
//! This module turns raw script bytes into [`Instruction`]s. Everything it knows about an
//! instruction set lives in declarative per-version opcode tables; the decoder itself is a
//! small interpreter of [`OperandRule`] values.
//!
//! # Key Types
//! - [`Version`] - Instruction-set revision, selects the opcode table
//! - [`OpcodeTable`] - Resolved table of one version
//! - [`Instruction`] - A decoded instruction
//! - [`Operand`] - Instruction operands (immediates, variables, strings, jumps, sub-forms)
//! - [`DecodedProgram`] - A whole decoded script, keyed by offset
//!
//! # Main Functions
//! - [`decode`] - Decode, validate and verify a script
//! - [`decode_at`] - The same for a script body that does not start at offset 0
//! - [`print_to_binary`] - Parse a rendered string literal back into bytes
//!
//! # Example
//! ```rust
//! use scummscope::{decode, Version};
//!
//! let program = decode(&[0x6C, 0x73, 0xFC, 0xFF], Version::V6)?; // breakHere, jump [0000]
//! assert_eq!(program.encode(), [0x6C, 0x73, 0xFC, 0xFF]);
//! # Ok::<(), scummscope::Error>(())
//! ```

mod decoder;
mod instruction;
mod operand;
mod rule;
mod tables;
mod text;

pub use decoder::{decode, decode_at, Decoder};
pub use instruction::{DecodedProgram, Instruction};
pub use operand::{
    JumpTarget, Operand, Scope, SubOperation, VarEncoding, VarFlags, VariableRef, Width,
};
pub use rule::{Arg, Handler, OpcodeDef, OperandRule};
pub use tables::{OpcodeTable, Overlay, Version};
pub use text::{print_to_binary, Segment, StringLiteral};
