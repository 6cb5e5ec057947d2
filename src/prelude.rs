//! # scummscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types from the
//! scummscope library. Import it to get quick access to everything needed to decode and
//! decompile scripts.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all scummscope operations
pub use crate::Error;

/// A failed script decompilation with its partial results
pub use crate::Failure;

/// The result type used throughout scummscope
pub use crate::Result;

/// Bounds-checked reading of script bytes
pub use crate::Parser;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Script decompiler and its configuration
pub use crate::decompiler::{Decompiler, DecompilerOptions};

/// Script descriptions handed to the decompiler
pub use crate::decompiler::{ScriptKind, ScriptSource};

// ================================================================================================
// Disassembler
// ================================================================================================

/// Decoding entry points
pub use crate::disassembler::{decode, decode_at, Decoder};

/// Instruction-set versions and their resolved opcode tables
pub use crate::disassembler::{OpcodeTable, Version};

/// Decoded instructions and their operands
pub use crate::disassembler::{
    DecodedProgram, Instruction, JumpTarget, Operand, Scope, StringLiteral, VariableRef,
};

// ================================================================================================
// Decompiler Internals
// ================================================================================================

/// Symbolic program representation
pub use crate::decompiler::{Expr, Statement, StatementKind};

/// Individual passes, for tooling that inspects intermediate results
pub use crate::decompiler::{evaluate, segment, ControlGraph, Evaluation, VerbTable};
