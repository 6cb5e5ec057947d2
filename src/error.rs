use std::fmt::Write;

use thiserror::Error;

use crate::{decompiler::Statement, disassembler::Instruction};

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every error is local to the script being decompiled. None of them is recoverable at the
/// level of that script: the decoder never guesses an instruction layout and the evaluator
/// never invents a stack value, so a failure always aborts the current script and leaves
/// other scripts untouched.
///
/// # Error Categories
///
/// ## Decoding Errors
/// - [`Error::OutOfBounds`] - An operand ran past the end of the script
/// - [`Error::UnknownOpcode`] - The opcode (or sub-opcode selector) has no table entry
/// - [`Error::DanglingJumpTarget`] - A jump lands between instructions
/// - [`Error::RoundTripMismatch`] - Re-encoding did not reproduce the input
///
/// ## Evaluation Errors
/// - [`Error::StackUnderflow`] - A handler popped more values than were pushed
/// - [`Error::UnhandledOpcode`] - A table entry has no evaluator family
/// - [`Error::StackAcrossBranch`] - Values stay on the stack across a jump or a jump target
///
/// ## Segmentation Errors
/// - [`Error::VerbOffsetMisaligned`] - A verb entry point is not a statement boundary
///
/// # Examples
///
/// ```rust
/// use scummscope::{decode, Error, Version};
///
/// // pushByte with its operand missing
/// match decode(&[0x00], Version::V6) {
///     Err(Error::OutOfBounds) => {}
///     other => panic!("unexpected result: {:?}", other.map(|p| p.len())),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The script is damaged and could not be processed.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while reading the script.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// The opcode table of the selected version has no entry for this byte.
    ///
    /// Also raised for a sub-opcode selector byte that the composite opcode's nested table
    /// does not know; `offset` then points at the selector.
    #[error("Unknown opcode 0x{opcode:02X} at offset 0x{offset:04X}")]
    UnknownOpcode {
        /// The offending opcode or selector byte
        opcode: u8,
        /// Absolute offset of the byte
        offset: u32,
    },

    /// A jump resolves to an offset that is not the start of a decoded instruction.
    #[error("Jump at offset 0x{offset:04X} targets 0x{target:04X}, which is not an instruction boundary")]
    DanglingJumpTarget {
        /// Offset of the jumping instruction
        offset: u32,
        /// Resolved absolute target
        target: i64,
    },

    /// Re-encoding the decoded program did not reproduce the input bytes.
    ///
    /// This always indicates a bug in an opcode table entry, never bad input.
    #[error("Round-trip mismatch at offset 0x{offset:04X}: expected 0x{expected:02X}, re-encoded 0x{actual:02X}")]
    RoundTripMismatch {
        /// First differing byte offset
        offset: u32,
        /// Byte found in the input (`0` past the end of the input)
        expected: u8,
        /// Byte produced by the encoder (`0` past the end of the output)
        actual: u8,
    },

    /// The evaluator had to pop a value from an empty stack.
    #[error("Stack underflow at offset 0x{offset:04X}")]
    StackUnderflow {
        /// Offset of the instruction whose handler underflowed
        offset: u32,
    },

    /// The instruction decoded fine, but its table entry carries no evaluator family.
    #[error("No evaluator for '{name}' at offset 0x{offset:04X}")]
    UnhandledOpcode {
        /// Mnemonic of the instruction
        name: &'static str,
        /// Offset of the instruction
        offset: u32,
    },

    /// A jump was taken, or a jump target reached, with values still on the stack.
    ///
    /// Statements are only ever cut at empty-stack points, so a value carried along an edge
    /// (as in `L.1 = cond ? 1 : 2`) has no faithful rendering.
    #[error("Values left on the stack across the branch edge at offset 0x{offset:04X}")]
    StackAcrossBranch {
        /// Offset of the jump, or of the jump target
        offset: u32,
    },

    /// An object script verb entry point does not fall on a statement boundary.
    #[error("Verb {verb} entry point 0x{offset:04X} is not a statement boundary")]
    VerbOffsetMisaligned {
        /// The verb identifier from the verb table
        verb: u8,
        /// The header-relative entry offset
        offset: u32,
    },
}

impl Error {
    /// Returns the script offset this error is attached to, if it has one.
    #[must_use]
    pub fn offset(&self) -> Option<u32> {
        match self {
            Error::UnknownOpcode { offset, .. }
            | Error::DanglingJumpTarget { offset, .. }
            | Error::RoundTripMismatch { offset, .. }
            | Error::StackUnderflow { offset }
            | Error::StackAcrossBranch { offset }
            | Error::UnhandledOpcode { offset, .. }
            | Error::VerbOffsetMisaligned { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

/// A failed script decompilation together with everything produced before the failure.
///
/// The partial data exists for diagnostics only. It is never a usable decompilation result;
/// [`Failure::dump`] turns it into a human readable report.
#[derive(Debug, Clone)]
pub struct Failure {
    /// Display name of the script that failed (`script 12`, `object 301`, ...)
    pub script: String,
    /// The fatal error
    pub error: Error,
    /// Instructions decoded before the failure, in offset order
    pub instructions: Vec<Instruction>,
    /// Statements assembled before the failure, in program order
    pub statements: Vec<Statement>,
}

impl Failure {
    /// Number of instructions shown on each side of the failing offset.
    pub const CONTEXT: usize = 3;

    /// Creates a failure without any partial results.
    #[must_use]
    pub fn new(script: impl Into<String>, error: Error) -> Self {
        Failure {
            script: script.into(),
            error,
            instructions: Vec::new(),
            statements: Vec::new(),
        }
    }

    /// Renders the diagnostic report: the error, the instructions surrounding the failing
    /// offset and the statements assembled so far.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}: {}", self.script, self.error);

        if !self.instructions.is_empty() {
            let center = match self.error.offset() {
                Some(offset) => self
                    .instructions
                    .iter()
                    .position(|instr| instr.offset >= offset)
                    .unwrap_or(self.instructions.len() - 1),
                None => self.instructions.len() - 1,
            };
            let start = center.saturating_sub(Self::CONTEXT);
            let end = (center + Self::CONTEXT + 1).min(self.instructions.len());

            let _ = writeln!(out, "instructions:");
            for instr in &self.instructions[start..end] {
                let _ = writeln!(out, "    {instr}");
            }
        }

        if !self.statements.is_empty() {
            let _ = writeln!(out, "statements:");
            for statement in &self.statements {
                let _ = writeln!(out, "    [{:04X}] {}", statement.offset, statement.summary());
            }
        }

        out
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.script, self.error)
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_offsets() {
        assert_eq!(Error::StackUnderflow { offset: 7 }.offset(), Some(7));
        assert_eq!(Error::StackAcrossBranch { offset: 8 }.offset(), Some(8));
        assert_eq!(
            Error::VerbOffsetMisaligned { verb: 2, offset: 45 }.offset(),
            Some(45)
        );
        assert_eq!(Error::OutOfBounds.offset(), None);
    }

    #[test]
    fn malformed_macro_records_location() {
        let err = malformed_error!("bad count {}", 3);
        match err {
            Error::Malformed { message, file, .. } => {
                assert_eq!(message, "bad count 3");
                assert!(file.ends_with("error.rs"));
            }
            _ => panic!("Expected Malformed"),
        }
    }

    #[test]
    fn failure_dump_without_partials() {
        let failure = Failure::new("script 1", Error::Empty);
        let dump = failure.dump();
        assert_eq!(dump, "script 1: Provided input was empty\n");
    }
}
