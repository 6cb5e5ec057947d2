//! Declarative operand layouts and evaluator families.
//!
//! Every opcode table entry is an [`OpcodeDef`]: a mnemonic, an [`OperandRule`] describing how
//! its operands are laid out in the byte stream, and a [`Handler`] naming the evaluator family
//! that turns the decoded instruction into expressions or statements. Rules are plain values
//! built from a handful of primitives, so a whole instruction set is a static table and the
//! decoder needs no per-opcode code.

use std::fmt;

use crate::{
    decompiler::{AssignOp, BinOp, Tag},
    disassembler::Width,
};

/// How the operands of an instruction (or of a sub-form) are laid out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperandRule {
    /// No operands
    None,
    /// A fixed-width immediate, optionally sign-extended
    Imm(Width, bool),
    /// A variable number of the given width
    Var(Width),
    /// A NUL-terminated string
    Str,
    /// A signed 16-bit relative jump
    Jump,
    /// A variable word if `bit` is set in the current mode byte, otherwise an immediate of
    /// `width`.
    ///
    /// The mode byte is the opcode itself at the top level and the selector byte inside a
    /// sub-form.
    Param {
        /// Parameter-presence bit tested in the mode byte
        bit: u8,
        /// Width of the immediate form
        width: Width,
    },
    /// Several rules in sequence
    Seq(&'static [OperandRule]),
    /// One selector byte, masked, dispatching into a nested table
    Sub {
        /// Mask applied to the selector before lookup
        mask: u8,
        /// The nested table
        table: &'static [OpcodeDef],
    },
    /// Selector bytes dispatching into a nested table until a `0xFF` terminator, or until a
    /// sub-form flagged `terminal` has been read
    Loop {
        /// Mask applied to each selector before lookup
        mask: u8,
        /// The nested table
        table: &'static [OpcodeDef],
    },
    /// V5 argument list: `{mode byte, word parameter}` items up to a `0xFF` terminator
    VarArgs,
}

/// A popped call argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    /// A single value, optionally tagged with what it denotes
    Value(Option<Tag>),
    /// A counted list: the count is popped first, then that many values
    List,
}

/// Evaluator family of an instruction.
///
/// This is a closed set: every table entry names one, and the evaluator matches on it
/// exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Push the immediate (or string) operand
    PushConst,
    /// Push the variable operand
    PushVar,
    /// Pop `dims` indices, push an element of the array operand
    ArrayRead {
        /// Number of index values
        dims: u8,
    },
    /// Pop a value and `dims` indices, assign the array element
    ArrayWrite {
        /// Number of index values
        dims: u8,
    },
    /// Pop an index, increment or decrement the array element
    ArrayStep {
        /// `true` for increment
        increment: bool,
    },
    /// Duplicate the top of the stack
    Dup,
    /// Duplicate the top `n` values, `n` being the immediate operand
    DupN,
    /// Logical negation of the top of the stack
    Not,
    /// Pop two values, push their combination
    Binary(BinOp),
    /// Discard the top of the stack
    Pop,
    /// Pop a value into the variable operand
    Assign,
    /// Increment or decrement the variable operand
    Step {
        /// `true` for increment
        increment: bool,
    },
    /// Unconditional jump
    Jump,
    /// Pop a condition, jump if it equals `when`
    JumpIf {
        /// Truth value that takes the jump
        when: bool,
    },
    /// A command or function: inline operands first, then popped arguments
    Call {
        /// Popped arguments in call-site order
        args: &'static [Arg],
        /// Whether the call pushes a result
        result: bool,
    },
    /// Composite instruction: every sub-form is evaluated with its own handler
    Ops,
    /// Yield to the scheduler
    Yield,
    /// V5: `operands[0] <op> operands[1]`
    InlineAssign(AssignOp),
    /// V5: increment or decrement `operands[0]`
    InlineStep {
        /// `true` for increment
        increment: bool,
    },
    /// V5: continue when `operands[0] <op> operands[1]`, otherwise jump
    InlineCompare(BinOp),
    /// V5: continue when `operands[0]` is zero (`zero`) or non-zero, otherwise jump
    InlineTest {
        /// `true` continues on zero
        zero: bool,
    },
    /// V5: continue when the call over the non-jump operands is true, otherwise jump
    InlineCondition,
    /// V5: command over inline operands; with `result` the first operand receives the value
    InlineCall {
        /// Whether `operands[0]` is the destination variable
        result: bool,
    },
    /// Decodable but not evaluable
    Unsupported,
}

/// One entry of an opcode table or of a nested sub-table.
#[derive(Clone, Copy)]
pub struct OpcodeDef {
    /// Opcode byte (or masked selector value for nested tables)
    pub opcode: u8,
    /// Opcode bits that vary between the parameter forms of this entry
    pub vary: u8,
    /// Mnemonic
    pub name: &'static str,
    /// Operand layout
    pub rule: OperandRule,
    /// Evaluator family
    pub handler: Handler,
    /// Inside a [`OperandRule::Loop`], this sub-form ends the loop without a terminator
    pub terminal: bool,
}

impl OpcodeDef {
    /// Creates a table entry.
    #[must_use]
    pub const fn new(opcode: u8, name: &'static str, rule: OperandRule, handler: Handler) -> Self {
        OpcodeDef {
            opcode,
            vary: 0,
            name,
            rule,
            handler,
            terminal: false,
        }
    }

    /// Sets the parameter bits that vary between the forms of this entry.
    #[must_use]
    pub const fn vary(mut self, mask: u8) -> Self {
        self.vary = mask;
        self
    }

    /// Flags the entry as ending an enclosing loop.
    #[must_use]
    pub const fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    /// Finds the nested-table entry for `selector` after masking.
    #[must_use]
    pub fn find(table: &'static [OpcodeDef], selector: u8, mask: u8) -> Option<&'static OpcodeDef> {
        let key = selector & mask;
        table.iter().find(|def| def.opcode == key)
    }
}

impl PartialEq for OpcodeDef {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || (self.opcode == other.opcode && self.name == other.name)
    }
}

impl fmt::Debug for OpcodeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpcodeDef")
            .field("opcode", &format_args!("0x{:02X}", self.opcode))
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUB: &[OpcodeDef] = &[
        OpcodeDef::new(0x01, "costume", OperandRule::None, Handler::Unsupported),
        OpcodeDef::new(0x0F, "text", OperandRule::Str, Handler::Unsupported).terminal(),
    ];

    #[test]
    fn find_masks_selector() {
        let def = OpcodeDef::find(SUB, 0x81, 0x1F).unwrap();
        assert_eq!(def.name, "costume");
        assert!(!def.terminal);
        assert!(OpcodeDef::find(SUB, 0x0F, 0x1F).unwrap().terminal);
        assert!(OpcodeDef::find(SUB, 0x02, 0x1F).is_none());
    }

    #[test]
    fn builder_sets_vary() {
        let def = OpcodeDef::new(0x01, "putActor", OperandRule::None, Handler::Unsupported).vary(0xE0);
        assert_eq!(def.vary, 0xE0);
        assert_eq!(format!("{def:?}"), "OpcodeDef { opcode: 0x01, name: \"putActor\", .. }");
    }

    #[test]
    fn rules_compare_through_nested_tables() {
        let sub = OperandRule::Sub { mask: 0x1F, table: SUB };
        assert_eq!(sub, OperandRule::Sub { mask: 0x1F, table: SUB });
        assert_ne!(sub, OperandRule::Loop { mask: 0x1F, table: SUB });
        assert_ne!(sub, OperandRule::Sub { mask: 0x1F, table: &SUB[..1] });
        assert_eq!(OperandRule::Seq(&[OperandRule::Str]), OperandRule::Seq(&[OperandRule::Str]));
    }
}
