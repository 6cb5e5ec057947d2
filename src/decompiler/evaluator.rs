//! Symbolic stack evaluation.
//!
//! The [`Evaluator`] replays a decoded program over a stack of [`Expr`] values instead of
//! numbers. Pushes build expressions, consumers pop them into statements, and jumps become
//! branch markers for the structurer. Evaluation is strictly linear and never looks ahead:
//! every handler consumes exactly the stack depth its [`Handler`] family declares.
//!
//! Besides the statements the evaluator records two offset sets:
//! - the jump targets, which become basic-block labels
//! - the boundaries, offsets at which the stack was empty before the instruction; only those
//!   are valid verb entry points in an object script
//!
//! Every jump and every jump target must be a boundary. A value carried along a branch edge
//! fails with [`Error::StackAcrossBranch`] instead of being dumped out of order.
//!
//! # Example
//!
//! ```rust
//! use scummscope::{decode, decompiler::evaluate, Version};
//!
//! // pushByte 5, writeWordVar L.0
//! let program = decode(&[0x00, 0x05, 0x43, 0x00, 0x40], Version::V6)?;
//! let evaluation = evaluate(&program)?;
//! assert_eq!(evaluation.statements[0].head(None), "L.0 = 5");
//! # Ok::<(), scummscope::Error>(())
//! ```

use std::{collections::BTreeSet, ops::Range};

use log::{debug, trace};

use crate::{
    decompiler::{AssignOp, BinOp, Expr, LValue, Statement, StatementKind},
    disassembler::{
        Arg, DecodedProgram, Handler, Instruction, JumpTarget, Operand, SubOperation, VariableRef,
    },
    Error, Result,
};

/// Result of evaluating one program.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Statements in program order
    pub statements: Vec<Statement>,
    /// Every jump target
    pub labels: BTreeSet<u32>,
    /// Offsets reached with an empty stack, the program end included when the stack drains
    pub boundaries: BTreeSet<u32>,
    /// Byte range of the evaluated program
    pub range: Range<u32>,
}

/// A stateful evaluator over one program.
///
/// Drive it with [`Evaluator::step`] for each instruction in offset order, or hand it the whole
/// program with [`Evaluator::run`].
#[derive(Debug, Default)]
pub struct Evaluator {
    stack: Vec<Expr>,
    statements: Vec<Statement>,
    labels: BTreeSet<u32>,
    boundaries: BTreeSet<u32>,
    start: Option<u32>,
    offset: u32,
}

impl Evaluator {
    /// Creates an evaluator with an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Statements emitted so far.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Current stack depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Consumes the evaluator and returns the statements emitted so far.
    ///
    /// Used for diagnostics after a failed evaluation.
    #[must_use]
    pub fn into_partial(self) -> Vec<Statement> {
        self.statements
    }

    /// Evaluates every instruction of `program`.
    ///
    /// Values left on the stack stay there until [`Evaluator::finish`].
    ///
    /// # Errors
    /// Returns the error of the first instruction that cannot be evaluated, see
    /// [`Evaluator::step`]; the evaluator keeps its partial state.
    pub fn run(&mut self, program: &DecodedProgram) -> Result<()> {
        for instr in program {
            self.step(instr)?;
        }

        debug!(
            "evaluated {} instructions into {} statements, {} labels",
            program.instruction_count(),
            self.statements.len(),
            self.labels.len()
        );
        Ok(())
    }

    /// Evaluates a single instruction.
    ///
    /// # Errors
    /// Returns [`Error::StackUnderflow`] when the handler pops from an empty stack,
    /// [`Error::UnhandledOpcode`] for table entries without an evaluator family and
    /// [`Error::StackAcrossBranch`] when a jump or a jump target is reached with values on the
    /// stack.
    pub fn step(&mut self, instr: &Instruction) -> Result<()> {
        self.offset = instr.offset;
        if !self.stack.is_empty() && self.labels.contains(&instr.offset) {
            return Err(Error::StackAcrossBranch {
                offset: instr.offset,
            });
        }
        if self.stack.is_empty() {
            self.boundaries.insert(instr.offset);
            self.start = Some(instr.offset);
        } else if self.start.is_none() {
            self.start = Some(instr.offset);
        }

        trace!("eval {instr} (depth {})", self.stack.len());

        match instr.def.handler {
            Handler::PushConst => {
                let value = first_value(&instr.operands)?;
                self.stack.push(value);
            }
            Handler::PushVar => {
                let var = first_var(&instr.operands)?;
                self.stack.push(Expr::Var(var));
            }
            Handler::ArrayRead { dims } => {
                let array = first_var(&instr.operands)?;
                let indices = self.pop_n(usize::from(dims))?;
                self.stack.push(Expr::Array { array, indices });
            }
            Handler::ArrayWrite { dims } => {
                let array = first_var(&instr.operands)?;
                let value = self.pop()?;
                let indices = self.pop_n(usize::from(dims))?;
                self.emit(StatementKind::Assign {
                    target: LValue::Array { array, indices },
                    op: AssignOp::Set,
                    value,
                });
            }
            Handler::ArrayStep { increment } => {
                let array = first_var(&instr.operands)?;
                let index = self.pop()?;
                self.emit(StatementKind::Step {
                    target: LValue::Array {
                        array,
                        indices: vec![index],
                    },
                    increment,
                });
            }
            Handler::Dup => {
                let value = self.pop()?;
                self.stack.push(value.clone());
                self.stack.push(value);
            }
            Handler::DupN => {
                let count = instr
                    .operands
                    .first()
                    .and_then(Operand::as_immediate)
                    .ok_or_else(|| malformed_error!("dupN without a count at 0x{:04X}", instr.offset))?;
                let count = usize::try_from(count)
                    .map_err(|_| malformed_error!("negative dupN count {}", count))?;
                if count > self.stack.len() {
                    return Err(self.underflow());
                }
                let top = self.stack[self.stack.len() - count..].to_vec();
                self.stack.extend(top);
            }
            Handler::Not => {
                let value = self.pop()?;
                self.stack.push(value.negate());
            }
            Handler::Binary(op) => {
                let rhs = self.pop()?;
                let lhs = self.pop()?;
                self.stack.push(Expr::binary(op, lhs, rhs));
            }
            Handler::Pop => {
                let value = self.pop()?;
                let expr = match value {
                    call @ Expr::Call { .. } => call,
                    other => Expr::Call {
                        name: "pop".to_string(),
                        args: vec![other],
                    },
                };
                self.emit(StatementKind::Expr(expr));
            }
            Handler::Assign => {
                let var = first_var(&instr.operands)?;
                let value = self.pop()?;
                self.emit(StatementKind::Assign {
                    target: LValue::Var(var),
                    op: AssignOp::Set,
                    value,
                });
            }
            Handler::Step { increment } => {
                let var = first_var(&instr.operands)?;
                self.emit(StatementKind::Step {
                    target: LValue::Var(var),
                    increment,
                });
            }
            Handler::Jump => {
                let target = self.jump_target(&instr.operands)?;
                self.branch(target, StatementKind::UnconditionalBranch { target })?;
            }
            Handler::JumpIf { when } => {
                let target = self.jump_target(&instr.operands)?;
                let cond = self.pop()?;
                let branch_when = if when { cond } else { cond.negate() };
                self.branch(target, StatementKind::ConditionalBranch {
                    branch_when,
                    target,
                })?;
            }
            Handler::Ops => self.ops(instr)?,
            Handler::Yield => self.emit(StatementKind::Yield),
            Handler::InlineAssign(op) => {
                let target = operand_var(&instr.operands, 0)?;
                let value = operand_value(&instr.operands, 1)?;
                self.emit(StatementKind::Assign {
                    target: LValue::Var(target),
                    op,
                    value,
                });
            }
            Handler::InlineStep { increment } => {
                let target = operand_var(&instr.operands, 0)?;
                self.emit(StatementKind::Step {
                    target: LValue::Var(target),
                    increment,
                });
            }
            Handler::InlineCompare(op) => {
                let lhs = Expr::Var(operand_var(&instr.operands, 0)?);
                let rhs = operand_value(&instr.operands, 1)?;
                let target = self.jump_target(&instr.operands)?;
                self.branch(target, StatementKind::ConditionalBranch {
                    branch_when: Expr::binary(op, lhs, rhs).negate(),
                    target,
                })?;
            }
            Handler::InlineTest { zero } => {
                let var = Expr::Var(operand_var(&instr.operands, 0)?);
                let op = if zero { BinOp::Eq } else { BinOp::Ne };
                let target = self.jump_target(&instr.operands)?;
                self.branch(target, StatementKind::ConditionalBranch {
                    branch_when: Expr::binary(op, var, Expr::constant(0)).negate(),
                    target,
                })?;
            }
            Handler::InlineCondition => {
                let target = self.jump_target(&instr.operands)?;
                let cond = Expr::Call {
                    name: instr.name().to_string(),
                    args: inline_args(&instr.operands),
                };
                self.branch(target, StatementKind::ConditionalBranch {
                    branch_when: cond.negate(),
                    target,
                })?;
            }
            handler @ (Handler::Call { .. } | Handler::InlineCall { .. }) => {
                self.call(instr.name().to_string(), handler, &[], &instr.operands)?;
            }
            Handler::Unsupported => {
                return Err(Error::UnhandledOpcode {
                    name: instr.name(),
                    offset: instr.offset,
                })
            }
        }
        Ok(())
    }

    /// Flushes values left on the stack as `push()` statements and returns the result.
    #[must_use]
    pub fn finish(mut self, range: Range<u32>) -> Evaluation {
        self.flush(range.end);
        Evaluation {
            statements: self.statements,
            labels: self.labels,
            boundaries: self.boundaries,
            range,
        }
    }

    fn flush(&mut self, end: u32) {
        if self.stack.is_empty() {
            self.boundaries.insert(end);
            return;
        }
        let offset = self.start.take().unwrap_or(self.offset);
        for value in std::mem::take(&mut self.stack) {
            self.statements
                .push(Statement::new(offset, StatementKind::Push(value)));
        }
    }

    fn ops(&mut self, instr: &Instruction) -> Result<()> {
        let prefix = inline_args(&instr.operands);
        for operand in &instr.operands {
            if let Operand::SubOp(sub) = operand {
                self.sub_op(instr, sub, &prefix)?;
            }
        }
        Ok(())
    }

    fn sub_op(&mut self, instr: &Instruction, sub: &SubOperation, prefix: &[Expr]) -> Result<()> {
        let name = format!("{}.{}", instr.name(), sub.def.name);
        match sub.def.handler {
            handler @ (Handler::Call { .. } | Handler::InlineCall { .. }) => {
                self.call(name, handler, prefix, &sub.operands)
            }
            _ => Err(Error::UnhandledOpcode {
                name: sub.def.name,
                offset: instr.offset,
            }),
        }
    }

    /// Evaluates the two call families: popped arguments (`Call`) and inline ones
    /// (`InlineCall`). Inline operands always come first.
    fn call(
        &mut self,
        name: String,
        handler: Handler,
        prefix: &[Expr],
        operands: &[Operand],
    ) -> Result<()> {
        match handler {
            Handler::Call { args, result } => {
                let mut all = prefix.to_vec();
                all.extend(inline_args(operands));
                all.extend(self.pop_args(args)?);

                let call = Expr::Call { name, args: all };
                if result {
                    self.stack.push(call);
                } else {
                    self.emit(StatementKind::Expr(call));
                }
            }
            Handler::InlineCall { result: true } => {
                let target = operand_var(operands, 0)?;
                let mut all = prefix.to_vec();
                all.extend(inline_args(&operands[1..]));
                self.emit(StatementKind::Assign {
                    target: LValue::Var(target),
                    op: AssignOp::Set,
                    value: Expr::Call { name, args: all },
                });
            }
            Handler::InlineCall { result: false } => {
                let mut all = prefix.to_vec();
                all.extend(inline_args(operands));
                self.emit(StatementKind::Expr(Expr::Call { name, args: all }));
            }
            _ => {
                return Err(Error::UnhandledOpcode {
                    name: "call",
                    offset: self.offset,
                })
            }
        }
        Ok(())
    }

    /// Pops the declared arguments, last declared first, and returns them in call-site order.
    fn pop_args(&mut self, args: &[Arg]) -> Result<Vec<Expr>> {
        let mut popped = Vec::with_capacity(args.len());
        for arg in args.iter().rev() {
            match arg {
                Arg::Value(tag) => popped.push(self.pop()?.tagged(*tag)),
                Arg::List => {
                    let count = match self.pop()? {
                        Expr::Const { value, .. } => value,
                        other => {
                            return Err(malformed_error!(
                                "argument count '{}' at 0x{:04X} is not a constant",
                                other,
                                self.offset
                            ))
                        }
                    };
                    let count = usize::try_from(count).map_err(|_| {
                        malformed_error!("negative argument count {} at 0x{:04X}", count, self.offset)
                    })?;
                    popped.push(Expr::List(self.pop_n(count)?));
                }
            }
        }
        popped.reverse();
        Ok(popped)
    }

    fn pop(&mut self) -> Result<Expr> {
        match self.stack.pop() {
            Some(value) => Ok(value),
            None => Err(self.underflow()),
        }
    }

    /// Pops `count` values, returned in push order.
    fn pop_n(&mut self, count: usize) -> Result<Vec<Expr>> {
        if count > self.stack.len() {
            return Err(self.underflow());
        }
        Ok(self.stack.split_off(self.stack.len() - count))
    }

    fn underflow(&self) -> Error {
        Error::StackUnderflow {
            offset: self.offset,
        }
    }

    fn jump_target(&mut self, operands: &[Operand]) -> Result<u32> {
        let jump: &JumpTarget = operands
            .iter()
            .find_map(Operand::as_jump)
            .ok_or_else(|| malformed_error!("missing jump operand at 0x{:04X}", self.offset))?;
        let target = u32::try_from(jump.resolved_absolute())
            .map_err(|_| malformed_error!("jump target {} out of range", jump.resolved_absolute()))?;
        self.labels.insert(target);
        Ok(target)
    }

    fn emit(&mut self, kind: StatementKind) {
        let offset = self.start.take().unwrap_or(self.offset);
        self.statements.push(Statement::new(offset, kind));
    }

    /// Emits a branch marker. The stack must be empty after the condition is popped, and a
    /// backward target must already be a boundary.
    fn branch(&mut self, target: u32, kind: StatementKind) -> Result<()> {
        if !self.stack.is_empty() {
            return Err(Error::StackAcrossBranch {
                offset: self.offset,
            });
        }
        if target <= self.offset && !self.boundaries.contains(&target) {
            return Err(Error::StackAcrossBranch { offset: target });
        }
        self.emit(kind);
        Ok(())
    }
}

/// Evaluates a whole program.
///
/// # Errors
/// Returns the first evaluation error, see [`Evaluator::step`].
pub fn evaluate(program: &DecodedProgram) -> Result<Evaluation> {
    let mut evaluator = Evaluator::new();
    for instr in program {
        evaluator.step(instr)?;
    }
    Ok(evaluator.finish(program.base()..program.end()))
}

/// Converts inline operands into call arguments.
///
/// Argument list items are collected into one [`Expr::List`] per terminator. The terminator of
/// a selector loop and jump operands produce nothing.
fn inline_args(operands: &[Operand]) -> Vec<Expr> {
    let mut out = Vec::new();
    let mut list: Option<Vec<Expr>> = None;
    let mut after_sub = false;

    for operand in operands {
        match operand {
            Operand::VarArg { value, .. } => {
                if let Some(value) = Expr::from_operand(value) {
                    list.get_or_insert_with(Vec::new).push(value);
                }
                after_sub = false;
            }
            Operand::End(_) => {
                match list.take() {
                    Some(items) => out.push(Expr::List(items)),
                    None if !after_sub => out.push(Expr::List(Vec::new())),
                    None => {}
                }
                after_sub = false;
            }
            Operand::SubOp(_) => after_sub = true,
            Operand::JumpTarget(_) => {}
            other => {
                if let Some(value) = Expr::from_operand(other) {
                    out.push(value);
                }
                after_sub = false;
            }
        }
    }
    out
}

fn first_value(operands: &[Operand]) -> Result<Expr> {
    operand_value(operands, 0)
}

fn first_var(operands: &[Operand]) -> Result<VariableRef> {
    operand_var(operands, 0)
}

fn operand_value(operands: &[Operand], index: usize) -> Result<Expr> {
    operands
        .get(index)
        .and_then(Expr::from_operand)
        .ok_or_else(|| malformed_error!("operand {} is not a value", index))
}

fn operand_var(operands: &[Operand], index: usize) -> Result<VariableRef> {
    operands
        .get(index)
        .and_then(Operand::as_variable)
        .cloned()
        .ok_or_else(|| malformed_error!("operand {} is not a variable", index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disassembler::{decode, Version};

    fn heads(data: &[u8], version: Version) -> Vec<(u32, String)> {
        let program = decode(data, version).unwrap();
        evaluate(&program)
            .unwrap()
            .statements
            .iter()
            .map(|statement| (statement.offset, statement.head(Some(version))))
            .collect()
    }

    /// `L.0 = 5`, `[0005] if (L.0 >= 10) goto [0014]`, `L.0++`, `goto [0005]`, `breakHere()`
    const COUNTING_LOOP: &[u8] = &[
        0x00, 0x05, // pushByte 5
        0x43, 0x00, 0x40, // writeWordVar L.0
        0x03, 0x00, 0x40, // pushWordVar L.0
        0x00, 0x0A, // pushByte 10
        0x11, // lt
        0x5D, 0x06, 0x00, // ifNot [0014]
        0x4F, 0x00, 0x40, // wordVarInc L.0
        0x73, 0xF1, 0xFF, // jump [0005]
        0x6C, // breakHere
    ];

    #[test]
    fn counting_loop() {
        let program = decode(COUNTING_LOOP, Version::V6).unwrap();
        let evaluation = evaluate(&program).unwrap();

        let lines: Vec<_> = evaluation
            .statements
            .iter()
            .map(|statement| (statement.offset, statement.head(None)))
            .collect();
        assert_eq!(
            lines,
            vec![
                (0, "L.0 = 5".to_string()),
                (5, "if (L.0 >= 10) goto [0014]".to_string()),
                (14, "L.0++".to_string()),
                (17, "goto [0005]".to_string()),
                (20, "breakHere()".to_string()),
            ]
        );
        assert_eq!(evaluation.labels.iter().copied().collect::<Vec<_>>(), vec![5, 20]);
        assert_eq!(
            evaluation.boundaries.iter().copied().collect::<Vec<_>>(),
            vec![0, 5, 14, 17, 20, 21]
        );
        assert_eq!(evaluation.range, 0..21);
    }

    #[test]
    fn call_with_counted_list() {
        // pushByte 0, pushByte 12, pushByte 1, pushByte 2, pushByte 2, startScript
        let data = [0x00, 0x00, 0x00, 0x0C, 0x00, 0x01, 0x00, 0x02, 0x00, 0x02, 0x5E];
        assert_eq!(
            heads(&data, Version::V6),
            vec![(0, "startScript(0, script#12, [1, 2])".to_string())]
        );
    }

    #[test]
    fn pop_of_call_and_value() {
        // pushByte 7, isScriptRunning, pop, pushByte 3, pop
        let data = [0x00, 0x07, 0x8B, 0x1A, 0x00, 0x03, 0x1A];
        assert_eq!(
            heads(&data, Version::V6),
            vec![
                (0, "isScriptRunning(script#7)".to_string()),
                (4, "pop(3)".to_string()),
            ]
        );
    }

    #[test]
    fn arrays() {
        // pushByte 1, pushByte 9, wordArrayWrite V.300, pushByte 2, wordArrayInc V.300
        let data = [
            0x00, 0x01, 0x00, 0x09, 0x47, 0x2C, 0x01, 0x00, 0x02, 0x53, 0x2C, 0x01,
        ];
        assert_eq!(
            heads(&data, Version::V6),
            vec![
                (0, "V.300[1] = 9".to_string()),
                (7, "V.300[2]++".to_string()),
            ]
        );
    }

    #[test]
    fn composite_ops() {
        // cursorCommand cursorOn, pushByte 3, cursorCommand initCharset
        let data = [0x6B, 0x90, 0x00, 0x03, 0x6B, 0x9C];
        assert_eq!(
            heads(&data, Version::V6),
            vec![
                (0, "cursorCommand.cursorOn()".to_string()),
                (2, "cursorCommand.initCharset(charset#3)".to_string()),
            ]
        );
    }

    #[test]
    fn leftover_values_are_flushed() {
        let program = decode(&[0x00, 0x05], Version::V6).unwrap();
        let evaluation = evaluate(&program).unwrap();
        assert_eq!(evaluation.statements.len(), 1);
        assert_eq!(evaluation.statements[0].head(None), "push(5)");
        assert_eq!(evaluation.statements[0].offset, 0);
        assert!(!evaluation.boundaries.contains(&2));
    }

    #[test]
    fn run_leaves_flushing_to_finish() {
        let program = decode(&[0x00, 0x05], Version::V6).unwrap();
        let mut evaluator = Evaluator::new();
        evaluator.run(&program).unwrap();
        assert_eq!(evaluator.depth(), 1);
        assert!(evaluator.statements().is_empty());

        let evaluation = evaluator.finish(program.base()..program.end());
        assert_eq!(evaluation.statements[0].head(None), "push(5)");
        assert_eq!(
            evaluation.boundaries.iter().copied().collect::<Vec<_>>(),
            vec![0]
        );
    }

    #[test]
    fn value_carried_across_jump() {
        // pushWordVar L.0, ifNot [000B], pushByte 1, jump [000D], pushByte 2, writeWordVar L.1,
        // breakHere
        let data = [
            0x03, 0x00, 0x40, 0x5D, 0x05, 0x00, 0x00, 0x01, 0x73, 0x02, 0x00, 0x00, 0x02, 0x43,
            0x01, 0x40, 0x6C,
        ];
        let program = decode(&data, Version::V6).unwrap();
        let mut evaluator = Evaluator::new();
        assert_eq!(
            evaluator.run(&program),
            Err(Error::StackAcrossBranch { offset: 8 })
        );
        assert_eq!(evaluator.into_partial()[0].head(None), "if (!L.0) goto [000B]");
    }

    #[test]
    fn value_carried_into_forward_target() {
        // jump [0005], pushByte 1, pushByte 2, add, pop
        let data = [0x73, 0x02, 0x00, 0x00, 0x01, 0x00, 0x02, 0x14, 0x1A];
        let program = decode(&data, Version::V6).unwrap();
        assert_eq!(
            evaluate(&program).map(|e| e.statements.len()),
            Err(Error::StackAcrossBranch { offset: 5 })
        );
    }

    #[test]
    fn backward_target_inside_a_run() {
        // pushByte 1, pushByte 2, add, pop, jump [0002]
        let data = [0x00, 0x01, 0x00, 0x02, 0x14, 0x1A, 0x73, 0xF9, 0xFF];
        let program = decode(&data, Version::V6).unwrap();
        assert_eq!(
            evaluate(&program).map(|e| e.statements.len()),
            Err(Error::StackAcrossBranch { offset: 2 })
        );
    }

    #[test]
    fn underflow_reports_offset() {
        // breakHere, writeWordVar L.0
        let program = decode(&[0x6C, 0x43, 0x00, 0x40], Version::V6).unwrap();
        let mut evaluator = Evaluator::new();
        match evaluator.run(&program) {
            Err(Error::StackUnderflow { offset }) => assert_eq!(offset, 1),
            other => panic!("Expected StackUnderflow, got {other:?}"),
        }
        assert_eq!(evaluator.into_partial().len(), 1);
    }

    #[test]
    fn variable_list_count_is_malformed() {
        // pushByte 1, pushWordVar L.0, startScriptQuick
        let program = decode(&[0x00, 0x01, 0x03, 0x00, 0x40, 0x5F], Version::V6).unwrap();
        match evaluate(&program) {
            Err(Error::Malformed { message, .. }) => assert!(message.contains("L.0")),
            other => panic!("Expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn v5_inline_forms() {
        // move L.0, 5 / isEqual L.0, 3 -> [0008] / increment L.0 / breakHere
        let data = [
            0x1A, 0x00, 0x40, 0x05, 0x00, // move
            0x48, 0x00, 0x40, 0x03, 0x00, 0x03, 0x00, // isEqual
            0x46, 0x00, 0x40, // increment
            0x80, // breakHere
        ];
        assert_eq!(
            heads(&data, Version::V5),
            vec![
                (0, "L.0 = 5".to_string()),
                (5, "if (L.0 != 3) goto [000F]".to_string()),
                (12, "L.0++".to_string()),
                (15, "breakHere()".to_string()),
            ]
        );
    }

    #[test]
    fn v5_inline_call_with_result() {
        // getActorRoom L.1, actor 2
        let data = [0x03, 0x01, 0x40, 0x02];
        assert_eq!(
            heads(&data, Version::V5),
            vec![(0, "L.1 = getActorRoom(2)".to_string())]
        );
    }

    #[test]
    fn v5_argument_lists() {
        // startScript 10, (1, 2)
        let data = [0x0A, 0x0A, 0x01, 0x01, 0x00, 0x01, 0x02, 0x00, 0xFF];
        assert_eq!(
            heads(&data, Version::V5),
            vec![(0, "startScript(10, [1, 2])".to_string())]
        );

        // cutscene ()
        assert_eq!(
            heads(&[0x40, 0xFF], Version::V5),
            vec![(0, "cutscene([])".to_string())]
        );
    }

    #[test]
    fn statement_offsets_follow_runs() {
        // pushByte 1, pushByte 2, add, writeWordVar L.1
        let data = [0x00, 0x01, 0x00, 0x02, 0x14, 0x43, 0x01, 0x40];
        let program = decode(&data, Version::V6).unwrap();
        let evaluation = evaluate(&program).unwrap();
        assert_eq!(evaluation.statements.len(), 1);
        assert_eq!(evaluation.statements[0].offset, 0);
        assert_eq!(evaluation.statements[0].head(None), "L.1 = 1 + 2");
        assert_eq!(
            evaluation.boundaries.iter().copied().collect::<Vec<_>>(),
            vec![0, 8]
        );
    }
}
