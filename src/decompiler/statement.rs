//! Statements: the evaluator's output and the structurer's building blocks.

use std::fmt::Write;

use crate::{
    decompiler::expr::{write_var, Expr},
    disassembler::{VariableRef, Version},
};

/// Compound assignment operator of a V5 arithmetic instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    /// `=`
    Set,
    /// `+=`
    Add,
    /// `-=`
    Sub,
    /// `*=`
    Mul,
    /// `/=`
    Div,
    /// `&=`
    And,
    /// `|=`
    Or,
}

impl AssignOp {
    /// Printed symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            AssignOp::Set => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::And => "&=",
            AssignOp::Or => "|=",
        }
    }
}

/// Assignment destination.
#[derive(Debug, Clone, PartialEq)]
pub enum LValue {
    /// A variable
    Var(VariableRef),
    /// An array element
    Array {
        /// The array variable
        array: VariableRef,
        /// Index values, outermost first
        indices: Vec<Expr>,
    },
}

impl LValue {
    /// The variable, if the destination is a plain variable.
    #[must_use]
    pub fn as_var(&self) -> Option<&VariableRef> {
        match self {
            LValue::Var(var) => Some(var),
            LValue::Array { .. } => None,
        }
    }

    fn write(&self, out: &mut String, version: Option<Version>) {
        match self {
            LValue::Var(var) => write_var(out, var, version),
            LValue::Array { array, indices } => Expr::Array {
                array: array.clone(),
                indices: indices.clone(),
            }
            .write(out, version),
        }
    }

    fn visit_vars(&self, f: &mut dyn FnMut(&VariableRef)) {
        match self {
            LValue::Var(var) => Expr::Var(var.clone()).visit_vars(f),
            LValue::Array { array, indices } => {
                f(array);
                for index in indices {
                    index.visit_vars(f);
                }
            }
        }
    }
}

/// What a statement does.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// `target op value`
    Assign {
        /// Destination
        target: LValue,
        /// Assignment operator
        op: AssignOp,
        /// Assigned value
        value: Expr,
    },
    /// `target++` or `target--`
    Step {
        /// Destination
        target: LValue,
        /// `true` for increment
        increment: bool,
    },
    /// A command or a call evaluated for its side effects
    Expr(Expr),
    /// Yield to the scheduler
    Yield,
    /// A value left on the stack when the script ends
    Push(Expr),
    /// Jump to `target` when `branch_when` holds
    ConditionalBranch {
        /// The condition under which the jump is taken
        branch_when: Expr,
        /// Jump target offset
        target: u32,
    },
    /// Jump to `target`
    UnconditionalBranch {
        /// Jump target offset
        target: u32,
    },
    /// `if (cond) { then } else { otherwise }`
    If {
        /// Condition for the `then` branch
        cond: Expr,
        /// Statements run when `cond` holds
        then: Vec<Statement>,
        /// Statements run otherwise
        otherwise: Option<Vec<Statement>>,
    },
    /// `while (cond) { body }`
    While {
        /// Loop condition
        cond: Expr,
        /// Loop body
        body: Vec<Statement>,
    },
    /// `for (init; cond; step) { body }`
    For {
        /// Initial assignment of the loop variable
        init: Box<Statement>,
        /// Loop condition
        cond: Expr,
        /// Loop variable update
        step: Box<Statement>,
        /// Loop body
        body: Vec<Statement>,
    },
    /// `do { body } while (cond)`, or an endless `do { body }` without condition
    DoWhile {
        /// Loop body
        body: Vec<Statement>,
        /// Loop condition, checked after the body
        cond: Option<Expr>,
    },
    /// Yield until `cond` holds
    BreakUntil(Expr),
}

/// One statement and the script offset it starts at.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Offset of the first instruction contributing to the statement
    pub offset: u32,
    /// The statement
    pub kind: StatementKind,
}

impl Statement {
    /// Creates a statement.
    #[must_use]
    pub fn new(offset: u32, kind: StatementKind) -> Self {
        Statement { offset, kind }
    }

    /// Returns `true` for branch markers.
    #[must_use]
    pub fn is_branch(&self) -> bool {
        matches!(
            self.kind,
            StatementKind::ConditionalBranch { .. } | StatementKind::UnconditionalBranch { .. }
        )
    }

    /// Target of a branch marker.
    #[must_use]
    pub fn branch_target(&self) -> Option<u32> {
        match self.kind {
            StatementKind::ConditionalBranch { target, .. }
            | StatementKind::UnconditionalBranch { target } => Some(target),
            _ => None,
        }
    }

    /// The variable this statement steps, for `v++`, `v--`, `v += n` and `v -= n`.
    #[must_use]
    pub fn stepped_var(&self) -> Option<&VariableRef> {
        match &self.kind {
            StatementKind::Step { target, .. }
            | StatementKind::Assign {
                target,
                op: AssignOp::Add | AssignOp::Sub,
                ..
            } => target.as_var(),
            _ => None,
        }
    }

    /// The variable this statement sets with a plain assignment.
    #[must_use]
    pub fn assigned_var(&self) -> Option<&VariableRef> {
        match &self.kind {
            StatementKind::Assign {
                target,
                op: AssignOp::Set,
                ..
            } => target.as_var(),
            _ => None,
        }
    }

    /// Renders the statement as a single line, nested bodies elided.
    ///
    /// Used for diagnostics, where the full indented form is not wanted.
    #[must_use]
    pub fn summary(&self) -> String {
        match &self.kind {
            StatementKind::If { .. }
            | StatementKind::While { .. }
            | StatementKind::For { .. }
            | StatementKind::DoWhile { .. } => format!("{} {{ .. }}", self.head(None)),
            _ => self.head(None),
        }
    }

    /// Renders the statement's own line: the whole statement for simple statements, the
    /// header for structured ones.
    #[must_use]
    pub fn head(&self, version: Option<Version>) -> String {
        let mut out = String::new();
        match &self.kind {
            StatementKind::Assign { target, op, value } => {
                target.write(&mut out, version);
                let _ = write!(out, " {} ", op.symbol());
                value.write(&mut out, version);
            }
            StatementKind::Step { target, increment } => {
                target.write(&mut out, version);
                out.push_str(if *increment { "++" } else { "--" });
            }
            StatementKind::Expr(expr) => expr.write(&mut out, version),
            StatementKind::Yield => out.push_str("breakHere()"),
            StatementKind::Push(expr) => {
                out.push_str("push(");
                expr.write(&mut out, version);
                out.push(')');
            }
            StatementKind::ConditionalBranch {
                branch_when,
                target,
            } => {
                out.push_str("if (");
                branch_when.write(&mut out, version);
                let _ = write!(out, ") goto [{target:04X}]");
            }
            StatementKind::UnconditionalBranch { target } => {
                let _ = write!(out, "goto [{target:04X}]");
            }
            StatementKind::If { cond, .. } => {
                out.push_str("if (");
                cond.write(&mut out, version);
                out.push(')');
            }
            StatementKind::While { cond, .. } => {
                out.push_str("while (");
                cond.write(&mut out, version);
                out.push(')');
            }
            StatementKind::For {
                init, cond, step, ..
            } => {
                let _ = write!(
                    out,
                    "for ({}; {}; {})",
                    init.head(version),
                    cond.render(version),
                    step.head(version)
                );
            }
            StatementKind::DoWhile { .. } => out.push_str("do"),
            StatementKind::BreakUntil(cond) => {
                out.push_str("break until (");
                cond.write(&mut out, version);
                out.push(')');
            }
        }
        out
    }

    /// Calls `f` for every variable the statement mentions, nested bodies included.
    pub fn visit_vars(&self, f: &mut dyn FnMut(&VariableRef)) {
        match &self.kind {
            StatementKind::Assign { target, value, .. } => {
                target.visit_vars(f);
                value.visit_vars(f);
            }
            StatementKind::Step { target, .. } => target.visit_vars(f),
            StatementKind::Expr(expr)
            | StatementKind::Push(expr)
            | StatementKind::BreakUntil(expr)
            | StatementKind::ConditionalBranch {
                branch_when: expr, ..
            } => expr.visit_vars(f),
            StatementKind::Yield | StatementKind::UnconditionalBranch { .. } => {}
            StatementKind::If {
                cond,
                then,
                otherwise,
            } => {
                cond.visit_vars(f);
                visit_all(then, f);
                if let Some(otherwise) = otherwise {
                    visit_all(otherwise, f);
                }
            }
            StatementKind::While { cond, body } => {
                cond.visit_vars(f);
                visit_all(body, f);
            }
            StatementKind::For {
                init,
                cond,
                step,
                body,
            } => {
                init.visit_vars(f);
                cond.visit_vars(f);
                step.visit_vars(f);
                visit_all(body, f);
            }
            StatementKind::DoWhile { body, cond } => {
                visit_all(body, f);
                if let Some(cond) = cond {
                    cond.visit_vars(f);
                }
            }
        }
    }

    /// Appends the offsets of this statement and everything nested in it, in source order.
    pub fn flatten_offsets(&self, out: &mut Vec<u32>) {
        match &self.kind {
            StatementKind::If {
                then, otherwise, ..
            } => {
                out.push(self.offset);
                flatten_all(then, out);
                if let Some(otherwise) = otherwise {
                    flatten_all(otherwise, out);
                }
            }
            StatementKind::While { body, .. } => {
                out.push(self.offset);
                flatten_all(body, out);
            }
            StatementKind::For {
                init, step, body, ..
            } => {
                // the condition is tested either before the body or after the step
                let top_tested = self.offset < step.offset;
                init.flatten_offsets(out);
                if top_tested {
                    out.push(self.offset);
                }
                flatten_all(body, out);
                step.flatten_offsets(out);
                if !top_tested {
                    out.push(self.offset);
                }
            }
            StatementKind::DoWhile { body, .. } => {
                flatten_all(body, out);
                out.push(self.offset);
            }
            _ => out.push(self.offset),
        }
    }
}

fn visit_all(statements: &[Statement], f: &mut dyn FnMut(&VariableRef)) {
    for statement in statements {
        statement.visit_vars(f);
    }
}

fn flatten_all(statements: &[Statement], out: &mut Vec<u32>) {
    for statement in statements {
        statement.flatten_offsets(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disassembler::{Scope, Width};

    fn local(index: u16) -> VariableRef {
        VariableRef {
            scope: Scope::Local,
            index,
            raw: 0x4000 | index,
            width: Width::Word,
            nested: None,
        }
    }

    #[test]
    fn heads() {
        let assign = Statement::new(
            0,
            StatementKind::Assign {
                target: LValue::Var(local(0)),
                op: AssignOp::Add,
                value: Expr::constant(2),
            },
        );
        assert_eq!(assign.head(None), "L.0 += 2");
        assert_eq!(assign.stepped_var(), Some(&local(0)));
        assert_eq!(assign.assigned_var(), None);

        let branch = Statement::new(
            4,
            StatementKind::ConditionalBranch {
                branch_when: Expr::Var(local(1)),
                target: 0x1A,
            },
        );
        assert!(branch.is_branch());
        assert_eq!(branch.branch_target(), Some(0x1A));
        assert_eq!(branch.summary(), "if (L.1) goto [001A]");
    }

    #[test]
    fn for_head_and_offsets() {
        let init = Statement::new(
            0,
            StatementKind::Assign {
                target: LValue::Var(local(0)),
                op: AssignOp::Set,
                value: Expr::constant(5),
            },
        );
        let step = Statement::new(
            12,
            StatementKind::Step {
                target: LValue::Var(local(0)),
                increment: true,
            },
        );
        let body = vec![Statement::new(10, StatementKind::Yield)];
        let for_loop = Statement::new(
            5,
            StatementKind::For {
                init: Box::new(init),
                cond: Expr::binary(
                    crate::decompiler::BinOp::Lt,
                    Expr::Var(local(0)),
                    Expr::constant(10),
                ),
                step: Box::new(step),
                body,
            },
        );

        assert_eq!(for_loop.head(None), "for (L.0 = 5; L.0 < 10; L.0++)");

        let mut offsets = Vec::new();
        for_loop.flatten_offsets(&mut offsets);
        assert_eq!(offsets, vec![0, 5, 10, 12]);

        let mut locals = Vec::new();
        for_loop.visit_vars(&mut |var| locals.push(var.index));
        assert!(locals.iter().all(|index| *index == 0));
        assert_eq!(locals.len(), 4);
    }

    #[test]
    fn array_targets() {
        let write = Statement::new(
            0,
            StatementKind::Step {
                target: LValue::Array {
                    array: local(3),
                    indices: vec![Expr::constant(1)],
                },
                increment: false,
            },
        );
        assert_eq!(write.head(None), "L.3[1]--");
        assert_eq!(write.stepped_var(), None);
    }
}
