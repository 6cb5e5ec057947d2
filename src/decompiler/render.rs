//! Indented text output.

use std::fmt::Write;

use log::warn;

use crate::decompiler::{ControlGraph, DecompileContext, Statement, StatementKind};

/// Accumulates the text of one script.
pub struct Printer<'a> {
    ctx: &'a DecompileContext<'a>,
    out: String,
}

impl<'a> Printer<'a> {
    /// Creates an empty printer.
    #[must_use]
    pub fn new(ctx: &'a DecompileContext<'a>) -> Self {
        Printer {
            ctx,
            out: String::new(),
        }
    }

    /// Writes one line at `depth` levels of indentation.
    pub fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth {
            self.out.push_str(self.ctx.options.indent);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Writes `header {`.
    pub fn open(&mut self, depth: usize, header: &str) {
        self.line(depth, &format!("{header} {{"));
    }

    /// Writes the closing brace of [`Printer::open`].
    pub fn close(&mut self, depth: usize) {
        self.line(depth, "}");
    }

    /// Writes the local declarations of `ctx`, if enabled.
    ///
    /// Every local the unit touches is declared once, at the top of the unit, rather than
    /// before its first use.
    pub fn locals(&mut self, depth: usize) {
        if !self.ctx.options.declare_locals {
            return;
        }
        for index in &self.ctx.locals {
            self.line(depth, &format!("local variable L.{index}"));
        }
    }

    /// Writes every block of `graph`, labeling those still targeted by a branch.
    pub fn graph(&mut self, depth: usize, graph: &ControlGraph) {
        for block in graph.blocks() {
            if graph.target_count(block.label) > 0 {
                warn!("unstructured control flow at [{:04X}]", block.label);
                self.line(depth, &format!("[{:04X}]:", block.label));
            }
            self.statements(depth, &block.body);
        }
    }

    /// Writes `statements` at `depth`.
    pub fn statements(&mut self, depth: usize, statements: &[Statement]) {
        for statement in statements {
            self.statement(depth, statement);
        }
    }

    /// Consumes the printer and returns the text.
    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }

    fn statement(&mut self, depth: usize, statement: &Statement) {
        let mut head = statement.head(Some(self.ctx.version));
        if self.ctx.options.annotate_offsets {
            let _ = write!(head, " // {:04X}", statement.offset);
        }

        match &statement.kind {
            StatementKind::If {
                then, otherwise, ..
            } => {
                self.line(depth, &head);
                self.body(depth, then);
                if let Some(otherwise) = otherwise {
                    self.line(depth, "else");
                    self.body(depth, otherwise);
                }
            }
            StatementKind::While { body, .. } | StatementKind::For { body, .. } => {
                self.line(depth, &head);
                self.body(depth, body);
            }
            StatementKind::DoWhile { body, cond } => {
                self.line(depth, &head);
                self.body(depth, body);
                if let Some(cond) = cond {
                    self.line(depth, &format!("while ({})", cond.render(Some(self.ctx.version))));
                }
            }
            _ => self.line(depth, &head),
        }
    }

    fn body(&mut self, depth: usize, statements: &[Statement]) {
        self.line(depth, "{");
        self.statements(depth + 1, statements);
        self.line(depth, "}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        decompiler::{BinOp, DecompilerOptions, Expr, LValue},
        disassembler::{Scope, VariableRef, Version, Width},
    };

    fn local(index: u16) -> VariableRef {
        VariableRef {
            scope: Scope::Local,
            index,
            raw: 0x4000 | index,
            width: Width::Word,
            nested: None,
        }
    }

    fn sample() -> Vec<Statement> {
        vec![
            Statement::new(
                0,
                StatementKind::If {
                    cond: Expr::binary(BinOp::Gt, Expr::Var(local(0)), Expr::constant(2)),
                    then: vec![Statement::new(6, StatementKind::Yield)],
                    otherwise: Some(vec![Statement::new(
                        10,
                        StatementKind::Step {
                            target: LValue::Var(local(0)),
                            increment: false,
                        },
                    )]),
                },
            ),
            Statement::new(
                14,
                StatementKind::DoWhile {
                    body: vec![Statement::new(14, StatementKind::Yield)],
                    cond: Some(Expr::Var(local(1))),
                },
            ),
        ]
    }

    #[test]
    fn structured_statements() {
        let options = DecompilerOptions::default();
        let ctx = DecompileContext::new(Version::V6, &options);
        let mut printer = Printer::new(&ctx);
        printer.statements(1, &sample());

        assert_eq!(
            printer.finish(),
            "\tif (L.0 > 2)\n\t{\n\t\tbreakHere()\n\t}\n\telse\n\t{\n\t\tL.0--\n\t}\n\
             \tdo\n\t{\n\t\tbreakHere()\n\t}\n\twhile (L.1)\n"
        );
    }

    #[test]
    fn annotated_compact_output() {
        let options = DecompilerOptions {
            annotate_offsets: true,
            ..DecompilerOptions::compact()
        };
        let mut ctx = DecompileContext::new(Version::V6, &options);
        let statements = sample();
        ctx.collect_locals(&statements);

        let mut printer = Printer::new(&ctx);
        printer.locals(1);
        printer.statements(0, &statements[..1]);
        assert_eq!(
            printer.finish(),
            "if (L.0 > 2) // 0000\n{\n  breakHere() // 0006\n}\nelse\n{\n  L.0-- // 000A\n}\n"
        );
    }

    #[test]
    fn local_declarations() {
        let options = DecompilerOptions::default();
        let mut ctx = DecompileContext::new(Version::V6, &options);
        ctx.collect_locals(&sample());

        let mut printer = Printer::new(&ctx);
        printer.open(0, "script 3");
        printer.locals(1);
        printer.close(0);
        assert_eq!(
            printer.finish(),
            "script 3 {\n\tlocal variable L.0\n\tlocal variable L.1\n}\n"
        );
    }
}
