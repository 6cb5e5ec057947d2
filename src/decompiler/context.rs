//! Per-invocation decompilation state.

use std::collections::BTreeSet;

use crate::{
    decompiler::{DecompilerOptions, Statement},
    disassembler::Version,
};

/// State shared by the rendering steps of one script unit.
///
/// A context is created per unit and never outlives the call that renders it, so nothing
/// leaks between scripts decompiled in parallel.
#[derive(Debug, Clone)]
pub struct DecompileContext<'a> {
    /// Instruction-set version of the script
    pub version: Version,
    /// Output configuration
    pub options: &'a DecompilerOptions,
    /// Indices of the local variables the unit mentions
    pub locals: BTreeSet<u16>,
}

impl<'a> DecompileContext<'a> {
    /// Creates a context without any known locals.
    #[must_use]
    pub fn new(version: Version, options: &'a DecompilerOptions) -> Self {
        DecompileContext {
            version,
            options,
            locals: BTreeSet::new(),
        }
    }

    /// Records every local variable mentioned by `statements`, nested bodies included.
    pub fn collect_locals<'s>(&mut self, statements: impl IntoIterator<Item = &'s Statement>) {
        for statement in statements {
            statement.visit_vars(&mut |var| {
                if var.is_local() {
                    self.locals.insert(var.index);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        decompiler::{AssignOp, Expr, LValue, StatementKind},
        disassembler::{Scope, VariableRef, Width},
    };

    fn var(scope: Scope, index: u16) -> VariableRef {
        VariableRef {
            scope,
            index,
            raw: index,
            width: Width::Word,
            nested: None,
        }
    }

    #[test]
    fn collects_nested_locals() {
        let options = DecompilerOptions::default();
        let mut ctx = DecompileContext::new(Version::V6, &options);

        let statements = vec![Statement::new(
            0,
            StatementKind::If {
                cond: Expr::Var(var(Scope::Local, 3)),
                then: vec![Statement::new(
                    4,
                    StatementKind::Assign {
                        target: LValue::Var(var(Scope::Local, 1)),
                        op: AssignOp::Set,
                        value: Expr::Var(var(Scope::Global, 7)),
                    },
                )],
                otherwise: None,
            },
        )];
        ctx.collect_locals(&statements);

        assert_eq!(ctx.locals.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
    }
}
