//! Control-flow structuring.
//!
//! A [`ControlGraph`] cuts the evaluator's linear statement list into basic blocks and then
//! rewrites recognizable block patterns into structured statements until no rule applies.
//! Rules are tried in a fixed priority order and the scan restarts after every rewrite:
//!
//! 1. absorption: drop a `goto` to the very next block, merge a block that is only reached by
//!    falling through into its predecessor
//! 2. bottom-tested `for`: a self loop stepping and testing a variable initialized right
//!    before the loop
//! 3. `do` loops: any other self loop, `break until` for loops that only yield
//! 4. top-tested `while` and `for`
//! 5. `if`
//! 6. `if` / `else`
//!
//! Every rewrite removes at least one block or one branch marker, so the loop terminates.
//! Whatever matches no rule stays a labeled block with explicit `goto`s, which is valid output
//! for irreducible control flow.
//!
//! Branch markers only ever appear as the last statement of a top-level block: blocks are cut
//! after every branch and the rules never nest a body that still ends in one.

use std::{collections::BTreeSet, ops::Range};

use log::{debug, trace};

use crate::decompiler::{Statement, StatementKind};

/// A straight-line run of statements entered only at its label.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    /// Offset the block starts at
    pub label: u32,
    /// Statements; a branch marker can only be the last one
    pub body: Vec<Statement>,
}

impl BasicBlock {
    /// Returns `true` if the block ends with a branch marker.
    #[must_use]
    pub fn ends_with_branch(&self) -> bool {
        self.body.last().is_some_and(Statement::is_branch)
    }

    fn last_kind(&self) -> Option<&StatementKind> {
        self.body.last().map(|statement| &statement.kind)
    }
}

/// The basic blocks of one script unit, in layout order.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlGraph {
    blocks: Vec<BasicBlock>,
    end: u32,
}

impl ControlGraph {
    /// Cuts `statements` into basic blocks.
    ///
    /// Blocks start at `range.start`, at every label inside `range` and after every branch
    /// marker. Labels outside the range belong to another unit and are ignored.
    #[must_use]
    pub fn build(statements: Vec<Statement>, labels: &BTreeSet<u32>, range: Range<u32>) -> Self {
        let mut starts = BTreeSet::new();
        starts.insert(range.start);
        starts.extend(labels.iter().copied().filter(|label| range.contains(label)));
        for pair in statements.windows(2) {
            if pair[0].is_branch() {
                starts.insert(pair[1].offset);
            }
        }

        let mut blocks: Vec<BasicBlock> = starts
            .into_iter()
            .map(|label| BasicBlock {
                label,
                body: Vec::new(),
            })
            .collect();

        for statement in statements {
            let index = blocks
                .partition_point(|block| block.label <= statement.offset)
                .saturating_sub(1);
            blocks[index].body.push(statement);
        }

        ControlGraph {
            blocks,
            end: range.end,
        }
    }

    /// The blocks in layout order.
    #[must_use]
    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    /// Offset one past the unit; the implicit exit every last block falls through to.
    #[must_use]
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Number of branch markers targeting `label`.
    #[must_use]
    pub fn target_count(&self, label: u32) -> usize {
        self.blocks
            .iter()
            .filter(|block| block.body.last().and_then(Statement::branch_target) == Some(label))
            .count()
    }

    /// Successor labels of the block at `index`: the branch target first, then the
    /// fallthrough. The exit is reported as [`ControlGraph::end`].
    #[must_use]
    pub fn successors(&self, index: usize) -> Vec<u32> {
        match self.blocks[index].last_kind() {
            Some(StatementKind::ConditionalBranch { target, .. }) => {
                vec![*target, self.next_label(index)]
            }
            Some(StatementKind::UnconditionalBranch { target }) => vec![*target],
            _ => vec![self.next_label(index)],
        }
    }

    /// Labels of the blocks that can transfer control to `label`.
    #[must_use]
    pub fn predecessors(&self, label: u32) -> Vec<u32> {
        (0..self.blocks.len())
            .filter(|&index| self.successors(index).contains(&label))
            .map(|index| self.blocks[index].label)
            .collect()
    }

    /// Labels still targeted by a branch marker; these render as explicit labels.
    #[must_use]
    pub fn residual_labels(&self) -> Vec<u32> {
        self.blocks
            .iter()
            .map(|block| block.label)
            .filter(|label| self.target_count(*label) > 0)
            .collect()
    }

    /// Statement offsets in source order, through every structured statement.
    #[must_use]
    pub fn flatten_offsets(&self) -> Vec<u32> {
        let mut out = Vec::new();
        for block in &self.blocks {
            for statement in &block.body {
                statement.flatten_offsets(&mut out);
            }
        }
        out
    }

    /// Runs the rewrite rules until none applies and returns the number of rewrites.
    ///
    /// A graph that is already fully structured reports zero.
    pub fn restructure(&mut self) -> usize {
        let mut rewrites = 0;
        while self.absorb()
            || self.for_bottom()
            || self.do_loop()
            || self.while_loop()
            || self.if_then()
            || self.if_else()
        {
            rewrites += 1;
        }

        debug!(
            "structured with {} rewrites, {} blocks left",
            rewrites,
            self.blocks.len()
        );
        rewrites
    }

    fn next_label(&self, index: usize) -> u32 {
        self.blocks
            .get(index + 1)
            .map_or(self.end, |block| block.label)
    }

    fn absorb(&mut self) -> bool {
        for index in 0..self.blocks.len() {
            let next = self.next_label(index);
            if let Some(StatementKind::UnconditionalBranch { target }) = self.blocks[index].last_kind() {
                if *target == next {
                    trace!("drop goto [{next:04X}]");
                    self.blocks[index].body.pop();
                    return true;
                }
            }
        }

        for index in 1..self.blocks.len() {
            let label = self.blocks[index].label;
            if !self.blocks[index - 1].ends_with_branch() && self.target_count(label) == 0 {
                trace!("absorb [{label:04X}]");
                let block = self.blocks.remove(index);
                self.blocks[index - 1].body.extend(block.body);
                return true;
            }
        }
        false
    }

    fn matches_for_bottom(&self, index: usize) -> bool {
        let block = &self.blocks[index];
        let [.., step, last] = block.body.as_slice() else {
            return false;
        };
        let StatementKind::ConditionalBranch {
            branch_when,
            target,
        } = &last.kind
        else {
            return false;
        };
        if *target != block.label || self.target_count(block.label) != 1 {
            return false;
        }
        let Some(var) = step.stepped_var() else {
            return false;
        };

        branch_when.reads(var)
            && self.blocks[index - 1]
                .body
                .last()
                .and_then(Statement::assigned_var)
                .is_some_and(|init| init.same_slot(var))
    }

    fn for_bottom(&mut self) -> bool {
        let Some(index) = (1..self.blocks.len()).find(|&index| self.matches_for_bottom(index)) else {
            return false;
        };

        let init = self.blocks[index - 1].body.pop();
        let mut body = std::mem::take(&mut self.blocks[index].body);
        let branch = body.pop();
        let step = body.pop();
        let (
            Some(init),
            Some(step),
            Some(Statement {
                offset,
                kind: StatementKind::ConditionalBranch { branch_when, .. },
            }),
        ) = (init, step, branch)
        else {
            return false;
        };

        trace!("for loop at [{:04X}]", self.blocks[index].label);
        self.blocks[index].body.push(Statement::new(
            offset,
            StatementKind::For {
                init: Box::new(init),
                cond: branch_when,
                step: Box::new(step),
                body,
            },
        ));
        true
    }

    fn do_loop(&mut self) -> bool {
        let Some(index) = (0..self.blocks.len()).find(|&index| {
            let block = &self.blocks[index];
            block.body.last().and_then(Statement::branch_target) == Some(block.label)
                && self.target_count(block.label) == 1
        }) else {
            return false;
        };

        let mut body = std::mem::take(&mut self.blocks[index].body);
        let Some(branch) = body.pop() else {
            return false;
        };

        let statement = match branch.kind {
            StatementKind::ConditionalBranch { branch_when, .. }
                if body
                    .iter()
                    .all(|statement| statement.kind == StatementKind::Yield) =>
            {
                let offset = body.first().map_or(branch.offset, |first| first.offset);
                Statement::new(offset, StatementKind::BreakUntil(branch_when.negate()))
            }
            StatementKind::ConditionalBranch { branch_when, .. } => Statement::new(
                branch.offset,
                StatementKind::DoWhile {
                    body,
                    cond: Some(branch_when),
                },
            ),
            _ => Statement::new(branch.offset, StatementKind::DoWhile { body, cond: None }),
        };

        trace!("do loop at [{:04X}]", self.blocks[index].label);
        self.blocks[index].body.push(statement);
        true
    }

    fn matches_while(&self, index: usize) -> bool {
        let header = &self.blocks[index];
        let [Statement {
            kind: StatementKind::ConditionalBranch { target: exit, .. },
            ..
        }] = header.body.as_slice()
        else {
            return false;
        };
        let Some(body) = self.blocks.get(index + 1) else {
            return false;
        };

        self.target_count(body.label) == 0
            && body.body.last().and_then(|last| match last.kind {
                StatementKind::UnconditionalBranch { target } => Some(target),
                _ => None,
            }) == Some(header.label)
            && self.next_label(index + 1) == *exit
    }

    fn while_loop(&mut self) -> bool {
        let Some(index) = (0..self.blocks.len()).find(|&index| self.matches_while(index)) else {
            return false;
        };

        let lone_entry = self.target_count(self.blocks[index].label) == 1;
        let mut body = self.blocks.remove(index + 1).body;
        body.pop();
        let Some(Statement {
            offset,
            kind: StatementKind::ConditionalBranch { branch_when, .. },
        }) = self.blocks[index].body.pop()
        else {
            return false;
        };
        let cond = branch_when.negate();

        trace!("while loop at [{:04X}]", self.blocks[index].label);

        let counter = body
            .last()
            .and_then(Statement::stepped_var)
            .filter(|var| cond.reads(var))
            .cloned();
        let has_init = lone_entry
            && index > 0
            && counter.as_ref().is_some_and(|var| {
                self.blocks[index - 1]
                    .body
                    .last()
                    .and_then(Statement::assigned_var)
                    .is_some_and(|init| init.same_slot(var))
            });

        if has_init {
            if let (Some(init), Some(step)) = (self.blocks[index - 1].body.pop(), body.pop()) {
                self.blocks[index].body.push(Statement::new(
                    offset,
                    StatementKind::For {
                        init: Box::new(init),
                        cond,
                        step: Box::new(step),
                        body,
                    },
                ));
                return true;
            }
        }

        self.blocks[index]
            .body
            .push(Statement::new(offset, StatementKind::While { cond, body }));
        true
    }

    fn matches_if(&self, index: usize) -> bool {
        let Some(StatementKind::ConditionalBranch { target, .. }) = self.blocks[index].last_kind()
        else {
            return false;
        };
        if *target == self.next_label(index) {
            return true;
        }
        let Some(then) = self.blocks.get(index + 1) else {
            return false;
        };

        self.target_count(then.label) == 0
            && !then.ends_with_branch()
            && self.next_label(index + 1) == *target
    }

    fn if_then(&mut self) -> bool {
        let Some(index) = (0..self.blocks.len()).find(|&index| self.matches_if(index)) else {
            return false;
        };

        let next = self.next_label(index);
        let Some(Statement {
            offset,
            kind: StatementKind::ConditionalBranch {
                branch_when,
                target,
            },
        }) = self.blocks[index].body.pop()
        else {
            return false;
        };
        let then = if target == next {
            Vec::new()
        } else {
            self.blocks.remove(index + 1).body
        };

        trace!("if at [{offset:04X}]");
        self.blocks[index].body.push(Statement::new(
            offset,
            StatementKind::If {
                cond: branch_when.negate(),
                then,
                otherwise: None,
            },
        ));
        true
    }

    fn matches_if_else(&self, index: usize) -> bool {
        let Some(StatementKind::ConditionalBranch { target, .. }) = self.blocks[index].last_kind()
        else {
            return false;
        };
        let (Some(then), Some(otherwise)) = (self.blocks.get(index + 1), self.blocks.get(index + 2))
        else {
            return false;
        };
        let Some(StatementKind::UnconditionalBranch { target: exit }) = then.last_kind() else {
            return false;
        };

        let rejoins = match otherwise.last_kind() {
            Some(StatementKind::UnconditionalBranch { target }) => target == exit,
            Some(StatementKind::ConditionalBranch { .. }) => false,
            _ => self.next_label(index + 2) == *exit,
        };

        otherwise.label == *target
            && exit != target
            && self.target_count(then.label) == 0
            && self.target_count(otherwise.label) == 1
            && rejoins
    }

    fn if_else(&mut self) -> bool {
        let Some(index) = (0..self.blocks.len()).find(|&index| self.matches_if_else(index)) else {
            return false;
        };

        let mut otherwise = self.blocks.remove(index + 2).body;
        let mut then = self.blocks.remove(index + 1).body;
        then.pop();
        let exit = if otherwise.last().is_some_and(Statement::is_branch) {
            otherwise.pop()
        } else {
            None
        };

        let Some(Statement {
            offset,
            kind: StatementKind::ConditionalBranch { branch_when, .. },
        }) = self.blocks[index].body.pop()
        else {
            return false;
        };

        trace!("if/else at [{offset:04X}]");
        let block = &mut self.blocks[index].body;
        block.push(Statement::new(
            offset,
            StatementKind::If {
                cond: branch_when.negate(),
                then,
                otherwise: Some(otherwise),
            },
        ));
        // both arms jump to the same exit; keep one jump after the whole statement
        if let Some(exit) = exit {
            block.push(exit);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        decompiler::{evaluate, AssignOp, BinOp, Expr, LValue},
        disassembler::{decode, Scope, VariableRef, Version, Width},
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

    fn local(index: u16) -> Expr {
        Expr::Var(var(Scope::Local, index))
    }

    fn at(offset: u32, kind: StatementKind) -> Statement {
        Statement::new(offset, kind)
    }

    fn call(offset: u32, name: &str) -> Statement {
        at(
            offset,
            StatementKind::Expr(Expr::Call {
                name: name.to_string(),
                args: Vec::new(),
            }),
        )
    }

    fn branch(offset: u32, cond: Expr, target: u32) -> Statement {
        at(
            offset,
            StatementKind::ConditionalBranch {
                branch_when: cond,
                target,
            },
        )
    }

    fn goto(offset: u32, target: u32) -> Statement {
        at(offset, StatementKind::UnconditionalBranch { target })
    }

    fn graph(statements: Vec<Statement>, end: u32) -> ControlGraph {
        let labels = statements
            .iter()
            .filter_map(Statement::branch_target)
            .collect();
        ControlGraph::build(statements, &labels, 0..end)
    }

    fn assert_order_preserved(original: &[u32], graph: &ControlGraph) {
        let flattened = graph.flatten_offsets();
        assert!(flattened.windows(2).all(|pair| pair[0] <= pair[1]), "{flattened:?}");
        let mut rest = original.iter();
        for offset in &flattened {
            assert!(rest.any(|candidate| candidate == offset), "{offset} out of order");
        }
    }

    #[test]
    fn build_cuts_at_labels_and_branches() {
        let statements = vec![
            call(0, "a"),
            branch(2, local(0), 9),
            call(5, "b"),
            goto(6, 0),
            call(9, "c"),
        ];
        let graph = graph(statements, 10);

        let labels: Vec<_> = graph.blocks().iter().map(|block| block.label).collect();
        assert_eq!(labels, vec![0, 5, 9]);
        assert_eq!(graph.successors(0), vec![9, 5]);
        assert_eq!(graph.successors(1), vec![0]);
        assert_eq!(graph.successors(2), vec![10]);
        assert_eq!(graph.predecessors(9), vec![0]);
        assert_eq!(graph.target_count(0), 1);
    }

    #[test]
    fn counting_loop_becomes_for() {
        let data = [
            0x00, 0x05, 0x43, 0x00, 0x40, 0x03, 0x00, 0x40, 0x00, 0x0A, 0x11, 0x5D, 0x06, 0x00,
            0x4F, 0x00, 0x40, 0x73, 0xF1, 0xFF, 0x6C,
        ];
        let program = decode(&data, Version::V6).unwrap();
        let evaluation = evaluate(&program).unwrap();
        let original: Vec<_> = evaluation.statements.iter().map(|s| s.offset).collect();

        let mut graph = ControlGraph::build(
            evaluation.statements,
            &evaluation.labels,
            evaluation.range.clone(),
        );
        assert_eq!(graph.blocks().len(), 4);
        assert!(graph.restructure() > 0);

        assert_eq!(graph.blocks().len(), 1);
        assert!(graph.residual_labels().is_empty());
        let body = &graph.blocks()[0].body;
        assert_eq!(body.len(), 2);
        match &body[0].kind {
            StatementKind::For { body, .. } => assert!(body.is_empty()),
            other => panic!("Expected For, got {other:?}"),
        }
        assert_eq!(body[0].head(None), "for (L.0 = 5; L.0 < 10; L.0++)");
        assert_eq!(body[1].kind, StatementKind::Yield);

        assert_eq!(graph.flatten_offsets(), vec![0, 5, 14, 20]);
        assert_order_preserved(&original, &graph);
        assert_eq!(graph.restructure(), 0);
    }

    #[test]
    fn bottom_tested_for() {
        let init = at(
            0,
            StatementKind::Assign {
                target: LValue::Var(var(Scope::Local, 0)),
                op: AssignOp::Set,
                value: Expr::constant(0),
            },
        );
        let step = at(
            4,
            StatementKind::Step {
                target: LValue::Var(var(Scope::Local, 0)),
                increment: true,
            },
        );
        let cond = Expr::binary(BinOp::Lt, local(0), Expr::constant(5));
        let statements = vec![
            init,
            at(3, StatementKind::Yield),
            step,
            branch(7, cond, 3),
            call(10, "done"),
        ];
        let mut graph = graph(statements, 11);
        graph.restructure();

        let body = &graph.blocks()[0].body;
        assert_eq!(graph.blocks().len(), 1);
        assert_eq!(body[0].head(None), "for (L.0 = 0; L.0 < 5; L.0++)");
        assert_eq!(graph.flatten_offsets(), vec![0, 3, 4, 7, 10]);
    }

    #[test]
    fn if_else() {
        let statements = vec![
            branch(0, local(0), 10),
            call(4, "a"),
            goto(6, 14),
            call(10, "b"),
            call(14, "c"),
        ];
        let original: Vec<_> = statements.iter().map(|s| s.offset).collect();
        let mut graph = graph(statements, 15);
        assert_eq!(graph.restructure(), 2);

        assert_eq!(graph.blocks().len(), 1);
        let body = &graph.blocks()[0].body;
        match &body[0].kind {
            StatementKind::If {
                cond,
                then,
                otherwise: Some(otherwise),
            } => {
                assert_eq!(cond.to_string(), "!L.0");
                assert_eq!(then[0].head(None), "a()");
                assert_eq!(otherwise[0].head(None), "b()");
            }
            other => panic!("Expected If with else, got {other:?}"),
        }
        assert_eq!(body[1].head(None), "c()");
        assert_order_preserved(&original, &graph);
    }

    #[test]
    fn if_then_and_empty_if() {
        let statements = vec![
            branch(0, Expr::binary(BinOp::Eq, local(0), Expr::constant(1)), 6),
            call(4, "a"),
            branch(6, local(1), 9),
            call(9, "b"),
        ];
        let mut graph = graph(statements, 10);
        graph.restructure();

        assert_eq!(graph.blocks().len(), 1);
        let body = &graph.blocks()[0].body;
        assert_eq!(body[0].head(None), "if (L.0 != 1)");
        assert_eq!(body[1].head(None), "if (!L.1)");
        match &body[1].kind {
            StatementKind::If { then, .. } => assert!(then.is_empty()),
            other => panic!("Expected If, got {other:?}"),
        }
    }

    #[test]
    fn break_until() {
        // breakHere, pushWordVar V.5, pushByte 0, eq, if [0000]
        let data = [0x6C, 0x03, 0x05, 0x00, 0x00, 0x00, 0x0E, 0x5C, 0xF6, 0xFF];
        let program = decode(&data, Version::V6).unwrap();
        let evaluation = evaluate(&program).unwrap();
        let mut graph = ControlGraph::build(
            evaluation.statements,
            &evaluation.labels,
            evaluation.range.clone(),
        );
        graph.restructure();

        let body = &graph.blocks()[0].body;
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].head(None), "break until (V.5 != 0)");
        assert_eq!(body[0].offset, 0);
    }

    #[test]
    fn do_while_and_endless_do() {
        let statements = vec![
            call(0, "a"),
            at(
                2,
                StatementKind::Step {
                    target: LValue::Var(var(Scope::Local, 0)),
                    increment: true,
                },
            ),
            branch(5, local(1), 0),
            call(8, "b"),
            goto(9, 8),
        ];
        let mut graph = graph(statements, 12);
        graph.restructure();

        let body = &graph.blocks()[0].body;
        assert_eq!(graph.blocks().len(), 1);
        match &body[0].kind {
            StatementKind::DoWhile { body, cond } => {
                assert_eq!(body.len(), 2);
                assert_eq!(cond.as_ref().map(ToString::to_string), Some("L.1".to_string()));
            }
            other => panic!("Expected DoWhile, got {other:?}"),
        }
        match &body[1].kind {
            StatementKind::DoWhile { body, cond: None } => assert_eq!(body.len(), 1),
            other => panic!("Expected endless DoWhile, got {other:?}"),
        }
        assert_eq!(graph.flatten_offsets(), vec![0, 2, 5, 8, 9]);
    }

    #[test]
    fn while_without_init() {
        let statements = vec![
            branch(0, local(3), 9),
            at(4, StatementKind::Yield),
            goto(5, 0),
            call(9, "after"),
        ];
        let mut graph = graph(statements, 10);
        graph.restructure();

        let body = &graph.blocks()[0].body;
        assert_eq!(graph.blocks().len(), 1);
        assert_eq!(body[0].head(None), "while (!L.3)");
        assert_eq!(body[1].head(None), "after()");
    }

    #[test]
    fn irreducible_flow_keeps_labels() {
        let statements = vec![
            goto(0, 8),
            call(4, "a"),
            call(8, "b"),
            branch(9, local(0), 4),
        ];
        let mut graph = graph(statements, 12);
        assert_eq!(graph.restructure(), 0);
        assert_eq!(graph.residual_labels(), vec![4, 8]);
        assert_eq!(graph.restructure(), 0);
    }
}
