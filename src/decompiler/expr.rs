//! Symbolic expressions built by the stack evaluator.
//!
//! Expressions are never simplified or re-associated. Operator precedence only decides where
//! parentheses go when an expression is printed.

use std::fmt::{self, Write};

use strum::Display;

use crate::disassembler::{Operand, Scope, StringLiteral, VariableRef, Version};

/// What a constant denotes. Only changes how the constant is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Tag {
    /// Room number
    Room,
    /// Script number
    Script,
    /// Actor number
    Actor,
    /// Object number
    Object,
    /// Sound resource
    Sound,
    /// Costume resource
    Costume,
    /// Verb number
    Verb,
    /// Charset resource
    Charset,
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `&&`
    LAnd,
    /// `||`
    LOr,
    /// `&`
    BAnd,
    /// `|`
    BOr,
    /// `^`
    Xor,
}

impl BinOp {
    /// Printed symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Gt => ">",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::LAnd => "&&",
            BinOp::LOr => "||",
            BinOp::BAnd => "&",
            BinOp::BOr => "|",
            BinOp::Xor => "^",
        }
    }

    /// Binding strength; higher binds tighter.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            BinOp::Mul | BinOp::Div | BinOp::Mod => 12,
            BinOp::Add | BinOp::Sub => 11,
            BinOp::Shl | BinOp::Shr => 10,
            BinOp::Gt | BinOp::Lt | BinOp::Le | BinOp::Ge => 9,
            BinOp::Eq | BinOp::Ne => 8,
            BinOp::BAnd => 7,
            BinOp::Xor => 6,
            BinOp::BOr => 5,
            BinOp::LAnd => 4,
            BinOp::LOr => 3,
        }
    }

    /// The comparison that holds exactly when `self` does not.
    #[must_use]
    pub const fn inverse(self) -> Option<BinOp> {
        match self {
            BinOp::Eq => Some(BinOp::Ne),
            BinOp::Ne => Some(BinOp::Eq),
            BinOp::Lt => Some(BinOp::Ge),
            BinOp::Ge => Some(BinOp::Lt),
            BinOp::Gt => Some(BinOp::Le),
            BinOp::Le => Some(BinOp::Gt),
            _ => None,
        }
    }
}

const PREC_NOT: u8 = 14;
const PREC_ATOM: u8 = 15;

/// A symbolic value: what the evaluator keeps on its stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// An integer constant
    Const {
        /// The value
        value: i64,
        /// What the value denotes, if known
        tag: Option<Tag>,
    },
    /// A variable read
    Var(VariableRef),
    /// A string literal
    Str(StringLiteral),
    /// An array element read
    Array {
        /// The array variable
        array: VariableRef,
        /// Index values, outermost first
        indices: Vec<Expr>,
    },
    /// A binary operation
    Binary {
        /// Operator
        op: BinOp,
        /// Left operand
        lhs: Box<Expr>,
        /// Right operand
        rhs: Box<Expr>,
    },
    /// Logical negation
    Not(Box<Expr>),
    /// A function call or a command
    Call {
        /// Callee name
        name: String,
        /// Arguments in call-site order
        args: Vec<Expr>,
    },
    /// A counted argument list
    List(Vec<Expr>),
}

impl Expr {
    /// An untagged constant.
    #[must_use]
    pub fn constant(value: i64) -> Self {
        Expr::Const { value, tag: None }
    }

    /// Builds a binary expression.
    #[must_use]
    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Converts a decoded value operand.
    ///
    /// Returns `None` for operands that are not values (jumps, sub-forms, terminators).
    #[must_use]
    pub fn from_operand(operand: &Operand) -> Option<Self> {
        match operand {
            Operand::Immediate { value, .. } => Some(Expr::constant(*value)),
            Operand::VariableRef(var) => Some(Expr::Var(var.clone())),
            Operand::StringLiteral(text) => Some(Expr::Str(text.clone())),
            Operand::VarArg { value, .. } => Expr::from_operand(value),
            Operand::JumpTarget(_) | Operand::SubOp(_) | Operand::End(_) => None,
        }
    }

    /// Applies `tag` to an untagged constant; other expressions are returned unchanged.
    #[must_use]
    pub fn tagged(self, tag: Option<Tag>) -> Self {
        match (self, tag) {
            (Expr::Const { value, tag: None }, Some(tag)) => Expr::Const {
                value,
                tag: Some(tag),
            },
            (expr, _) => expr,
        }
    }

    /// The logical negation, folding double negation and inverting comparisons.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Expr::Not(inner) => *inner,
            Expr::Binary { op, lhs, rhs } => match op.inverse() {
                Some(inverse) => Expr::Binary {
                    op: inverse,
                    lhs,
                    rhs,
                },
                None => Expr::Not(Box::new(Expr::Binary { op, lhs, rhs })),
            },
            other => Expr::Not(Box::new(other)),
        }
    }

    /// Binding strength used for parenthesization.
    #[must_use]
    pub fn precedence(&self) -> u8 {
        match self {
            Expr::Binary { op, .. } => op.precedence(),
            Expr::Not(_) => PREC_NOT,
            _ => PREC_ATOM,
        }
    }

    /// Returns `true` if the expression reads the variable slot of `var`.
    #[must_use]
    pub fn reads(&self, var: &VariableRef) -> bool {
        let mut found = false;
        self.visit_vars(&mut |seen| found |= seen.same_slot(var));
        found
    }

    /// Calls `f` for every variable the expression mentions, array variables included.
    pub fn visit_vars(&self, f: &mut dyn FnMut(&VariableRef)) {
        match self {
            Expr::Const { .. } | Expr::Str(_) => {}
            Expr::Var(var) => visit_var(var, f),
            Expr::Array { array, indices } => {
                visit_var(array, f);
                for index in indices {
                    index.visit_vars(f);
                }
            }
            Expr::Binary { lhs, rhs, .. } => {
                lhs.visit_vars(f);
                rhs.visit_vars(f);
            }
            Expr::Not(inner) => inner.visit_vars(f),
            Expr::Call { args, .. } | Expr::List(args) => {
                for arg in args {
                    arg.visit_vars(f);
                }
            }
        }
    }

    /// Renders the expression, naming well-known globals of `version` when given.
    #[must_use]
    pub fn render(&self, version: Option<Version>) -> String {
        let mut out = String::new();
        self.write(&mut out, version);
        out
    }

    pub(crate) fn write(&self, out: &mut String, version: Option<Version>) {
        match self {
            Expr::Const { value, tag: None } => {
                let _ = write!(out, "{value}");
            }
            Expr::Const {
                value,
                tag: Some(tag),
            } => {
                let _ = write!(out, "{tag}#{value}");
            }
            Expr::Var(var) => write_var(out, var, version),
            Expr::Str(text) => {
                let _ = write!(out, "\"{}\"", text.render());
            }
            Expr::Array { array, indices } => {
                write_var(out, array, version);
                out.push('[');
                write_list(out, indices, version);
                out.push(']');
            }
            Expr::Binary { op, lhs, rhs } => {
                let prec = op.precedence();
                write_operand(out, lhs, version, lhs.precedence() < prec);
                let _ = write!(out, " {} ", op.symbol());
                write_operand(out, rhs, version, rhs.precedence() <= prec);
            }
            Expr::Not(inner) => {
                out.push('!');
                write_operand(out, inner, version, inner.precedence() < PREC_NOT);
            }
            Expr::Call { name, args } => {
                out.push_str(name);
                out.push('(');
                write_list(out, args, version);
                out.push(')');
            }
            Expr::List(items) => {
                out.push('[');
                write_list(out, items, version);
                out.push(']');
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(None))
    }
}

fn visit_var(var: &VariableRef, f: &mut dyn FnMut(&VariableRef)) {
    f(var);
    if let Some(Operand::VariableRef(inner)) = var.nested.as_deref() {
        f(inner);
    }
}

fn write_operand(out: &mut String, expr: &Expr, version: Option<Version>, parens: bool) {
    if parens {
        out.push('(');
        expr.write(out, version);
        out.push(')');
    } else {
        expr.write(out, version);
    }
}

fn write_list(out: &mut String, items: &[Expr], version: Option<Version>) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        item.write(out, version);
    }
}

/// Writes a variable, by name when it is a well-known global.
pub(crate) fn write_var(out: &mut String, var: &VariableRef, version: Option<Version>) {
    let name = match (version, var.nested.is_none()) {
        (Some(version), true) if var.scope == Scope::Global => {
            version.global_name(var.index)
        }
        _ => None,
    };

    match name {
        Some(name) => out.push_str(name),
        None => {
            let _ = write!(out, "{var}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disassembler::Width;

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

    #[test]
    fn parenthesize_by_precedence() {
        let sum = Expr::binary(BinOp::Add, local(0), Expr::constant(1));
        let product = Expr::binary(BinOp::Mul, sum.clone(), Expr::constant(2));
        assert_eq!(product.to_string(), "(L.0 + 1) * 2");

        let no_parens = Expr::binary(
            BinOp::Add,
            Expr::constant(2),
            Expr::binary(BinOp::Mul, local(1), local(2)),
        );
        assert_eq!(no_parens.to_string(), "2 + L.1 * L.2");

        let right_assoc = Expr::binary(BinOp::Sub, local(0), sum);
        assert_eq!(right_assoc.to_string(), "L.0 - (L.0 + 1)");
    }

    #[test]
    fn negate_inverts_comparisons() {
        let lt = Expr::binary(BinOp::Lt, local(0), Expr::constant(10));
        assert_eq!(lt.clone().negate().to_string(), "L.0 >= 10");
        assert_eq!(lt.clone().negate().negate(), lt);

        let call = Expr::Call {
            name: "isScriptRunning".to_string(),
            args: vec![Expr::constant(3).tagged(Some(Tag::Script))],
        };
        let negated = call.clone().negate();
        assert_eq!(negated.to_string(), "!isScriptRunning(script#3)");
        assert_eq!(negated.negate(), call);

        let and = Expr::binary(BinOp::LAnd, local(0), local(1));
        assert_eq!(and.negate().to_string(), "!(L.0 && L.1)");
    }

    #[test]
    fn well_known_globals() {
        let ego = Expr::Var(var(Scope::Global, 1));
        assert_eq!(ego.render(Some(Version::V6)), "VAR_EGO");
        assert_eq!(ego.render(None), "V.1");
        assert_eq!(Expr::Var(var(Scope::Bit, 1)).render(Some(Version::V6)), "B.1");
    }

    #[test]
    fn tags_apply_only_to_untagged_constants() {
        assert_eq!(Expr::constant(7).tagged(Some(Tag::Room)).to_string(), "room#7");
        assert_eq!(
            Expr::constant(7).tagged(Some(Tag::Room)).tagged(Some(Tag::Actor)).to_string(),
            "room#7"
        );
        assert_eq!(local(2).tagged(Some(Tag::Actor)), local(2));
    }

    #[test]
    fn arrays_and_lists() {
        let read = Expr::Array {
            array: var(Scope::Global, 300),
            indices: vec![local(0), Expr::constant(2)],
        };
        assert_eq!(read.to_string(), "V.300[L.0, 2]");
        assert_eq!(Expr::List(vec![Expr::constant(1), local(0)]).to_string(), "[1, L.0]");
        assert!(read.reads(&var(Scope::Local, 0)));
        assert!(!read.reads(&var(Scope::Local, 1)));
    }
}
