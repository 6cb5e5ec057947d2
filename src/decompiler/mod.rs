//! From decoded instructions to readable pseudo-code.
//!
//! The pipeline per script is strictly linear:
//!
//! 1. decode the bytes with the version's opcode table ([`crate::disassembler`])
//! 2. evaluate the instructions symbolically into [`Statement`]s ([`Evaluator`])
//! 3. slice object scripts into one [`ScriptUnit`] per verb ([`segment`])
//! 4. cut every unit into basic blocks and fold loops and conditionals ([`ControlGraph`])
//! 5. print the result ([`Printer`])
//!
//! Scripts share nothing but the read-only opcode tables, so [`Decompiler::decompile_all`]
//! processes them in parallel.
//!
//! # Key Types
//! - [`Decompiler`] - Entry point, one per version and configuration
//! - [`ScriptSource`] - The bytes of one script and what kind of script it is
//! - [`DecompilerOptions`] - Output configuration
//! - [`Expr`] and [`Statement`] - The symbolic program
//!
//! # Example
//!
//! ```rust
//! use scummscope::{Decompiler, ScriptKind, ScriptSource, Version};
//!
//! // pushByte 5, writeWordVar L.0, breakHere
//! let data = [0x00, 0x05, 0x43, 0x00, 0x40, 0x6C];
//! let text = Decompiler::new(Version::V6)
//!     .decompile(&ScriptSource::new(&ScriptKind::Global(1), &data))?;
//! assert_eq!(text, "script 1 {\n\tlocal variable L.0\n\tL.0 = 5\n\tbreakHere()\n}\n");
//! # Ok::<(), scummscope::Failure>(())
//! ```

mod context;
mod evaluator;
mod expr;
mod options;
mod render;
mod segment;
mod statement;
mod structurer;

use std::{collections::BTreeSet, fmt};

use log::debug;
use rayon::prelude::*;

pub use context::DecompileContext;
pub use evaluator::{evaluate, Evaluation, Evaluator};
pub use expr::{BinOp, Expr, Tag};
pub use options::DecompilerOptions;
pub use render::Printer;
pub use segment::{segment, ScriptUnit, VerbEntry, VerbTable};
pub use statement::{AssignOp, LValue, Statement, StatementKind};
pub use structurer::{BasicBlock, ControlGraph};

use crate::{
    disassembler::{Decoder, Segment, StringLiteral, Version},
    Error, Failure,
};

/// What a script blob is, which decides its header line and whether it carries a verb table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptKind {
    /// A global script
    Global(u16),
    /// A room-local script
    Local(u16),
    /// The room entry script
    Enter,
    /// The room exit script
    Exit,
    /// An object script: a verb table followed by the verbs' code
    Object {
        /// Object number
        id: u16,
        /// Object name, without NUL terminator
        name: Vec<u8>,
    },
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptKind::Global(id) | ScriptKind::Local(id) => write!(f, "script {id}"),
            ScriptKind::Enter => write!(f, "enter"),
            ScriptKind::Exit => write!(f, "exit"),
            ScriptKind::Object { id, .. } => write!(f, "object {id}"),
        }
    }
}

/// The bytes of one script-bearing chunk.
#[derive(Debug, Clone, Copy)]
pub struct ScriptSource<'a> {
    /// What the bytes are
    pub kind: &'a ScriptKind,
    /// The chunk payload; for object scripts the verb table comes first
    pub data: &'a [u8],
}

impl<'a> ScriptSource<'a> {
    /// Creates a source.
    #[must_use]
    pub fn new(kind: &'a ScriptKind, data: &'a [u8]) -> Self {
        ScriptSource { kind, data }
    }
}

/// Turns script bytes of one instruction-set version into pseudo-code.
///
/// A decompiler holds no per-script state; one instance can serve any number of scripts,
/// from any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct Decompiler {
    version: Version,
    options: DecompilerOptions,
}

impl Decompiler {
    /// Creates a decompiler with default options.
    #[must_use]
    pub fn new(version: Version) -> Self {
        Self::with_options(version, DecompilerOptions::default())
    }

    /// Creates a decompiler with the given options.
    #[must_use]
    pub fn with_options(version: Version, options: DecompilerOptions) -> Self {
        Decompiler { version, options }
    }

    /// The instruction-set version.
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// The output configuration.
    #[must_use]
    pub fn options(&self) -> &DecompilerOptions {
        &self.options
    }

    /// Decompiles one script.
    ///
    /// # Errors
    /// Returns a [`Failure`] carrying the error and whatever instructions and statements were
    /// produced before it. A failure never affects other scripts.
    pub fn decompile(&self, source: &ScriptSource<'_>) -> Result<String, Failure> {
        let script = source.kind.to_string();
        let fail = |error: Error| Failure::new(script.clone(), error);

        let verbs = match source.kind {
            ScriptKind::Object { .. } => Some(VerbTable::parse(source.data).map_err(fail)?),
            _ => None,
        };
        let header = verbs.as_ref().map_or(0, VerbTable::header_len);
        let body = source
            .data
            .get(header..)
            .ok_or_else(|| fail(out_of_bounds_error!()))?;
        if body.is_empty() {
            return Err(fail(Error::Empty));
        }

        let mut decoder = Decoder::new(body, header as u32, self.version);
        let decoded = decoder.decode_all().and_then(|()| decoder.validate_jumps()).and_then(|()| {
            if self.options.verify_round_trip {
                decoder.verify_round_trip()
            } else {
                Ok(())
            }
        });
        if let Err(error) = decoded {
            return Err(Failure {
                instructions: decoder.into_partial(),
                ..fail(error)
            });
        }
        let program = decoder.into_program();

        let mut evaluator = Evaluator::new();
        if let Err(error) = evaluator.run(&program) {
            return Err(Failure {
                instructions: program.iter().cloned().collect(),
                statements: evaluator.into_partial(),
                ..fail(error)
            });
        }
        let evaluation = evaluator.finish(program.base()..program.end());

        let units = match &verbs {
            Some(verbs) => segment(&evaluation, verbs).map_err(|error| Failure {
                instructions: program.iter().cloned().collect(),
                statements: evaluation.statements.clone(),
                ..fail(error)
            })?,
            None => vec![ScriptUnit::whole(&evaluation)],
        };

        debug!(
            "{script}: {} instructions, {} statements, {} units",
            program.instruction_count(),
            evaluation.statements.len(),
            units.len()
        );

        Ok(self.render(source.kind, units, &evaluation.labels))
    }

    /// Decompiles many scripts in parallel.
    ///
    /// Results come back in input order, one per source.
    #[must_use]
    pub fn decompile_all(&self, sources: &[ScriptSource<'_>]) -> Vec<Result<String, Failure>> {
        sources
            .par_iter()
            .map(|source| self.decompile(source))
            .collect()
    }

    fn render(&self, kind: &ScriptKind, units: Vec<ScriptUnit>, labels: &BTreeSet<u32>) -> String {
        match kind {
            ScriptKind::Object { name, .. } => {
                let ctx = DecompileContext::new(self.version, &self.options);
                let mut printer = Printer::new(&ctx);
                printer.open(0, &kind.to_string());
                let name = StringLiteral {
                    segments: vec![Segment::Text(name.clone())],
                };
                printer.line(1, &format!("name is \"{}\"", name.render()));

                let mut out = printer.finish();
                for unit in units {
                    let header = format!("verb {}", unit.verb.unwrap_or_default());
                    out.push_str(&self.render_unit(unit, labels, &header, 1));
                }
                out.push_str("}\n");
                out
            }
            _ => units
                .into_iter()
                .map(|unit| self.render_unit(unit, labels, &kind.to_string(), 0))
                .collect(),
        }
    }

    fn render_unit(
        &self,
        unit: ScriptUnit,
        labels: &BTreeSet<u32>,
        header: &str,
        depth: usize,
    ) -> String {
        let mut ctx = DecompileContext::new(self.version, &self.options);
        ctx.collect_locals(&unit.statements);

        let mut graph = ControlGraph::build(unit.statements, labels, unit.range);
        if self.options.structure {
            graph.restructure();
        }

        let mut printer = Printer::new(&ctx);
        printer.open(depth, header);
        printer.locals(depth + 1);
        printer.graph(depth + 1, &graph);
        printer.close(depth);
        printer.finish()
    }
}
