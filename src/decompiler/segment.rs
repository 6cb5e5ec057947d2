//! Object script verb tables and script units.
//!
//! An object script starts with a small verb table mapping verb identifiers to entry points
//! in one shared instruction blob:
//!
//! ```text
//! +--------+----------+--------+----------+-----+------+------------------------+
//! | verb 1 | offset 1 | verb 2 | offset 2 | ... | 0x00 | instructions           |
//! |  u8    |  u16 LE  |  u8    |  u16 LE  |     |      |                        |
//! +--------+----------+--------+----------+-----+------+------------------------+
//! ```
//!
//! Offsets count from the start of the table. The blob is decoded and evaluated once; the
//! segmenter then slices the statements at the entry points instead of decoding per verb.

use std::ops::Range;

use crate::{
    decompiler::{Evaluation, Statement},
    Error, Parser, Result,
};

/// One verb table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerbEntry {
    /// Verb identifier, never zero
    pub verb: u8,
    /// Entry point, counted from the start of the table
    pub offset: u16,
}

/// The verb table at the start of an object script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerbTable {
    entries: Vec<VerbEntry>,
}

impl VerbTable {
    /// Reads entries up to the zero terminator.
    ///
    /// # Errors
    /// Returns [`Error::OutOfBounds`] if the terminator is missing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scummscope::decompiler::VerbTable;
    ///
    /// let table = VerbTable::parse(&[0x01, 0x07, 0x00, 0x00, 0x65])?;
    /// assert_eq!(table.len(), 1);
    /// assert_eq!(table.header_len(), 4);
    /// # Ok::<(), scummscope::Error>(())
    /// ```
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut parser = Parser::new(data);
        let mut entries = Vec::new();
        loop {
            let verb = parser.read_le::<u8>()?;
            if verb == 0 {
                break;
            }
            let offset = parser.read_le::<u16>()?;
            entries.push(VerbEntry { verb, offset });
        }
        Ok(VerbTable { entries })
    }

    /// Size of the table in bytes, terminator included.
    #[must_use]
    pub fn header_len(&self) -> usize {
        self.entries.len() * 3 + 1
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` for a table without entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in table order.
    #[must_use]
    pub fn entries(&self) -> &[VerbEntry] {
        &self.entries
    }
}

/// An addressable slice of a script that is structured and printed on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptUnit {
    /// Verb identifier for an object script entry point, `None` for a whole script
    pub verb: Option<u8>,
    /// Instruction range covered by the unit
    pub range: Range<u32>,
    /// The unit's statements in program order
    pub statements: Vec<Statement>,
}

impl ScriptUnit {
    /// A unit covering a whole evaluated program.
    #[must_use]
    pub fn whole(evaluation: &Evaluation) -> Self {
        ScriptUnit {
            verb: None,
            range: evaluation.range.clone(),
            statements: evaluation.statements.clone(),
        }
    }
}

/// Slices an evaluated object script blob into one unit per verb table entry.
///
/// A verb's range ends at the next greater distinct entry point or at the end of the blob.
/// Units are returned in table order; entries sharing an entry point share the statements.
///
/// # Errors
/// Returns [`Error::VerbOffsetMisaligned`] for an entry point that is not an instruction start
/// reached with an empty stack.
pub fn segment(evaluation: &Evaluation, verbs: &VerbTable) -> Result<Vec<ScriptUnit>> {
    let end = evaluation.range.end;
    let mut starts: Vec<u32> = verbs
        .entries()
        .iter()
        .map(|entry| u32::from(entry.offset))
        .collect();
    starts.sort_unstable();
    starts.dedup();

    let mut units = Vec::with_capacity(verbs.len());
    for entry in verbs.entries() {
        let start = u32::from(entry.offset);
        if !evaluation.boundaries.contains(&start) {
            return Err(Error::VerbOffsetMisaligned {
                verb: entry.verb,
                offset: start,
            });
        }

        let stop = starts
            .iter()
            .copied()
            .find(|&offset| offset > start)
            .unwrap_or(end);
        let range = start..stop;
        let statements = evaluation
            .statements
            .iter()
            .filter(|statement| range.contains(&statement.offset))
            .cloned()
            .collect();

        units.push(ScriptUnit {
            verb: Some(entry.verb),
            range,
            statements,
        });
    }
    Ok(units)
}
