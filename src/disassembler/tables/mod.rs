//! Versioned opcode tables.
//!
//! Two base instruction sets exist: the register-style V5 set, whose opcodes carry parameter
//! presence bits, and the V6 stack-machine set. Every later engine revision is an [`Overlay`]
//! over an earlier version listing only the opcodes it removes and the definitions it adds or
//! replaces. [`OpcodeTable::for_version`] walks that chain once per version and caches the
//! resolved 256-slot table for the lifetime of the process.
//!
//! # Examples
//!
//! ```rust
//! use scummscope::{OpcodeTable, Version};
//!
//! let table = OpcodeTable::for_version(Version::He90);
//! assert_eq!(table.lookup(0x00, 0)?.name, "pushByte");
//! assert_eq!(table.lookup(0x0A, 0)?.name, "dupN");
//! # Ok::<(), scummscope::Error>(())
//! ```

mod he;
mod v5;
mod v6;

use std::sync::OnceLock;

use strum::{Display, EnumCount, EnumIter, EnumString};

use crate::{
    decompiler::{BinOp, Tag},
    disassembler::{
        rule::{Arg, Handler, OpcodeDef, OperandRule},
        VarEncoding, Width,
    },
    Error, Result,
};

/// Engine instruction-set revision.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString, EnumCount,
)]
#[strum(serialize_all = "lowercase")]
pub enum Version {
    /// SCUMM v5 (register-style opcodes with parameter bits)
    V5,
    /// SCUMM v6 (stack machine)
    V6,
    /// Humongous Entertainment 6.0
    He60,
    /// Humongous Entertainment 7.0
    He70,
    /// Humongous Entertainment 7.2
    He72,
    /// Humongous Entertainment 8.0
    He80,
    /// Humongous Entertainment 9.0
    He90,
}

impl Version {
    /// Returns the overlay describing this version's table.
    #[must_use]
    pub fn overlay(self) -> &'static Overlay {
        match self {
            Version::V5 => &v5::V5,
            Version::V6 => &v6::V6,
            Version::He60 => &he::HE60,
            Version::He70 => &he::HE70,
            Version::He72 => &he::HE72,
            Version::He80 => &he::HE80,
            Version::He90 => &he::HE90,
        }
    }

    /// Returns the version this one is an overlay of.
    #[must_use]
    pub fn parent(self) -> Option<Version> {
        self.overlay().parent
    }

    /// Returns how variable words are encoded in this version.
    #[must_use]
    pub fn var_encoding(self) -> VarEncoding {
        match self {
            Version::V5 => VarEncoding::Classic,
            Version::V6 | Version::He60 | Version::He70 | Version::He72 => VarEncoding::Stack,
            Version::He80 | Version::He90 => VarEncoding::StackRoom,
        }
    }

    /// Returns the engine name of a well-known global variable.
    #[must_use]
    pub fn global_name(self, index: u16) -> Option<&'static str> {
        WELL_KNOWN_GLOBALS
            .iter()
            .find(|(known, _)| *known == index)
            .map(|(_, name)| *name)
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Global variables shared by every supported version.
const WELL_KNOWN_GLOBALS: &[(u16, &str)] = &[
    (0, "VAR_KEYPRESS"),
    (1, "VAR_EGO"),
    (2, "VAR_CAMERA_POS_X"),
    (3, "VAR_HAVE_MSG"),
    (4, "VAR_ROOM"),
    (5, "VAR_OVERRIDE"),
    (6, "VAR_MACHINE_SPEED"),
    (7, "VAR_ME"),
    (8, "VAR_NUM_ACTOR"),
    (19, "VAR_TIMER_NEXT"),
    (22, "VAR_ROOM_RESOURCE"),
    (25, "VAR_TALK_ACTOR"),
];

/// The difference between a version's table and its parent's.
#[derive(Debug)]
pub struct Overlay {
    /// Version this overlay applies to, `None` for a base table
    pub parent: Option<Version>,
    /// Opcodes of the parent that no longer exist
    pub removed: &'static [u8],
    /// Added or replaced definitions
    pub entries: &'static [OpcodeDef],
}

/// A fully resolved opcode table for one version.
pub struct OpcodeTable {
    version: Version,
    slots: [Option<&'static OpcodeDef>; 256],
}

#[allow(clippy::declare_interior_mutable_const)]
const UNRESOLVED: OnceLock<OpcodeTable> = OnceLock::new();

static RESOLVED: [OnceLock<OpcodeTable>; Version::COUNT] = [UNRESOLVED; Version::COUNT];

impl OpcodeTable {
    /// Returns the resolved table for `version`, building it on first use.
    ///
    /// # Thread Safety
    ///
    /// Resolution happens at most once per version; the returned table is shared read-only.
    #[must_use]
    pub fn for_version(version: Version) -> &'static OpcodeTable {
        RESOLVED[version.slot()].get_or_init(|| Self::resolve(version))
    }

    fn resolve(version: Version) -> OpcodeTable {
        let overlay = version.overlay();
        let mut slots = match overlay.parent {
            Some(parent) => OpcodeTable::for_version(parent).slots,
            None => [None; 256],
        };

        for &opcode in overlay.removed {
            slots[usize::from(opcode)] = None;
        }

        for def in overlay.entries {
            // Every subset of the varying parameter bits selects the same definition.
            let mut bits = def.vary;
            loop {
                slots[usize::from(def.opcode | bits)] = Some(def);
                if bits == 0 {
                    break;
                }
                bits = (bits - 1) & def.vary;
            }
        }

        log::debug!(
            "resolved opcode table for {} ({} opcodes)",
            version,
            slots.iter().filter(|slot| slot.is_some()).count()
        );

        OpcodeTable { version, slots }
    }

    /// Returns the version this table was resolved for.
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Looks up `opcode`; `offset` only feeds the error.
    ///
    /// # Errors
    /// Returns [`Error::UnknownOpcode`] if the opcode is not defined for this version.
    pub fn lookup(&self, opcode: u8, offset: u32) -> Result<&'static OpcodeDef> {
        self.slots[usize::from(opcode)].ok_or(Error::UnknownOpcode { opcode, offset })
    }

    /// Returns the definition of `opcode`, if any.
    #[must_use]
    pub fn get(&self, opcode: u8) -> Option<&'static OpcodeDef> {
        self.slots[usize::from(opcode)]
    }

    /// Iterates over the defined opcodes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &'static OpcodeDef)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(opcode, def)| def.map(|def| (opcode as u8, def)))
    }
}

// Shorthands shared by the table files.

const fn op(opcode: u8, name: &'static str, rule: OperandRule, handler: Handler) -> OpcodeDef {
    OpcodeDef::new(opcode, name, rule, handler)
}

const fn call(args: &'static [Arg]) -> Handler {
    Handler::Call {
        args,
        result: false,
    }
}

const fn func(args: &'static [Arg]) -> Handler {
    Handler::Call { args, result: true }
}

const fn bin(op: BinOp) -> Handler {
    Handler::Binary(op)
}

const NONE: OperandRule = OperandRule::None;
const B: OperandRule = OperandRule::Imm(Width::Byte, false);
const W: OperandRule = OperandRule::Imm(Width::Word, true);
const D: OperandRule = OperandRule::Imm(Width::DWord, true);
const BV: OperandRule = OperandRule::Var(Width::Byte);
const WV: OperandRule = OperandRule::Var(Width::Word);
const STR: OperandRule = OperandRule::Str;
const JMP: OperandRule = OperandRule::Jump;

const V: Arg = Arg::Value(None);
const LIST: Arg = Arg::List;
const ROOM: Arg = Arg::Value(Some(Tag::Room));
const SCRIPT: Arg = Arg::Value(Some(Tag::Script));
const ACTOR: Arg = Arg::Value(Some(Tag::Actor));
const OBJECT: Arg = Arg::Value(Some(Tag::Object));
const SOUND: Arg = Arg::Value(Some(Tag::Sound));
const COSTUME: Arg = Arg::Value(Some(Tag::Costume));
const VERB: Arg = Arg::Value(Some(Tag::Verb));
const CHARSET: Arg = Arg::Value(Some(Tag::Charset));

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn every_version_resolves() {
        for version in Version::iter() {
            let table = OpcodeTable::for_version(version);
            assert_eq!(table.version(), version);
            assert!(table.iter().count() > 40, "{version} table is too small");
        }
    }

    #[test]
    fn resolution_is_cached() {
        let first = OpcodeTable::for_version(Version::He72) as *const OpcodeTable;
        let second = OpcodeTable::for_version(Version::He72) as *const OpcodeTable;
        assert_eq!(first, second);
    }

    #[test]
    fn overlays_inherit_and_replace() {
        let v6 = OpcodeTable::for_version(Version::V6);
        let he72 = OpcodeTable::for_version(Version::He72);

        // inherited untouched
        assert_eq!(he72.get(0x0E).unwrap().name, "eq");
        assert!(std::ptr::eq(v6.get(0x0E).unwrap(), he72.get(0x0E).unwrap()));

        // added
        assert!(v6.get(0x02).is_some());
        assert_eq!(he72.get(0x02).unwrap().name, "pushDWord");

        // removed
        assert!(v6.get(0x63).is_some());
        assert!(OpcodeTable::for_version(Version::He60).get(0x63).is_none());
    }

    #[test]
    fn parameter_bits_share_definition() {
        let v5 = OpcodeTable::for_version(Version::V5);
        let base = v5.get(0x01).unwrap();
        for opcode in [0x21, 0x41, 0x61, 0x81, 0xA1, 0xC1, 0xE1] {
            assert!(std::ptr::eq(base, v5.get(opcode).unwrap()));
        }
    }

    #[test]
    fn v5_parameter_forms_do_not_collide() {
        let mut owner: [Option<&'static str>; 256] = [None; 256];
        for def in Version::V5.overlay().entries {
            let mut bits = def.vary;
            loop {
                let slot = usize::from(def.opcode | bits);
                if let Some(previous) = owner[slot] {
                    panic!("0x{slot:02X} claimed by {previous} and {}", def.name);
                }
                owner[slot] = Some(def.name);
                if bits == 0 {
                    break;
                }
                bits = (bits - 1) & def.vary;
            }
        }
    }

    #[test]
    fn unknown_opcode_reports_offset() {
        let v6 = OpcodeTable::for_version(Version::V6);
        match v6.lookup(0xFF, 0x42) {
            Err(Error::UnknownOpcode { opcode, offset }) => {
                assert_eq!(opcode, 0xFF);
                assert_eq!(offset, 0x42);
            }
            _ => panic!("Expected UnknownOpcode"),
        }
    }

    #[test]
    fn version_names() {
        assert_eq!(Version::He90.to_string(), "he90");
        assert_eq!("v6".parse::<Version>().unwrap(), Version::V6);
        assert_eq!(Version::He80.parent(), Some(Version::He72));
        assert_eq!(Version::V5.parent(), None);
        assert_eq!(Version::V6.global_name(1), Some("VAR_EGO"));
    }
}
