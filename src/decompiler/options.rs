//! Output configuration for the decompiler
//!
//! The options only change how a script is printed and which self checks run. They never
//! change what the decoder accepts.

/// Configuration for script decompilation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct DecompilerOptions {
    /// One level of indentation (default: a tab)
    pub indent: &'static str,

    /// Run the control-flow rewrite rules (default: true)
    /// Without it the output is the flat statement list with labels and gotos
    pub structure: bool,

    /// Print a `local variable L.n` line for every local a unit uses (default: true)
    pub declare_locals: bool,

    /// Append the script offset to every printed statement as `// XXXX` (default: false)
    pub annotate_offsets: bool,

    /// Re-encode every decoded script and compare it with the input (default: true)
    /// A mismatch always means an opcode table bug
    pub verify_round_trip: bool,
}

impl Default for DecompilerOptions {
    fn default() -> Self {
        Self {
            indent: "\t",
            structure: true,
            declare_locals: true,
            annotate_offsets: false,
            verify_round_trip: true,
        }
    }
}

impl DecompilerOptions {
    /// Flat, annotated output for debugging table entries and the structurer
    #[must_use]
    pub fn raw() -> Self {
        Self {
            structure: false,
            annotate_offsets: true,
            ..Self::default()
        }
    }

    /// Two-space indentation without local declarations
    #[must_use]
    pub fn compact() -> Self {
        Self {
            indent: "  ",
            declare_locals: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let raw = DecompilerOptions::raw();
        assert!(!raw.structure);
        assert!(raw.annotate_offsets);
        assert!(raw.declare_locals);
        assert!(raw.verify_round_trip);

        let compact = DecompilerOptions::compact();
        assert_eq!(compact.indent, "  ");
        assert!(compact.structure);
        assert!(!compact.declare_locals);
        assert!(!compact.annotate_offsets);
    }

    #[test]
    fn test_default_options() {
        let default = DecompilerOptions::default();
        assert_eq!(default.indent, "\t");
        assert!(default.structure);
        assert!(default.verify_round_trip);
    }
}
