// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # scummscope
//!
//! A table-driven decompiler for the stack-machine bytecode of the SCUMM adventure game engine.
//! `scummscope` turns the raw bytes of a script chunk into readable, structured pseudo-code:
//!
//! ```text
//! script 1 {
//!     local variable L.0
//!     for (L.0 = 5; L.0 < 10; L.0++)
//!     {
//!     }
//!     breakHere()
//! }
//! ```
//!
//! ## Features
//!
//! - **Table-driven decoding** - Every instruction-set version is an overlay of opcode
//!   definitions on its predecessor, resolved once and shared by all threads
//! - **Exact re-encoding** - A decoded program re-encodes to its input bytes, which checks the
//!   opcode tables against real data
//! - **Symbolic evaluation** - Stack operations fold into expressions and statements
//! - **Control-flow structuring** - `if`/`else`, `while`, `for`, `do` and `break until`
//!   are recovered from conditional and unconditional jumps
//! - **Parallel** - Scripts are independent and are decompiled in parallel
//!
//! ## Supported Versions
//!
//! | Version | Variable encoding | Notes |
//! |---------|-------------------|-------|
//! | `V5`    | classic, inline parameters | Common opcodes only |
//! | `V6`    | 16 bit, scope in the top bits | Full table |
//! | `He60` to `He72` | as `V6` | Additive overlays |
//! | `He80`, `He90` | room variables added | Additive overlays |
//!
//! ## Quick Start
//!
//! ```rust
//! use scummscope::{Decompiler, ScriptKind, ScriptSource, Version};
//!
//! let bytes = [
//!     0x00, 0x05, 0x43, 0x00, 0x40, 0x03, 0x00, 0x40, 0x00, 0x0A, 0x11, 0x5D, 0x06, 0x00,
//!     0x4F, 0x00, 0x40, 0x73, 0xF1, 0xFF, 0x6C,
//! ];
//! let kind = ScriptKind::Global(1);
//! let text = Decompiler::new(Version::V6).decompile(&ScriptSource::new(&kind, &bytes))?;
//! assert!(text.contains("for (L.0 = 5; L.0 < 10; L.0++)"));
//! # Ok::<(), scummscope::Failure>(())
//! ```
//!
//! ## Architecture
//!
//! - [`disassembler`] - Opcode tables, operand decoding, re-encoding and jump validation
//! - [`decompiler`] - Symbolic evaluation, verb segmentation, structuring and printing
//! - [`Parser`] - Bounds-checked little-endian reads shared by both
//!
//! Errors are local to one script. A failing script yields a [`Failure`] with the partial
//! instructions and statements for diagnostics, and never affects the others.
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: `debug` per script and pass, `trace` per
//! instruction and rewrite, `warn` for every label the structurer could not remove.

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust
/// use scummscope::prelude::*;
///
/// let program = decode(&[0x6C], Version::V6)?;
/// assert_eq!(program.len(), 1);
/// # Ok::<(), scummscope::Error>(())
/// ```
pub mod prelude;

/// Instruction decoding for every supported SCUMM version.
///
/// # Key Types
///
/// - [`disassembler::OpcodeTable`] - The resolved opcode definitions of one version
/// - [`disassembler::Decoder`] - Decodes, validates and re-encodes one script
/// - [`disassembler::Instruction`] - One decoded instruction with its operands
/// - [`disassembler::DecodedProgram`] - The ordered instructions of a script
///
/// # Examples
///
/// ```rust
/// use scummscope::{decode, Version};
///
/// // pushByte 5, pop
/// let program = decode(&[0x00, 0x05, 0x1A], Version::V6)?;
/// assert_eq!(program.listing(), "[0000] pushByte 5\n[0002] pop\n");
/// assert_eq!(program.encode(), vec![0x00, 0x05, 0x1A]);
/// # Ok::<(), scummscope::Error>(())
/// ```
pub mod disassembler;

/// Symbolic evaluation, structuring and printing.
///
/// See [`Decompiler`] for the entry point.
pub mod decompiler;

/// `scummscope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `scummscope` Error type
///
/// # Examples
///
/// ```rust
/// use scummscope::{decode, Error, Version};
///
/// match decode(&[0xFF], Version::V6) {
///     Err(Error::UnknownOpcode { opcode, offset }) => {
///         assert_eq!(opcode, 0xFF);
///         assert_eq!(offset, 0);
///     }
///     other => panic!("unexpected result: {:?}", other.map(|p| p.len())),
/// }
/// ```
pub use error::{Error, Failure};

/// Bounds-checked reading of script bytes.
pub use file::parser::Parser;

pub use disassembler::{decode, decode_at, OpcodeTable, Version};

pub use decompiler::{Decompiler, DecompilerOptions, ScriptKind, ScriptSource};
