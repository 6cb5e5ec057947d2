//! Low-level byte access for script chunks.
//!
//! Script chunks are small and always fully in memory, so this module only provides the
//! bounds-checked cursor used by the decoder and the verb table reader.
//!
//! # Key Components
//!
//! - [`parser::Parser`] - Cursor with little-endian reads that fail instead of panicking
//! - [`io::ScummIO`] - The primitive integer types the cursor can read and write

pub mod io;
pub mod parser;
