//! Bounds-checked byte cursor over a script blob.
//!
//! [`Parser`] is the only way the decoder touches script bytes. All reads validate the
//! remaining length first, so a truncated operand surfaces as
//! [`crate::Error::OutOfBounds`] instead of a panic.
//!
//! # Examples
//!
//! ```rust
//! use scummscope::Parser;
//!
//! let data = [0x01, 0x34, 0x12];
//! let mut parser = Parser::new(&data);
//!
//! assert_eq!(parser.read_le::<u8>()?, 0x01);
//! assert_eq!(parser.read_le::<u16>()?, 0x1234);
//! assert!(!parser.has_more_data());
//! # Ok::<(), scummscope::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, ScummIO},
    Result,
};

/// A cursor-based reader for script bytecode.
///
/// The parser maintains an internal position and provides bounds checking to prevent buffer
/// overruns when reading malformed or truncated scripts.
pub struct Parser<'a> {
    /// The binary data being parsed
    data: &'a [u8],
    /// Current position within the data buffer
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new [`Parser`] from a byte slice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scummscope::Parser;
    /// let data = [0x01, 0x02, 0x03, 0x04];
    /// let parser = Parser::new(&data);
    /// assert_eq!(parser.len(), 4);
    /// ```
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the length of the underlying data buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the parser has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data available to parse.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scummscope::Parser;
    /// let data = [0x01];
    /// let mut parser = Parser::new(&data);
    /// assert!(parser.has_more_data());
    ///
    /// let _byte = parser.read_le::<u8>()?;
    /// assert!(!parser.has_more_data());
    /// # Ok::<(), scummscope::Error>(())
    /// ```
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Get the current position of the parser within the data buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Number of bytes left after the cursor.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Get access to the underlying data buffer.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data
    }

    /// Peek at the next byte without advancing the position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if position is at or beyond the data length.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scummscope::Parser;
    /// let data = [0xFF, 0x02];
    /// let parser = Parser::new(&data);
    ///
    /// assert_eq!(parser.peek_byte()?, 0xFF);
    /// assert_eq!(parser.pos(), 0);
    /// # Ok::<(), scummscope::Error>(())
    /// ```
    pub fn peek_byte(&self) -> Result<u8> {
        if self.position >= self.data.len() {
            return Err(out_of_bounds_error!());
        }
        Ok(self.data[self.position])
    }

    /// Read a value of type `T` in little-endian format and advance past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if reading `T` would exceed the data length. The
    /// position is left unchanged in that case.
    pub fn read_le<T: ScummIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read a little-endian unsigned 24-bit quantity.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than three bytes remain.
    pub fn read_u24_le(&mut self) -> Result<u32> {
        if self.remaining() < 3 {
            return Err(out_of_bounds_error!());
        }
        let low = u32::from(self.read_le::<u16>()?);
        let high = u32::from(self.read_le::<u8>()?);
        Ok(low | (high << 16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn sequential_reads() {
        let data = [0x01, 0xFE, 0xFF, 0x78, 0x56, 0x34, 0x12];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_le::<u8>().unwrap(), 0x01);
        assert_eq!(parser.read_le::<i16>().unwrap(), -2);
        assert_eq!(parser.read_le::<u32>().unwrap(), 0x1234_5678);
        assert!(!parser.has_more_data());
        assert_eq!(parser.remaining(), 0);
    }

    #[test]
    fn read_past_end() {
        let data = [0x01];
        let mut parser = Parser::new(&data);
        assert!(matches!(parser.read_le::<u16>(), Err(Error::OutOfBounds)));
        assert_eq!(parser.pos(), 0);
        assert_eq!(parser.read_le::<u8>().unwrap(), 0x01);
        assert!(matches!(parser.peek_byte(), Err(Error::OutOfBounds)));
    }

    #[test]
    fn read_u24() {
        let data = [0x03, 0x02, 0x01];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_u24_le().unwrap(), 0x0001_0203);

        let mut short = Parser::new(&data[..2]);
        assert!(matches!(short.read_u24_le(), Err(Error::OutOfBounds)));
    }

    #[test]
    fn empty_parser() {
        let parser = Parser::new(&[]);
        assert!(parser.is_empty());
        assert_eq!(parser.len(), 0);
        assert!(!parser.has_more_data());
    }
}
