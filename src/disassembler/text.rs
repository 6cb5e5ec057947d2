//! String operands with embedded control codes.
//!
//! A string operand is a NUL-terminated byte run. The escape byte `0xFF` introduces a control
//! code used for runtime interpolation; codes `1`, `2`, `3` and `8` stand alone, every other
//! code is followed by a little-endian 16-bit argument.
//!
//! [`StringLiteral::render`] produces a printable, invertible form and [`print_to_binary`]
//! turns that form back into the original bytes:
//!
//! | Rendered | Bytes |
//! |----------|-------|
//! | `\n` `\k` `\w` | `FF 01`, `FF 02`, `FF 03` |
//! | `%i<n>%` `%v<n>%` `%n<n>%` `%s<n>%` | codes 4 to 7 with argument `n` |
//! | `%a<n>%` `%c<n>%` `%f<n>%` | codes 9, 12 and 14 with argument `n` |
//! | `%<code>%` | any other argument-less code |
//! | `%<code>:<n>%` | any other code with argument `n` |
//! | `\\` `\"` `%%` | a literal backslash, quote or percent sign |
//! | `\xHH` | a raw non-printable byte |

use std::fmt::Write;

use crate::{file::io::write_le, Parser, Result};

/// The byte that introduces a control code.
pub const ESCAPE: u8 = 0xFF;

/// Named control codes with a one-letter rendering.
const LETTERS: &[(u8, char)] = &[
    (4, 'i'),
    (5, 'v'),
    (6, 'n'),
    (7, 's'),
    (9, 'a'),
    (12, 'c'),
    (14, 'f'),
];

/// Returns `true` if control code `code` carries a 16-bit argument.
#[must_use]
pub const fn takes_argument(code: u8) -> bool {
    !matches!(code, 1 | 2 | 3 | 8)
}

/// A piece of a string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Plain bytes
    Text(Vec<u8>),
    /// An escape sequence
    Control {
        /// The control code following the escape byte
        code: u8,
        /// The argument, for codes that carry one
        arg: Option<u16>,
    },
}

/// A decoded string operand.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringLiteral {
    /// The literal's segments in order
    pub segments: Vec<Segment>,
}

impl StringLiteral {
    /// Reads a NUL-terminated string at the parser's position, consuming the terminator.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the terminator or a control code argument is
    /// missing.
    pub fn read(parser: &mut Parser) -> Result<Self> {
        let mut segments = Vec::new();
        let mut run = Vec::new();

        loop {
            match parser.read_le::<u8>()? {
                0 => break,
                ESCAPE => {
                    if !run.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut run)));
                    }
                    let code = parser.read_le::<u8>()?;
                    let arg = if takes_argument(code) {
                        Some(parser.read_le::<u16>()?)
                    } else {
                        None
                    };
                    segments.push(Segment::Control { code, arg });
                }
                byte => run.push(byte),
            }
        }

        if !run.is_empty() {
            segments.push(Segment::Text(run));
        }

        Ok(StringLiteral { segments })
    }

    /// Appends the encoded bytes, NUL terminator included.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_bytes());
        out.push(0);
    }

    /// Returns the encoded bytes without the NUL terminator.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(bytes) => out.extend_from_slice(bytes),
                Segment::Control { code, arg } => {
                    out.push(ESCAPE);
                    out.push(*code);
                    if let Some(arg) = arg {
                        write_le(&mut out, *arg);
                    }
                }
            }
        }
        out
    }

    /// Renders the literal in its printable form (without surrounding quotes).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scummscope::disassembler::{Segment, StringLiteral};
    ///
    /// let text = StringLiteral {
    ///     segments: vec![Segment::Text(b"Hi ".to_vec()), Segment::Control { code: 5, arg: Some(107) }],
    /// };
    /// assert_eq!(text.render(), "Hi %v107%");
    /// ```
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(bytes) => render_bytes(&mut out, bytes),
                Segment::Control { code, arg } => render_control(&mut out, *code, *arg),
            }
        }
        out
    }
}

fn render_bytes(out: &mut String, bytes: &[u8]) {
    for &byte in bytes {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'"' => out.push_str("\\\""),
            b'%' => out.push_str("%%"),
            0x20..=0x7E => out.push(char::from(byte)),
            _ => {
                let _ = write!(out, "\\x{byte:02X}");
            }
        }
    }
}

fn render_control(out: &mut String, code: u8, arg: Option<u16>) {
    let letter = LETTERS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, letter)| *letter);

    let _ = match (code, arg, letter) {
        (1, None, _) => write!(out, "\\n"),
        (2, None, _) => write!(out, "\\k"),
        (3, None, _) => write!(out, "\\w"),
        (_, Some(arg), Some(letter)) => write!(out, "%{letter}{arg}%"),
        (_, Some(arg), None) => write!(out, "%{code}:{arg}%"),
        (_, None, _) => write!(out, "%{code}%"),
    };
}

/// Converts the printable form produced by [`StringLiteral::render`] back into script bytes.
///
/// The NUL terminator is not included.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for an unterminated or unknown escape sequence.
///
/// # Examples
///
/// ```rust
/// use scummscope::disassembler::print_to_binary;
///
/// assert_eq!(print_to_binary("%v107%")?, vec![0xFF, 0x05, 0x6B, 0x00]);
/// # Ok::<(), scummscope::Error>(())
/// ```
pub fn print_to_binary(text: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('\\') => out.push(b'\\'),
                Some('"') => out.push(b'"'),
                Some('n') => out.extend_from_slice(&[ESCAPE, 1]),
                Some('k') => out.extend_from_slice(&[ESCAPE, 2]),
                Some('w') => out.extend_from_slice(&[ESCAPE, 3]),
                Some('x') => {
                    let hex: String = chars.by_ref().take(2).collect();
                    let byte = u8::from_str_radix(&hex, 16)
                        .map_err(|_| malformed_error!("Invalid hex escape '\\x{}'", hex))?;
                    out.push(byte);
                }
                other => return Err(malformed_error!("Invalid escape '\\{:?}'", other)),
            },
            '%' => {
                if chars.peek() == Some(&'%') {
                    chars.next();
                    out.push(b'%');
                    continue;
                }

                let mut body = String::new();
                loop {
                    match chars.next() {
                        Some('%') => break,
                        Some(c) => body.push(c),
                        None => return Err(malformed_error!("Unterminated control code '%{}'", body)),
                    }
                }
                encode_control(&mut out, &body)?;
            }
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c as u8),
            c => return Err(malformed_error!("Character {:?} cannot be encoded", c)),
        }
    }

    Ok(out)
}

fn encode_control(out: &mut Vec<u8>, body: &str) -> Result<()> {
    let parse = |digits: &str| -> Result<u16> {
        digits
            .parse::<u16>()
            .map_err(|_| malformed_error!("Invalid control code argument '{}'", digits))
    };

    let first = body
        .chars()
        .next()
        .ok_or_else(|| malformed_error!("Empty control code"))?;

    if let Some((code, _)) = LETTERS.iter().find(|(_, letter)| *letter == first) {
        out.extend_from_slice(&[ESCAPE, *code]);
        write_le(out, parse(&body[first.len_utf8()..])?);
        return Ok(());
    }

    match body.split_once(':') {
        Some((code, arg)) => {
            let code = u8::try_from(parse(code)?)
                .map_err(|_| malformed_error!("Control code out of range '{}'", body))?;
            out.extend_from_slice(&[ESCAPE, code]);
            write_le(out, parse(arg)?);
        }
        None => {
            let code = u8::try_from(parse(body)?)
                .map_err(|_| malformed_error!("Control code out of range '{}'", body))?;
            out.extend_from_slice(&[ESCAPE, code]);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn read(bytes: &[u8]) -> StringLiteral {
        let mut parser = Parser::new(bytes);
        let text = StringLiteral::read(&mut parser).unwrap();
        assert!(!parser.has_more_data());
        text
    }

    #[test]
    fn verb_interpolation() {
        let text = read(&[0xFF, 0x05, 0x6B, 0x00, 0x00]);
        assert_eq!(
            text.segments,
            vec![Segment::Control {
                code: 5,
                arg: Some(107)
            }]
        );
        assert_eq!(text.render(), "%v107%");
        assert_eq!(
            print_to_binary(&text.render()).unwrap(),
            vec![0xFF, 0x05, 0x6B, 0x00]
        );
    }

    #[test]
    fn mixed_segments() {
        let bytes = b"Hello\xFF\x01100% \"ok\"\xFF\x0E\x02\x00\x00";
        let text = read(bytes);
        assert_eq!(text.segments.len(), 4);
        assert_eq!(text.render(), "Hello\\n100%% \\\"ok\\\"%f2%");
        assert_eq!(
            print_to_binary(&text.render()).unwrap(),
            &bytes[..bytes.len() - 1]
        );
    }

    #[test]
    fn unnamed_codes_and_raw_bytes() {
        let bytes = [0x82, 0xFF, 0x08, 0xFF, 0x0D, 0x05, 0x00, b'\\', 0x00];
        let text = read(&bytes);
        assert_eq!(text.render(), "\\x82%8%%13:5%\\\\");
        assert_eq!(print_to_binary(&text.render()).unwrap(), &bytes[..8]);
    }

    #[test]
    fn missing_terminator() {
        let mut parser = Parser::new(b"abc");
        assert!(matches!(
            StringLiteral::read(&mut parser),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn invalid_printed_forms() {
        assert!(print_to_binary("%v12").is_err());
        assert!(print_to_binary("\\q").is_err());
        assert!(print_to_binary("%%v1%").is_err());
    }
}
