//! Little-endian reading and writing of the primitive integer types used by SCUMM bytecode.
//!
//! Every multi-byte quantity in a script (word immediates, variable numbers, jump
//! displacements, control code arguments) is stored little-endian. The [`ScummIO`] trait gives
//! the decoder and the encoder one generic entry point for all of them.
//!
//! # Key Components
//!
//! - [`ScummIO`] - Trait defining endian-aware conversions for primitive types
//! - [`read_le_at`] - Bounds-checked read at an offset with auto-advance
//! - [`write_le`] - Append a value to an output buffer
//!
//! # Examples
//!
//! ```rust,ignore
//! use scummscope::file::io::{read_le_at, write_le};
//!
//! let data = [0x34, 0x12];
//! let mut offset = 0;
//! let value: u16 = read_le_at(&data, &mut offset)?;
//! assert_eq!(value, 0x1234);
//!
//! let mut out = Vec::new();
//! write_le(&mut out, value);
//! assert_eq!(out, data);
//! # Ok::<(), scummscope::Error>(())
//! ```

use crate::{Error::OutOfBounds, Result};

/// Trait for the primitive types that can be read from and written to a script.
///
/// # Thread Safety
///
/// All implementations are pure conversions without shared state.
pub trait ScummIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_scumm_io {
    ($($ty:ty => $n:expr),* $(,)?) => {
        $(
            impl ScummIO for $ty {
                type Bytes = [u8; $n];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_scumm_io!(u8 => 1, i8 => 1, u16 => 2, i16 => 2, u32 => 4, i32 => 4);

/// Reads a value of type `T` in little-endian order at `offset` and advances the offset.
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le_at<T: ScummIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(OutOfBounds);
    };

    *offset += type_len;

    Ok(T::from_le_bytes(read))
}

/// Appends `value` in little-endian order to `out`.
pub fn write_le<T: ScummIO>(out: &mut Vec<u8>, value: T) {
    out.extend_from_slice(value.to_le_bytes().as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_le_u16_advances() {
        let data = [0x01, 0x00, 0x02, 0x00];
        let mut offset = 0;

        let first: u16 = read_le_at(&data, &mut offset).unwrap();
        assert_eq!(first, 1);
        assert_eq!(offset, 2);

        let second: u16 = read_le_at(&data, &mut offset).unwrap();
        assert_eq!(second, 2);
        assert_eq!(offset, 4);
    }

    #[test]
    fn read_le_i16_negative() {
        let data = [0xFE, 0xFF];
        let mut offset = 0;
        let value: i16 = read_le_at(&data, &mut offset).unwrap();
        assert_eq!(value, -2);
    }

    #[test]
    fn read_le_out_of_bounds() {
        let data = [0x01];
        let mut offset = 0;
        let result = read_le_at::<u16>(&data, &mut offset);
        assert!(matches!(result, Err(OutOfBounds)));
        assert_eq!(offset, 0);
    }

    #[test]
    fn write_le_appends() {
        let mut out = vec![0xAA];
        write_le(&mut out, 0x1234u16);
        write_le(&mut out, -1i8);
        write_le(&mut out, 0x0102_0304u32);
        assert_eq!(out, [0xAA, 0x34, 0x12, 0xFF, 0x04, 0x03, 0x02, 0x01]);
    }
}
