use snafu::ResultExt;

use crate::compact::Compact;
use crate::cursor::Cursor;
use crate::error::{DecodeError, InvalidUtf8Snafu, Result};
use crate::traits::Codec;

/// Fixed-width little-endian unsigned integer codecs.
macro_rules! uint_codec {
    ($(#[$doc:meta] $name:ident => $ty:ty),+ $(,)?) => {
        $(
            #[$doc]
            #[derive(Debug, Clone, Copy, Default)]
            pub struct $name;

            impl Codec for $name {
                type Value = $ty;

                fn encode_to(&self, value: &$ty, dest: &mut Vec<u8>) {
                    dest.extend_from_slice(&value.to_le_bytes());
                }

                fn decode(&self, cursor: &mut Cursor<'_>) -> Result<$ty> {
                    Ok(<$ty>::from_le_bytes(cursor.read_array()?))
                }
            }
        )+
    };
}

uint_codec! {
    /// `u8` codec.
    U8 => u8,
    /// Little-endian `u16` codec.
    U16 => u16,
    /// Little-endian `u32` codec.
    U32 => u32,
    /// Little-endian `u64` codec.
    U64 => u64,
    /// Little-endian `u128` codec.
    U128 => u128,
}

/// Zero-width codec for calls without arguments.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unit;

impl Codec for Unit {
    type Value = ();

    fn encode_to(&self, _value: &(), _dest: &mut Vec<u8>) {}

    fn decode(&self, _cursor: &mut Cursor<'_>) -> Result<()> {
        Ok(())
    }
}

/// Single-byte boolean codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bool;

impl Codec for Bool {
    type Value = bool;

    fn encode_to(&self, value: &bool, dest: &mut Vec<u8>) {
        dest.push(*value as u8);
    }

    fn decode(&self, cursor: &mut Cursor<'_>) -> Result<bool> {
        match cursor.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(DecodeError::InvalidBool { byte }),
        }
    }
}

/// Optional value: `0x00` for `None`, `0x01` followed by the inner encoding for `Some`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionCodec<C>(pub C);

impl<C: Codec> Codec for OptionCodec<C> {
    type Value = Option<C::Value>;

    fn encode_to(&self, value: &Self::Value, dest: &mut Vec<u8>) {
        match value {
            None => dest.push(0),
            Some(inner) => {
                dest.push(1);
                self.0.encode_to(inner, dest);
            }
        }
    }

    fn decode(&self, cursor: &mut Cursor<'_>) -> Result<Self::Value> {
        match cursor.read_byte()? {
            0 => Ok(None),
            1 => Ok(Some(self.0.decode(cursor)?)),
            byte => Err(DecodeError::InvalidOptionTag { byte }),
        }
    }
}

/// Raw bytes, either of a fixed length or compact length-prefixed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bytes {
    size: Option<usize>,
}

impl Bytes {
    /// Length-prefixed byte string.
    pub fn new() -> Self {
        Self { size: None }
    }

    /// Exactly `size` bytes with no prefix.
    pub fn fixed(size: usize) -> Self {
        Self { size: Some(size) }
    }
}

impl Codec for Bytes {
    type Value = Vec<u8>;

    fn encode_to(&self, value: &Vec<u8>, dest: &mut Vec<u8>) {
        match self.size {
            Some(size) => debug_assert_eq!(value.len(), size),
            None => Compact.encode_to(&(value.len() as u128), dest),
        }
        dest.extend_from_slice(value);
    }

    fn decode(&self, cursor: &mut Cursor<'_>) -> Result<Vec<u8>> {
        let len = match self.size {
            Some(size) => size,
            None => {
                let length = Compact.decode(cursor)?;
                usize::try_from(length).map_err(|_| DecodeError::LengthOverflow { length })?
            }
        };
        Ok(cursor.read_bytes(len)?.to_vec())
    }
}

/// Compact length-prefixed UTF-8 string.
#[derive(Debug, Clone, Copy, Default)]
pub struct Str;

impl Codec for Str {
    type Value = String;

    fn encode_to(&self, value: &String, dest: &mut Vec<u8>) {
        Compact.encode_to(&(value.len() as u128), dest);
        dest.extend_from_slice(value.as_bytes());
    }

    fn decode(&self, cursor: &mut Cursor<'_>) -> Result<String> {
        let bytes = Bytes::new().decode(cursor)?;
        String::from_utf8(bytes).context(InvalidUtf8Snafu)
    }
}
