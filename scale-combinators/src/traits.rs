use crate::cursor::Cursor;
use crate::error::Result;

/// A paired encoder and decoder for one semantic type.
///
/// Implementations must satisfy the round-trip law: decoding the output of `encode(v)` yields
/// `v` and leaves the cursor exactly at the end of that output.
pub trait Codec {
    /// The value this codec reads and writes.
    type Value;

    /// Appends the encoding of `value` to `dest`.
    fn encode_to(&self, value: &Self::Value, dest: &mut Vec<u8>);

    /// Decodes one value, advancing `cursor` past the bytes consumed.
    fn decode(&self, cursor: &mut Cursor<'_>) -> Result<Self::Value>;

    /// Encodes `value` into a fresh buffer.
    fn encode(&self, value: &Self::Value) -> Vec<u8> {
        let mut dest = Vec::new();
        self.encode_to(value, &mut dest);
        dest
    }

    /// Decodes one value from the start of `bytes`. Trailing bytes are left unread.
    fn decode_bytes(&self, bytes: &[u8]) -> Result<Self::Value> {
        self.decode(&mut Cursor::new(bytes))
    }
}

impl<C: Codec + ?Sized> Codec for &C {
    type Value = C::Value;

    fn encode_to(&self, value: &Self::Value, dest: &mut Vec<u8>) {
        (**self).encode_to(value, dest)
    }

    fn decode(&self, cursor: &mut Cursor<'_>) -> Result<Self::Value> {
        (**self).decode(cursor)
    }
}

/// Tuples of codecs encode their fields back to back, in order.
macro_rules! tuple_codec {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: Codec),+> Codec for ($($name,)+) {
            type Value = ($($name::Value,)+);

            fn encode_to(&self, value: &Self::Value, dest: &mut Vec<u8>) {
                $(self.$idx.encode_to(&value.$idx, dest);)+
            }

            fn decode(&self, cursor: &mut Cursor<'_>) -> Result<Self::Value> {
                Ok(($(self.$idx.decode(cursor)?,)+))
            }
        }
    };
}

tuple_codec!(A: 0);
tuple_codec!(A: 0, B: 1);
tuple_codec!(A: 0, B: 1, C: 2);
tuple_codec!(A: 0, B: 1, C: 2, D: 3);
tuple_codec!(A: 0, B: 1, C: 2, D: 3, E: 4);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DecodeError, U128, U16, U8};

    #[test]
    fn we_can_compose_tuple_codecs() {
        let codec = (U8, U16, U128);
        let bytes = codec.encode(&(1, 0x0302, 5));
        assert_eq!(bytes[..3], [1, 2, 3]);
        assert_eq!(bytes.len(), 1 + 2 + 16);

        let mut cursor = Cursor::new(&bytes);
        assert_eq!(codec.decode(&mut cursor).unwrap(), (1, 0x0302, 5));
        assert!(cursor.is_empty());
    }

    #[test]
    fn we_cannot_decode_a_tuple_from_a_short_buffer() {
        let codec = (U8, U16);
        assert!(matches!(
            codec.decode_bytes(&[1, 2]),
            Err(DecodeError::Underflow { needed: 2, .. })
        ));
    }
}
