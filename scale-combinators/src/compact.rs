use codec::{CompactLen, Decode, Encode};
use snafu::ResultExt;

use crate::cursor::Cursor;
use crate::error::{InvalidCompactSnafu, Result};
use crate::traits::Codec;

/// Variable-length codec for non-negative integers.
///
/// The two low bits of the first byte select the width: single byte, two bytes, four bytes, or a
/// length-prefixed big-integer form. Encoding is delegated to `parity-scale-codec` so the output
/// matches the chain byte for byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compact;

/// Number of bytes the compact encoding of `value` occupies.
pub fn compact_len(value: u128) -> usize {
    <codec::Compact<u128> as CompactLen<u128>>::compact_len(&value)
}

/// Width of the compact encoding announced by its first byte.
fn encoded_width(first: u8) -> usize {
    match first & 0b11 {
        0b00 => 1,
        0b01 => 2,
        0b10 => 4,
        _ => 1 + (first >> 2) as usize + 4,
    }
}

impl Codec for Compact {
    type Value = u128;

    fn encode_to(&self, value: &u128, dest: &mut Vec<u8>) {
        codec::Compact(*value).encode_to(dest);
    }

    fn decode(&self, cursor: &mut Cursor<'_>) -> Result<u128> {
        cursor.ensure(encoded_width(cursor.peek_byte()?))?;
        let codec::Compact(value) =
            <codec::Compact<u128>>::decode(cursor).context(InvalidCompactSnafu)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecodeError;

    #[test]
    fn we_can_encode_compact_integers_in_every_mode() {
        assert_eq!(Compact.encode(&0), vec![0x00]);
        assert_eq!(Compact.encode(&63), vec![0xfc]);
        assert_eq!(Compact.encode(&64), vec![0x01, 0x01]);
        assert_eq!(Compact.encode(&300), vec![0xb1, 0x04]);
        assert_eq!(Compact.encode(&16_384), vec![0x02, 0x00, 0x01, 0x00]);
        assert_eq!(
            Compact.encode(&(1u128 << 30)),
            vec![0x03, 0x00, 0x00, 0x00, 0x40]
        );
    }

    #[test]
    fn we_can_decode_what_we_encode() {
        for value in [0u128, 1, 63, 64, 16_383, 16_384, 1 << 30, u64::MAX as u128, u128::MAX] {
            let bytes = Compact.encode(&value);
            assert_eq!(bytes.len(), compact_len(value));

            let mut cursor = Cursor::new(&bytes);
            assert_eq!(Compact.decode(&mut cursor).unwrap(), value);
            assert!(cursor.is_empty());
        }
    }

    #[test]
    fn compact_len_is_monotonic_in_the_value() {
        let lens: Vec<_> = [0u128, 63, 64, 16_383, 16_384, (1 << 30) - 1, 1 << 30, u128::MAX]
            .into_iter()
            .map(compact_len)
            .collect();
        assert!(lens.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn we_cannot_decode_a_truncated_compact_integer() {
        // four-byte mode with only two bytes available
        let err = Compact.decode_bytes(&[0x02, 0x00]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Underflow {
                needed: 4,
                remaining: 2,
                ..
            }
        ));
        assert!(matches!(
            Compact.decode_bytes(&[]),
            Err(DecodeError::Underflow { needed: 1, .. })
        ));
    }

    #[test]
    fn we_cannot_decode_a_non_canonical_compact_integer() {
        // 1 encoded in two-byte mode
        assert!(matches!(
            Compact.decode_bytes(&[0x05, 0x00]),
            Err(DecodeError::InvalidCompact { .. })
        ));
    }
}
