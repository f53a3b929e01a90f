use crate::compact::Compact;
use crate::cursor::Cursor;
use crate::error::{DecodeError, Result, UnboundedLengthSnafu};
use crate::traits::Codec;

/// Largest decoded count accepted for elements that occupy no bytes.
pub const MAX_ZERO_WIDTH_ELEMENTS: usize = 1 << 16;

/// Sequence codec built from an element codec.
///
/// - Fixed size ([`Vector::fixed`]): elements are written back to back with no length marker and
///   exactly `size` elements are read back. Trailing bytes after the last element are left unread.
/// - Variable size ([`Vector::new`]): a [`Compact`] element count precedes the elements. A count
///   above [`MAX_ZERO_WIDTH_ELEMENTS`] is rejected when the elements occupy no bytes.
#[derive(Debug, Clone, Copy)]
pub struct Vector<C> {
    inner: C,
    size: Option<usize>,
}

impl<C> Vector<C> {
    /// Length-prefixed sequence of `inner` elements.
    pub fn new(inner: C) -> Self {
        Self { inner, size: None }
    }

    /// Sequence of exactly `size` elements with no length prefix.
    pub fn fixed(inner: C, size: usize) -> Self {
        Self {
            inner,
            size: Some(size),
        }
    }

    /// The fixed element count, if any.
    pub fn size(&self) -> Option<usize> {
        self.size
    }
}

impl<C: Codec> Codec for Vector<C> {
    type Value = Vec<C::Value>;

    fn encode_to(&self, value: &Self::Value, dest: &mut Vec<u8>) {
        match self.size {
            Some(size) => debug_assert_eq!(
                value.len(),
                size,
                "fixed-size vector encoded with the wrong number of elements"
            ),
            None => Compact.encode_to(&(value.len() as u128), dest),
        }
        for element in value {
            self.inner.encode_to(element, dest);
        }
    }

    fn decode(&self, cursor: &mut Cursor<'_>) -> Result<Self::Value> {
        let len = match self.size {
            Some(size) => size,
            None => {
                let length = Compact.decode(cursor)?;
                usize::try_from(length).map_err(|_| DecodeError::LengthOverflow { length })?
            }
        };

        // an untrusted prefix must not drive the allocation
        let mut result = Vec::with_capacity(len.min(cursor.remaining_len()));
        for index in 0..len {
            let start = cursor.position();
            result.push(self.inner.decode(cursor)?);

            // zero-width elements consume no input, so the input cannot bound a decoded count
            if index == 0
                && self.size.is_none()
                && cursor.position() == start
                && len > MAX_ZERO_WIDTH_ELEMENTS
            {
                return UnboundedLengthSnafu { length: len }.fail();
            }
        }
        Ok(result)
    }
}
