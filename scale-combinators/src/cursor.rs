use crate::error::{DecodeError, Result};

/// A byte buffer paired with a read offset.
///
/// A cursor is owned by one decode operation at a time. Decoders advance it as a side effect so
/// they compose without threading offsets through their callers. The offset never exceeds the
/// buffer length, and a failed read leaves the offset untouched.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor positioned at the start of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Current read offset.
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Number of bytes not yet consumed.
    pub fn remaining_len(&self) -> usize {
        self.bytes.len() - self.offset
    }

    /// The bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        &self.bytes[self.offset..]
    }

    /// Returns `true` once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining_len() == 0
    }

    /// Reads the next byte without consuming it.
    pub fn peek_byte(&self) -> Result<u8> {
        self.remaining()
            .first()
            .copied()
            .ok_or_else(|| self.underflow(1))
    }

    /// Reads and consumes a single byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        let byte = self.peek_byte()?;
        self.offset += 1;
        Ok(byte)
    }

    /// Reads and consumes exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining_len() {
            return Err(self.underflow(n));
        }
        let bytes = &self.bytes[self.offset..self.offset + n];
        self.offset += n;
        Ok(bytes)
    }

    /// Reads exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    /// Fails with [`DecodeError::Underflow`] unless at least `n` bytes remain.
    pub fn ensure(&self, n: usize) -> Result<()> {
        if n > self.remaining_len() {
            return Err(self.underflow(n));
        }
        Ok(())
    }

    fn underflow(&self, needed: usize) -> DecodeError {
        DecodeError::Underflow {
            offset: self.offset,
            needed,
            remaining: self.remaining_len(),
        }
    }
}

/// Lets `parity-scale-codec` decoders read straight from the cursor, advancing it in place.
impl codec::Input for Cursor<'_> {
    fn remaining_len(&mut self) -> Result<Option<usize>, codec::Error> {
        Ok(Some(Cursor::remaining_len(self)))
    }

    fn read(&mut self, into: &mut [u8]) -> Result<(), codec::Error> {
        let bytes = self
            .read_bytes(into.len())
            .map_err(|_| codec::Error::from("Not enough data to fill buffer"))?;
        into.copy_from_slice(bytes);
        Ok(())
    }
}
