use snafu::Snafu;

/// Errors raised while decoding bytes with a [`crate::Codec`].
///
/// Decoding never truncates silently: any shortfall or malformed marker aborts the
/// whole decode and is returned to the caller.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DecodeError {
    /// The buffer ended before a decoder could read the bytes it needs.
    #[snafu(display(
        "Decode underflow at offset {offset}: needed {needed} bytes, {remaining} remaining"
    ))]
    Underflow {
        /// Offset of the cursor when the read was attempted.
        offset: usize,
        /// Number of bytes the decoder required.
        needed: usize,
        /// Number of bytes left in the buffer.
        remaining: usize,
    },

    /// A compact integer was malformed or does not fit in 128 bits.
    #[snafu(display("Invalid compact integer: {source}"))]
    InvalidCompact {
        /// The underlying `parity-scale-codec` error.
        source: codec::Error,
    },

    /// A boolean byte was neither `0x00` nor `0x01`.
    #[snafu(display("Invalid boolean byte 0x{byte:02x}"))]
    InvalidBool {
        /// The offending byte.
        byte: u8,
    },

    /// An option tag was neither `0x00` nor `0x01`.
    #[snafu(display("Invalid option tag 0x{byte:02x}"))]
    InvalidOptionTag {
        /// The offending byte.
        byte: u8,
    },

    /// A string payload was not valid UTF-8.
    #[snafu(display("Invalid UTF-8 string: {source}"))]
    InvalidUtf8 {
        /// The underlying conversion error.
        source: std::string::FromUtf8Error,
    },

    /// A length prefix claims more zero-width elements than a decoder accepts.
    #[snafu(display("Length prefix {length} is too large for zero-width elements"))]
    UnboundedLength {
        /// The decoded length.
        length: usize,
    },

    /// A decoded length prefix does not fit in `usize`.
    #[snafu(display("Length prefix {length} does not fit in usize"))]
    LengthOverflow {
        /// The decoded length.
        length: u128,
    },
}

/// Result alias used by every decoder in this crate.
pub type Result<T, E = DecodeError> = std::result::Result<T, E>;
