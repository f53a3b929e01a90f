//! # SCALE Codec Combinators
//!
//! Composable encoders and decoders for the chain's compact binary (SCALE) wire format.
//!
//! Every codec implements [`Codec`]: encoding appends to a byte buffer, decoding reads from a
//! shared [`Cursor`] and advances it past exactly the bytes it consumed. Because the cursor carries
//! the offset, codecs nest without the caller tracking positions:
//!
//! ```
//! use scale_combinators::{Codec, Compact, Cursor, Vector, U8};
//!
//! let codec = (Compact, Vector::fixed(U8, 2));
//! let bytes = codec.encode(&(300, vec![7, 9]));
//! assert_eq!(bytes, vec![0xb1, 0x04, 7, 9]);
//!
//! let mut cursor = Cursor::new(&bytes);
//! assert_eq!(codec.decode(&mut cursor).unwrap(), (300, vec![7, 9]));
//! assert!(cursor.is_empty());
//! ```
//!
//! ## Overview
//! - [`Cursor`]: byte view with a read offset, shared by nested decoders.
//! - [`Compact`]: variable-length integer codec, byte-compatible with `parity-scale-codec`.
//! - [`Vector`]: sequence codec, either fixed-size or compact length-prefixed.
//! - [`primitives`]: fixed-width integers, booleans, options, tuples, bytes and strings.

/// Shared byte cursor.
pub mod cursor;

/// Decoding errors.
pub mod error;

/// The [`Codec`] trait and tuple combinators.
pub mod traits;

/// Compact (variable-length) integer codec.
pub mod compact;

/// Sequence codec.
pub mod vector;

/// Primitive and structural codecs.
pub mod primitives;

pub use crate::compact::{compact_len, Compact};
pub use crate::cursor::Cursor;
pub use crate::error::{DecodeError, Result};
pub use crate::primitives::{Bool, Bytes, OptionCodec, Str, Unit, U128, U16, U32, U64, U8};
pub use crate::traits::Codec;
pub use crate::vector::Vector;
