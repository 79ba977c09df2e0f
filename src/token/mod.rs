//! Continuation token module
//!
//! Encodes and decodes the opaque `(orderValue, offset, checksum)` triple
//! handed to API clients between pages.
//!
//! # Wire format
//!
//! ```text
//! <orderPart>_<offset>_<checksumPart>
//!
//! bfdew0_1_1jvdwz4
//! │      │ └─ CRC-32 of the trailing group's tie-break values, base 36
//! │      └─── records of that group already delivered, decimal
//! └────────── primary value of the page boundary, base 36
//! ```
//!
//! Non-integer order values are written as `=` followed by the base64 of
//! their string form, e.g. `=OWM1ZjZm..._1_68lkk0`.

mod checksum;
mod codec;

pub use checksum::checksum;
pub use codec::{decode_base36, encode_base36, is_valid, ContinuationToken, TOKEN_DELIMITER};
