//! Trailing-group checksum

use crate::accessor::Scalar;

/// CRC-32 over the comma-joined string forms of `values`, in the order given.
///
/// Callers pass the tie-break values of a trailing group in page order.
pub fn checksum<'a, I>(values: I) -> u32
where
    I: IntoIterator<Item = &'a Scalar>,
{
    let mut hasher = crc32fast::Hasher::new();
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            hasher.update(b",");
        }
        hasher.update(value.string_form().as_bytes());
    }
    hasher.finalize()
}
