use std::borrow::Cow;

use log::warn;

use crate::error::ExportError;

/// What to do with text that is not valid UTF-8.
///
/// Export data coming out of older databases is sometimes stored in a
/// single-byte charset. The default policy reads such bytes as Latin-1 and
/// logs a warning so the conversion is never silent. Well-formed UTF-8
/// sequences around the invalid bytes are kept as they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Utf8Policy {
    /// Decode every invalid byte as the Latin-1 code point of the same value.
    #[default]
    Latin1Fallback,
    /// Fail with [`ExportError::Encoding`].
    Reject,
}

/// Turns raw bytes into UTF-8 text according to `policy`.
///
/// Valid UTF-8 is borrowed as is whatever the policy.
///
/// # Examples
///
/// ```
/// use wxr_export::xml::encoding::{coerce_utf8, Utf8Policy};
///
/// let text = coerce_utf8(b"caf\xe9", Utf8Policy::Latin1Fallback).unwrap();
/// assert_eq!(text, "café");
///
/// assert!(coerce_utf8(b"caf\xe9", Utf8Policy::Reject).is_err());
/// ```
pub fn coerce_utf8(bytes: &[u8], policy: Utf8Policy) -> Result<Cow<'_, str>, ExportError> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Ok(Cow::Borrowed(text)),
        Err(error) => match policy {
            Utf8Policy::Latin1Fallback => {
                warn!(
                    "Invalid UTF-8 at byte {}, text converted from Latin-1",
                    error.valid_up_to()
                );
                let mut text = String::with_capacity(bytes.len() + 8);
                for chunk in bytes.utf8_chunks() {
                    text.push_str(chunk.valid());
                    text.extend(chunk.invalid().iter().map(|&b| char::from(b)));
                }
                Ok(Cow::Owned(text))
            }
            Utf8Policy::Reject => Err(ExportError::Encoding(format!(
                "invalid UTF-8 sequence at byte {}",
                error.valid_up_to()
            ))),
        },
    }
}
