//! Legacy credential transform applied to passwords before they go on the
//! wire.
//!
//! The login endpoint expects the lowercase hex MD5 of the raw password
//! bytes. MD5 here is unsalted and uncounted; it only keeps the plaintext out
//! of the request body and offers no protection against a captured digest,
//! which is as good as the password for this API. Keep every caller on
//! [`legacy_credential_transform`] so the scheme can be replaced in one place.

use md5::{Digest, Md5};

/// Hex-encoded MD5 of `password`, 32 lowercase characters.
pub fn legacy_credential_transform(password: &str) -> String {
    format!("{:x}", Md5::digest(password.as_bytes()))
}
