//! Base64 encoding for binary payloads carried inside JSON strings.
//!
//! Standard alphabet (`A-Z a-z 0-9 + /`) with `=` padding. The Notecard
//! decodes `"payload"` fields with a standard decoder, so nothing here is
//! URL-safe or unpadded.

extern crate alloc;
use alloc::string::String;
use core::fmt;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Output buffer cannot hold the encoded text and its terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputTooSmall {
    pub needed: usize,
}

impl fmt::Display for OutputTooSmall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "base64 output needs {} bytes", self.needed)
    }
}

impl std::error::Error for OutputTooSmall {}

/// Encoded length of `len` input bytes, without terminator.
pub const fn encoded_len(len: usize) -> usize {
    len.div_ceil(3) * 4
}

/// Encode `input` into `out` followed by a NUL terminator.
///
/// Returns the number of bytes written including the terminator.
pub fn encode_into(input: &[u8], out: &mut [u8]) -> Result<usize, OutputTooSmall> {
    let needed = encoded_len(input.len()) + 1;
    if out.len() < needed {
        return Err(OutputTooSmall { needed });
    }

    let mut p = 0;
    for group in input.chunks(3) {
        out[p..p + 4].copy_from_slice(&encode_group(group));
        p += 4;
    }
    out[p] = 0;
    Ok(p + 1)
}

/// Encode `input` into a fresh string.
pub fn encode(input: &[u8]) -> String {
    let mut s = String::with_capacity(encoded_len(input.len()));
    for group in input.chunks(3) {
        for &c in &encode_group(group) {
            s.push(c as char);
        }
    }
    s
}

fn encode_group(group: &[u8]) -> [u8; 4] {
    let b0 = group[0];
    let b1 = group.get(1).copied().unwrap_or(0);
    let b2 = group.get(2).copied().unwrap_or(0);

    let mut quad = [
        ALPHABET[usize::from(b0 >> 2)],
        ALPHABET[usize::from(((b0 & 0x03) << 4) | (b1 >> 4))],
        ALPHABET[usize::from(((b1 & 0x0F) << 2) | (b2 >> 6))],
        ALPHABET[usize::from(b2 & 0x3F)],
    ];
    if group.len() < 3 {
        quad[3] = b'=';
    }
    if group.len() < 2 {
        quad[2] = b'=';
    }
    quad
}
