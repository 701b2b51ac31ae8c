//! Chunking for bus-sized transfers.
//!
//! The Notecard's I2C interface accepts at most 32 payload bytes per
//! transaction, so every byte stream is cut into bounded pieces:
//!
//! ```text
//! stream:  |<---------------------- n bytes ---------------------->|
//! chunks:  |<- max ->|<- max ->|<- max ->| ... |<- n mod max ->|
//! ```
//!
//! The same helpers drive both directions: outbound they split the
//! serialized request, inbound they cap how many bytes a poll asks for.

/// Largest payload the peripheral accepts in one bus transaction.
pub const MAX_CHUNK_SIZE: u16 = 32;

/// Clamp a requested chunk size to what one transaction (and the 16-bit
/// length field) can carry. Never returns zero.
pub const fn effective_chunk_size(max: u16) -> u16 {
    if max == 0 {
        1
    } else if max > MAX_CHUNK_SIZE {
        MAX_CHUNK_SIZE
    } else {
        max
    }
}

/// Split `data` into pieces of at most `max` bytes.
///
/// The iterator is lazy and `Clone`, so a failed transfer can restart from a
/// saved copy without re-splitting.
pub fn chunks(data: &[u8], max: u16) -> Chunks<'_> {
    Chunks {
        rest: data,
        size: effective_chunk_size(max) as usize,
    }
}

/// Iterator returned by [`chunks`].
#[derive(Debug, Clone)]
pub struct Chunks<'a> {
    rest: &'a [u8],
    size: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let take = self.size.min(self.rest.len());
        let (head, tail) = self.rest.split_at(take);
        self.rest = tail;
        Some(head)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.rest.len().div_ceil(self.size);
        (n, Some(n))
    }
}

impl ExactSizeIterator for Chunks<'_> {}

impl core::iter::FusedIterator for Chunks<'_> {}

/// How many bytes the next poll should request, given what the peripheral
/// reported as still buffered.
pub fn next_request_len(available: u32, max: u16) -> u16 {
    let fits = available.min(u32::from(u16::MAX)) as u16;
    fits.min(effective_chunk_size(max))
}

// ── Tests ────────────────────────────────────────────────────
