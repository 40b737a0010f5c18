//! # Monotonic read cursor.
//!
//! The cursor is the offset of the next unconsumed item. Identifiers in a batch
//! are exclusive lower bounds for the next request: after delivering ids
//! `{5, 7}` the next offset is `8`. The cursor uses the batch *maximum*, so an
//! endpoint that reorders items inside a batch cannot move it backwards.
//!
//! Once `u64::MAX` has been delivered there is no next offset; the cursor stays
//! at `u64::MAX` and treats every identifier as already delivered.

use std::fmt;

/// Offset of the next unconsumed item; never decreases.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor {
    offset: u64,
    exhausted: bool,
}

impl Cursor {
    /// Cursor positioned at `offset`.
    pub const fn at(offset: u64) -> Self {
        Self {
            offset,
            exhausted: false,
        }
    }

    /// Offset to send with the next request.
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// True once the largest possible identifier has been delivered.
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// True if an item with `id` was already delivered under this cursor.
    pub const fn is_behind(&self, id: u64) -> bool {
        self.exhausted || id < self.offset
    }

    /// Moves past every id in `ids`; returns whether the offset changed.
    ///
    /// ```rust
    /// use pollvisor::Cursor;
    ///
    /// let mut c = Cursor::default();
    /// assert!(c.advance_past([7, 5]));
    /// assert_eq!(c.offset(), 8);
    /// assert!(!c.advance_past([3]));
    /// assert_eq!(c.offset(), 8);
    /// ```
    pub fn advance_past(&mut self, ids: impl IntoIterator<Item = u64>) -> bool {
        let Some(max) = ids.into_iter().max() else {
            return false;
        };
        match max.checked_add(1) {
            Some(next) if next > self.offset => {
                self.offset = next;
                true
            }
            Some(_) => false,
            None if self.exhausted => false,
            None => {
                self.offset = u64::MAX;
                self.exhausted = true;
                true
            }
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.offset)
    }
}
