//! Block occupancy store: fixed slot array with an append cursor
//!
//! Writes are log-structured: fresh extents are always stamped at the cursor
//! and the cursor only moves forward. Deletions punch holes in place, and a
//! stable compaction pass closes them when an allocation cannot fit at the
//! tail. The store tracks which file owns which block; file content itself is
//! never held.

use crate::catalog::FileId;
use crate::error::{LogdiskError, Result};
use serde::{Deserialize, Serialize};

/// Occupancy state of a single block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    Free,
    Occupied(FileId),
}

impl Slot {
    pub fn is_free(self) -> bool {
        matches!(self, Slot::Free)
    }

    /// Owning file, if any.
    pub fn owner(self) -> Option<FileId> {
        match self {
            Slot::Occupied(id) => Some(id),
            Slot::Free => None,
        }
    }
}

/// Fixed-size block store.
///
/// Invariant outside of `compact`: every occupied slot sits below the cursor,
/// so the tail `cursor..` is entirely free and extents can be stamped there
/// without scanning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockStore {
    slots: Box<[Slot]>,

    /// Next append position.
    cursor: usize,

    /// Number of compaction passes run so far.
    compactions: u64,
}

impl BlockStore {
    /// Create a store with `total_blocks` free slots.
    pub fn new(total_blocks: usize) -> Self {
        BlockStore {
            slots: vec![Slot::Free; total_blocks].into_boxed_slice(),
            cursor: 0,
            compactions: 0,
        }
    }

    pub fn total_blocks(&self) -> usize {
        self.slots.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn compactions(&self) -> u64 {
        self.compactions
    }

    /// Read-only view of the slot array.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Allocate `required` contiguous blocks for `id`, returning the start
    /// index of the extent.
    ///
    /// Two attempts, never more: if the tail is too short but the device-wide
    /// free count covers the request, one compaction pass is run and the tail
    /// is retried once. A free count short of the request fails immediately,
    /// without compacting.
    pub fn allocate(&mut self, id: FileId, required: usize) -> Result<usize> {
        if self.tail_room() >= required {
            return Ok(self.stamp(id, required));
        }

        let free = self.count_free();
        if free < required {
            return Err(LogdiskError::InsufficientSpace {
                required: required as u64,
                free: free as u64,
            });
        }

        self.compact();
        if self.tail_room() >= required {
            return Ok(self.stamp(id, required));
        }

        // Compaction gathers all free blocks at the tail, so with the free
        // count already verified this branch cannot be taken. It stays as the
        // hard stop of the two-attempt policy.
        Err(LogdiskError::InsufficientSpace {
            required: required as u64,
            free: self.tail_room() as u64,
        })
    }

    /// Free every block owned by `id`. The cursor stays put; reclaiming the
    /// holes is compaction's job.
    pub fn release(&mut self, id: FileId) {
        let mut released = 0usize;
        for slot in self.slots.iter_mut() {
            if *slot == Slot::Occupied(id) {
                *slot = Slot::Free;
                released += 1;
            }
        }
        if released == 0 {
            tracing::warn!(%id, "release for an id that owns no blocks");
        } else {
            tracing::debug!(%id, blocks = released, "released blocks");
        }
    }

    /// Compact the store: move all occupied slots to the front, preserving
    /// their relative order, and leave the entire tail free.
    ///
    /// Single pass over the slots. Afterwards the cursor equals the occupied
    /// count, so the append invariant holds again with maximal tail room.
    pub fn compact(&mut self) {
        self.compactions += 1;

        if self.is_full() || self.is_empty() {
            // Both queries resynchronize the cursor; nothing to move.
            return;
        }

        let mut write = 0;
        for read in 0..self.slots.len() {
            if let Slot::Occupied(id) = self.slots[read] {
                self.slots[write] = Slot::Occupied(id);
                write += 1;
            }
        }
        for slot in &mut self.slots[write..] {
            *slot = Slot::Free;
        }
        self.cursor = write;
        tracing::debug!(occupied = write, "compacted block store");
    }

    /// True when no slot is free. A full store forces the cursor to the end,
    /// resynchronizing it if it had drifted.
    pub fn is_full(&mut self) -> bool {
        let full = self.slots.iter().all(|slot| !slot.is_free());
        if full {
            self.cursor = self.slots.len();
        }
        full
    }

    /// True when no slot is occupied. An empty store pulls the cursor back to
    /// the start so the whole array is tail again.
    pub fn is_empty(&mut self) -> bool {
        let empty = self.slots.iter().all(|slot| slot.is_free());
        if empty {
            self.cursor = 0;
        }
        empty
    }

    /// Device-wide free count, blind to fragmentation. Reports 0 straight
    /// away when the store is full.
    pub fn count_free(&mut self) -> usize {
        if self.is_full() {
            return 0;
        }
        self.slots.iter().filter(|slot| slot.is_free()).count()
    }

    /// Lowest block index owned by `id`.
    pub fn first_block(&self, id: FileId) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == Slot::Occupied(id))
    }

    /// Number of blocks owned by `id`.
    pub fn owned_blocks(&self, id: FileId) -> usize {
        self.slots
            .iter()
            .filter(|slot| **slot == Slot::Occupied(id))
            .count()
    }

    fn tail_room(&self) -> usize {
        self.slots.len() - self.cursor
    }

    fn stamp(&mut self, id: FileId, required: usize) -> usize {
        let start = self.cursor;
        for slot in &mut self.slots[start..start + required] {
            *slot = Slot::Occupied(id);
        }
        self.cursor += required;
        start
    }
}
