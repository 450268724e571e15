//! Device engine: geometry, block store, and file directory behind one API
//!
//! All command-level file operations land here. The engine owns every piece
//! of mutable state, so a `Device` value is the whole simulated disk; nothing
//! lives in globals.

use crate::catalog::{Catalog, FileId, FileRecord};
use crate::error::{LogdiskError, Result};
use crate::geometry::Geometry;
use crate::store::BlockStore;
use crate::units::{self, SizeUnit};
use serde::Serialize;

/// Outcome of a write commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Commit {
    /// A zero-size write deleted the file.
    Deleted {
        path: String,
        id: FileId,
        unit: SizeUnit,
    },
    /// A new extent was committed.
    Written {
        path: String,
        id: FileId,
        /// Starting byte address of the extent.
        address: u64,
        /// Committed size in the block unit.
        size: u64,
        unit: SizeUnit,
    },
}

/// File info served by a read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadInfo {
    pub path: String,
    pub id: FileId,
    pub address: u64,
    pub size: u64,
    pub unit: SizeUnit,
}

/// Occupancy snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceStats {
    pub total_blocks: u64,
    pub free_blocks: u64,
    pub used_blocks: u64,
    pub files: u64,
    pub compactions: u64,
}

/// The simulated log-structured device.
pub struct Device {
    geometry: Geometry,
    store: BlockStore,
    catalog: Catalog,
}

impl Device {
    /// Build a device with an all-free store sized by the geometry.
    pub fn new(geometry: Geometry) -> Self {
        let store = BlockStore::new(geometry.total_blocks() as usize);
        tracing::info!(
            blocks = geometry.total_blocks(),
            block_bytes = geometry.block_bytes(),
            "device initialized"
        );
        Device {
            geometry,
            store,
            catalog: Catalog::new(),
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Commit a write: delete on zero size, create on a fresh path,
    /// release-then-reallocate on an existing one.
    ///
    /// Overwrites surrender the old extent before the new allocation is
    /// attempted, so the freed blocks count toward the request. The flip
    /// side is deliberate: when the reallocation still fails, the old data
    /// is already gone and the file drops out of the directory, exactly as
    /// if a delete had been followed by a write that never landed.
    ///
    /// The unit is ignored for zero sizes; a delete has no extent.
    pub fn commit_write(&mut self, path: &str, size: u64, unit: SizeUnit) -> Result<Commit> {
        let existing = self.catalog.find_by_path(path).map(|record| record.id);

        if size == 0 {
            let id = existing.ok_or_else(|| LogdiskError::FileNotFound(path.to_string()))?;
            self.store.release(id);
            self.catalog.remove(id);
            tracing::info!(%path, %id, "deleted file");
            return Ok(Commit::Deleted {
                path: path.to_string(),
                id,
                unit: self.geometry.block_unit(),
            });
        }

        // Whole-device bound. Equal to capacity is allowed, larger is not.
        // Sizes that overflow the byte conversion never get this far.
        let size_bytes = units::to_bytes(size, unit)?;
        let capacity_bytes = self.geometry.capacity_bytes();
        if size_bytes > capacity_bytes {
            return Err(LogdiskError::WriteTooLarge {
                requested: size_bytes,
                capacity: capacity_bytes,
            });
        }

        let required = self.geometry.blocks_for(size, unit)?;
        let logical_size = self.geometry.committed_size(required);

        match existing {
            Some(id) => {
                self.store.release(id);
                match self.store.allocate(id, required as usize) {
                    Ok(start) => Ok(self.finish_commit(id, path, required, logical_size, start)),
                    Err(err) => {
                        // The old extent is gone and stays gone.
                        self.catalog.remove(id);
                        tracing::warn!(
                            %path, %id,
                            "overwrite allocation failed after release, file dropped"
                        );
                        Err(err)
                    }
                }
            }
            None => {
                // The fresh id is consumed only if the allocation lands.
                let id = self.catalog.peek_next_id();
                let start = self.store.allocate(id, required as usize)?;
                Ok(self.finish_commit(id, path, required, logical_size, start))
            }
        }
    }

    /// Serve the directory info for a file.
    pub fn lookup_read(&self, path: &str) -> Result<ReadInfo> {
        let record = self
            .catalog
            .find_by_path(path)
            .ok_or_else(|| LogdiskError::FileNotFound(path.to_string()))?;
        // A committed record always owns at least one block.
        let start = self.store.first_block(record.id).unwrap_or(0);
        Ok(ReadInfo {
            path: record.path.clone(),
            id: record.id,
            address: self.geometry.block_address(start),
            size: record.logical_size,
            unit: self.geometry.block_unit(),
        })
    }

    pub fn stats(&self) -> DeviceStats {
        let total = self.store.total_blocks() as u64;
        let free = self
            .store
            .slots()
            .iter()
            .filter(|slot| slot.is_free())
            .count() as u64;
        DeviceStats {
            total_blocks: total,
            free_blocks: free,
            used_blocks: total - free,
            files: self.catalog.len() as u64,
            compactions: self.store.compactions(),
        }
    }

    fn finish_commit(
        &mut self,
        id: FileId,
        path: &str,
        block_count: u64,
        logical_size: u64,
        start: usize,
    ) -> Commit {
        self.catalog.upsert(FileRecord {
            id,
            path: path.to_string(),
            block_count,
            logical_size,
        });
        let address = self.geometry.block_address(start);
        tracing::info!(%path, %id, address, blocks = block_count, "committed file");
        Commit::Written {
            path: path.to_string(),
            id,
            address,
            size: logical_size,
            unit: self.geometry.block_unit(),
        }
    }
}
