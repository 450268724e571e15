//! Device geometry: capacity, block size, and the block math derived from them
//!
//! Geometry is validated once at construction and immutable afterwards. Every
//! invariant violation here is configuration-fatal: a device with broken
//! geometry must never come into existence.

use crate::error::{LogdiskError, Result};
use crate::units::{self, SizeUnit};
use serde::{Deserialize, Serialize};

/// Validated capacity / block-size pair.
///
/// Capacity and block size keep the units they were configured with; byte
/// values are fixed at construction, where their `u64` representability is
/// part of validation. The block count is precomputed since every allocation
/// decision needs it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Geometry {
    capacity: u64,
    capacity_unit: SizeUnit,
    block_size: u64,
    block_unit: SizeUnit,
    total_blocks: u64,
    capacity_bytes: u64,
    block_bytes: u64,
}

impl Geometry {
    /// Build and validate a geometry.
    ///
    /// Checked, in order: nonzero capacity, nonzero block size, both byte
    /// values representable in `u64`, block size not exceeding capacity
    /// (compared in the block unit), and capacity dividing into a whole
    /// number of blocks.
    pub fn new(
        capacity: u64,
        capacity_unit: SizeUnit,
        block_size: u64,
        block_unit: SizeUnit,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(LogdiskError::ZeroCapacity);
        }
        if block_size == 0 {
            return Err(LogdiskError::ZeroBlockSize);
        }

        // Bytes are the widest downscale, so these two conversions bound
        // every other one derived from the pair.
        let capacity_bytes = units::to_bytes(capacity, capacity_unit)?;
        let block_bytes = units::to_bytes(block_size, block_unit)?;

        // Capacity expressed in the block unit. An upscale conversion reports
        // 0, which the bounds check below rejects for free.
        let capacity_in_block_unit = units::convert(capacity, capacity_unit, block_unit)?;
        if block_size > capacity_in_block_unit {
            return Err(LogdiskError::BlockExceedsCapacity {
                block: block_size,
                capacity: capacity_in_block_unit,
            });
        }
        if capacity_in_block_unit % block_size != 0 {
            return Err(LogdiskError::UnalignedBlockSize {
                block: block_size,
                capacity: capacity_in_block_unit,
            });
        }

        Ok(Geometry {
            capacity,
            capacity_unit,
            block_size,
            block_unit,
            total_blocks: capacity_in_block_unit / block_size,
            capacity_bytes,
            block_bytes,
        })
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn capacity_unit(&self) -> SizeUnit {
        self.capacity_unit
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn block_unit(&self) -> SizeUnit {
        self.block_unit
    }

    pub fn total_blocks(&self) -> u64 {
        self.total_blocks
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_bytes
    }

    pub fn block_bytes(&self) -> u64 {
        self.block_bytes
    }

    /// Blocks needed to hold `size` of the given unit, rounding partial
    /// blocks up. Sizes too large to express in bytes are `BadQuantity`
    /// errors, like everywhere else on the conversion path.
    pub fn blocks_for(&self, size: u64, unit: SizeUnit) -> Result<u64> {
        let size_bytes = units::to_bytes(size, unit)?;
        Ok(size_bytes.div_ceil(self.block_bytes))
    }

    /// Logical size of a `blocks`-long extent, in the block unit. Committed
    /// file sizes are always whole blocks.
    pub fn committed_size(&self, blocks: u64) -> u64 {
        blocks * self.block_size
    }

    /// Byte address of the block at `index`.
    pub fn block_address(&self, index: usize) -> u64 {
        index as u64 * self.block_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_geometry() {
        let g = Geometry::new(4, SizeUnit::MB, 1, SizeUnit::MB).unwrap();
        assert_eq!(g.total_blocks(), 4);
        assert_eq!(g.block_bytes(), 1024 * 1024);
        assert_eq!(g.capacity_bytes(), 4 * 1024 * 1024);
    }

    #[test]
    fn test_cross_unit_geometry() {
        let g = Geometry::new(1, SizeUnit::GB, 256, SizeUnit::KB).unwrap();
        assert_eq!(g.total_blocks(), 4096);
        assert_eq!(g.block_bytes(), 256 * 1024);
    }

    #[test]
    fn test_zero_capacity() {
        assert!(matches!(
            Geometry::new(0, SizeUnit::MB, 1, SizeUnit::KB),
            Err(LogdiskError::ZeroCapacity)
        ));
    }

    #[test]
    fn test_zero_block_size() {
        assert!(matches!(
            Geometry::new(4, SizeUnit::MB, 0, SizeUnit::KB),
            Err(LogdiskError::ZeroBlockSize)
        ));
    }

    #[test]
    fn test_block_larger_than_capacity() {
        assert!(matches!(
            Geometry::new(4, SizeUnit::MB, 8, SizeUnit::MB),
            Err(LogdiskError::BlockExceedsCapacity { .. })
        ));
    }

    #[test]
    fn test_block_unit_above_capacity_unit() {
        // Conversion sentinel makes the capacity read as 0 in the block unit.
        assert!(matches!(
            Geometry::new(4, SizeUnit::MB, 1, SizeUnit::GB),
            Err(LogdiskError::BlockExceedsCapacity { .. })
        ));
    }

    #[test]
    fn test_unaligned_block_size() {
        assert!(matches!(
            Geometry::new(4, SizeUnit::MB, 3, SizeUnit::MB),
            Err(LogdiskError::UnalignedBlockSize { .. })
        ));
    }

    #[test]
    fn test_blocks_for_rounds_up() {
        let g = Geometry::new(4, SizeUnit::MB, 1, SizeUnit::MB).unwrap();
        assert_eq!(g.blocks_for(1, SizeUnit::B).unwrap(), 1);
        assert_eq!(g.blocks_for(1, SizeUnit::MB).unwrap(), 1);
        assert_eq!(g.blocks_for(1024 * 1024 + 1, SizeUnit::B).unwrap(), 2);
        assert_eq!(g.blocks_for(3, SizeUnit::MB).unwrap(), 3);
        assert_eq!(g.blocks_for(0, SizeUnit::B).unwrap(), 0);
    }

    #[test]
    fn test_unrepresentable_sizes_are_rejected() {
        assert!(matches!(
            Geometry::new(u64::MAX, SizeUnit::TB, 1, SizeUnit::MB),
            Err(LogdiskError::BadQuantity(_))
        ));
        assert!(matches!(
            Geometry::new(4, SizeUnit::MB, u64::MAX, SizeUnit::GB),
            Err(LogdiskError::BadQuantity(_))
        ));

        let g = Geometry::new(4, SizeUnit::MB, 1, SizeUnit::MB).unwrap();
        assert!(matches!(
            g.blocks_for(u64::MAX, SizeUnit::GB),
            Err(LogdiskError::BadQuantity(_))
        ));
    }

    #[test]
    fn test_committed_size_in_block_units() {
        let g = Geometry::new(1, SizeUnit::GB, 256, SizeUnit::KB).unwrap();
        assert_eq!(g.committed_size(3), 768); // KB
        assert_eq!(g.committed_size(0), 0);
    }

    #[test]
    fn test_block_addresses() {
        let g = Geometry::new(4, SizeUnit::MB, 1, SizeUnit::MB).unwrap();
        assert_eq!(g.block_address(0), 0);
        assert_eq!(g.block_address(1), 0x100000);
        assert_eq!(g.block_address(3), 0x300000);
    }
}
