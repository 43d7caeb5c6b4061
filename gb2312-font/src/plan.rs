//! Sizing of the glyph table before anything is rendered.

use indexmap::IndexMap;

use crate::{pack::bytes_per_char, Error};

/// Byte totals and the per partition budget for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetPlan {
    sizes: Vec<u32>,
    total_slots: usize,
    partitions: usize,
    total_bytes: u64,
    bytes_per_partition: u64,
}

impl BudgetPlan {
    /// Computes the plan for `sizes`, each holding `total_slots` glyphs,
    /// split across `partitions` files.
    pub fn new(sizes: &[u32], total_slots: usize, partitions: usize) -> Result<Self, Error> {
        if sizes.is_empty() {
            return Err(Error::config("no font sizes requested"));
        }
        if partitions == 0 {
            return Err(Error::config("partition count must be at least 1"));
        }
        let total_bytes = sizes
            .iter()
            .map(|size| table_bytes(*size, total_slots))
            .sum::<u64>();
        Ok(Self {
            sizes: sizes.to_vec(),
            total_slots,
            partitions,
            total_bytes,
            bytes_per_partition: total_bytes.div_ceil(partitions as u64),
        })
    }

    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }

    pub fn total_slots(&self) -> usize {
        self.total_slots
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// The length of the concatenated glyph table.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// The byte budget of every partition but the last.
    pub fn bytes_per_partition(&self) -> u64 {
        self.bytes_per_partition
    }

    /// The offsets each size's table will start at.
    pub fn expected_offsets(&self) -> OffsetMap {
        let mut offsets = OffsetMap::default();
        let mut offset = 0;
        for size in &self.sizes {
            offsets.record(*size, offset);
            offset += table_bytes(*size, self.total_slots);
        }
        offsets
    }
}

/// The length of one size's table.
pub fn table_bytes(size: u32, total_slots: usize) -> u64 {
    bytes_per_char(size) as u64 * total_slots as u64
}

/// Start address of each size's table in the concatenated output.
///
/// Entries keep the order sizes were requested in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OffsetMap(IndexMap<u32, u64>);

impl OffsetMap {
    pub fn get(&self, size: u32) -> Option<u64> {
        self.0.get(&size).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.0.iter().map(|(size, offset)| (*size, *offset))
    }

    /// Records the start of `size`. The first record for a size wins.
    pub(crate) fn record(&mut self, size: u32, offset: u64) {
        self.0.entry(size).or_insert(offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_size() {
        let plan = BudgetPlan::new(&[16], 3, 1).unwrap();
        assert_eq!(plan.total_bytes(), 96);
        assert_eq!(plan.bytes_per_partition(), 96);
        assert_eq!(plan.expected_offsets().get(16), Some(0));
    }

    #[test]
    fn two_sizes_seven_parts() {
        let plan = BudgetPlan::new(&[12, 16], 8178, 7).unwrap();
        assert_eq!(plan.total_bytes(), 8178 * 56);
        assert_eq!(plan.bytes_per_partition(), (8178 * 56u64).div_ceil(7));
        let offsets = plan.expected_offsets();
        assert_eq!(offsets.get(12), Some(0));
        assert_eq!(offsets.get(16), Some(8178 * 24));
        assert_eq!(offsets.iter().map(|(size, _)| size).collect::<Vec<_>>(), [12, 16]);
    }

    #[test]
    fn budget_rounds_up() {
        let plan = BudgetPlan::new(&[16], 10, 3).unwrap();
        assert_eq!(plan.total_bytes(), 320);
        assert_eq!(plan.bytes_per_partition(), 107);
    }

    #[test]
    fn more_partitions_than_glyphs() {
        let plan = BudgetPlan::new(&[16], 3, 7).unwrap();
        assert_eq!(plan.bytes_per_partition(), 14);
    }

    #[test]
    fn invalid_plans() {
        assert!(matches!(BudgetPlan::new(&[], 10, 1), Err(Error::Config(_))));
        assert!(matches!(BudgetPlan::new(&[16], 10, 0), Err(Error::Config(_))));
    }

    #[test]
    fn first_record_wins() {
        let mut offsets = OffsetMap::default();
        offsets.record(16, 0);
        offsets.record(16, 32);
        assert_eq!(offsets.get(16), Some(0));
        assert_eq!(offsets.len(), 1);
    }
}
