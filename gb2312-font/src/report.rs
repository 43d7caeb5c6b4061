//! What a run produced, for people and for firmware.

use std::fmt::{self, Write as _};

use crate::{
    partition::PartitionInfo,
    plan::{BudgetPlan, OffsetMap},
};

/// The name of the address manifest written next to the partitions.
pub const MANIFEST_FILE_NAME: &str = "font_parts.h";

/// The name of the optional flat image of the whole table.
pub const BINARY_FILE_NAME: &str = "font_table.bin";

/// The outcome of [`generate`](crate::generate).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub plan: BudgetPlan,
    pub offsets: OffsetMap,
    pub partitions: Vec<PartitionInfo>,
    /// Number of glyph slots rendered blank because they are unassigned.
    pub placeholders: usize,
}

impl Report {
    /// A C header with the flash address of every size and partition.
    pub fn manifest_header(&self) -> String {
        let mut out = String::new();
        out.push_str("#ifndef FONT_PARTS_H\n#define FONT_PARTS_H\n\n");
        for (size, offset) in self.offsets.iter() {
            let _ = writeln!(out, "#define FONT_{size}X{size}_ADDR 0x{offset:08X}");
        }
        out.push('\n');
        for part in &self.partitions {
            let n = part.number();
            let _ = writeln!(out, "#define FONT_PART_{n}_ADDR 0x{:08X}", part.start);
            let _ = writeln!(out, "#define FONT_PART_{n}_SIZE {}", part.len);
        }
        out.push('\n');
        let _ = writeln!(out, "#define FONT_PART_COUNT {}", self.partitions.len());
        let _ = writeln!(out, "#define FONT_TOTAL_SIZE {}", self.plan.total_bytes());
        out.push_str("\n#endif\n");
        out
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "font start addresses:")?;
        for (size, offset) in self.offsets.iter() {
            writeln!(f, "  {size}x{size}: 0x{offset:08X}")?;
        }
        writeln!(
            f,
            "partitions ({} bytes total, budget {} bytes each):",
            self.plan.total_bytes(),
            self.plan.bytes_per_partition()
        )?;
        for part in &self.partitions {
            writeln!(
                f,
                "  part {}: 0x{:08X} {} bytes, {} glyphs",
                part.number(),
                part.start,
                part.len,
                part.glyphs
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn report() -> Report {
        let plan = BudgetPlan::new(&[12, 16], 2, 2).unwrap();
        let offsets = plan.expected_offsets();
        Report {
            plan,
            offsets,
            partitions: vec![
                PartitionInfo {
                    index: 0,
                    start: 0,
                    len: 48,
                    glyphs: 2,
                },
                PartitionInfo {
                    index: 1,
                    start: 48,
                    len: 64,
                    glyphs: 2,
                },
            ],
            placeholders: 0,
        }
    }

    #[test]
    fn display() {
        assert_eq!(
            report().to_string(),
            "font start addresses:\n\
             \x20 12x12: 0x00000000\n\
             \x20 16x16: 0x00000030\n\
             partitions (112 bytes total, budget 56 bytes each):\n\
             \x20 part 1: 0x00000000 48 bytes, 2 glyphs\n\
             \x20 part 2: 0x00000030 64 bytes, 2 glyphs\n"
        );
    }

    #[test]
    fn manifest() {
        assert_eq!(
            report().manifest_header(),
            "#ifndef FONT_PARTS_H\n\
             #define FONT_PARTS_H\n\
             \n\
             #define FONT_12X12_ADDR 0x00000000\n\
             #define FONT_16X16_ADDR 0x00000030\n\
             \n\
             #define FONT_PART_1_ADDR 0x00000000\n\
             #define FONT_PART_1_SIZE 48\n\
             #define FONT_PART_2_ADDR 0x00000030\n\
             #define FONT_PART_2_SIZE 64\n\
             \n\
             #define FONT_PART_COUNT 2\n\
             #define FONT_TOTAL_SIZE 112\n\
             \n\
             #endif\n"
        );
    }
}
