//! Splitting the glyph table across size-bounded source files.
//!
//! Each partition is a C header holding one `uint8_t` array. Partitions are
//! filled greedily in table order: a glyph moves on to the next partition
//! when it would push the current one past the budget, so no glyph is ever
//! split across files and every partition but the last stays within budget.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use encoding::{all::GBK, EncoderTrap, Encoding};
use serde::{Deserialize, Serialize};

use crate::{codepoint::GlyphSlot, pack::PackedGlyph, plan::BudgetPlan, plan::OffsetMap, Error};

/// Text encoding of the generated source files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Charset {
    /// GB2312, as expected by most embedded IDEs configured for Chinese.
    #[default]
    Gb2312,
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
}

impl Charset {
    fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Charset::Utf8 => text.as_bytes().to_vec(),
            // only annotations can hold characters outside GB2312
            Charset::Gb2312 => GBK
                .encode(text, EncoderTrap::Replace)
                .unwrap_or_else(|_| text.as_bytes().to_vec()),
        }
    }

    /// Encodes a glyph line. In GB2312 the slot's character is written as
    /// the slot's own code bytes, since GBK maps a few GB2312 positions to
    /// other code points.
    fn encode_line(self, line: &str, slot: &GlyphSlot) -> Vec<u8> {
        let (Charset::Gb2312, Some(slot_ch)) = (self, slot.ch) else {
            return self.encode(line);
        };
        let mut out = Vec::with_capacity(line.len());
        let mut utf8 = [0; 4];
        for ch in line.chars() {
            if ch == slot_ch {
                out.extend([slot.code.high, slot.code.low]);
            } else if ch.is_ascii() {
                out.push(ch as u8);
            } else {
                out.extend(self.encode(ch.encode_utf8(&mut utf8)));
            }
        }
        out
    }
}

/// How glyph lines are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmitOptions {
    /// Append `// {size}px [{char}] {code}` to each glyph line.
    pub annotate: bool,
    pub charset: Charset,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            annotate: true,
            charset: Charset::Gb2312,
        }
    }
}

/// Destination for partition files.
pub trait PartitionSink {
    type Output: Write;

    /// Opens the output for partition `index` (zero based).
    fn open(&mut self, index: usize) -> Result<Self::Output, Error>;

    /// Flushes and releases the output of partition `index`.
    fn close(&mut self, index: usize, output: Self::Output) -> Result<(), Error>;

    /// Names partition `index` in error messages.
    fn location(&self, index: usize) -> PathBuf;
}

/// The file name of partition `index` (zero based).
pub fn partition_file_name(index: usize) -> String {
    format!("font_part_{}.h", index + 1)
}

/// Writes partitions as `font_part_{n}.h` files into a directory.
#[derive(Clone, Debug)]
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl PartitionSink for DirSink {
    type Output = BufWriter<File>;

    fn open(&mut self, index: usize) -> Result<Self::Output, Error> {
        let path = self.location(index);
        File::create(&path)
            .map(BufWriter::new)
            .map_err(|e| Error::io(&path, e))
    }

    fn close(&mut self, index: usize, mut output: Self::Output) -> Result<(), Error> {
        output.flush().map_err(|e| Error::io(&self.location(index), e))
    }

    fn location(&self, index: usize) -> PathBuf {
        self.dir.join(partition_file_name(index))
    }
}

/// Collects partitions in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    pub partitions: Vec<Vec<u8>>,
}

impl PartitionSink for MemorySink {
    type Output = Vec<u8>;

    fn open(&mut self, _index: usize) -> Result<Self::Output, Error> {
        Ok(Vec::new())
    }

    fn close(&mut self, index: usize, output: Self::Output) -> Result<(), Error> {
        if self.partitions.len() <= index {
            self.partitions.resize(index + 1, Vec::new());
        }
        self.partitions[index] = output;
        Ok(())
    }

    fn location(&self, index: usize) -> PathBuf {
        PathBuf::from(format!("<memory>/{}", partition_file_name(index)))
    }
}

/// A finished partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PartitionInfo {
    /// Zero based partition index.
    pub index: usize,
    /// Absolute start of this partition in the concatenated table.
    pub start: u64,
    /// Number of glyph bytes in this partition.
    pub len: u64,
    pub glyphs: usize,
}

impl PartitionInfo {
    /// The one based number used in file and array names.
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

struct OpenPartition<W> {
    index: usize,
    output: W,
    start: u64,
    bytes: u64,
    glyphs: usize,
}

enum WriterState<W> {
    Writing(OpenPartition<W>),
    Done,
}

/// What a finished [`PartitionWriter`] produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriterSummary {
    pub offsets: OffsetMap,
    pub partitions: Vec<PartitionInfo>,
}

/// Streams packed glyphs into partitions.
pub struct PartitionWriter<S: PartitionSink> {
    sink: S,
    budget: u64,
    partition_count: usize,
    options: EmitOptions,
    state: WriterState<S::Output>,
    offset: u64,
    offsets: OffsetMap,
    finished: Vec<PartitionInfo>,
    line: String,
}

impl<S: PartitionSink> PartitionWriter<S> {
    /// Opens the first partition.
    pub fn new(mut sink: S, plan: &BudgetPlan, options: EmitOptions) -> Result<Self, Error> {
        let partition_count = plan.partitions();
        let first = open_partition(&mut sink, 0, 0, partition_count, options.charset)?;
        Ok(Self {
            sink,
            budget: plan.bytes_per_partition(),
            partition_count,
            options,
            state: WriterState::Writing(first),
            offset: 0,
            offsets: OffsetMap::default(),
            finished: Vec::new(),
            line: String::new(),
        })
    }

    /// Marks the start of the table for `size` at the current offset.
    pub fn begin_size(&mut self, size: u32) {
        log::debug!("{size}x{size} table starts at 0x{:08X}", self.offset);
        self.offsets.record(size, self.offset);
    }

    /// The number of glyph bytes written so far, over all partitions.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Writes one glyph, first moving to the next partition if the glyph
    /// would push the current one over budget.
    pub fn write_glyph(
        &mut self,
        size: u32,
        slot: &GlyphSlot,
        glyph: &PackedGlyph,
    ) -> Result<(), Error> {
        let len = glyph.len() as u64;
        let switch = match &self.state {
            WriterState::Writing(open) => {
                open.bytes > 0
                    && open.bytes + len > self.budget
                    && open.index + 1 < self.partition_count
            }
            WriterState::Done => return Err(Error::config("partition writer already finished")),
        };
        if switch {
            self.advance()?;
        }

        format_line(&mut self.line, size, slot, glyph, self.options.annotate);
        let encoded = self.options.charset.encode_line(&self.line, slot);
        let WriterState::Writing(open) = &mut self.state else {
            return Err(Error::config("partition writer already finished"));
        };
        open.output
            .write_all(&encoded)
            .map_err(|e| Error::io(&self.sink.location(open.index), e))?;
        open.bytes += len;
        open.glyphs += 1;
        self.offset += len;
        Ok(())
    }

    fn advance(&mut self) -> Result<(), Error> {
        let info = self.close_current()?;
        log::info!(
            "part {} finished with {} bytes, switching to part {}",
            info.number(),
            info.len,
            info.number() + 1
        );
        let next = open_partition(
            &mut self.sink,
            info.index + 1,
            self.offset,
            self.partition_count,
            self.options.charset,
        )?;
        self.state = WriterState::Writing(next);
        Ok(())
    }

    fn close_current(&mut self) -> Result<PartitionInfo, Error> {
        let WriterState::Writing(mut open) = std::mem::replace(&mut self.state, WriterState::Done)
        else {
            return Err(Error::config("partition writer already finished"));
        };
        open.output
            .write_all(b"};\n")
            .map_err(|e| Error::io(&self.sink.location(open.index), e))?;
        self.sink.close(open.index, open.output)?;
        let info = PartitionInfo {
            index: open.index,
            start: open.start,
            len: open.bytes,
            glyphs: open.glyphs,
        };
        self.finished.push(info);
        Ok(info)
    }

    /// Closes the last partition and emits any partitions that received no
    /// glyphs, so that exactly the planned number of files exists.
    pub fn finish(mut self) -> Result<(WriterSummary, S), Error> {
        let last = self.close_current()?;
        for index in last.index + 1..self.partition_count {
            log::warn!(
                "part {} received no glyphs; partition count exceeds what the table can fill",
                index + 1
            );
            let empty = open_partition(
                &mut self.sink,
                index,
                self.offset,
                self.partition_count,
                self.options.charset,
            )?;
            self.state = WriterState::Writing(empty);
            self.close_current()?;
        }
        let summary = WriterSummary {
            offsets: self.offsets,
            partitions: self.finished,
        };
        Ok((summary, self.sink))
    }
}

fn open_partition<S: PartitionSink>(
    sink: &mut S,
    index: usize,
    start: u64,
    partition_count: usize,
    charset: Charset,
) -> Result<OpenPartition<S::Output>, Error> {
    let mut output = sink.open(index)?;
    let number = index + 1;
    let header = format!(
        "#include \"stdint.h\"\n// Part {number} (Total {partition_count})\nstatic const uint8_t Font_Part_{number}[] = {{\n"
    );
    output
        .write_all(&charset.encode(&header))
        .map_err(|e| Error::io(&sink.location(index), e))?;
    Ok(OpenPartition {
        index,
        output,
        start,
        bytes: 0,
        glyphs: 0,
    })
}

/// Formats one glyph line into `buf`, replacing its contents.
fn format_line(buf: &mut String, size: u32, slot: &GlyphSlot, glyph: &PackedGlyph, annotate: bool) {
    use std::fmt::Write as _;
    buf.clear();
    buf.push_str("    ");
    for (i, byte) in glyph.as_bytes().iter().enumerate() {
        if i > 0 {
            buf.push_str(", ");
        }
        let _ = write!(buf, "0x{byte:02X}");
    }
    buf.push(',');
    if annotate {
        let _ = match slot.ch {
            Some(ch) => write!(buf, " // {size}px [{ch}] {}", slot.code),
            None => write!(buf, " // {size}px [  ] {}", slot.code),
        };
    }
    buf.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codepoint::{CodePosition, CodeRange};
    use pretty_assertions::assert_eq;

    fn glyph(len: usize, fill: u8) -> PackedGlyph {
        PackedGlyph::from(vec![fill; len])
    }

    fn range(first: u16, last: u16) -> CodeRange {
        CodeRange::new(CodePosition::from_u16(first), CodePosition::from_u16(last))
    }

    fn slot(code: u16) -> GlyphSlot {
        GlyphSlot::new(CodePosition::from_u16(code))
    }

    #[test]
    fn line_format() {
        let mut line = String::new();
        let glyph = PackedGlyph::from(vec![0x00, 0x1F, 0xA0]);
        format_line(&mut line, 16, &slot(0xB0A1), &glyph, true);
        assert_eq!(line, "    0x00, 0x1F, 0xA0, // 16px [啊] 0xB0A1\n");
        format_line(&mut line, 12, &slot(0xAAA1), &glyph, true);
        assert_eq!(line, "    0x00, 0x1F, 0xA0, // 12px [  ] 0xAAA1\n");
        format_line(&mut line, 12, &slot(0xAAA1), &glyph, false);
        assert_eq!(line, "    0x00, 0x1F, 0xA0,\n");
    }

    #[test]
    fn single_partition_layout() {
        let plan = BudgetPlan::new(&[16], 2, 1).unwrap();
        let options = EmitOptions {
            annotate: true,
            charset: Charset::Utf8,
        };
        let mut writer = PartitionWriter::new(MemorySink::default(), &plan, options).unwrap();
        writer.begin_size(16);
        for slot in range(0xB0A1, 0xB0A2).slots() {
            writer.write_glyph(16, &slot, &glyph(32, 0)).unwrap();
        }
        let (summary, sink) = writer.finish().unwrap();
        let zeros = vec!["0x00"; 32].join(", ");
        let expected = format!(
            "#include \"stdint.h\"\n\
             // Part 1 (Total 1)\n\
             static const uint8_t Font_Part_1[] = {{\n    \
             {zeros}, // 16px [啊] 0xB0A1\n    \
             {zeros}, // 16px [阿] 0xB0A2\n\
             }};\n"
        );
        assert_eq!(String::from_utf8(sink.partitions[0].clone()).unwrap(), expected);
        assert_eq!(summary.offsets.get(16), Some(0));
        assert_eq!(
            summary.partitions,
            [PartitionInfo {
                index: 0,
                start: 0,
                len: 64,
                glyphs: 2
            }]
        );
    }

    #[test]
    fn switches_before_exceeding_budget() {
        // 10 glyphs of 32 bytes, budget ceil(320 / 3) = 107: three glyphs fit
        let plan = BudgetPlan::new(&[16], 10, 3).unwrap();
        let mut writer =
            PartitionWriter::new(MemorySink::default(), &plan, EmitOptions::default()).unwrap();
        writer.begin_size(16);
        for slot in range(0xB0A1, 0xB0AA).slots() {
            writer.write_glyph(16, &slot, &glyph(32, 0xFF)).unwrap();
        }
        let (summary, sink) = writer.finish().unwrap();
        let lens: Vec<_> = summary.partitions.iter().map(|p| p.len).collect();
        // the last partition absorbs the remainder even past budget
        assert_eq!(lens, [96, 96, 128]);
        let starts: Vec<_> = summary.partitions.iter().map(|p| p.start).collect();
        assert_eq!(starts, [0, 96, 192]);
        assert_eq!(sink.partitions.len(), 3);
        let text = String::from_utf8_lossy(&sink.partitions[2]);
        assert!(text.starts_with("#include \"stdint.h\"\n// Part 3 (Total 3)\n"));
        assert!(text.contains("static const uint8_t Font_Part_3[] = {\n"));
        assert!(text.ends_with("};\n"));
    }

    #[test]
    fn excess_partitions_are_empty() {
        let plan = BudgetPlan::new(&[16], 3, 5).unwrap();
        let mut writer =
            PartitionWriter::new(MemorySink::default(), &plan, EmitOptions::default()).unwrap();
        writer.begin_size(16);
        for slot in range(0xA1A1, 0xA1A3).slots() {
            writer.write_glyph(16, &slot, &glyph(32, 0)).unwrap();
        }
        let (summary, sink) = writer.finish().unwrap();
        let glyphs: Vec<_> = summary.partitions.iter().map(|p| p.glyphs).collect();
        assert_eq!(glyphs, [1, 1, 1, 0, 0]);
        assert_eq!(sink.partitions.len(), 5);
        assert_eq!(
            sink.partitions[4],
            b"#include \"stdint.h\"\n// Part 5 (Total 5)\nstatic const uint8_t Font_Part_5[] = {\n};\n"
        );
        assert_eq!(summary.partitions[4].start, 96);
    }

    #[test]
    fn gb2312_output_encoding() {
        let plan = BudgetPlan::new(&[8], 1, 1).unwrap();
        let mut writer =
            PartitionWriter::new(MemorySink::default(), &plan, EmitOptions::default()).unwrap();
        writer.begin_size(8);
        writer.write_glyph(8, &slot(0xB0A1), &glyph(8, 0)).unwrap();
        let (_, sink) = writer.finish().unwrap();
        let bytes = &sink.partitions[0];
        // the annotation holds the raw GB2312 bytes of the character
        let needle = [b'[', 0xB0, 0xA1, b']'];
        assert!(bytes.windows(4).any(|w| w == needle));
    }

    #[test]
    fn gb2312_annotations_keep_slot_bytes() {
        // GBK has no U+30FB and writes U+2015 as A8 44
        let plan = BudgetPlan::new(&[8], 2, 1).unwrap();
        let mut writer =
            PartitionWriter::new(MemorySink::default(), &plan, EmitOptions::default()).unwrap();
        writer.begin_size(8);
        for code in [0xA1A4, 0xA1AA] {
            writer.write_glyph(8, &slot(code), &glyph(8, 0)).unwrap();
        }
        let (_, sink) = writer.finish().unwrap();
        let bytes = &sink.partitions[0];
        for needle in [[b'[', 0xA1, 0xA4, b']'], [b'[', 0xA1, 0xAA, b']']] {
            assert!(bytes.windows(4).any(|w| w == needle), "{needle:02X?}");
        }
        assert!(!bytes.contains(&b'?'));
    }

    #[test]
    fn offsets_accumulate_across_sizes() {
        let plan = BudgetPlan::new(&[12, 16], 4, 2).unwrap();
        let mut writer =
            PartitionWriter::new(MemorySink::default(), &plan, EmitOptions::default()).unwrap();
        for size in [12, 16] {
            writer.begin_size(size);
            for slot in range(0xB0A1, 0xB0A4).slots() {
                let len = crate::pack::bytes_per_char(size);
                writer.write_glyph(size, &slot, &glyph(len, 1)).unwrap();
            }
        }
        assert_eq!(writer.offset(), 4 * 24 + 4 * 32);
        let (summary, _) = writer.finish().unwrap();
        assert_eq!(summary.offsets.get(12), Some(0));
        assert_eq!(summary.offsets.get(16), Some(96));
        let total: u64 = summary.partitions.iter().map(|p| p.len).sum();
        assert_eq!(total, 224);
    }

    #[test]
    fn dir_sink_paths() {
        let sink = DirSink::new("out");
        assert_eq!(sink.location(0), Path::new("out").join("font_part_1.h"));
        assert_eq!(sink.location(6), Path::new("out").join("font_part_7.h"));
    }
}
