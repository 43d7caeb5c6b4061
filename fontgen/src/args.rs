//! Command line arguments and how they override a plan file.

use std::path::PathBuf;

use gb2312_font::{Charset, CodePosition, CodeRange, Config};

#[derive(clap::Parser, Debug)]
#[command(version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Render the font table into `font_part_{n}.h` files
    Generate {
        /// Plan file to start from; relative paths in it are resolved
        /// against its directory
        plan: Option<PathBuf>,
        #[command(flatten)]
        layout: LayoutArgs,
        /// Font file (TrueType, OpenType or a collection)
        #[arg(long)]
        font: Option<PathBuf>,
        /// Face to use from a font collection
        #[arg(long)]
        font_index: Option<u32>,
        /// Directory the partitions are written to
        #[arg(long)]
        out: Option<PathBuf>,
        /// Vertical offset for one size, as SIZE=PIXELS
        #[arg(long = "y-offset", value_parser = parse_offset)]
        y_offsets: Vec<(u32, i32)>,
        /// Do not comment glyph lines with their character
        #[arg(long)]
        no_annotate: bool,
        /// Encoding of the generated sources
        #[arg(long)]
        charset: Option<CharsetArg>,
        /// Also write the concatenated table to `font_table.bin`
        #[arg(long)]
        binary: bool,
    },
    /// Print table sizes, the partition budget and start addresses
    Plan {
        /// Plan file to start from
        plan: Option<PathBuf>,
        #[command(flatten)]
        layout: LayoutArgs,
    },
}

/// Options that shape the table, shared by every command.
#[derive(clap::Args, Debug, Default)]
pub struct LayoutArgs {
    /// Pixel size to render; repeat for several sizes
    #[arg(long = "size")]
    pub sizes: Vec<u32>,
    /// Number of partition files
    #[arg(long = "parts")]
    pub partitions: Option<usize>,
    /// Code positions to cover, as FIRST..LAST in hex (e.g. A1A1..F7FE)
    #[arg(long, value_parser = parse_range)]
    pub range: Option<CodeRange>,
}

#[derive(clap::ValueEnum, Copy, Clone, Debug)]
pub enum CharsetArg {
    Gb2312,
    #[value(name = "utf-8", alias = "utf8")]
    Utf8,
}

impl From<CharsetArg> for Charset {
    fn from(arg: CharsetArg) -> Self {
        match arg {
            CharsetArg::Gb2312 => Charset::Gb2312,
            CharsetArg::Utf8 => Charset::Utf8,
        }
    }
}

impl LayoutArgs {
    pub fn apply(&self, config: &mut Config) {
        if !self.sizes.is_empty() {
            config.sizes.clone_from(&self.sizes);
        }
        if let Some(partitions) = self.partitions {
            config.partitions = partitions;
        }
        if let Some(range) = self.range {
            config.range = range;
        }
    }
}

/// The `generate` options that override a plan file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub font: Option<PathBuf>,
    pub font_index: Option<u32>,
    pub out: Option<PathBuf>,
    pub y_offsets: Vec<(u32, i32)>,
    pub no_annotate: bool,
    pub charset: Option<CharsetArg>,
    pub binary: bool,
}

impl Overrides {
    pub fn apply(self, config: &mut Config) {
        if let Some(font) = self.font {
            config.font = font;
        }
        if let Some(index) = self.font_index {
            config.font_index = index;
        }
        if let Some(out) = self.out {
            config.output_dir = out;
        }
        for (size, offset) in self.y_offsets {
            config.vertical_offsets.set(size, offset);
        }
        if self.no_annotate {
            config.annotate = false;
        }
        if let Some(charset) = self.charset {
            config.charset = charset.into();
        }
        config.binary |= self.binary;
    }
}

fn parse_offset(arg: &str) -> Result<(u32, i32), String> {
    let (size, offset) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected SIZE=PIXELS, found '{arg}'"))?;
    let size = size
        .trim()
        .parse()
        .map_err(|e| format!("bad size '{size}': {e}"))?;
    let offset = offset
        .trim()
        .parse()
        .map_err(|e| format!("bad offset '{offset}': {e}"))?;
    Ok((size, offset))
}

fn parse_range(arg: &str) -> Result<CodeRange, String> {
    let (first, last) = arg
        .split_once("..")
        .ok_or_else(|| format!("expected FIRST..LAST, found '{arg}'"))?;
    let first = parse_code(first)?;
    let last = parse_code(last.strip_prefix('=').unwrap_or(last))?;
    let range = CodeRange::new(first, last);
    if range.is_empty() {
        return Err(format!("range {first}..{last} is empty"));
    }
    Ok(range)
}

fn parse_code(code: &str) -> Result<CodePosition, String> {
    let digits = code.trim();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);
    u16::from_str_radix(digits, 16)
        .map(CodePosition::from_u16)
        .map_err(|e| format!("bad code position '{code}': {e}"))
}
