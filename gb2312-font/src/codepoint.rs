//! GB2312 code positions and their enumeration.
//!
//! The generated table is dense: every position in the enumerated range
//! gets a slot, whether or not GB2312 assigns a character to it. Firmware
//! locates a glyph with plain arithmetic on the position, so the order of
//! [`Slots`] is part of the output format.

use std::{fmt, iter::FusedIterator};

use encoding::{all::GBK, DecoderTrap, Encoding};
use serde::{Deserialize, Serialize};

/// First byte of the lowest GB2312 position.
pub const FIRST_BYTE: u8 = 0xA1;
/// Last high byte covered by the standard table (row 87).
pub const LAST_HIGH: u8 = 0xF7;
/// Last low byte of every row (cell 94).
pub const LAST_LOW: u8 = 0xFE;

/// A two byte position in the GB2312 code table.
///
/// Ordering is lexicographic on `(high, low)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub struct CodePosition {
    pub high: u8,
    pub low: u8,
}

impl CodePosition {
    pub const fn new(high: u8, low: u8) -> Self {
        Self { high, low }
    }

    pub const fn from_u16(code: u16) -> Self {
        Self::new((code >> 8) as u8, code as u8)
    }

    pub const fn to_u16(self) -> u16 {
        ((self.high as u16) << 8) | self.low as u16
    }

    /// Returns `true` if GB2312-80 assigns a character to this position.
    pub fn is_assigned(self) -> bool {
        let cell = self.low;
        if !(FIRST_BYTE..=LAST_LOW).contains(&cell) {
            return false;
        }
        match self.high {
            // punctuation, full width ASCII
            0xA1 | 0xA3 => true,
            // numerals: 1.-20., (1)-(20), circled 1-10, (一)-(十), I-XII
            0xA2 => matches!(cell, 0xB1..=0xE2 | 0xE5..=0xEE | 0xF1..=0xFC),
            // hiragana
            0xA4 => cell <= 0xF3,
            // katakana
            0xA5 => cell <= 0xF6,
            // greek
            0xA6 => matches!(cell, 0xA1..=0xB8 | 0xC1..=0xD8),
            // cyrillic
            0xA7 => matches!(cell, 0xA1..=0xC1 | 0xD1..=0xF1),
            // pinyin, bopomofo
            0xA8 => matches!(cell, 0xA1..=0xBA | 0xC5..=0xE9),
            // box drawing
            0xA9 => matches!(cell, 0xA4..=0xEF),
            0xB0..=0xD6 | 0xD8..=LAST_HIGH => true,
            // the level 1 hanzi end at 0xD7F9
            0xD7 => cell <= 0xF9,
            _ => false,
        }
    }

    /// Decodes the character at this position.
    ///
    /// Returns `None` for positions with no GB2312 assignment.
    pub fn decode(self) -> Option<char> {
        if !self.is_assigned() {
            return None;
        }
        // the GBK index remaps these two GB2312 positions
        match self.to_u16() {
            0xA1A4 => return Some('\u{30FB}'),
            0xA1AA => return Some('\u{2015}'),
            _ => (),
        }
        let text = GBK
            .decode(&[self.high, self.low], DecoderTrap::Strict)
            .ok()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(ch),
            _ => None,
        }
    }
}

impl From<u16> for CodePosition {
    fn from(code: u16) -> Self {
        Self::from_u16(code)
    }
}

impl From<CodePosition> for u16 {
    fn from(code: CodePosition) -> Self {
        code.to_u16()
    }
}

impl fmt::Display for CodePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}{:02X}", self.high, self.low)
    }
}

/// One entry of the glyph table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphSlot {
    pub code: CodePosition,
    /// The decoded character, or `None` for a blank placeholder.
    pub ch: Option<char>,
}

impl GlyphSlot {
    pub fn new(code: CodePosition) -> Self {
        Self {
            code,
            ch: code.decode(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.ch.is_none()
    }
}

/// A rectangular block of code positions.
///
/// Every high byte in `first.high..=last.high` is combined with every low
/// byte in `first.low..=last.low`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRange {
    pub first: CodePosition,
    pub last: CodePosition,
}

impl CodeRange {
    pub const fn new(first: CodePosition, last: CodePosition) -> Self {
        Self { first, last }
    }

    /// The full structural range of GB2312, `0xA1A1..=0xF7FE`.
    pub const fn gb2312() -> Self {
        Self::new(
            CodePosition::new(FIRST_BYTE, FIRST_BYTE),
            CodePosition::new(LAST_HIGH, LAST_LOW),
        )
    }

    fn rows(&self) -> usize {
        (self.last.high as usize + 1).saturating_sub(self.first.high as usize)
    }

    fn cells(&self) -> usize {
        (self.last.low as usize + 1).saturating_sub(self.first.low as usize)
    }

    /// The number of slots, assigned or not.
    pub fn len(&self) -> usize {
        self.rows() * self.cells()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over every slot in table order.
    pub fn slots(&self) -> Slots {
        Slots {
            range: *self,
            next: (!self.is_empty()).then_some(self.first),
            remaining: self.len(),
        }
    }
}

impl Default for CodeRange {
    fn default() -> Self {
        Self::gb2312()
    }
}

/// Iterator over the slots of a [`CodeRange`].
#[derive(Clone, Debug)]
pub struct Slots {
    range: CodeRange,
    next: Option<CodePosition>,
    remaining: usize,
}

impl Iterator for Slots {
    type Item = GlyphSlot;

    fn next(&mut self) -> Option<Self::Item> {
        let code = self.next?;
        self.next = if code.low < self.range.last.low {
            Some(CodePosition::new(code.high, code.low + 1))
        } else if code.high < self.range.last.high {
            Some(CodePosition::new(code.high + 1, self.range.first.low))
        } else {
            None
        };
        self.remaining -= 1;
        Some(GlyphSlot::new(code))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Slots {}

impl FusedIterator for Slots {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_range_is_dense_and_ordered() {
        let range = CodeRange::gb2312();
        assert_eq!(range.len(), 8178);
        let slots: Vec<_> = range.slots().collect();
        assert_eq!(slots.len(), 8178);
        assert_eq!(slots[0].code, CodePosition::new(0xA1, 0xA1));
        assert_eq!(slots[8177].code, CodePosition::new(0xF7, 0xFE));
        assert!(slots.windows(2).all(|pair| pair[0].code < pair[1].code));
        // row boundaries wrap back to the first cell
        assert_eq!(slots[93].code, CodePosition::new(0xA1, 0xFE));
        assert_eq!(slots[94].code, CodePosition::new(0xA2, 0xA1));
    }

    #[test]
    fn assigned_position_count() {
        let assigned = CodeRange::gb2312()
            .slots()
            .filter(|slot| !slot.is_placeholder())
            .count();
        assert_eq!(assigned, 7445);
    }

    #[test]
    fn decode_known_positions() {
        let decode = |code: u16| CodePosition::from_u16(code).decode();
        assert_eq!(decode(0xA1A1), Some('\u{3000}'));
        assert_eq!(decode(0xA1A2), Some('、'));
        assert_eq!(decode(0xA1A4), Some('\u{30FB}'));
        assert_eq!(decode(0xA1AA), Some('\u{2015}'));
        assert_eq!(decode(0xA3C1), Some('Ａ'));
        assert_eq!(decode(0xA4A1), Some('ぁ'));
        assert_eq!(decode(0xB0A1), Some('啊'));
        assert_eq!(decode(0xD7F9), Some('座'));
        assert_eq!(decode(0xF7FE), Some('齄'));
    }

    #[test]
    fn unassigned_positions_are_placeholders() {
        for code in [0xA2A1, 0xA6E0, 0xA8BB, 0xA9A1, 0xAAA1, 0xAFFE, 0xD7FA, 0xD7FE] {
            let slot = GlyphSlot::new(CodePosition::from_u16(code));
            assert!(slot.is_placeholder(), "{} should be unassigned", slot.code);
        }
    }

    #[test]
    fn sub_range() {
        let range = CodeRange::new(CodePosition::from_u16(0xA1A1), CodePosition::from_u16(0xA1A3));
        let codes: Vec<_> = range.slots().map(|slot| slot.code.to_u16()).collect();
        assert_eq!(codes, [0xA1A1, 0xA1A2, 0xA1A3]);
        assert_eq!(range.slots().len(), 3);
    }

    #[test]
    fn slots_restart() {
        let range = CodeRange::new(CodePosition::from_u16(0xB0A1), CodePosition::from_u16(0xB1A2));
        let first: Vec<_> = range.slots().collect();
        let second: Vec<_> = range.slots().collect();
        assert_eq!(first.len(), 4);
        assert_eq!(first, second);
    }

    #[test]
    fn inverted_range_is_empty() {
        let range = CodeRange::new(CodePosition::from_u16(0xA1A3), CodePosition::from_u16(0xA1A1));
        assert!(range.is_empty());
        assert_eq!(range.slots().next(), None);
    }

    #[test]
    fn display() {
        assert_eq!(CodePosition::new(0xB0, 0xA1).to_string(), "0xB0A1");
    }
}
