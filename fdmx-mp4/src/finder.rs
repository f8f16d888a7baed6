/*
    REFERENCES
    ----------

    1. https://github.com/shaka-project/shaka-player/blob/7098f43f70119226bca2e5583833aaf27b498e33/lib/util/mp4_parser.js
    2. ISO/IEC 14496-12 section 4.2 (object structure)

*/

use crate::{Reader, Result};
use log::trace;

/// Size of the `size` + `type` fields every box starts with.
const BASIC_HEADER_SIZE: usize = 8;
/// Size of the header when the `size` field is followed by a 64-bit `largesize`.
const LARGE_HEADER_SIZE: usize = 16;

/// Half-open range of bytes `[start, end)` inside a caller owned buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Range covering a whole buffer.
    pub fn of(data: &[u8]) -> Self {
        Self::new(0, data.len())
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the bytes of this range, clamped to the buffer length.
    pub fn slice<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        let end = self.end.min(data.len());
        &data[self.start.min(end)..end]
    }
}

impl From<std::ops::Range<usize>> for ByteRange {
    fn from(value: std::ops::Range<usize>) -> Self {
        Self::new(value.start, value.end)
    }
}

/// Location of a single box inside a buffer. This is only a view, the box
/// bytes are never copied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxDescriptor {
    /// Integer code of the fourcc, see [`type_from_string`].
    pub box_type: u32,
    /// Offset of the first header byte.
    pub start: usize,
    /// Offset right after the last byte as declared by the header. This can
    /// be past the end of the scanned range when the box body is truncated.
    pub end: usize,
    /// Either 8 or 16 bytes depending upon the presence of `largesize`.
    pub header_size: usize,
}

impl BoxDescriptor {
    /// The box name, a 4-character string (fourcc).
    pub fn name(&self) -> String {
        type_to_string(self.box_type)
    }

    /// The declared size of this box (including the header).
    pub fn size(&self) -> usize {
        self.end - self.start
    }

    /// Range of the box body, right after the header.
    pub fn payload(&self) -> ByteRange {
        ByteRange::new(self.start + self.header_size, self.end)
    }

    /// Returns true if the whole box lies within the first `len` bytes.
    pub fn is_complete_within(&self, len: usize) -> bool {
        self.end <= len
    }

    /// Open this box as a basic box, reading its (possibly truncated) body.
    pub fn basic_box<'a>(&self, data: &'a [u8]) -> ParsedBox<'a> {
        ParsedBox {
            name: self.name(),
            start: self.start,
            size: self.size(),
            version: None,
            flags: None,
            reader: Reader::new(self.payload().slice(data)),
            has_64_bit_size: self.header_size == LARGE_HEADER_SIZE,
        }
    }

    /// Open this box as a full box, consuming the version and flags fields.
    pub fn full_box<'a>(&self, data: &'a [u8]) -> Result<ParsedBox<'a>> {
        let mut box_ = self.basic_box(data);
        let version_and_flags = box_.reader.read_u32()?;
        box_.version = Some(version_and_flags >> 24);
        box_.flags = Some(version_and_flags & 0xFFFFFF);
        Ok(box_)
    }
}

/// Opened mp4 box, ready to have its fields read.
pub struct ParsedBox<'a> {
    /// The box name, a 4-character string (fourcc).
    pub name: String,
    /// The start of this box (before the header) in the original buffer.
    pub start: usize,
    /// The size of this box (including the header).
    pub size: usize,
    /// The version for a full box, `None` for basic boxes.
    pub version: Option<u32>,
    /// The flags for a full box, `None` for basic boxes.
    pub flags: Option<u32>,
    /// Reader positioned at the box body. Only covers the bytes of this box
    /// which are actually present in the buffer.
    pub reader: Reader<'a>,
    /// If true, the box header had a 64-bit size field.
    pub has_64_bit_size: bool,
}

impl ParsedBox<'_> {
    /// Find the header size of the box.
    pub fn header_size(&self) -> usize {
        let size_field = if self.has_64_bit_size {
            LARGE_HEADER_SIZE
        } else {
            BASIC_HEADER_SIZE
        };
        let version_and_flags_size = if self.flags.is_some() { 4 } else { 0 };
        size_field + version_and_flags_size
    }
}

/// Iterator over the sibling boxes of a single level.
///
/// Iteration ends without an error when the next header does not fit inside
/// the range, or when a header declares an impossible size. Whatever was
/// yielded before that point is still valid.
#[derive(Clone, Debug)]
pub struct BoxIter<'a> {
    data: &'a [u8],
    position: usize,
    end: usize,
    done: bool,
}

impl<'a> BoxIter<'a> {
    pub fn new(data: &'a [u8], range: ByteRange) -> Self {
        let end = range.end.min(data.len());
        Self {
            data,
            position: range.start.min(end),
            end,
            done: false,
        }
    }

    fn read_u32_at(&self, offset: usize) -> u32 {
        let b = &self.data[offset..offset + 4];
        u32::from_be_bytes([b[0], b[1], b[2], b[3]])
    }

    fn read_u64_at(&self, offset: usize) -> u64 {
        ((self.read_u32_at(offset) as u64) << 32) | self.read_u32_at(offset + 4) as u64
    }
}

impl Iterator for BoxIter<'_> {
    type Item = BoxDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.position;

        if self.done || start >= self.end || self.end - start < BASIC_HEADER_SIZE {
            return None;
        }

        let size = self.read_u32_at(start);
        let box_type = self.read_u32_at(start + 4);
        let mut header_size = BASIC_HEADER_SIZE;

        let end = match size {
            0 => self.end,
            1 => {
                if self.end - start < LARGE_HEADER_SIZE {
                    self.done = true;
                    return None;
                }

                header_size = LARGE_HEADER_SIZE;
                let large_size = self.read_u64_at(start + BASIC_HEADER_SIZE);

                if large_size < LARGE_HEADER_SIZE as u64 {
                    trace!(
                        "{} box at {} has invalid 64-bit size {}",
                        type_to_string(box_type),
                        start,
                        large_size
                    );
                    self.done = true;
                    return None;
                }

                usize::try_from(large_size)
                    .map(|x| start.saturating_add(x))
                    .unwrap_or(usize::MAX)
            }
            2..=7 => {
                trace!(
                    "{} box at {} has invalid size {}",
                    type_to_string(box_type),
                    start,
                    size
                );
                self.done = true;
                return None;
            }
            _ => start.saturating_add(size as usize),
        };

        self.position = end;

        Some(BoxDescriptor {
            box_type,
            start,
            end,
            header_size,
        })
    }
}

/// Find all boxes matching a nested type path inside `range`.
///
/// A single element path like `["moof"]` matches boxes at the first level of
/// the range, while `["moof", "traf"]` descends into every `moof` and
/// matches its `traf` children. Results are in encounter order.
pub fn find_box(data: &[u8], range: ByteRange, path: &[&str]) -> Vec<BoxDescriptor> {
    let mut results = Vec::new();

    let Some((first, rest)) = path.split_first() else {
        return results;
    };

    let box_type = type_from_string(first);

    for box_ in BoxIter::new(data, range).filter(|x| x.box_type == box_type) {
        if rest.is_empty() {
            results.push(box_);
        } else {
            let payload = box_.payload();
            let children = ByteRange::new(payload.start, payload.end.min(range.end));
            results.extend(find_box(data, children, rest));
        }
    }

    results
}

// UTILS

/// Convert an ascii string name to the integer type for a box.
/// The name must be four characters long.
pub fn type_from_string(name: &str) -> u32 {
    assert!(name.len() == 4, "MP4 box names must be 4 characters long");
    name.bytes().fold(0, |code, chr| (code << 8) | chr as u32)
}

/// Convert an integer type from a box into an ascii string name.
/// Non printable bytes are replaced, which is useful for debugging.
pub fn type_to_string(box_type: u32) -> String {
    String::from_utf8_lossy(&box_type.to_be_bytes()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_box(name: &str, payload: &[u8]) -> Vec<u8> {
        let mut data = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
        data.extend_from_slice(name.as_bytes());
        data.extend_from_slice(payload);
        data
    }

    #[test]
    fn test_type_conversions() {
        assert_eq!(type_from_string("moof"), 0x6D6F6F66);
        assert_eq!(type_to_string(0x6D646174), "mdat");
    }

    #[test]
    fn test_nested_path() {
        let traf = make_box("traf", &make_box("tfdt", &[0; 8]));
        let mut moof = make_box("mfhd", &[0; 8]);
        moof.extend(traf);
        let mut data = make_box("styp", b"msdh");
        let moof_start = data.len();
        data.extend(make_box("moof", &moof));

        let found = find_box(&data, ByteRange::of(&data), &["moof", "traf", "tfdt"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name(), "tfdt");
        assert_eq!(found[0].start, moof_start + 8 + 16 + 8);
        assert_eq!(found[0].size(), 16);
    }

    #[test]
    fn test_size_zero_extends_to_range_end() {
        let mut data = make_box("free", &[]);
        data.extend_from_slice(&[0, 0, 0, 0]);
        data.extend_from_slice(b"mdat");
        data.extend_from_slice(&[1; 20]);

        let found = find_box(&data, ByteRange::of(&data), &["mdat"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].end, data.len());
    }

    #[test]
    fn test_large_size() {
        let mut data = 1_u32.to_be_bytes().to_vec();
        data.extend_from_slice(b"mdat");
        data.extend_from_slice(&20_u64.to_be_bytes());
        data.extend_from_slice(&[7; 4]);

        let found = find_box(&data, ByteRange::of(&data), &["mdat"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].header_size, 16);
        assert_eq!(found[0].payload(), ByteRange::new(16, 20));
        assert!(found[0].basic_box(&data).has_64_bit_size);
    }

    #[test]
    fn test_invalid_size_halts_scan() {
        let mut data = make_box("emsg", &[0; 4]);
        data.extend_from_slice(&[0, 0, 0, 4]);
        data.extend_from_slice(b"emsg");
        data.extend(make_box("emsg", &[0; 4]));

        let found = find_box(&data, ByteRange::of(&data), &["emsg"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start, 0);
    }

    #[test]
    fn test_partial_header_is_excluded() {
        let mut data = make_box("moof", &[0; 8]);
        data.extend_from_slice(&[0, 0, 0, 16, b'm', b'o']);

        let found = find_box(&data, ByteRange::of(&data), &["moof"]);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_truncated_body_is_reported_with_declared_end() {
        let data = make_box("mdat", &[0; 32]);
        let truncated = &data[..20];

        let found = find_box(truncated, ByteRange::of(truncated), &["mdat"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].end, 40);
        assert!(!found[0].is_complete_within(truncated.len()));
        assert_eq!(found[0].basic_box(truncated).reader.get_length(), 12);
    }
}
