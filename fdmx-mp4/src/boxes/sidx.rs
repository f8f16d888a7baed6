/*
    REFERENCES
    ----------

    1. https://github.com/shaka-project/shaka-player/blob/62c8367438d36c08db6440ba32f54223e0367f00/lib/dash/mp4_segment_index_parser.js
    2. ISO/IEC 14496-12 section 8.16.3 (segment index box)

*/

use crate::{ByteRange, ParsedBox, Result, bail, find_box};

/// Time anchor of a segment, the `earliest_presentation_time` of a `SIDX` box
/// together with the timescale it is expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SidxTiming {
    pub earliest_presentation_time: u64,
    pub timescale: u32,
}

impl SidxTiming {
    /// Earliest presentation time in seconds.
    pub fn as_secs(&self) -> f64 {
        self.earliest_presentation_time as f64 / self.timescale as f64
    }
}

/// Subsegment referenced by a `SIDX` box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidxRange {
    /// First byte of the subsegment.
    pub start: u64,
    /// Last byte of the subsegment (inclusive).
    pub end: u64,
    /// Duration of the subsegment in timescale units.
    pub subsegment_duration: u32,
    /// The reference points to another `SIDX` box instead of media.
    pub is_index: bool,
}

/// Mp4 `SIDX` box.
#[derive(Clone, Debug)]
pub struct SidxBox {
    pub reference_id: u32,
    pub timing: SidxTiming,
    pub first_offset: u64,
    pub references: Vec<SidxRange>,
}

impl SidxBox {
    /// Locate the first top level `SIDX` box in a segment and read its time
    /// anchor. Returns `None` if the box is absent, truncated or declares a
    /// zero timescale.
    pub fn timing_from_segment(data: &[u8]) -> Option<SidxTiming> {
        let sidx = find_box(data, ByteRange::of(data), &["sidx"]).into_iter().next()?;
        let mut box_ = sidx.full_box(data).ok()?;
        Self::parse_header(&mut box_).ok().map(|(_, timing, _)| timing)
    }

    /// Locate and fully parse the first top level `SIDX` box in a segment.
    pub fn from_segment(data: &[u8]) -> Result<Option<Self>> {
        match find_box(data, ByteRange::of(data), &["sidx"]).first() {
            Some(sidx) => Ok(Some(Self::new(&mut sidx.full_box(data)?)?)),
            None => Ok(None),
        }
    }

    /// Parses a SIDX Box. Reference byte ranges are absolute positions in the
    /// buffer the box was found in.
    pub fn new(box_: &mut ParsedBox) -> Result<Self> {
        let (reference_id, timing, first_offset) = Self::parse_header(box_)?;

        let reader = &mut box_.reader;
        reader.skip(2)?;
        let reference_count = reader.read_u16()?;

        let mut references = Vec::with_capacity(reference_count as usize);
        let Some(mut start_byte) = (box_.start as u64)
            .checked_add(box_.size as u64)
            .and_then(|x| x.checked_add(first_offset))
        else {
            bail!("SIDX box reference range overflows.");
        };

        for _ in 0..reference_count {
            // |chunk| is 1 bit for |referenceType|, and 31 bits for |referenceSize|.
            let chunk = reader.read_u32()?;
            let reference_type = (chunk & 0x80000000) >> 31;
            let reference_size = chunk & 0x7FFFFFFF;

            let subsegment_duration = reader.read_u32()?;

            // Skipping 1 bit for |startsWithSap|, 3 bits for |sapType|, and 28 bits
            // for |sapDelta|.
            reader.skip(4)?;

            if reference_size == 0 {
                bail!("SIDX box has a zero sized reference.");
            }

            let Some(next_start) = start_byte.checked_add(reference_size as u64) else {
                bail!("SIDX box reference range overflows.");
            };

            references.push(SidxRange {
                start: start_byte,
                end: next_start - 1,
                subsegment_duration,
                is_index: reference_type == 1,
            });

            start_byte = next_start;
        }

        Ok(Self {
            reference_id,
            timing,
            first_offset,
            references,
        })
    }

    fn parse_header(box_: &mut ParsedBox) -> Result<(u32, SidxTiming, u64)> {
        let Some(version) = box_.version else {
            bail!("SIDX is a full box and should have a valid version.");
        };

        let reader = &mut box_.reader;
        let reference_id = reader.read_u32()?;
        let timescale = reader.read_u32()?;

        if timescale == 0 {
            bail!("SIDX box has invalid timescale.");
        }

        let (earliest_presentation_time, first_offset) = match version {
            0 => (reader.read_u32()? as u64, reader.read_u32()? as u64),
            1 => (reader.read_u64()?, reader.read_u64()?),
            _ => bail!("SIDX box version can only be 0 or 1 (found {}).", version),
        };

        Ok((
            reference_id,
            SidxTiming {
                earliest_presentation_time,
                timescale,
            },
            first_offset,
        ))
    }
}
