/*
    REFERENCES
    ----------

    1. ISO/IEC 23009-1 section 5.10.3.3 (event message box)
    2. https://aomediacodec.github.io/id3-emsg/

*/

use crate::{BoxDescriptor, ByteRange, ParsedBox, Result, bail, find_box};

/// Presentation time of an event, either relative to the segment or absolute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmsgTime {
    /// Version 0, offset from the earliest presentation time of the segment.
    Delta(u32),
    /// Version 1, absolute time on the media timeline.
    Absolute(u64),
}

/// Mp4 `EMSG` box.
#[derive(Clone, Debug)]
pub struct EmsgBox {
    pub scheme_id_uri: String,
    pub value: String,
    pub timescale: u32,
    pub presentation_time: EmsgTime,
    pub event_duration: u32,
    pub id: u32,
    pub message_data: Vec<u8>,
}

impl EmsgBox {
    /// Locate all top level `EMSG` boxes in `range`.
    pub fn find_all(data: &[u8], range: ByteRange) -> Vec<BoxDescriptor> {
        find_box(data, range, &["emsg"])
    }

    /// Parses an EMSG Box. The message data is copied out of the buffer.
    pub fn new(box_: &mut ParsedBox) -> Result<Self> {
        let Some(version) = box_.version else {
            bail!("EMSG is a full box and should have a valid version.");
        };

        let reader = &mut box_.reader;

        let emsg = match version {
            0 => {
                let scheme_id_uri = reader.read_terminated_string("EMSG box scheme id uri")?;
                let value = reader.read_terminated_string("EMSG box value")?;
                let timescale = reader.read_u32()?;
                let presentation_time_delta = reader.read_u32()?;
                let event_duration = reader.read_u32()?;
                let id = reader.read_u32()?;

                Self {
                    scheme_id_uri: scheme_id_uri.to_owned(),
                    value: value.to_owned(),
                    timescale,
                    presentation_time: EmsgTime::Delta(presentation_time_delta),
                    event_duration,
                    id,
                    message_data: reader.read_to_end().to_vec(),
                }
            }
            1 => {
                let timescale = reader.read_u32()?;
                let presentation_time = reader.read_u64()?;
                let event_duration = reader.read_u32()?;
                let id = reader.read_u32()?;
                let scheme_id_uri = reader.read_terminated_string("EMSG box scheme id uri")?;
                let value = reader.read_terminated_string("EMSG box value")?;

                Self {
                    scheme_id_uri: scheme_id_uri.to_owned(),
                    value: value.to_owned(),
                    timescale,
                    presentation_time: EmsgTime::Absolute(presentation_time),
                    event_duration,
                    id,
                    message_data: reader.read_to_end().to_vec(),
                }
            }
            _ => bail!("EMSG box version can only be 0 or 1 (found {}).", version),
        };

        if emsg.timescale == 0 {
            bail!("EMSG box has invalid timescale.");
        }

        Ok(emsg)
    }

    /// Event duration in seconds, `None` when the duration is unknown
    /// (`0xFFFFFFFF`).
    pub fn duration_secs(&self) -> Option<f64> {
        (self.event_duration != u32::MAX)
            .then(|| self.event_duration as f64 / self.timescale as f64)
    }
}
