use crate::{
    BoxIter, ByteRange, DemuxerResult, Error, PassthroughVideoTrack, Result, type_from_string,
    metadata::extract_id3_track, segment::segment_valid_range,
};
use log::debug;
use std::future::{Ready, ready};

/// Options fixed when a demuxer is created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DemuxerConfig {
    /// Data arrives in chunks which are not aligned to fragment boundaries.
    pub progressive: bool,
}

/// Key material for sample level decryption.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyData {
    pub method: String,
    pub key: Vec<u8>,
    pub iv: Vec<u8>,
}

/// Whether a demuxer is holding back bytes from an earlier call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DemuxerState {
    Idle,
    Buffering,
}

/// Common interface of the demuxers a transmuxing pipeline can drive.
pub trait Demuxer {
    /// Demux the next chunk of a stream. `time_offset` is the start time, in
    /// seconds, of the segment the chunk belongs to.
    fn demux(&mut self, data: &[u8], time_offset: f64) -> DemuxerResult;

    /// Demux a chunk whose samples are encrypted with SAMPLE-AES.
    fn demux_sample_aes(
        &mut self,
        data: &[u8],
        key_data: &KeyData,
        time_offset: f64,
    ) -> Ready<Result<DemuxerResult>>;

    /// Emit everything still held back, no more data will follow.
    fn flush(&mut self) -> DemuxerResult;

    /// Called when a new initialization segment is about to be used.
    fn reset_init_segment(&mut self);

    /// Called after a discontinuity in timestamps.
    fn reset_time_stamp(&mut self);

    /// Called when the next chunk is not contiguous with the previous one.
    fn reset_contiguity(&mut self);
}

/// Demuxer for fragmented mp4 segments.
///
/// Media bytes are not demuxed at all, they are handed over as a single
/// passthrough video sample. Only `emsg` boxes are parsed, to expose ID3 and
/// SCTE-35 events as timed metadata.
#[derive(Debug, Default)]
pub struct Mp4Demuxer {
    config: DemuxerConfig,
    remainder: Option<Vec<u8>>,
    time_offset: f64,
}

impl Mp4Demuxer {
    /// Amount of data a pipeline should gather before calling [`Mp4Demuxer::probe`].
    pub const MIN_PROBE_BYTE_LENGTH: usize = 1024;

    /// Only the first 16 KiB of a segment are searched by [`Mp4Demuxer::probe`].
    pub const PROBE_WINDOW: usize = 16384;

    pub fn new(config: DemuxerConfig) -> Self {
        Self {
            config,
            remainder: None,
            time_offset: 0.0,
        }
    }

    /// Returns true if a top level `moof` box is found within the first 16 KiB
    /// of `data`. A box counts when its size field lies inside that window.
    pub fn probe(data: &[u8]) -> bool {
        let window = data.len().min(Self::PROBE_WINDOW);
        let moof = type_from_string("moof");

        BoxIter::new(data, ByteRange::of(data))
            .take_while(|x| x.start + 4 <= window)
            .any(|x| x.box_type == moof)
    }

    pub fn config(&self) -> &DemuxerConfig {
        &self.config
    }

    pub fn state(&self) -> DemuxerState {
        if self.remainder.is_some() {
            DemuxerState::Buffering
        } else {
            DemuxerState::Idle
        }
    }

    pub fn time_offset(&self) -> f64 {
        self.time_offset
    }

    /// Bytes held back until the fragment they start is complete.
    pub fn remainder(&self) -> Option<&[u8]> {
        self.remainder.as_deref()
    }

    fn segment(&mut self, data: &[u8]) -> Vec<u8> {
        let joined;
        let data = match self.remainder.take() {
            Some(mut remainder) => {
                remainder.extend_from_slice(data);
                joined = remainder;
                &joined[..]
            }
            None => data,
        };

        let segmented = segment_valid_range(data);
        self.remainder = segmented
            .remainder
            .map(|remainder| remainder.slice(data).to_vec());

        debug!(
            "Segmented {} bytes into {} valid and {} remainder",
            data.len(),
            segmented.valid.len(),
            self.remainder.as_ref().map(|x| x.len()).unwrap_or(0)
        );

        segmented.valid.slice(data).to_vec()
    }
}

impl Demuxer for Mp4Demuxer {
    fn demux(&mut self, data: &[u8], time_offset: f64) -> DemuxerResult {
        self.time_offset = time_offset;

        let samples = if self.config.progressive {
            self.segment(data)
        } else {
            data.to_vec()
        };

        let id3_track = extract_id3_track(&samples, time_offset);
        DemuxerResult::new(PassthroughVideoTrack { samples }, id3_track)
    }

    fn demux_sample_aes(
        &mut self,
        _data: &[u8],
        _key_data: &KeyData,
        _time_offset: f64,
    ) -> Ready<Result<DemuxerResult>> {
        ready(Err(Error::Unsupported(
            "The MP4 demuxer does not support SAMPLE-AES decryption".to_owned(),
        )))
    }

    fn flush(&mut self) -> DemuxerResult {
        let samples = self.remainder.take().unwrap_or_default();

        if !samples.is_empty() {
            debug!("Flushing {} remainder bytes", samples.len());
        }

        let id3_track = extract_id3_track(&samples, self.time_offset);
        DemuxerResult::new(PassthroughVideoTrack { samples }, id3_track)
    }

    fn reset_init_segment(&mut self) {
        self.time_offset = 0.0;
    }

    fn reset_time_stamp(&mut self) {}

    fn reset_contiguity(&mut self) {}
}
