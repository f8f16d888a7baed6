/// Kind of elementary stream a demuxed track stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TrackKind {
    Audio,
    Video,
    Id3,
    Text,
}

/// Track this demuxer never fills. It only exists so that every demuxer
/// returns the same set of tracks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceholderTrack {
    pub kind: TrackKind,
}

impl PlaceholderTrack {
    pub fn new(kind: TrackKind) -> Self {
        Self { kind }
    }

    pub fn len(&self) -> usize {
        0
    }

    pub fn is_empty(&self) -> bool {
        true
    }
}

/// Video track whose samples are the raw container bytes, left for the
/// remuxer to repackage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassthroughVideoTrack {
    pub samples: Vec<u8>,
}

impl PassthroughVideoTrack {
    pub fn kind(&self) -> TrackKind {
        TrackKind::Video
    }
}

/// Timed metadata payload taken out of an `emsg` box.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetadataSample {
    /// Message data, owned so that it outlives the input buffer.
    pub data: Vec<u8>,
    pub len: usize,
    /// Decode timestamp in seconds, always equal to `pts`.
    pub dts: f64,
    /// Presentation timestamp in seconds.
    pub pts: f64,
}

impl MetadataSample {
    pub fn new(data: Vec<u8>, pts: f64) -> Self {
        Self {
            len: data.len(),
            data,
            dts: pts,
            pts,
        }
    }
}

/// Metadata samples in the order their boxes were found.
#[derive(Clone, Debug, PartialEq)]
pub struct MetadataTrack {
    pub kind: TrackKind,
    /// Timestamps are already in seconds.
    pub input_time_scale: u32,
    pub samples: Vec<MetadataSample>,
}

impl Default for MetadataTrack {
    fn default() -> Self {
        Self {
            kind: TrackKind::Id3,
            input_time_scale: 1,
            samples: Vec::new(),
        }
    }
}

/// Output of a single demux or flush call.
#[derive(Clone, Debug, PartialEq)]
pub struct DemuxerResult {
    pub audio_track: PlaceholderTrack,
    pub video_track: PassthroughVideoTrack,
    pub id3_track: MetadataTrack,
    pub text_track: PlaceholderTrack,
}

impl DemuxerResult {
    pub(crate) fn new(video_track: PassthroughVideoTrack, id3_track: MetadataTrack) -> Self {
        Self {
            audio_track: PlaceholderTrack::new(TrackKind::Audio),
            video_track,
            id3_track,
            text_track: PlaceholderTrack::new(TrackKind::Text),
        }
    }
}
