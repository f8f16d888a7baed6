#![cfg_attr(docsrs, feature(doc_cfg))]

//! This crate contains a demuxer for fragmented mp4 (fMP4) segments which are
//! delivered progressively, chunk by chunk, over the network.
//!
//! Media bytes are forwarded untouched as a passthrough video track, split at
//! fragment boundaries when chunks are not aligned to them. Timed metadata
//! carried in `emsg` boxes (ID3 and SCTE-35 schemes) is extracted into a
//! metadata track with timestamps in seconds.
//!
//! # Example
//!
//! ```no_run
//! use fdmx_mp4::{Demuxer, DemuxerConfig, Mp4Demuxer};
//!
//! let mut demuxer = Mp4Demuxer::new(DemuxerConfig { progressive: true });
//! let mut video = Vec::new();
//!
//! for chunk in std::fs::read("segment.m4s")?.chunks(4096) {
//!     let result = demuxer.demux(chunk, 10.0);
//!     video.extend(result.video_track.samples);
//!
//!     for sample in result.id3_track.samples {
//!         println!("{:.3}s {} bytes", sample.pts, sample.len);
//!     }
//! }
//!
//! video.extend(demuxer.flush().video_track.samples);
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! # Optional Features
//!
//! - **serde**: Derives `Serialize` and `Deserialize` for configuration and
//!   metadata samples.

pub mod boxes;
pub mod metadata;

mod demuxer;
mod error;
mod finder;
mod reader;
mod segment;
mod track;

pub use demuxer::{Demuxer, DemuxerConfig, DemuxerState, KeyData, Mp4Demuxer};
pub use error::{Error, Result};
pub use finder::{
    BoxDescriptor, BoxIter, ByteRange, ParsedBox, find_box, type_from_string, type_to_string,
};
pub use reader::Reader;
pub use segment::{SegmentedRange, segment_valid_range};
pub use track::{
    DemuxerResult, MetadataSample, MetadataTrack, PassthroughVideoTrack, PlaceholderTrack,
    TrackKind,
};
