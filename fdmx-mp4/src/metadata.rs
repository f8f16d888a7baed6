//! Timed metadata extraction from `emsg` boxes.

use crate::{
    ByteRange, MetadataSample, MetadataTrack,
    boxes::{EmsgBox, EmsgTime, SidxBox},
};
use log::{debug, warn};
use regex::Regex;
use std::sync::LazyLock;

// Supported schemes
//   https://aomedia.org/emsg/ID3
//   https://developer.apple.com/streaming/emsg-id3
//   urn:scte:scte35:2013:xml
static EMSG_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/emsg[-/]ID3|urn:scte:scte35:2013:xml").unwrap());

/// Returns true if events of this scheme are dispatched as timed metadata.
pub fn is_supported_scheme(scheme_id_uri: &str) -> bool {
    EMSG_SCHEME.is_match(scheme_id_uri)
}

/// Seconds to add to relative event times, taken from the segment index.
/// Zero when the segment has no usable `sidx` box.
pub fn earliest_presentation_time(data: &[u8]) -> f64 {
    match SidxBox::timing_from_segment(data) {
        Some(timing) => timing.as_secs(),
        None => 0.0,
    }
}

/// Presentation time of an event in seconds.
pub fn presentation_time(emsg: &EmsgBox, time_offset: f64, earliest_presentation_time: f64) -> f64 {
    let timescale = emsg.timescale as f64;

    match emsg.presentation_time {
        EmsgTime::Absolute(time) => time as f64 / timescale,
        EmsgTime::Delta(delta) => {
            time_offset + earliest_presentation_time + delta as f64 / timescale
        }
    }
}

/// Build the metadata track for a chunk of fragmented mp4 data.
///
/// Event messages with an unknown scheme are skipped, as are boxes that
/// cannot be parsed or run past the end of `data`.
pub fn extract_id3_track(data: &[u8], time_offset: f64) -> MetadataTrack {
    let mut track = MetadataTrack::default();

    if data.is_empty() {
        return track;
    }

    let earliest_presentation_time = earliest_presentation_time(data);

    for descriptor in EmsgBox::find_all(data, ByteRange::of(data)) {
        if !descriptor.is_complete_within(data.len()) {
            debug!("Skipping truncated emsg box at {}", descriptor.start);
            continue;
        }

        let emsg = match descriptor
            .full_box(data)
            .and_then(|mut box_| EmsgBox::new(&mut box_))
        {
            Ok(emsg) => emsg,
            Err(e) => {
                warn!("Skipping emsg box at {}: {}", descriptor.start, e);
                continue;
            }
        };

        if !is_supported_scheme(&emsg.scheme_id_uri) {
            debug!("Ignoring emsg box with scheme {:?}", emsg.scheme_id_uri);
            continue;
        }

        let pts = presentation_time(&emsg, time_offset, earliest_presentation_time);
        track.samples.push(MetadataSample::new(emsg.message_data, pts));
    }

    track
}
