mod support;

use fdmx_mp4::{ByteRange, segment_valid_range};
use support::*;

#[test]
fn test_no_moof_is_withheld() {
    let data = init_segment();
    let segmented = segment_valid_range(&data);

    assert!(segmented.valid.is_empty());
    assert_eq!(segmented.remainder, Some(ByteRange::of(&data)));
}

#[test]
fn test_empty_buffer() {
    let segmented = segment_valid_range(&[]);

    assert!(segmented.valid.is_empty());
    assert_eq!(segmented.remainder, None);
}

#[test]
fn test_complete_fragments_are_valid() {
    let mut data = init_segment();
    data.extend(fragment(1, 100));
    data.extend(fragment(2, 100));

    let segmented = segment_valid_range(&data);
    assert_eq!(segmented.valid, ByteRange::of(&data));
    assert_eq!(segmented.remainder, None);
}

#[test]
fn test_truncated_trailing_fragment() {
    let mut data = init_segment();
    data.extend(fragment(1, 100));
    data.extend(fragment(2, 100));
    let split = data.len();
    let trailing = fragment(3, 100);
    data.extend_from_slice(&trailing[..trailing.len() - 10]);

    let segmented = segment_valid_range(&data);
    assert_eq!(segmented.valid, ByteRange::new(0, split));
    assert_eq!(segmented.remainder, Some(ByteRange::new(split, data.len())));
}

#[test]
fn test_moof_without_mdat() {
    let mut data = fragment(1, 10);
    let split = data.len();
    let trailing = fragment(2, 10);
    let moof_len = trailing.len() - 18;
    data.extend_from_slice(&trailing[..moof_len]);

    let segmented = segment_valid_range(&data);
    assert_eq!(segmented.valid, ByteRange::new(0, split));
    assert_eq!(segmented.remainder, Some(ByteRange::new(split, data.len())));
}

#[test]
fn test_cut_short_header_after_fragment() {
    let mut data = fragment(1, 10);
    let split = data.len();
    data.extend_from_slice(&fragment(2, 10)[..5]);

    let segmented = segment_valid_range(&data);
    assert_eq!(segmented.valid, ByteRange::new(0, split));
    assert_eq!(segmented.remainder, Some(ByteRange::new(split, data.len())));
}

#[test]
fn test_partial_box_after_fragment() {
    let mut data = fragment(1, 10);
    let split = data.len();
    let emsg = emsg_v0(ID3_SCHEME, 1, 0, b"payload");
    data.extend_from_slice(&emsg[..emsg.len() - 3]);

    let segmented = segment_valid_range(&data);
    assert_eq!(segmented.valid, ByteRange::new(0, split));
    assert_eq!(segmented.remainder, Some(ByteRange::new(split, data.len())));
}

#[test]
fn test_complete_boxes_after_fragment_stay_valid() {
    let mut data = fragment(1, 10);
    data.extend(emsg_v0(ID3_SCHEME, 1, 0, b"payload"));

    let segmented = segment_valid_range(&data);
    assert_eq!(segmented.valid, ByteRange::of(&data));
    assert_eq!(segmented.remainder, None);
}

#[test]
fn test_segments_cover_the_whole_buffer() {
    let data = stream(3);

    for end in 0..=data.len() {
        let chunk = &data[..end];
        let segmented = segment_valid_range(chunk);
        let remainder = segmented.remainder.unwrap_or(ByteRange::new(end, end));

        assert_eq!(segmented.valid.start, 0);
        assert_eq!(segmented.valid.end, remainder.start, "split mismatch at {}", end);
        assert_eq!(remainder.end, end);
    }
}
