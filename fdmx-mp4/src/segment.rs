use crate::{BoxIter, ByteRange, type_from_string};
use log::trace;

/// Split of a buffer into bytes that are safe to hand over and bytes that
/// must wait for more data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SegmentedRange {
    /// Whole fragments, starting at the beginning of the buffer.
    pub valid: ByteRange,
    /// Incomplete trailing fragment, always running to the end of the buffer.
    pub remainder: Option<ByteRange>,
}

impl SegmentedRange {
    fn split_at(len: usize, at: usize) -> Self {
        Self {
            valid: ByteRange::new(0, at),
            remainder: (at < len).then(|| ByteRange::new(at, len)),
        }
    }
}

/// Split `data` at the last fragment boundary.
///
/// A fragment is a `moof` box together with the `mdat` box following it.
/// When the `mdat` paired with the last `moof` is complete, the whole buffer
/// is valid. Otherwise everything starting at the last `moof` becomes the
/// remainder. A buffer without any `moof` box is withheld entirely.
///
/// Top level boxes trailing a complete fragment are kept in the valid range
/// unless one of them is itself cut short, in which case the split happens at
/// the start of that box.
pub fn segment_valid_range(data: &[u8]) -> SegmentedRange {
    let len = data.len();
    let moof = type_from_string("moof");
    let mdat = type_from_string("mdat");

    let boxes = BoxIter::new(data, ByteRange::of(data)).collect::<Vec<_>>();

    let Some(last_moof) = boxes.iter().rposition(|x| x.box_type == moof) else {
        trace!("no moof box in {} bytes, withholding", len);
        return SegmentedRange::split_at(len, 0);
    };

    let split = boxes[last_moof].start;
    let trailing = &boxes[last_moof + 1..];

    let Some(paired_mdat) = trailing.iter().position(|x| x.box_type == mdat) else {
        trace!("moof at {} has no mdat yet, splitting", split);
        return SegmentedRange::split_at(len, split);
    };

    let fragment_complete = boxes[last_moof].is_complete_within(len)
        && trailing[paired_mdat].is_complete_within(len);

    if !fragment_complete {
        trace!("fragment at {} is incomplete, splitting", split);
        return SegmentedRange::split_at(len, split);
    }

    let scanned_end = boxes.last().map(|x| x.end).unwrap_or(0);

    match trailing[paired_mdat + 1..]
        .iter()
        .find(|x| !x.is_complete_within(len))
    {
        Some(partial) => SegmentedRange::split_at(len, partial.start),
        None if is_cut_short_header(data, scanned_end) => {
            SegmentedRange::split_at(len, scanned_end)
        }
        None => SegmentedRange::split_at(len, len),
    }
}

/// Returns true if the bytes from `at` to the end of `data` are the beginning
/// of a box header rather than a corrupt one.
fn is_cut_short_header(data: &[u8], at: usize) -> bool {
    let rest = &data[at.min(data.len())..];
    !rest.is_empty() && (rest.len() < 8 || (rest.len() < 16 && rest[..4] == [0, 0, 0, 1]))
}
