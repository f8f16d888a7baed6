#![allow(dead_code)]

//! Builders for small synthetic fragmented mp4 streams.

pub const ID3_SCHEME: &str = "https://aomedia.org/emsg/ID3";

pub fn make_box(name: &str, payload: &[u8]) -> Vec<u8> {
    let mut data = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
    data.extend_from_slice(name.as_bytes());
    data.extend_from_slice(payload);
    data
}

pub fn make_full_box(name: &str, version: u8, flags: u32, payload: &[u8]) -> Vec<u8> {
    let mut body = ((version as u32) << 24 | flags).to_be_bytes().to_vec();
    body.extend_from_slice(payload);
    make_box(name, &body)
}

pub fn init_segment() -> Vec<u8> {
    let mut data = make_box("ftyp", b"iso6\0\0\0\0iso6cmfc");
    data.extend(make_box("moov", &make_box("mvhd", &[0; 100])));
    data
}

/// A `moof` + `mdat` pair with `mdat_len` bytes of media data.
pub fn fragment(sequence_number: u32, mdat_len: usize) -> Vec<u8> {
    let mfhd = make_full_box("mfhd", 0, 0, &sequence_number.to_be_bytes());
    let traf = make_box("traf", &make_full_box("tfdt", 0, 0, &[0; 4]));
    let mut data = make_box("moof", &[mfhd, traf].concat());
    data.extend(make_box("mdat", &vec![sequence_number as u8; mdat_len]));
    data
}

pub fn emsg_v0(scheme: &str, timescale: u32, delta: u32, message: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(scheme.as_bytes());
    body.push(0);
    body.extend_from_slice(b"1\0");
    body.extend_from_slice(&timescale.to_be_bytes());
    body.extend_from_slice(&delta.to_be_bytes());
    body.extend_from_slice(&0xFFFFFFFF_u32.to_be_bytes());
    body.extend_from_slice(&7_u32.to_be_bytes());
    body.extend_from_slice(message);
    make_full_box("emsg", 0, 0, &body)
}

pub fn emsg_v1(scheme: &str, timescale: u32, presentation_time: u64, message: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&timescale.to_be_bytes());
    body.extend_from_slice(&presentation_time.to_be_bytes());
    body.extend_from_slice(&(timescale * 2).to_be_bytes());
    body.extend_from_slice(&8_u32.to_be_bytes());
    body.extend_from_slice(scheme.as_bytes());
    body.push(0);
    body.extend_from_slice(b"\0");
    body.extend_from_slice(message);
    make_full_box("emsg", 1, 0, &body)
}

pub fn sidx_v0(timescale: u32, earliest_presentation_time: u32, sizes: &[u32]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&1_u32.to_be_bytes());
    body.extend_from_slice(&timescale.to_be_bytes());
    body.extend_from_slice(&earliest_presentation_time.to_be_bytes());
    body.extend_from_slice(&0_u32.to_be_bytes());
    body.extend_from_slice(&0_u16.to_be_bytes());
    body.extend_from_slice(&(sizes.len() as u16).to_be_bytes());

    for size in sizes {
        body.extend_from_slice(&size.to_be_bytes());
        body.extend_from_slice(&timescale.to_be_bytes());
        body.extend_from_slice(&0x90000000_u32.to_be_bytes());
    }

    make_full_box("sidx", 0, 0, &body)
}

pub fn sidx_v1(timescale: u32, earliest_presentation_time: u64) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&1_u32.to_be_bytes());
    body.extend_from_slice(&timescale.to_be_bytes());
    body.extend_from_slice(&earliest_presentation_time.to_be_bytes());
    body.extend_from_slice(&0_u64.to_be_bytes());
    body.extend_from_slice(&0_u16.to_be_bytes());
    body.extend_from_slice(&0_u16.to_be_bytes());
    make_full_box("sidx", 1, 0, &body)
}

/// Init segment followed by `count` fragments, each preceded by an ID3 event.
pub fn stream(count: u32) -> Vec<u8> {
    let mut data = init_segment();

    for i in 1..=count {
        data.extend(emsg_v0(ID3_SCHEME, 1000, i * 500, &[b'I', b'D', b'3', i as u8]));
        data.extend(fragment(i, 64 + i as usize * 13));
    }

    data
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {} but got {}",
        expected,
        actual
    );
}
