use spades_map::color::{self, INTERIOR_COLOR};
use spades_map::{MapDims, VoxelGrid};
use spades_vxl::{
    VxlError, decode_with_dims, decode_with_progress, encode, encode_with_progress, spawn_decode,
};

fn stored(rgb: u32) -> [u8; 4] {
    color::to_storage(color::from_hex(rgb)).to_le_bytes()
}

fn column_bytes(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

#[test]
fn single_span_column() {
    let dims = MapDims::new(1, 1, 8).unwrap();
    let bytes = column_bytes(&[&[0, 3, 3, 0], &stored(0x112233)]);
    let g = decode_with_dims(&bytes, dims).unwrap();
    assert_eq!(g.solid_column(0, 0), 0b1111_1000);
    assert_eq!(color::to_hex(g.color(0, 0, 3)), 0x112233);
    assert_eq!(color::health(g.color(0, 0, 3)), color::MAX_HEALTH);
    assert_eq!(g.color(0, 0, 5), INTERIOR_COLOR);
}

#[test]
fn air_color_solid_color_solid_color_air() {
    // z: 0-1 air, 2 A, 3 buried, 4 B, 5 buried, 6 C, 7-9 air, 10 D, 11-15 buried
    let dims = MapDims::new(1, 1, 16).unwrap();
    let bytes = column_bytes(&[
        &[3, 2, 2, 0],
        &stored(0xA0A0A0),
        &stored(0xB0B0B0),
        &[2, 5, 4, 5],
        &stored(0xC0C0C0),
        &[0, 10, 10, 7],
        &stored(0xD0D0D0),
    ]);
    let g = decode_with_dims(&bytes, dims).unwrap();
    let expect: u64 = 0b1111_1100_0111_1100;
    assert_eq!(g.solid_column(0, 0), expect);
    assert_eq!(color::to_hex(g.color(0, 0, 2)), 0xA0A0A0);
    assert_eq!(color::to_hex(g.color(0, 0, 4)), 0xB0B0B0);
    assert_eq!(color::to_hex(g.color(0, 0, 6)), 0xC0C0C0);
    assert_eq!(color::to_hex(g.color(0, 0, 10)), 0xD0D0D0);
    assert_eq!(g.color(0, 0, 3), INTERIOR_COLOR);
    assert_eq!(g.color(0, 0, 5), INTERIOR_COLOR);
}

#[test]
fn encodes_bottom_run_reaching_the_floor_as_next_top() {
    let dims = MapDims::new(2, 1, 8).unwrap();
    let mut g = VoxelGrid::empty(dims);
    for z in 2..8 {
        g.set_quiet(0, 0, z, true, color::from_hex(0x101010 * (z as u32)));
    }
    g.set_quiet(1, 0, 4, true, color::from_hex(0x445566));
    g.set_quiet(1, 0, 5, true, color::from_hex(0x556677));

    let bytes = encode(&g);
    let c = |z: u32| stored(0x101010 * z);
    let expect = column_bytes(&[
        // column (0, 0): top 2..=3, buried 4..=5, floor run 6..=7 moves to a second span
        &[3, 2, 3, 0],
        &c(2),
        &c(3),
        &[0, 6, 7, 6],
        &c(6),
        &c(7),
        // column (1, 0)
        &[3, 4, 5, 0],
        &stored(0x445566),
        &stored(0x556677),
        &[0, 8, 7, 6],
    ]);
    assert_eq!(bytes, expect);

    let back = decode_with_dims(&bytes, dims).unwrap();
    assert_eq!(back.solid_column(0, 0), g.solid_column(0, 0));
    assert_eq!(back.solid_column(1, 0), g.solid_column(1, 0));
    assert_eq!(back.color(0, 0, 7), g.color(0, 0, 7));
    assert_eq!(back.color(0, 0, 4), INTERIOR_COLOR);
}

#[test]
fn all_air_column() {
    let dims = MapDims::new(1, 1, 8).unwrap();
    let g = VoxelGrid::empty(dims);
    let bytes = encode(&g);
    assert_eq!(bytes, vec![0, 8, 7, 0]);
    assert_eq!(decode_with_dims(&bytes, dims).unwrap().solid_count(), 0);
}

#[test]
fn truncated_stream_is_rejected() {
    let dims = MapDims::new(1, 1, 8).unwrap();
    let bytes = column_bytes(&[&[0, 3, 3, 0], &stored(0x112233)]);
    let err = decode_with_dims(&bytes[..bytes.len() - 1], dims).unwrap_err();
    assert!(matches!(err, VxlError::Truncated { x: 0, y: 0, .. }));
    assert!(matches!(
        decode_with_dims(&[], dims),
        Err(VxlError::Truncated { offset: 0, .. })
    ));
}

#[test]
fn corrupt_spans_are_rejected() {
    let dims = MapDims::new(1, 1, 8).unwrap();
    // top end before top start
    assert!(matches!(
        decode_with_dims(&[0, 5, 2, 0], dims),
        Err(VxlError::CorruptSpan { .. })
    ));
    // top colors past the floor
    assert!(matches!(
        decode_with_dims(&[0, 3, 9, 0], dims),
        Err(VxlError::CorruptSpan { .. })
    ));
    // chunk count smaller than the top colors it claims
    let bytes = column_bytes(&[&[1, 3, 4, 0], &stored(1), &stored(2)]);
    assert!(matches!(
        decode_with_dims(&bytes, dims),
        Err(VxlError::CorruptSpan { .. })
    ));
}

#[test]
fn trailing_bytes_are_rejected() {
    let dims = MapDims::new(1, 1, 8).unwrap();
    let mut bytes = column_bytes(&[&[0, 3, 3, 0], &stored(0x112233)]);
    bytes.push(0);
    assert!(matches!(
        decode_with_dims(&bytes, dims),
        Err(VxlError::TrailingBytes { extra: 1 })
    ));
}

#[test]
fn progress_reports_every_column() {
    let dims = MapDims::new(4, 2, 8).unwrap();
    let g = VoxelGrid::new(dims);
    let mut enc_calls = 0;
    let bytes = encode_with_progress(&g, |_, total| {
        enc_calls += 1;
        assert_eq!(total, 8);
    });
    assert_eq!(enc_calls, 8);
    assert_eq!(bytes, encode(&g));

    let mut seen = Vec::new();
    decode_with_progress(&bytes, dims, |done, _| seen.push(done)).unwrap();
    assert_eq!(seen, (1..=8).collect::<Vec<_>>());
}

#[test]
fn background_load_matches_foreground() {
    let dims = MapDims::new(8, 4, 16).unwrap();
    let g = VoxelGrid::with_ground(dims, 9);
    let bytes = encode(&g);
    let job = spawn_decode(bytes.clone(), dims);
    let progress: Vec<_> = job.progress().iter().collect();
    let loaded = job.join().unwrap();
    assert_eq!(progress.len(), 4);
    assert_eq!(progress.last().map(|p| p.rows_done), Some(4));
    assert_eq!(encode(&loaded), bytes);
}

#[test]
fn background_load_reports_errors() {
    let dims = MapDims::new(2, 2, 8).unwrap();
    let job = spawn_decode(vec![0, 3, 3], dims);
    assert!(matches!(job.join(), Err(VxlError::Truncated { .. })));
}
