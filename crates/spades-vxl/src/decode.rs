use std::path::Path;
use std::time::Instant;

use spades_map::color::{self, INTERIOR_COLOR};
use spades_map::{MapDims, VoxelGrid};

use crate::error::VxlError;

/// Decodes a standard 512x512x64 map.
pub fn decode(bytes: &[u8]) -> Result<VoxelGrid, VxlError> {
    decode_with_dims(bytes, MapDims::STANDARD)
}

pub fn decode_with_dims(bytes: &[u8], dims: MapDims) -> Result<VoxelGrid, VxlError> {
    decode_with_progress(bytes, dims, |_, _| {})
}

/// Reads and decodes a standard map file.
pub fn read_file(path: impl AsRef<Path>) -> Result<VoxelGrid, VxlError> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Decodes `bytes` into a fresh grid, calling `progress(done, total)` after
/// every column. Columns are stored y-major, x-minor.
///
/// Nothing is returned unless the whole stream is valid.
pub fn decode_with_progress<F>(
    bytes: &[u8],
    dims: MapDims,
    mut progress: F,
) -> Result<VoxelGrid, VxlError>
where
    F: FnMut(usize, usize),
{
    let start = Instant::now();
    let mut grid = VoxelGrid::empty(dims);
    let total = dims.columns();
    let mut reader = SpanReader { bytes, pos: 0 };
    let mut colors = vec![INTERIOR_COLOR; dims.depth as usize];
    let mut done = 0usize;
    for y in 0..dims.height {
        for x in 0..dims.width {
            let bits = reader.column(x, y, dims.depth, &mut colors)?;
            grid.set_solid_column_quiet(x, y, bits);
            for z in 0..dims.depth {
                if (bits >> z) & 1 != 0 {
                    grid.set_quiet(x, y, z, true, colors[z as usize]);
                }
            }
            done += 1;
            progress(done, total);
        }
    }
    if reader.pos != bytes.len() {
        return Err(VxlError::TrailingBytes {
            extra: bytes.len() - reader.pos,
        });
    }
    log::info!(
        target: "perf",
        "ms={} vxl_decode dims={} bytes={}",
        start.elapsed().as_millis(),
        dims,
        bytes.len()
    );
    Ok(grid)
}

struct SpanReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl SpanReader<'_> {
    fn header(&self, at: usize, x: i32, y: i32) -> Result<[u8; 4], VxlError> {
        self.bytes
            .get(at..at + 4)
            .and_then(|s| <[u8; 4]>::try_from(s).ok())
            .ok_or(VxlError::Truncated { x, y, offset: at })
    }

    fn color(&self, at: usize, x: i32, y: i32) -> Result<u32, VxlError> {
        self.header(at, x, y).map(|b| color::from_storage(u32::from_le_bytes(b)))
    }

    /// Decodes one column starting at `self.pos`. Returns the solidity bits
    /// and fills `colors` for every solid z (interior voxels get the
    /// default interior color).
    fn column(&mut self, x: i32, y: i32, depth: i32, colors: &mut [u32]) -> Result<u64, VxlError> {
        let corrupt = |offset, reason| VxlError::CorruptSpan {
            x,
            y,
            offset,
            reason,
        };
        colors.fill(INTERIOR_COLOR);
        let mut bits: u64 = if depth >= 64 {
            u64::MAX
        } else {
            (1u64 << depth) - 1
        };
        let mut z: i32 = 0;
        loop {
            let span = self.pos;
            let [chunks, top_start, top_end, _air_start] = self.header(span, x, y)?;
            let chunks = i32::from(chunks);
            let top_start = i32::from(top_start);
            let top_end = i32::from(top_end);
            if top_start < z || top_start > depth {
                return Err(corrupt(span, "top color start out of order"));
            }
            if top_end >= depth || top_end + 1 < top_start {
                return Err(corrupt(span, "top color end out of range"));
            }
            for az in z..top_start {
                bits &= !(1u64 << az);
            }
            let len_top = top_end - top_start + 1;
            let mut at = span + 4;
            for tz in top_start..=top_end {
                colors[tz as usize] = self.color(at, x, y)?;
                at += 4;
            }
            z = top_end + 1;

            if chunks == 0 {
                self.pos = span + 4 * (len_top as usize + 1);
                return Ok(bits);
            }

            let len_bottom = chunks - 1 - len_top;
            if len_bottom < 0 {
                return Err(corrupt(span, "span shorter than its top colors"));
            }
            let next = span + chunks as usize * 4;
            let [_, _, _, bottom_end] = self.header(next, x, y)?;
            let bottom_end = i32::from(bottom_end);
            let bottom_start = bottom_end - len_bottom;
            if bottom_end > depth || bottom_start < z {
                return Err(corrupt(next, "bottom colors overlap or leave the column"));
            }
            for bz in bottom_start..bottom_end {
                colors[bz as usize] = self.color(at, x, y)?;
                at += 4;
            }
            z = bottom_end;
            self.pos = next;
        }
    }
}
