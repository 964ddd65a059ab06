use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use spades_map::{VoxelGrid, color};

use crate::error::VxlError;

/// Encodes the grid, one row of columns per rayon task.
pub fn encode(grid: &VoxelGrid) -> Vec<u8> {
    let start = Instant::now();
    let rows: Vec<Vec<u8>> = (0..grid.height())
        .into_par_iter()
        .map(|y| {
            let mut row = Vec::new();
            for x in 0..grid.width() {
                write_column(grid, x, y, &mut row);
            }
            row
        })
        .collect();
    let out = rows.concat();
    log::info!(
        target: "perf",
        "ms={} vxl_encode dims={} bytes={}",
        start.elapsed().as_millis(),
        grid.dims(),
        out.len()
    );
    out
}

/// Sequential encode that reports `progress(done, total)` after each column.
pub fn encode_with_progress<F>(grid: &VoxelGrid, mut progress: F) -> Vec<u8>
where
    F: FnMut(usize, usize),
{
    let total = grid.dims().columns();
    let mut out = Vec::new();
    let mut done = 0;
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            write_column(grid, x, y, &mut out);
            done += 1;
            progress(done, total);
        }
    }
    out
}

pub fn write_file(grid: &VoxelGrid, path: impl AsRef<Path>) -> Result<(), VxlError> {
    std::fs::write(path, encode(grid))?;
    Ok(())
}

/// Appends the spans of one column.
///
/// A span is: air run, surface colors on top, buried solids, then surface
/// colors at the bottom of the solid run. When that bottom run reaches the
/// floor it is written as the next span's top run instead, which is how a
/// column like air-color-solid-color-solid-color-air is expressed.
fn write_column(grid: &VoxelGrid, x: i32, y: i32, out: &mut Vec<u8>) {
    let depth = grid.depth();
    let surface = |z: i32| z < depth && grid.is_surface(x, y, z);
    let mut k = 0;
    while k < depth {
        let air_start = k;
        while k < depth && !grid.is_solid(x, y, k) {
            k += 1;
        }

        let top_start = k;
        while surface(k) {
            k += 1;
        }
        let top_end = k;

        while k < depth && grid.is_solid(x, y, k) && !grid.is_surface(x, y, k) {
            k += 1;
        }

        let bottom_start = k;
        let mut end = k;
        while surface(end) {
            end += 1;
        }
        if end != depth {
            k = end;
        }
        let bottom_end = k;

        let colors = (top_end - top_start) + (bottom_end - bottom_start);
        let chunks = if k == depth { 0 } else { colors + 1 };
        out.push(chunks as u8);
        out.push(top_start as u8);
        out.push((top_end - 1) as u8);
        out.push(air_start as u8);
        for z in (top_start..top_end).chain(bottom_start..bottom_end) {
            let word = color::to_storage(grid.color(x, y, z));
            out.extend_from_slice(&word.to_le_bytes());
        }
    }
}
