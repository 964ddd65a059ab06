//! Noise terrain for `spades gen`.

use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};
use spades_map::color;
use spades_map::{MapDims, VoxelGrid};

#[derive(Clone, Debug)]
pub struct TerrainParams {
    pub seed: i32,
    pub dims: MapDims,
    pub height_frequency: f32,
    /// Lowest and highest surface, as fractions of the map depth.
    pub min_height_ratio: f32,
    pub max_height_ratio: f32,
    /// Surface heights at or below this are flooded.
    pub water_level: i32,
}

impl TerrainParams {
    pub fn new(seed: i32, dims: MapDims) -> Self {
        Self {
            seed,
            dims,
            height_frequency: 0.006,
            min_height_ratio: 0.05,
            max_height_ratio: 0.6,
            water_level: 2,
        }
    }
}

const GRASS: u32 = color::from_rgb(0x48, 0x8a, 0x2c);
const SAND: u32 = color::from_rgb(0xc8, 0xb4, 0x78);
const WATER: u32 = color::from_rgb(0x20, 0x50, 0x90);

/// Builds a height-field map. Heights count up from the bottom layer; the
/// two bottom layers are always solid.
pub fn generate(params: &TerrainParams) -> VoxelGrid {
    let dims = params.dims;
    let mut heights = FastNoiseLite::with_seed(params.seed);
    heights.set_noise_type(Some(NoiseType::OpenSimplex2));
    heights.set_fractal_type(Some(FractalType::FBm));
    heights.set_fractal_octaves(Some(4));
    heights.set_frequency(Some(params.height_frequency));

    let depth = dims.depth;
    let min_h = (depth as f32 * params.min_height_ratio) as i32;
    let max_h = (depth as f32 * params.max_height_ratio) as i32;

    let mut grid = VoxelGrid::empty(dims);
    for y in 0..dims.height {
        for x in 0..dims.width {
            let n = heights.get_noise_2d(x as f32, y as f32);
            let h = (((n + 1.0) * 0.5 * (max_h - min_h) as f32) as i32 + min_h).clamp(2, depth - 1);
            let top = depth - h;
            for z in top..depth {
                let c = if z == top {
                    let base = if h <= params.water_level + 1 { SAND } else { GRASS };
                    grid.color_jit(base, color::DEFAULT_JIT_MASK)
                } else if z >= depth - 2 && h <= params.water_level {
                    WATER
                } else {
                    grid.dirt_color(x, y, z)
                };
                grid.set_quiet(x, y, z, true, c);
            }
        }
    }
    log::info!(
        target: "events",
        "terrain seed={} dims={} solid={}",
        params.seed,
        dims,
        grid.solid_count()
    );
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(seed: i32) -> TerrainParams {
        TerrainParams::new(seed, MapDims::new(32, 32, 64).unwrap())
    }

    #[test]
    fn same_seed_same_map() {
        let a = generate(&small(7));
        let b = generate(&small(7));
        for y in 0..32 {
            for x in 0..32 {
                assert_eq!(a.solid_column(x, y), b.solid_column(x, y));
            }
        }
    }

    #[test]
    fn bottom_layers_are_solid_and_columns_are_contiguous() {
        let g = generate(&small(99));
        for y in 0..32 {
            for x in 0..32 {
                assert!(g.is_solid(x, y, 63) && g.is_solid(x, y, 62));
                let col = g.solid_column(x, y);
                let top = col.trailing_zeros();
                // everything from the surface down is filled
                assert_eq!(col >> top, (1u64 << (64 - top)) - 1);
            }
        }
    }
}
