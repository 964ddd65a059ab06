//! Voxel color words.
//!
//! In memory a voxel color is `0xHHBBGGRR`: red in the low byte, health
//! (0..=100) in the top byte. Map files and the wire store the little-endian
//! bytes `B, G, R, A`, i.e. `0xAARRGGBB`; converting between the two swaps
//! bytes 0 and 2 and replaces the top byte.

pub const MAX_HEALTH: u8 = 100;

/// Alpha byte written for every color when saving a map.
pub const STORAGE_ALPHA: u8 = 0x7F;

/// Color given to solid voxels that the map format does not store
/// (buried, non-surface voxels).
pub const INTERIOR_COLOR: u32 = from_rgb(0x67, 0x40, 0x28);

/// Default jitter mask used by [`crate::VoxelGrid::color_jit`].
pub const DEFAULT_JIT_MASK: u32 = 0x070707;

#[inline]
pub const fn from_rgb(r: u8, g: u8, b: u8) -> u32 {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((MAX_HEALTH as u32) << 24)
}

/// Builds a full-health color from a conventional `0xRRGGBB` literal.
#[inline]
pub const fn from_hex(rgb: u32) -> u32 {
    from_rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

/// Returns the conventional `0xRRGGBB` form (health dropped).
#[inline]
pub const fn to_hex(color: u32) -> u32 {
    ((red(color) as u32) << 16) | ((green(color) as u32) << 8) | blue(color) as u32
}

#[inline]
pub const fn red(color: u32) -> u8 {
    color as u8
}

#[inline]
pub const fn green(color: u32) -> u8 {
    (color >> 8) as u8
}

#[inline]
pub const fn blue(color: u32) -> u8 {
    (color >> 16) as u8
}

#[inline]
pub const fn health(color: u32) -> u8 {
    (color >> 24) as u8
}

#[inline]
pub const fn with_health(color: u32, health: u8) -> u32 {
    (color & 0x00FF_FFFF) | ((health as u32) << 24)
}

#[inline]
const fn swap_red_blue(word: u32) -> u32 {
    (word & 0xFF00_FF00) | ((word & 0xFF) << 16) | ((word >> 16) & 0xFF)
}

/// Map-file word (`0xAARRGGBB`) to an in-memory color at full health.
#[inline]
pub const fn from_storage(word: u32) -> u32 {
    with_health(swap_red_blue(word), MAX_HEALTH)
}

/// In-memory color to the map-file word, alpha forced to [`STORAGE_ALPHA`].
#[inline]
pub const fn to_storage(color: u32) -> u32 {
    (swap_red_blue(color) & 0x00FF_FFFF) | ((STORAGE_ALPHA as u32) << 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_swap_moves_red_to_low_byte() {
        // bytes on disk: B=0x11 G=0x22 R=0x33 A=0x7F
        let word = u32::from_le_bytes([0x11, 0x22, 0x33, 0x7F]);
        let c = from_storage(word);
        assert_eq!(red(c), 0x33);
        assert_eq!(green(c), 0x22);
        assert_eq!(blue(c), 0x11);
        assert_eq!(health(c), MAX_HEALTH);
        assert_eq!(to_storage(c), word);
    }

    #[test]
    fn hex_helpers_agree() {
        let c = from_hex(0x506050);
        assert_eq!(to_hex(c), 0x506050);
        assert_eq!(health(with_health(c, 45)), 45);
        assert_eq!(to_hex(with_health(c, 45)), 0x506050);
    }
}
