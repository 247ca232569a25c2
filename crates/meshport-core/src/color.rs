//! Color-range remapping
//!
//! PBR renderers expect albedo inside a perceptual band: pure 0.0 crushes
//! shadows and pure 1.0 clips highlights. Linear source colors are
//! compressed into `PBR_DARKEST..PBR_BRIGHTEST` before export.

/// Darkest albedo value a PBR renderer displays without crushing
pub const PBR_DARKEST: f32 = 0.04;

/// Brightest albedo value a PBR renderer displays without clipping
pub const PBR_BRIGHTEST: f32 = 0.85;

/// Affine remap of `x` from `src_low..src_high` into `dst_low..dst_high`
///
/// No clamping: inputs outside the source range map outside the
/// destination range.
pub fn remap(x: f32, src_low: f32, src_high: f32, dst_low: f32, dst_high: f32) -> f32 {
    (x - src_low) * (dst_high - dst_low) / (src_high - src_low) + dst_low
}

/// Remap a linear 0..1 color channel into the PBR albedo band
pub fn remap_pbr(channel: f32) -> f32 {
    remap(channel, 0.0, 1.0, PBR_DARKEST, PBR_BRIGHTEST)
}
