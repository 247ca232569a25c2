//! PBR material derivation and deduplication

use crate::gltf::{AlphaMode, Material, PbrMetallicRoughness, TextureInfo};

/// Specular-power convention ceiling; maps to roughness 0
const MAX_SPECULAR_POWER: f32 = 128.0;

/// Derive a glTF PBR material from a classic shading material
///
/// Shininess inverts into roughness, metallic stays 0, and any
/// translucency switches the material to alpha blending.
pub fn derive_pbr(
    source: &meshport_core::Material,
    base_color_texture: Option<usize>,
) -> Material {
    let [r, g, b] = source.diffuse;
    let alpha_mode = if source.opacity < 1.0 {
        Some(AlphaMode::Blend)
    } else {
        None
    };

    Material {
        name: None,
        pbr_metallic_roughness: Some(PbrMetallicRoughness {
            base_color_factor: Some([r, g, b, source.opacity]),
            base_color_texture: base_color_texture.map(|index| TextureInfo { index }),
            metallic_factor: Some(0.0),
            roughness_factor: Some(1.0 - source.specular_power / MAX_SPECULAR_POWER),
        }),
        double_sided: true,
        alpha_mode,
    }
}

/// Find or append `material` in the output list, returning its index
///
/// Equality is exact (no epsilon) on base-color factor, metallic factor,
/// and roughness factor only; double-sidedness and alpha mode do not
/// split otherwise identical materials. First seen, first indexed.
pub fn dedup(materials: &mut Vec<Material>, material: Material) -> usize {
    let position = materials
        .iter()
        .position(|existing| pbr_factors_equal(existing, &material));
    match position {
        Some(index) => index,
        None => {
            materials.push(material);
            materials.len() - 1
        }
    }
}

fn pbr_factors_equal(a: &Material, b: &Material) -> bool {
    match (&a.pbr_metallic_roughness, &b.pbr_metallic_roughness) {
        (Some(a), Some(b)) => {
            a.base_color_factor == b.base_color_factor
                && a.metallic_factor == b.metallic_factor
                && a.roughness_factor == b.roughness_factor
        }
        (None, None) => true,
        _ => false,
    }
}
