//! CPU mirror of the water fragment shader.
//!
//! Each function matches one step of `water.wgsl` formula for formula, so the
//! shading contract can be exercised in tests. Keep the two in sync.

use glam::{Vec2, Vec3};
use waterscape_common::WaterParams;

/// Reflectance at normal incidence used by the Schlick blend.
pub const BASE_REFLECTANCE: f32 = 0.02;

/// Per-layer uv scale and scroll sign, in sampling order.
/// Layers 0 and 2 read normal map 1, layers 1 and 3 read normal map 2.
const LAYERS: [(Vec2, f32); 4] = [
    (Vec2::new(1.0, 1.0), 1.0),
    (Vec2::new(6.0, 4.0), -1.0),
    (Vec2::new(1.0, 1.0), 1.0),
    (Vec2::new(3.0, 3.0), -1.0),
];

/// A 2D texture read: returns rgb in [0, 1].
pub trait NormalSampler {
    fn sample(&self, uv: Vec2) -> Vec3;
}

impl<F: Fn(Vec2) -> Vec3> NormalSampler for F {
    fn sample(&self, uv: Vec2) -> Vec3 {
        self(uv)
    }
}

/// A cubemap read along a (not necessarily normalized) direction.
pub trait EnvironmentSampler {
    fn sample(&self, dir: Vec3) -> Vec3;
}

impl<F: Fn(Vec3) -> Vec3> EnvironmentSampler for F {
    fn sample(&self, dir: Vec3) -> Vec3 {
        self(dir)
    }
}

/// Inputs for one water fragment.
#[derive(Debug, Clone, Copy)]
pub struct WaterFragment {
    pub uv: Vec2,
    pub world_pos: Vec3,
    pub eye: Vec3,
    pub time: f32,
}

/// The two animated uv offsets: primary, and secondary at a fraction of its
/// speed.
pub fn scroll_offsets(time: f32, params: &WaterParams) -> (Vec2, Vec2) {
    let primary = Vec2::splat(time * params.scroll_speed);
    let secondary = Vec2::splat(time * params.scroll_speed * params.secondary_scroll_factor);
    (primary, secondary)
}

/// The four normal-map coordinates for a fragment.
pub fn normal_map_coords(uv: Vec2, time: f32, params: &WaterParams) -> [Vec2; 4] {
    let (primary, secondary) = scroll_offsets(time, params);
    let offsets = [primary, primary, secondary, secondary];
    std::array::from_fn(|i| {
        let (scale, sign) = LAYERS[i];
        uv * scale + offsets[i] * sign
    })
}

/// Map a texture colour in [0, 1] to a direction in [-1, 1].
pub fn decode_normal(rgb: Vec3) -> Vec3 {
    rgb * 2.0 - 1.0
}

/// Weighted sum of the layer normals, renormalized.
pub fn blend_normals(normals: [Vec3; 4], strengths: [f32; 4]) -> Vec3 {
    normals
        .iter()
        .zip(strengths)
        .fold(Vec3::ZERO, |acc, (n, s)| acc + *n * s)
        .normalize()
}

/// `i - 2 dot(n, i) n`, as GLSL and WGSL define it.
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}

/// Refracted direction for ratio `eta`; zero on total internal reflection.
pub fn refract(incident: Vec3, normal: Vec3, eta: f32) -> Vec3 {
    let cos_i = normal.dot(incident);
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        Vec3::ZERO
    } else {
        eta * incident - (eta * cos_i + k.sqrt()) * normal
    }
}

fn mix(x: f32, y: f32, a: f32) -> f32 {
    x * (1.0 - a) + y * a
}

/// Schlick's approximation: grazing angles reflect, head-on angles refract.
pub fn fresnel_schlick(view_dir: Vec3, normal: Vec3) -> f32 {
    let term = (1.0 - view_dir.dot(normal).max(0.0)).powi(5);
    mix(BASE_REFLECTANCE, 1.0, term)
}

/// Shade one water fragment.
pub fn shade_water(
    fragment: &WaterFragment,
    params: &WaterParams,
    normal_map1: &impl NormalSampler,
    normal_map2: &impl NormalSampler,
    environment: &impl EnvironmentSampler,
) -> Vec3 {
    let to_fragment = fragment.world_pos - fragment.eye;
    let view_dir = to_fragment.normalize();

    let coords = normal_map_coords(fragment.uv, fragment.time, params);
    let normals = [
        decode_normal(normal_map1.sample(coords[0])),
        decode_normal(normal_map2.sample(coords[1])),
        decode_normal(normal_map1.sample(coords[2])),
        decode_normal(normal_map2.sample(coords[3])),
    ];
    let normal = blend_normals(normals, params.strengths);

    let reflected = environment.sample(reflect(to_fragment, normal));
    let refracted = environment.sample(refract(view_dir, normal, params.refraction_ratio));

    let fresnel = fresnel_schlick(view_dir, normal);
    (refracted * (1.0 - fresnel) + reflected * fresnel) * params.tint
}
