use waterscape_assets::{CUBE_FACE_COUNT, CubemapFaces, DecodedImage};

/// A view of a sampled texture and its sampler. The view keeps the texture
/// alive; both are released when dropped.
pub struct GpuTexture {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Colour of whatever could not be loaded.
const MISSING_TEXEL: [u8; 4] = [0, 0, 0, 255];

/// Normal maps hold directions, not colours.
const NORMAL_MAP_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Environment texels are sampled, blended and written without any sRGB
/// decode, so the water shading runs on the stored gamma-space values.
const CUBEMAP_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Repeat wrap and bilinear filtering of the base level. The mip chain is
/// uploaded but the sampler never leaves level 0.
fn normal_map_sampler(label: &str) -> wgpu::SamplerDescriptor<'_> {
    wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::Repeat,
        address_mode_v: wgpu::AddressMode::Repeat,
        address_mode_w: wgpu::AddressMode::Repeat,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        lod_min_clamp: 0.0,
        lod_max_clamp: 0.0,
        ..Default::default()
    }
}

impl GpuTexture {
    /// Upload a 2D texture with its full mip chain. `None` uploads a 1x1
    /// black texture.
    pub fn upload_2d(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        image: Option<&DecodedImage>,
    ) -> Self {
        let fallback;
        let image = match image {
            Some(image) => image,
            None => {
                tracing::warn!("{label}: no image data, using black 1x1 texture");
                fallback = DecodedImage::solid(1, 1, MISSING_TEXEL);
                &fallback
            }
        };

        let mips = image.mip_chain();
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: mips.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: NORMAL_MAP_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, mip) in mips.iter().enumerate() {
            write_layer(queue, &texture, level as u32, 0, mip);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&normal_map_sampler(label));

        tracing::debug!(
            "{label}: uploaded {}x{} with {} mip levels",
            image.width,
            image.height,
            mips.len()
        );

        Self { view, sampler }
    }

    /// Upload a cubemap with clamp-to-edge wrapping and linear filtering.
    /// Faces that failed to load or do not match the cube size stay black.
    pub fn upload_cubemap(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        faces: &CubemapFaces,
    ) -> Self {
        let side = cube_side(faces);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: side,
                height: side,
                depth_or_array_layers: CUBE_FACE_COUNT as u32,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CUBEMAP_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let black = DecodedImage::solid(side, side, MISSING_TEXEL);
        for (index, face) in faces.uniform_faces().into_iter().enumerate() {
            write_layer(queue, &texture, 0, index as u32, face.unwrap_or(&black));
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        tracing::debug!(
            "{label}: uploaded {side}x{side} cubemap, {}/{} faces loaded",
            faces.loaded_count(),
            CUBE_FACE_COUNT
        );

        Self { view, sampler }
    }
}

/// Edge length of the uploaded cube. With no usable face the cube is 1x1.
fn cube_side(faces: &CubemapFaces) -> u32 {
    faces.side().unwrap_or(1)
}

fn write_layer(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    mip_level: u32,
    layer: u32,
    image: &DecodedImage,
) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level,
            origin: wgpu::Origin3d {
                x: 0,
                y: 0,
                z: layer,
            },
            aspect: wgpu::TextureAspect::All,
        },
        &image.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(image.bytes_per_row()),
            rows_per_image: Some(image.height),
        },
        wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_textures_skip_srgb_decode() {
        assert!(!CUBEMAP_FORMAT.is_srgb());
        assert!(!NORMAL_MAP_FORMAT.is_srgb());
    }

    #[test]
    fn normal_maps_sample_only_the_base_level() {
        let desc = normal_map_sampler("bump");
        assert_eq!(desc.min_filter, wgpu::FilterMode::Linear);
        assert_eq!(desc.mag_filter, wgpu::FilterMode::Linear);
        assert_eq!(desc.lod_max_clamp, 0.0);
        assert_eq!(desc.address_mode_u, wgpu::AddressMode::Repeat);
        assert_eq!(desc.address_mode_v, wgpu::AddressMode::Repeat);
    }

    #[test]
    fn empty_cube_falls_back_to_one_texel() {
        assert_eq!(cube_side(&CubemapFaces::default()), 1);
    }

    #[test]
    fn cube_side_follows_first_square_face() {
        let mut faces: [Option<DecodedImage>; CUBE_FACE_COUNT] = Default::default();
        faces[1] = Some(DecodedImage::solid(16, 8, [0; 4]));
        faces[3] = Some(DecodedImage::solid(32, 32, [0; 4]));
        faces[5] = Some(DecodedImage::solid(64, 64, [0; 4]));
        assert_eq!(cube_side(&CubemapFaces::from_faces(faces)), 32);
    }
}
