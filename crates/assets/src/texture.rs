use crate::AssetError;
use image::imageops::FilterType;
use std::path::{Path, PathBuf};

/// Number of faces in a cubemap, in +X, -X, +Y, -Y, +Z, -Z order.
pub const CUBE_FACE_COUNT: usize = 6;

/// Decoded pixels ready for upload. Always tightly packed RGBA8.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// Channel count of the source file before expansion to RGBA.
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// A single-colour image, used for fallbacks and fixtures.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect();
        Self {
            width,
            height,
            channels: 4,
            pixels,
        }
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.width * 4
    }

    pub fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Full mip chain, level 0 first. Each level halves both dimensions
    /// (never below 1) and is filtered from level 0.
    pub fn mip_chain(&self) -> Vec<DecodedImage> {
        let levels = mip_level_count(self.width, self.height);
        let mut chain = Vec::with_capacity(levels as usize);
        chain.push(self.clone());

        let Some(base) = image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
        else {
            tracing::warn!(
                "pixel buffer does not match {}x{}; skipping mip generation",
                self.width,
                self.height
            );
            return chain;
        };

        for level in 1..levels {
            let width = (self.width >> level).max(1);
            let height = (self.height >> level).max(1);
            let scaled = image::imageops::resize(&base, width, height, FilterType::Triangle);
            chain.push(DecodedImage {
                width,
                height,
                channels: self.channels,
                pixels: scaled.into_raw(),
            });
        }
        chain
    }
}

/// Number of mip levels down to 1x1: `floor(log2(max(w, h))) + 1`.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    u32::BITS - largest.leading_zeros()
}

/// Decode an image file into RGBA8.
///
/// 2D textures are flipped so row 0 is the bottom of the image; cubemap faces
/// are not, since their orientation is fixed by face order.
pub fn load_texture(path: impl AsRef<Path>, flip_vertically: bool) -> Result<DecodedImage, AssetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // TGA has no magic number, so trust the extension when there is one.
    let decoded = match image::ImageFormat::from_path(path) {
        Ok(format) => image::load_from_memory_with_format(&bytes, format),
        Err(_) => image::load_from_memory(&bytes),
    }
    .map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(AssetError::Empty {
            path: path.to_path_buf(),
        });
    }

    let channels = decoded.color().channel_count();
    let decoded = if flip_vertically {
        decoded.flipv()
    } else {
        decoded
    };
    let rgba = decoded.to_rgba8();

    tracing::debug!(
        "decoded {} ({}x{}, {} channels)",
        path.display(),
        rgba.width(),
        rgba.height(),
        channels
    );

    Ok(DecodedImage {
        width: rgba.width(),
        height: rgba.height(),
        channels,
        pixels: rgba.into_raw(),
    })
}

/// The six faces of a cubemap. A face that failed to load is `None`.
#[derive(Debug, Default)]
pub struct CubemapFaces {
    faces: [Option<DecodedImage>; CUBE_FACE_COUNT],
    failures: Vec<(usize, AssetError)>,
}

/// Load cubemap faces given in +X, -X, +Y, -Y, +Z, -Z order.
///
/// Each face loads independently. A missing or corrupt face is logged and left
/// empty; the remaining faces still populate.
pub fn load_cubemap(paths: &[PathBuf; CUBE_FACE_COUNT]) -> CubemapFaces {
    let mut cube = CubemapFaces::default();
    for (index, path) in paths.iter().enumerate() {
        match load_texture(path, false) {
            Ok(face) => cube.faces[index] = Some(face),
            Err(e) => {
                tracing::error!("cubemap face {index} failed to load: {e}");
                cube.failures.push((index, e));
            }
        }
    }
    tracing::info!(
        "cubemap loaded with {}/{} faces",
        cube.loaded_count(),
        CUBE_FACE_COUNT
    );
    cube
}

impl CubemapFaces {
    pub fn from_faces(faces: [Option<DecodedImage>; CUBE_FACE_COUNT]) -> Self {
        Self {
            faces,
            failures: Vec::new(),
        }
    }

    pub fn face(&self, index: usize) -> Option<&DecodedImage> {
        self.faces.get(index).and_then(|f| f.as_ref())
    }

    pub fn loaded_count(&self) -> usize {
        self.faces.iter().filter(|f| f.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.loaded_count() == CUBE_FACE_COUNT
    }

    /// Faces that failed, with the error for each.
    pub fn failures(&self) -> &[(usize, AssetError)] {
        &self.failures
    }

    /// Edge length shared by the cube: the first loaded square face decides.
    pub fn side(&self) -> Option<u32> {
        self.faces
            .iter()
            .flatten()
            .find(|f| f.width == f.height)
            .map(|f| f.width)
    }

    /// Faces usable for a cube of edge `side()`. Faces that are not square or
    /// differ in size are dropped with a warning.
    pub fn uniform_faces(&self) -> [Option<&DecodedImage>; CUBE_FACE_COUNT] {
        let side = self.side();
        std::array::from_fn(|index| {
            let face = self.faces[index].as_ref()?;
            if Some(face.width) == side && face.width == face.height {
                Some(face)
            } else {
                tracing::warn!(
                    "cubemap face {index} is {}x{}, expected {}x{}; leaving it black",
                    face.width,
                    face.height,
                    side.unwrap_or(0),
                    side.unwrap_or(0)
                );
                None
            }
        })
    }

    /// Nearest-texel lookup along a direction, using the usual cubemap face
    /// selection. Returns `None` when the selected face is missing.
    pub fn sample_nearest(&self, dir: [f32; 3]) -> Option<[u8; 4]> {
        let (index, s, t) = face_coords(dir)?;
        let face = self.face(index)?;
        let x = (s * face.width as f32).floor().max(0.0) as u32;
        let y = (t * face.height as f32).floor().max(0.0) as u32;
        Some(face.texel(x, y))
    }
}

/// Pick the cubemap face for a direction and the [0, 1] coordinates on it.
pub fn face_coords(dir: [f32; 3]) -> Option<(usize, f32, f32)> {
    let [x, y, z] = dir;
    let (ax, ay, az) = (x.abs(), y.abs(), z.abs());
    let (index, sc, tc, ma) = if ax >= ay && ax >= az {
        if x >= 0.0 { (0, -z, -y, ax) } else { (1, z, -y, ax) }
    } else if ay >= az {
        if y >= 0.0 { (2, x, z, ay) } else { (3, x, -z, ay) }
    } else if z >= 0.0 {
        (4, x, -y, az)
    } else {
        (5, -x, -y, az)
    };
    if ma == 0.0 || !ma.is_finite() {
        return None;
    }
    Some((index, (sc / ma + 1.0) * 0.5, (tc / ma + 1.0) * 0.5))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FACE_COLORS: [[u8; 3]; CUBE_FACE_COUNT] = [
        [255, 0, 0],
        [0, 255, 0],
        [0, 0, 255],
        [255, 255, 0],
        [0, 255, 255],
        [255, 0, 255],
    ];

    fn write_png(dir: &Path, name: &str, w: u32, h: u32, rgb: [u8; 3]) -> PathBuf {
        let path = dir.join(name);
        image::RgbImage::from_pixel(w, h, image::Rgb(rgb))
            .save(&path)
            .unwrap();
        path
    }

    fn face_paths(dir: &Path) -> [PathBuf; CUBE_FACE_COUNT] {
        std::array::from_fn(|i| write_png(dir, &format!("face{i}.png"), 4, 4, FACE_COLORS[i]))
    }

    #[test]
    fn decodes_rgb_into_rgba() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "bump.png", 3, 2, [10, 20, 30]);
        let img = load_texture(&path, true).unwrap();
        assert_eq!((img.width, img.height), (3, 2));
        assert_eq!(img.channels, 3);
        assert_eq!(img.pixels.len(), 3 * 2 * 4);
        assert_eq!(img.texel(1, 1), [10, 20, 30, 255]);
    }

    #[test]
    fn flip_reverses_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.png");
        let mut img = image::RgbaImage::new(1, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        img.save(&path).unwrap();

        let upright = load_texture(&path, false).unwrap();
        let flipped = load_texture(&path, true).unwrap();
        assert_eq!(upright.texel(0, 0), [255, 0, 0, 255]);
        assert_eq!(flipped.texel(0, 0), [0, 0, 255, 255]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_texture("/no/such/texture.tga", true).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
        assert_eq!(err.path(), Path::new("/no/such/texture.tga"));
    }

    #[test]
    fn corrupt_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let err = load_texture(&path, false).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }

    #[test]
    fn mip_level_counts() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(300, 20), 9);
        assert_eq!(mip_level_count(0, 0), 1);
    }

    #[test]
    fn mip_chain_halves_to_one() {
        let img = DecodedImage::solid(8, 2, [40, 80, 120, 255]);
        let chain = img.mip_chain();
        let sizes: Vec<_> = chain.iter().map(|m| (m.width, m.height)).collect();
        assert_eq!(sizes, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
        let last = chain.last().unwrap();
        assert_eq!(last.pixels.len(), 4);
        assert_eq!(last.texel(0, 0), [40, 80, 120, 255]);
    }

    #[test]
    fn full_cubemap_serves_every_direction() {
        let dir = tempfile::tempdir().unwrap();
        let cube = load_cubemap(&face_paths(dir.path()));
        assert!(cube.is_complete());
        assert!(cube.failures().is_empty());
        assert_eq!(cube.side(), Some(4));

        let axes = [
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 1.0],
            [0.0, 0.0, -1.0],
        ];
        for (i, axis) in axes.iter().enumerate() {
            let [r, g, b] = FACE_COLORS[i];
            assert_eq!(cube.sample_nearest(*axis), Some([r, g, b, 255]), "face {i}");
        }
    }

    #[test]
    fn one_bad_face_leaves_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = face_paths(dir.path());
        std::fs::write(&paths[2], b"garbage").unwrap();
        paths[4] = dir.path().join("missing.png");
        std::fs::remove_file(dir.path().join("face4.png")).unwrap();

        let cube = load_cubemap(&paths);
        assert_eq!(cube.loaded_count(), 4);
        let failed: Vec<usize> = cube.failures().iter().map(|(i, _)| *i).collect();
        assert_eq!(failed, vec![2, 4]);
        assert!(cube.face(2).is_none());
        assert!(cube.face(0).is_some());
        assert_eq!(cube.sample_nearest([0.0, 1.0, 0.0]), None);
    }

    #[test]
    fn single_missing_face() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = face_paths(dir.path());
        paths[5] = dir.path().join("nope.png");
        let cube = load_cubemap(&paths);
        assert_eq!(cube.loaded_count(), 5);
        assert_eq!(cube.failures().len(), 1);
        assert_eq!(cube.failures()[0].0, 5);
    }

    #[test]
    fn mismatched_face_is_dropped() {
        let mut faces: [Option<DecodedImage>; CUBE_FACE_COUNT] =
            std::array::from_fn(|_| Some(DecodedImage::solid(4, 4, [1, 2, 3, 255])));
        faces[3] = Some(DecodedImage::solid(8, 8, [0, 0, 0, 255]));
        faces[1] = Some(DecodedImage::solid(4, 2, [0, 0, 0, 255]));
        let cube = CubemapFaces::from_faces(faces);
        let usable = cube.uniform_faces();
        assert!(usable[0].is_some());
        assert!(usable[1].is_none());
        assert!(usable[3].is_none());
        assert_eq!(usable.iter().flatten().count(), 4);
    }

    #[test]
    fn face_selection_follows_major_axis() {
        assert_eq!(face_coords([0.2, 0.1, -0.9]).map(|c| c.0), Some(5));
        assert_eq!(face_coords([-0.9, 0.5, 0.5]).map(|c| c.0), Some(1));
        assert_eq!(face_coords([0.0, 0.0, 0.0]), None);
        let (_, s, t) = face_coords([0.0, 0.0, 1.0]).unwrap();
        assert_eq!((s, t), (0.5, 0.5));
    }
}
