//! Asset loading for the waterscape demo.
//!
//! Assets are addressed by logical name (`textures/water_bump1.tga`) and
//! resolved against an asset root by [`AssetPaths`]. Decoding happens here;
//! GPU upload lives in the render backend.
//!
//! Load failures for individual textures and cubemap faces are reported to the
//! caller, which logs them and renders with a black substitute.

mod error;
pub mod paths;
pub mod shader;
pub mod texture;

pub use error::AssetError;
pub use paths::AssetPaths;
pub use shader::{ShaderOrigin, ShaderSource};
pub use texture::{CubemapFaces, DecodedImage, CUBE_FACE_COUNT, load_cubemap, load_texture};
