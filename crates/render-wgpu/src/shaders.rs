/// Built-in WGSL for the water surface, used when the asset tree has no copy.
pub const WATER_SHADER: &str = include_str!("../../../assets/shaders/water.wgsl");

/// Built-in WGSL for the skybox.
pub const SKYBOX_SHADER: &str = include_str!("../../../assets/shaders/skybox.wgsl");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_shader_declares_entry_points_and_bindings() {
        assert!(WATER_SHADER.contains("fn vs_main"));
        assert!(WATER_SHADER.contains("fn fs_main"));
        for binding in 0..6 {
            assert!(WATER_SHADER.contains(&format!("@binding({binding})")));
        }
    }

    #[test]
    fn skybox_shader_forces_far_depth() {
        assert!(SKYBOX_SHADER.contains("fn vs_main"));
        assert!(SKYBOX_SHADER.contains("clip.xyww"));
        assert!(SKYBOX_SHADER.contains("texture_cube"));
    }
}
