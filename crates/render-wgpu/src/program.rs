use waterscape_assets::ShaderSource;

/// A compiled shader and the render pipeline built from it.
///
/// Compile and pipeline validation errors are captured, logged and kept as
/// diagnostics. A failed program has no pipeline, and passes using it draw
/// nothing.
pub struct ShaderProgram {
    name: String,
    pipeline: Option<wgpu::RenderPipeline>,
    diagnostics: Vec<String>,
}

impl ShaderProgram {
    /// Compile `source` and hand the module to `make_pipeline`.
    pub fn build(
        device: &wgpu::Device,
        source: &ShaderSource,
        make_pipeline: impl FnOnce(&wgpu::ShaderModule) -> wgpu::RenderPipeline,
    ) -> Self {
        let mut diagnostics = Vec::new();

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(source.name.as_str()),
            source: wgpu::ShaderSource::Wgsl(source.text.as_str().into()),
        });
        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            tracing::error!("shader {} failed to compile:\n{error}", source.name);
            diagnostics.push(error.to_string());
            return Self {
                name: source.name.clone(),
                pipeline: None,
                diagnostics,
            };
        }

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = make_pipeline(&module);
        let pipeline = match pollster::block_on(device.pop_error_scope()) {
            Some(error) => {
                tracing::error!("pipeline for {} failed to link:\n{error}", source.name);
                diagnostics.push(error.to_string());
                None
            }
            None => Some(pipeline),
        };

        if pipeline.is_some() {
            tracing::debug!("built program {}", source.name);
        }

        Self {
            name: source.name.clone(),
            pipeline,
            diagnostics,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pipeline(&self) -> Option<&wgpu::RenderPipeline> {
        self.pipeline.as_ref()
    }

    pub fn is_valid(&self) -> bool {
        self.pipeline.is_some()
    }

    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }
}
