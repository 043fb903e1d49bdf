// src/builder.rs
use sift_resources::{FilesystemBuildContext, ResourcesProcessor};
use sift_template::{Delimiters, MissingValue, RendererConfig, ResourceRenderer};
use sift_traits::BuildContext;
use std::sync::Arc;

/// A builder for creating a `ResourcesProcessor`.
#[derive(Debug, Default)]
pub struct ProcessorBuilder {
    context: Option<Arc<dyn BuildContext>>,
    renderer_config: RendererConfig,
}

impl ProcessorBuilder {
    /// Creates a builder with the default renderer configuration and no build context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the build context. Defaults to a `FilesystemBuildContext`.
    pub fn with_context(mut self, context: Arc<dyn BuildContext>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_renderer_config(mut self, config: RendererConfig) -> Self {
        self.renderer_config = config;
        self
    }

    /// Sets the placeholder delimiters, `${` and `}` by default.
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.renderer_config.delimiters = delimiters;
        self
    }

    /// Chooses between failing and rendering nothing for unresolved placeholders.
    pub fn with_missing_values(mut self, missing_values: MissingValue) -> Self {
        self.renderer_config.missing_values = missing_values;
        self
    }

    /// Consumes the builder and creates the `ResourcesProcessor`.
    pub fn build(self) -> ResourcesProcessor {
        let context = self.context.unwrap_or_else(|| {
            log::debug!("No build context configured, using the filesystem");
            Arc::new(FilesystemBuildContext::new())
        });
        ResourcesProcessor::with_renderer(context, ResourceRenderer::new(self.renderer_config))
    }
}
