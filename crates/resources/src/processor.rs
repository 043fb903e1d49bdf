//! The resource processing entry point.

use crate::encoding::TextEncoding;
use crate::error::ProcessError;
use crate::paths::derive_output_path;
use log::{debug, info, warn};
use sift_template::{ContextStack, ResourceRenderer, TextSink, Value};
use sift_traits::{BuildContext, InputSelection, OutputHandle, ProcessableResource};
use std::fmt;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// How the resources of one run are written.
#[derive(Debug, Clone, Default)]
pub enum ProcessMode<'p> {
    /// Byte-for-byte copy.
    #[default]
    Copy,
    /// Render each resource as a template against the given scopes.
    Filter(ContextStack<'p>),
}

impl<'p> ProcessMode<'p> {
    /// Filter mode with `properties` as the only scope.
    pub fn filter(properties: &'p Value) -> Self {
        ProcessMode::Filter(ContextStack::with_root(properties))
    }

    /// Filter mode when properties are supplied, copy mode otherwise.
    pub fn from_properties(properties: Option<&'p Value>) -> Self {
        properties.map_or(ProcessMode::Copy, Self::filter)
    }

    pub fn is_filtering(&self) -> bool {
        matches!(self, ProcessMode::Filter(_))
    }
}

/// One source/target pair to process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessRequest {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    /// Encoding label used in filter mode. UTF-8 when unset.
    pub encoding: Option<String>,
}

impl ProcessRequest {
    pub fn new(source_dir: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            target_dir: target_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_includes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }

    /// The input selection handed to the build context.
    pub fn selection(&self) -> InputSelection {
        InputSelection::new(&self.source_dir)
            .with_includes(self.includes.iter().cloned())
            .with_excludes(self.excludes.iter().cloned())
    }
}

/// What a run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub filtering: bool,
    pub copied: usize,
    pub filtered: usize,
    pub bytes_written: u64,
}

impl ProcessSummary {
    /// Number of resources written, whatever the mode.
    pub fn resources(&self) -> usize {
        self.copied + self.filtered
    }
}

impl fmt::Display for ProcessSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.filtering {
            write!(f, "filtered {} resource(s)", self.filtered)?;
        } else {
            write!(f, "copied {} resource(s)", self.copied)?;
        }
        write!(f, ", {} byte(s) written", self.bytes_written)
    }
}

/// Copies or filters resources from a source tree into a target tree through
/// a [`BuildContext`].
///
/// The processor keeps no per-run state. It can be shared across threads to
/// process independent source/target pairs concurrently.
#[derive(Debug, Clone)]
pub struct ResourcesProcessor {
    context: Arc<dyn BuildContext>,
    renderer: ResourceRenderer,
}

impl ResourcesProcessor {
    /// Creates a processor rendering with the default resource renderer.
    pub fn new(context: Arc<dyn BuildContext>) -> Self {
        Self::with_renderer(context, ResourceRenderer::default())
    }

    pub fn with_renderer(context: Arc<dyn BuildContext>, renderer: ResourceRenderer) -> Self {
        Self { context, renderer }
    }

    pub fn context(&self) -> &dyn BuildContext {
        self.context.as_ref()
    }

    pub fn renderer(&self) -> &ResourceRenderer {
        &self.renderer
    }

    /// Processes every resource selected by `request`.
    ///
    /// The first failing resource aborts the run. Its partial output is
    /// discarded; outputs written before it are kept.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::UnknownEncoding` before touching any file when
    /// the request names an unknown encoding in filter mode. Otherwise returns
    /// the error of the first failing resource.
    pub fn process(
        &self,
        request: &ProcessRequest,
        mode: &ProcessMode<'_>,
    ) -> Result<ProcessSummary, ProcessError> {
        let selection = request.selection();
        let mut summary = ProcessSummary {
            filtering: mode.is_filtering(),
            ..ProcessSummary::default()
        };
        debug!(
            "Processing '{}' -> '{}' using {}",
            request.source_dir.display(),
            request.target_dir.display(),
            self.context.name()
        );

        match mode {
            ProcessMode::Copy => {
                for input in self.context.register_and_process_inputs(&selection)? {
                    let output = self.associate(request, &input)?;
                    summary.bytes_written +=
                        self.discard_on_error(&output, self.copy_resource(&input, &output))?;
                    summary.copied += 1;
                }
            }
            ProcessMode::Filter(scopes) => {
                let encoding = TextEncoding::resolve(request.encoding.as_deref())?;
                for descriptor in self.context.register_inputs(&selection)? {
                    let input = self.context.process(descriptor)?;
                    let output = self.associate(request, &input)?;
                    let result = self.filter_resource(&input, &output, scopes, encoding);
                    summary.bytes_written += self.discard_on_error(&output, result)?;
                    summary.filtered += 1;
                }
            }
        }

        info!("Resources in '{}': {}", request.source_dir.display(), summary);
        Ok(summary)
    }

    /// Renders one template held in memory into `out`.
    pub fn filter(
        &self,
        name: &str,
        source: &str,
        scopes: &ContextStack<'_>,
        out: &mut dyn TextSink,
    ) -> Result<(), ProcessError> {
        self.renderer.render(name, source, scopes, out)?;
        Ok(())
    }

    fn associate(
        &self,
        request: &ProcessRequest,
        input: &ProcessableResource,
    ) -> Result<OutputHandle, ProcessError> {
        let target = derive_output_path(&request.source_dir, &request.target_dir, input.path())?;
        debug!("'{}' -> '{}'", input.path().display(), target.display());
        Ok(self.context.associate_output(input, &target)?)
    }

    fn discard_on_error(
        &self,
        output: &OutputHandle,
        result: Result<u64, ProcessError>,
    ) -> Result<u64, ProcessError> {
        if result.is_err()
            && let Err(e) = self.context.discard_output(output)
        {
            warn!("Failed to discard partial output '{}': {}", output.path().display(), e);
        }
        result
    }

    fn copy_resource(
        &self,
        input: &ProcessableResource,
        output: &OutputHandle,
    ) -> Result<u64, ProcessError> {
        let mut reader = self.context.open_input(input)?;
        let mut writer = CountingWriter::new(self.context.new_output_stream(output)?);
        let mut buffer = vec![0; COPY_BUFFER_SIZE];
        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ProcessError::io(input.path(), e)),
            };
            writer
                .write_all(&buffer[..read])
                .map_err(|e| ProcessError::io(output.path(), e))?;
        }
        writer.flush().map_err(|e| ProcessError::io(output.path(), e))?;
        Ok(writer.written())
    }

    fn filter_resource(
        &self,
        input: &ProcessableResource,
        output: &OutputHandle,
        scopes: &ContextStack<'_>,
        encoding: TextEncoding,
    ) -> Result<u64, ProcessError> {
        let mut bytes = Vec::new();
        self.context
            .open_input(input)?
            .read_to_end(&mut bytes)
            .map_err(|e| ProcessError::io(input.path(), e))?;

        let (text, malformed) = encoding.decode(&bytes);
        if malformed {
            warn!(
                "'{}' is not valid {}; malformed sequences were replaced",
                input.path().display(),
                encoding.name()
            );
        }

        let template = self
            .renderer
            .compile(&input.path().display().to_string(), &text)?;
        let stream = self.context.new_output_stream(output)?;
        let mut writer = encoding.writer(CountingWriter::new(stream));
        template.execute(&mut writer, scopes)?;

        if writer.unmappable() > 0 {
            warn!(
                "{} character(s) in '{}' cannot be encoded as {} and were written as '?'",
                writer.unmappable(),
                output.path().display(),
                encoding.name()
            );
        }
        let counter = writer
            .finish()
            .map_err(|e| ProcessError::io(output.path(), e))?;
        Ok(counter.written())
    }
}

/// Counts the bytes passed through to the inner writer.
struct CountingWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    fn written(&self) -> u64 {
        self.written
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sift_template::{MissingValue, RendererConfig, TemplateError};
    use sift_traits::InMemoryBuildContext;
    use std::path::Path;

    fn context_with(files: &[(&str, &[u8])]) -> Arc<InMemoryBuildContext> {
        let context = InMemoryBuildContext::new();
        for (path, data) in files {
            context.add_input(*path, data.to_vec()).unwrap();
        }
        Arc::new(context)
    }

    fn processor(context: &Arc<InMemoryBuildContext>) -> ResourcesProcessor {
        ResourcesProcessor::new(context.clone())
    }

    fn output(context: &InMemoryBuildContext, path: &str) -> Option<Vec<u8>> {
        context.output(Path::new(path))
    }

    #[test]
    fn test_copy_mode_is_byte_exact() {
        let binary = [0u8, 0xFF, 0xFE, b'$', b'{', b'x', b'}', 0x80];
        let context = context_with(&[("/src/a.bin", &binary), ("/src/nested/b.txt", b"${x}")]);

        let summary = processor(&context)
            .process(&ProcessRequest::new("/src", "/out"), &ProcessMode::Copy)
            .unwrap();

        assert_eq!(output(&context, "/out/a.bin").unwrap(), binary);
        assert_eq!(output(&context, "/out/nested/b.txt").unwrap(), b"${x}");
        assert_eq!(summary.copied, 2);
        assert_eq!(summary.filtered, 0);
        assert_eq!(summary.bytes_written, (binary.len() + 4) as u64);
    }

    #[test]
    fn test_filter_mode_renders_properties() {
        let context = context_with(&[("/src/app.properties", b"version=${project.version}\n")]);
        let properties = Value::from(json!({ "project.version": "1.2.3" }));

        let summary = processor(&context)
            .process(
                &ProcessRequest::new("/src", "/out"),
                &ProcessMode::filter(&properties),
            )
            .unwrap();

        assert_eq!(output(&context, "/out/app.properties").unwrap(), b"version=1.2.3\n");
        assert_eq!(summary.filtered, 1);
        assert_eq!(summary.resources(), 1);
        assert!(summary.filtering);
        assert_eq!(
            context.associated_outputs(Path::new("/src/app.properties")),
            vec![PathBuf::from("/out/app.properties")]
        );
    }

    #[test]
    fn test_filter_mode_failure_discards_output() {
        let context = context_with(&[("/src/a.txt", b"ok ${missing} tail")]);
        let properties = Value::from(json!({}));

        let err = processor(&context)
            .process(
                &ProcessRequest::new("/src", "/out"),
                &ProcessMode::filter(&properties),
            )
            .unwrap_err();

        match err {
            ProcessError::Render(TemplateError::Unresolved { template, name, .. }) => {
                assert_eq!(name, "missing");
                assert!(template.ends_with("a.txt"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(output(&context, "/out/a.txt").is_none());
    }

    #[test]
    fn test_filter_mode_with_empty_missing_values() {
        let context = context_with(&[("/src/a.txt", b"[${missing}]")]);
        let properties = Value::from(json!({}));
        let renderer = ResourceRenderer::new(RendererConfig {
            missing_values: MissingValue::Empty,
            ..RendererConfig::default()
        });

        ResourcesProcessor::with_renderer(context.clone(), renderer)
            .process(
                &ProcessRequest::new("/src", "/out"),
                &ProcessMode::filter(&properties),
            )
            .unwrap();
        assert_eq!(output(&context, "/out/a.txt").unwrap(), b"[]");
    }

    #[test]
    fn test_filter_mode_round_trips_latin1() {
        let context = context_with(&[("/src/a.txt", b"caf\xE9 ${who}")]);
        let properties = Value::from(json!({ "who": "d\u{E9}j\u{E0}" }));

        processor(&context)
            .process(
                &ProcessRequest::new("/src", "/out").with_encoding("ISO-8859-1"),
                &ProcessMode::filter(&properties),
            )
            .unwrap();
        assert_eq!(output(&context, "/out/a.txt").unwrap(), b"caf\xE9 d\xE9j\xE0");
    }

    #[test]
    fn test_filter_mode_round_trips_utf16le() {
        let utf16 = |text: &str| -> Vec<u8> {
            text.encode_utf16().flat_map(u16::to_le_bytes).collect()
        };
        let source = utf16("v=${x}");
        let context = context_with(&[("/src/a.properties", source.as_slice())]);
        let properties = Value::from(json!({ "x": "1" }));

        let summary = processor(&context)
            .process(
                &ProcessRequest::new("/src", "/out").with_encoding("UTF-16LE"),
                &ProcessMode::filter(&properties),
            )
            .unwrap();
        assert_eq!(output(&context, "/out/a.properties").unwrap(), utf16("v=1"));
        assert_eq!(summary.bytes_written, 6);
    }

    #[test]
    fn test_excluded_inputs_are_not_written() {
        let context = context_with(&[("/src/a.txt", b"a"), ("/src/b.bak", b"b")]);

        let summary = processor(&context)
            .process(
                &ProcessRequest::new("/src", "/out").with_excludes(["**/*.bak"]),
                &ProcessMode::Copy,
            )
            .unwrap();
        assert_eq!(summary.copied, 1);
        assert_eq!(context.output_paths(), vec![PathBuf::from("/out/a.txt")]);
    }

    #[test]
    fn test_unknown_encoding_fails_before_writing() {
        let context = context_with(&[("/src/a.txt", b"x")]);
        let properties = Value::from(json!({}));

        let result = processor(&context).process(
            &ProcessRequest::new("/src", "/out").with_encoding("klingon-8"),
            &ProcessMode::filter(&properties),
        );
        assert!(matches!(result, Err(ProcessError::UnknownEncoding(_))));
        assert!(context.output_paths().is_empty());
    }

    #[test]
    fn test_encoding_is_ignored_in_copy_mode() {
        let context = context_with(&[("/src/a.txt", b"x")]);
        let summary = processor(&context)
            .process(
                &ProcessRequest::new("/src", "/out").with_encoding("klingon-8"),
                &ProcessMode::Copy,
            )
            .unwrap();
        assert_eq!(summary.copied, 1);
    }

    #[test]
    fn test_run_aborts_at_first_failure() {
        let context = context_with(&[("/src/a.txt", b"${v}"), ("/src/b.txt", b"${nope}")]);
        let properties = Value::from(json!({ "v": "1" }));

        let result = processor(&context).process(
            &ProcessRequest::new("/src", "/out"),
            &ProcessMode::filter(&properties),
        );
        assert!(result.is_err());
        assert_eq!(context.output_paths(), vec![PathBuf::from("/out/a.txt")]);
    }

    #[test]
    fn test_mode_from_properties() {
        let properties = Value::from(json!({}));
        assert!(!ProcessMode::from_properties(None).is_filtering());
        assert!(ProcessMode::from_properties(Some(&properties)).is_filtering());
        assert!(!ProcessMode::default().is_filtering());
    }

    #[test]
    fn test_direct_filter() {
        let context = context_with(&[]);
        let properties = Value::from(json!({ "a": { "b": "<x & y>" } }));
        let mut out = String::new();
        processor(&context)
            .filter("inline", "${a.b}", &ContextStack::with_root(&properties), &mut out)
            .unwrap();
        assert_eq!(out, "<x & y>");
    }

    #[test]
    fn test_summary_display() {
        let summary = ProcessSummary {
            filtering: false,
            copied: 3,
            filtered: 0,
            bytes_written: 42,
        };
        assert_eq!(summary.to_string(), "copied 3 resource(s), 42 byte(s) written");
    }

    #[test]
    fn test_processor_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ResourcesProcessor>();
    }
}
