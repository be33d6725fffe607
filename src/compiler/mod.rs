//! Compile backend - source text to preview artifact.
//!
//! The pipeline only sees [`CompileBackend`]: a pure
//! `(source) -> Result<Artifact, CompileError>` function that runs inside the
//! compile worker. Swapping the typesetter never touches the pipeline.

use std::sync::Arc;

use thiserror::Error;

/// Rendered preview (SVG markup). Always replaces the previous one wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    svg: Arc<str>,
}

impl Artifact {
    pub fn from_svg(svg: impl Into<Arc<str>>) -> Self {
        Self { svg: svg.into() }
    }

    pub fn svg(&self) -> &str {
        &self.svg
    }
}

/// Compilation failed on the given source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
}

impl CompileError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Source-to-artifact compiler run by the worker.
pub trait CompileBackend: Send + Sync + 'static {
    fn compile(&self, source: &str) -> Result<Artifact, CompileError>;
}

impl<F> CompileBackend for F
where
    F: Fn(&str) -> Result<Artifact, CompileError> + Send + Sync + 'static,
{
    fn compile(&self, source: &str) -> Result<Artifact, CompileError> {
        self(source)
    }
}

/// Backend used until the typst renderer is wired in: ignores the source
/// and renders a fixed notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderBackend;

impl PlaceholderBackend {
    pub const WIDTH: u32 = 800;
    pub const HEIGHT: u32 = 600;
}

impl CompileBackend for PlaceholderBackend {
    fn compile(&self, _source: &str) -> Result<Artifact, CompileError> {
        let (w, h) = (Self::WIDTH, Self::HEIGHT);
        let (cx, cy) = (w / 2, h / 2);
        Ok(Artifact::from_svg(format!(
            r#"<svg width="{w}" height="{h}" xmlns="http://www.w3.org/2000/svg"><rect width="{w}" height="{h}" fill="white"/><text x="{cx}" y="{cy}" text-anchor="middle" font-family="Arial" font-size="16" fill="black">Typst compilation will appear here</text><text x="{cx}" y="{y2}" text-anchor="middle" font-family="Arial" font-size="12" fill="gray">(Typst renderer integration pending)</text></svg>"#,
            y2 = cy + 30,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_fixed() {
        let a = PlaceholderBackend.compile("= One").unwrap();
        let b = PlaceholderBackend.compile("").unwrap();
        assert_eq!(a, b);
        assert!(a.svg().starts_with("<svg width=\"800\" height=\"600\""));
        assert!(a.svg().contains("y=\"330\""));
    }

    #[test]
    fn test_closure_backend() {
        let backend = |src: &str| {
            if src.is_empty() {
                Err(CompileError::new("empty document"))
            } else {
                Ok(Artifact::from_svg(format!("<svg>{src}</svg>")))
            }
        };
        assert_eq!(backend.compile("x").unwrap().svg(), "<svg>x</svg>");
        assert_eq!(
            backend.compile("").unwrap_err().to_string(),
            "empty document"
        );
    }
}
