//! Deployment config template interpolation.
//!
//! Templates are text with `{{ ... }}` actions:
//!
//! | Action | Meaning |
//! |--------|---------|
//! | `{{ .a.b }}` | value at a dotted path from the current context |
//! | `{{ . }}` | the current context itself |
//! | `{{ if .x }}..{{ else }}..{{ end }}` | branch on truthiness |
//! | `{{ range .xs }}..{{ else }}..{{ end }}` | iterate, `.` bound to each element |
//! | `{{/* ... */}}` | comment |
//!
//! `{{- ` and ` -}}` trim surrounding whitespace. Any key the template asks
//! for that the variables lack fails the render.

mod parse;
mod render;

use gdm_core::{GdmError, Result, Vars};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// A parsed template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    nodes: Vec<parse::Node>,
}

impl Template {
    pub fn parse(name: impl Into<String>, source: &str) -> Result<Self> {
        let name = name.into();
        let nodes = parse::parse(source).map_err(|e| GdmError::TemplateParse {
            name: name.clone(),
            message: e.to_string(),
        })?;
        Ok(Self { name, nodes })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render against `vars`. Same template and vars always give the same text.
    pub fn render(&self, vars: &Vars) -> Result<String> {
        let root = serde_json::Value::Object(vars.clone());
        render::render(&self.nodes, &root).map_err(|message| GdmError::TemplateRender {
            name: self.name.clone(),
            message,
        })
    }
}

/// Render `template` into `output`.
///
/// Both paths are used as given; the caller resolves them against its working
/// directory. Nothing is written unless rendering succeeds, and the output is
/// replaced atomically. Returns the path written.
pub fn interpolate(template: &Path, output: &Path, vars: &Vars) -> Result<PathBuf> {
    let source = read_template(template)?;

    let name = template
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| template.display().to_string());
    let rendered = Template::parse(name, &source)?.render(vars)?;

    let out_path = output.to_path_buf();
    write_atomic(&out_path, rendered.as_bytes()).map_err(|source| GdmError::OutputWrite {
        path: out_path.clone(),
        source,
    })?;

    info!(
        template = %template.display(),
        output = %out_path.display(),
        bytes = rendered.len(),
        "rendered deployment config"
    );
    Ok(out_path)
}

fn read_template(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(source) => Ok(source),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(GdmError::TemplateNotFound {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(GdmError::TemplateRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    debug!(path = %path.display(), "replaced output file");
    Ok(())
}
