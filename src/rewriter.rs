//! HTML template reference rewriting.

use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::copier::create_dir;
use crate::error::BuildError;
use crate::layout::{
    minified_script_name, ProjectLayout, SCRIPT_FILES, STYLESHEET, STYLESHEET_MIN,
};

const TEMPLATE_EXTENSION: &str = ".html";

/// Point asset references in `html` at their minified counterparts.
///
/// Only the stylesheet reference changes: minified scripts keep their source
/// names, so their substitution is an identity.
pub fn rewrite_references(html: &str) -> String {
    let mut content = html.replace(
        &format!("href=\"static/{STYLESHEET}\""),
        &format!("href=\"static/{STYLESHEET_MIN}\""),
    );

    for name in SCRIPT_FILES {
        let minified = minified_script_name(name);
        if minified != *name {
            content = content.replace(
                &format!("src=\"static/js/{name}\""),
                &format!("src=\"static/js/{minified}\""),
            );
        }
    }

    content
}

/// Rewrite every `.html` file under the template root into the output tree,
/// mirroring its relative directory. Returns the number of templates written.
///
/// A missing template root writes nothing.
pub fn update_html_references(layout: &ProjectLayout) -> Result<u64, BuildError> {
    let templates = layout.templates_src();
    if !templates.exists() {
        tracing::debug!("{} not found, no templates to rewrite", templates.display());
        return Ok(0);
    }

    let mut written = 0u64;

    for entry in WalkDir::new(&templates).sort_by_file_name() {
        let entry = entry.map_err(|source| BuildError::WalkFailed {
            path: templates.clone(),
            source,
        })?;

        if !entry.file_type().is_file() || !is_template(entry.path()) {
            continue;
        }

        let src = entry.path();
        let content = fs::read_to_string(src).map_err(|source| BuildError::ReadFailed {
            path: src.to_path_buf(),
            source,
        })?;

        let relative = src.strip_prefix(&templates).unwrap_or(src);
        let dst = layout.output.join(relative);
        if let Some(parent) = dst.parent() {
            create_dir(parent)?;
        }

        fs::write(&dst, rewrite_references(&content)).map_err(|e| {
            BuildError::classify(e, &dst, |source| BuildError::WriteFailed {
                path: dst.clone(),
                source,
            })
        })?;

        tracing::debug!("rewrote {}", relative.display());
        written += 1;
    }

    Ok(written)
}

#[inline]
fn is_template(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(TEMPLATE_EXTENSION))
}
