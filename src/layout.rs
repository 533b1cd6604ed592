//! Project layout: the fixed source and output paths a build touches.
//!
//! Every file category is hard-coded; nothing here is discovered by scanning.

use std::path::{Path, PathBuf};

/// Static asset directory, relative to the project root
pub const STATIC_DIR: &str = "static";

/// HTML template directory, relative to the project root
pub const TEMPLATES_DIR: &str = "templates";

/// Local Node dependency cache, relative to the project root
pub const NODE_MODULES_DIR: &str = "node_modules";

/// Default output directory name
pub const DEFAULT_OUTPUT_DIR: &str = "build";

/// Files copied from the project root into the output root when present
pub const ROOT_FILES: &[&str] = &["index.html", "favicon.ico", "robots.txt", "sitemap.xml"];

/// Scripts minified one by one, relative to `static/js`
pub const SCRIPT_FILES: &[&str] = &["matrix.js", "main.js", "project-modal.js"];

/// Stylesheet source, relative to `static/`
pub const STYLESHEET: &str = "css/style.css";

/// Minified stylesheet, relative to `static/`
pub const STYLESHEET_MIN: &str = "css/style.min.css";

/// Name a minified script is written under.
///
/// terser overwrites the copied script in place, so the name does not change.
#[inline]
pub fn minified_script_name(name: &str) -> &str {
    name
}

/// Source and output roots of one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    /// Project root holding `static/`, `templates/` and the root files
    pub root: PathBuf,
    /// Output tree, wiped at the start of every build
    pub output: PathBuf,
}

impl ProjectLayout {
    /// Layout with the output tree at `<root>/build`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let output = root.join(DEFAULT_OUTPUT_DIR);
        Self { root, output }
    }

    /// Layout with an explicit output tree
    pub fn with_output(root: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output: output.into(),
        }
    }

    #[inline]
    pub fn static_src(&self) -> PathBuf {
        self.root.join(STATIC_DIR)
    }

    #[inline]
    pub fn static_out(&self) -> PathBuf {
        self.output.join(STATIC_DIR)
    }

    #[inline]
    pub fn templates_src(&self) -> PathBuf {
        self.root.join(TEMPLATES_DIR)
    }

    #[inline]
    pub fn node_modules(&self) -> PathBuf {
        self.root.join(NODE_MODULES_DIR)
    }

    /// Stylesheet source, relative to the project root (as passed to the minifier)
    pub fn stylesheet_rel(&self) -> PathBuf {
        Path::new(STATIC_DIR).join(STYLESHEET)
    }

    pub fn stylesheet_min_out(&self) -> PathBuf {
        self.static_out().join(STYLESHEET_MIN)
    }

    /// Script source, relative to the project root
    pub fn script_rel(&self, name: &str) -> PathBuf {
        Path::new(STATIC_DIR).join("js").join(name)
    }

    pub fn script_out(&self, name: &str) -> PathBuf {
        self.static_out().join("js").join(minified_script_name(name))
    }
}
