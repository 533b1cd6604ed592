//! CLI configuration and runtime settings for a site build.

use anyhow::Context;
use clap::Parser;
use std::path::{Component, Path, PathBuf};

use crate::builder::{BuildMode, BuildPlan};
use crate::layout::ProjectLayout;
use crate::minifier::Toolchain;

/// Build the static front-end for deployment
#[derive(Parser, Debug)]
#[command(name = "site-build")]
#[command(version)]
#[command(about = "Build the static front-end for deployment")]
pub struct Cli {
    /// Project root holding static/, templates/ and the root files
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Build variant: full (minify and rewrite) or static-host (plain copy)
    #[arg(short, long, default_value = "full")]
    pub mode: String,

    /// Output directory [default: <ROOT>/build]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Program used to install Node dependencies
    #[arg(long, default_value = "npm")]
    pub npm: String,

    /// Program used to run the minifiers
    #[arg(long, default_value = "npx")]
    pub npx: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the production application settings as JSON and exit
    #[arg(long)]
    pub show_config: bool,
}

/// Runtime configuration parsed from CLI
#[derive(Debug, Clone)]
pub struct Config {
    pub layout: ProjectLayout,
    pub mode: BuildMode,
    pub toolchain: Toolchain,
    pub verbose: bool,
    pub show_config: bool,
}

impl Config {
    /// Create Config from CLI arguments.
    ///
    /// Root and output are made absolute here: the copier resolves paths
    /// against the process cwd while the Node tools run inside the root.
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let root = resolve_path(&cli.root)?;

        let Some(mode) = BuildMode::parse(&cli.mode) else {
            anyhow::bail!(
                "invalid build mode '{}': expected 'full' or 'static-host'",
                cli.mode
            );
        };

        let layout = match cli.output {
            Some(output) => ProjectLayout::with_output(root, resolve_path(&output)?),
            None => ProjectLayout::new(root),
        };

        validate_output(&layout)?;

        Ok(Config {
            layout,
            mode,
            toolchain: Toolchain {
                npm: cli.npm,
                npx: cli.npx,
            },
            verbose: cli.verbose,
            show_config: cli.show_config,
        })
    }

    pub fn plan(&self) -> BuildPlan {
        BuildPlan {
            layout: self.layout.clone(),
            mode: self.mode,
            toolchain: self.toolchain.clone(),
        }
    }
}

/// Absolute, lexically normalized form of `path`, with symlinks resolved
/// when the path exists
fn resolve_path(path: &Path) -> anyhow::Result<PathBuf> {
    if let Ok(canonical) = path.canonicalize() {
        return Ok(canonical);
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to read current directory")?
            .join(path)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    // Resolve symlinks in the part that already exists
    for ancestor in normalized.ancestors().skip(1) {
        if let Ok(canonical) = ancestor.canonicalize() {
            let rest = normalized.strip_prefix(ancestor).unwrap_or(&normalized);
            return Ok(canonical.join(rest));
        }
    }
    Ok(normalized)
}

/// The output tree is wiped and refilled from `static/`, so it must not
/// contain the project root or sit inside the static tree.
fn validate_output(layout: &ProjectLayout) -> anyhow::Result<()> {
    if layout.root.starts_with(&layout.output) {
        anyhow::bail!(
            "output directory {} contains the project root and would be wiped",
            layout.output.display()
        );
    }

    if layout.output.starts_with(layout.static_src()) {
        anyhow::bail!(
            "output directory {} is inside {} and would be copied into itself",
            layout.output.display(),
            layout.static_src().display()
        );
    }

    Ok(())
}
