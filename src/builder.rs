//! Build orchestration.
//!
//! Runs the stages of a build strictly in order:
//! - full: prepare, install, copy, minify, rewrite
//! - static-host: prepare, copy

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::copier::{copy_directory, copy_root_files, CopyStats};
use crate::error::BuildError;
use crate::layout::{ProjectLayout, ROOT_FILES};
use crate::minifier::{install_dependencies, minify_assets, MinifyOutcome, Toolchain};
use crate::rewriter::update_html_references;
use crate::tools::CommandRunner;

/// Which build variant to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// Install, copy, minify and rewrite templates
    #[default]
    Full,
    /// Plain copy for a static-hosting target
    StaticHost,
}

impl BuildMode {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::Full => "full",
            BuildMode::StaticHost => "static-host",
        }
    }

    #[inline]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "full" => Some(BuildMode::Full),
            "static-host" => Some(BuildMode::StaticHost),
            _ => None,
        }
    }

    /// Stages this variant runs, in order
    pub fn stages(&self) -> &'static [Stage] {
        match self {
            BuildMode::Full => &[
                Stage::Prepare,
                Stage::Install,
                Stage::Copy,
                Stage::Minify,
                Stage::Rewrite,
            ],
            BuildMode::StaticHost => &[Stage::Prepare, Stage::Copy],
        }
    }
}

/// One step of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Prepare,
    Install,
    Copy,
    Minify,
    Rewrite,
}

impl Stage {
    /// Progress line printed when the stage starts
    pub fn message(&self) -> &'static str {
        match self {
            Stage::Prepare => "Cleaning build directory...",
            Stage::Install => "Installing build dependencies...",
            Stage::Copy => "Copying static files...",
            Stage::Minify => "Minifying assets...",
            Stage::Rewrite => "Updating HTML references...",
        }
    }
}

/// Everything a build run needs besides the runner and shutdown flag
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub layout: ProjectLayout,
    pub mode: BuildMode,
    pub toolchain: Toolchain,
}

/// Summary of a completed build
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Files copied by the copy stage
    pub copied: CopyStats,
    /// Whether `npm install` ran
    pub installed: bool,
    /// Minification result (None for static-host builds)
    pub minify: Option<MinifyOutcome>,
    /// Templates written by the rewrite stage
    pub templates: u64,
    pub duration: Duration,
}

/// Remove the output directory if present and recreate it empty
pub fn prepare_output_dir(output: &Path) -> Result<(), BuildError> {
    let prepare_err = |source| BuildError::PrepareFailed {
        path: output.to_path_buf(),
        source,
    };

    if output.exists() {
        fs::remove_dir_all(output).map_err(prepare_err)?;
    }
    fs::create_dir_all(output).map_err(prepare_err)
}

/// Copy the static tree and the root files present at the project root
pub fn copy_static_files(
    layout: &ProjectLayout,
    shutdown: &AtomicBool,
) -> Result<CopyStats, BuildError> {
    let mut stats = copy_directory(&layout.static_src(), &layout.static_out(), shutdown)?;
    stats += copy_root_files(&layout.root, &layout.output, ROOT_FILES, shutdown)?;
    Ok(stats)
}

/// Run every stage of `plan.mode`, calling `on_stage` before each one.
///
/// Stops at the first fatal error; partial output is left in place.
pub fn run_build(
    plan: &BuildPlan,
    runner: &dyn CommandRunner,
    shutdown: &AtomicBool,
    on_stage: &mut dyn FnMut(Stage),
) -> Result<BuildReport, BuildError> {
    let start = Instant::now();
    let layout = &plan.layout;
    let mut report = BuildReport::default();

    for stage in plan.mode.stages() {
        if shutdown.load(Ordering::Relaxed) {
            return Err(BuildError::Cancelled);
        }

        on_stage(*stage);
        match stage {
            Stage::Prepare => prepare_output_dir(&layout.output)?,
            Stage::Install => {
                report.installed = install_dependencies(layout, &plan.toolchain, runner)?
            }
            Stage::Copy => report.copied = copy_static_files(layout, shutdown)?,
            Stage::Minify => {
                report.minify = Some(minify_assets(layout, &plan.toolchain, runner, shutdown)?)
            }
            Stage::Rewrite => report.templates = update_html_references(layout)?,
        }
    }

    report.duration = start.elapsed();
    Ok(report)
}
