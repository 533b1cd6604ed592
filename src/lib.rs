//! # Site Build
//!
//! Production build tool for a static web front-end.
//!
//! Two fixed build variants are provided:
//!
//! - **full**: wipe the output tree, install Node build dependencies, copy
//!   static assets, minify the stylesheet and scripts with `cleancss` and
//!   `terser`, then rewrite HTML templates to reference the minified stylesheet
//! - **static-host**: wipe the output tree and copy static assets only
//!
//! A failed minification never fails the build: the static tree is re-copied
//! unminified instead.
//!
//! The crate also holds the production settings of the web application that
//! serves the site, and the constructor that builds the application from them.
//!
//! ## Usage
//!
//! ```ignore
//! use site_build::builder::{run_build, BuildMode, BuildPlan};
//! use site_build::layout::ProjectLayout;
//! use site_build::minifier::Toolchain;
//! use site_build::tools::SystemRunner;
//!
//! let plan = BuildPlan {
//!     layout: ProjectLayout::new(root),
//!     mode: BuildMode::Full,
//!     toolchain: Toolchain::default(),
//! };
//! let report = run_build(&plan, &SystemRunner, &shutdown, &mut |_| {})?;
//! ```

/// Application construction from production settings
pub mod app;

/// Build orchestration
pub mod builder;

/// CLI configuration and argument parsing
pub mod config;

/// File copying operations
pub mod copier;

/// Error types for build operations
pub mod error;

/// Fixed project paths and file lists
pub mod layout;

/// Dependency install and asset minification
pub mod minifier;

/// HTML template reference rewriting
pub mod rewriter;

/// Production web application settings
pub mod settings;

/// External tool invocation
pub mod tools;
