//! Node dependency install and asset minification.
//!
//! The stylesheet goes through `cleancss`, each known script through `terser`.
//! Any failure abandons minification and re-copies the whole static tree
//! unminified, so the output is always servable.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use crate::copier::{copy_directory, CopyStats};
use crate::error::BuildError;
use crate::layout::{ProjectLayout, SCRIPT_FILES};
use crate::tools::{CommandRunner, ToolCommand};

/// Program names used to reach the Node toolchain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub npm: String,
    pub npx: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            npm: "npm".to_string(),
            npx: "npx".to_string(),
        }
    }
}

impl Toolchain {
    pub fn install_command(&self, layout: &ProjectLayout) -> ToolCommand {
        ToolCommand::new(&self.npm, &layout.root).args(["install", "--no-package-lock"])
    }

    pub fn stylesheet_command(&self, layout: &ProjectLayout) -> ToolCommand {
        ToolCommand::new(&self.npx, &layout.root)
            .arg("cleancss")
            .arg("--output")
            .arg(layout.stylesheet_min_out())
            .arg(layout.stylesheet_rel())
    }

    pub fn script_command(&self, layout: &ProjectLayout, name: &str) -> ToolCommand {
        ToolCommand::new(&self.npx, &layout.root)
            .arg("terser")
            .arg(layout.script_rel(name))
            .args(["--compress", "--mangle"])
            .arg("--output")
            .arg(layout.script_out(name))
    }
}

fn run_logged(runner: &dyn CommandRunner, command: &ToolCommand) -> Result<(), BuildError> {
    runner.run(command)?.log(&command.program);
    Ok(())
}

/// Install Node build dependencies unless `node_modules` already exists.
/// Returns whether the install ran.
pub fn install_dependencies(
    layout: &ProjectLayout,
    toolchain: &Toolchain,
    runner: &dyn CommandRunner,
) -> Result<bool, BuildError> {
    if layout.node_modules().exists() {
        tracing::debug!("{} present, skipping install", layout.node_modules().display());
        return Ok(false);
    }

    run_logged(runner, &toolchain.install_command(layout))?;
    Ok(true)
}

/// Result of the minification step
#[derive(Debug)]
pub enum MinifyOutcome {
    /// Every invocation succeeded; the minified files written
    Minified(Vec<PathBuf>),
    /// An invocation failed and the static tree was re-copied unminified
    Fallback { reason: BuildError, copied: CopyStats },
}

fn run_compressors(
    layout: &ProjectLayout,
    toolchain: &Toolchain,
    runner: &dyn CommandRunner,
) -> Result<Vec<PathBuf>, BuildError> {
    let mut written = Vec::with_capacity(SCRIPT_FILES.len() + 1);

    run_logged(runner, &toolchain.stylesheet_command(layout))?;
    written.push(layout.stylesheet_min_out());

    for name in SCRIPT_FILES {
        if !layout.root.join(layout.script_rel(name)).exists() {
            continue;
        }
        run_logged(runner, &toolchain.script_command(layout, name))?;
        written.push(layout.script_out(name));
    }

    Ok(written)
}

/// Minify the stylesheet and scripts into the output tree.
///
/// Only an error from the fallback copy itself is returned.
pub fn minify_assets(
    layout: &ProjectLayout,
    toolchain: &Toolchain,
    runner: &dyn CommandRunner,
    shutdown: &AtomicBool,
) -> Result<MinifyOutcome, BuildError> {
    match run_compressors(layout, toolchain, runner) {
        Ok(written) => Ok(MinifyOutcome::Minified(written)),
        Err(reason) => {
            tracing::warn!("Could not minify assets: {reason}");
            let copied = copy_directory(&layout.static_src(), &layout.static_out(), shutdown)?;
            Ok(MinifyOutcome::Fallback { reason, copied })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolOutput;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// Records commands and writes a fake minified file at each `--output` path.
    /// Fails the command whose second word equals `fail_on`.
    struct FakeRunner {
        calls: RefCell<Vec<ToolCommand>>,
        fail_on: Option<&'static str>,
    }

    impl FakeRunner {
        fn new(fail_on: Option<&'static str>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_on,
            }
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, command: &ToolCommand) -> Result<ToolOutput, BuildError> {
            self.calls.borrow_mut().push(command.clone());
            let tool = command.args.first().map(|a| a.to_string_lossy().to_string());
            if tool.as_deref() == self.fail_on {
                return Err(BuildError::ToolFailed {
                    program: command.program.clone(),
                    code: 1,
                    stderr: "fake failure".to_string(),
                });
            }
            if let Some(pos) = command.args.iter().position(|a| a == "--output") {
                let out = PathBuf::from(&command.args[pos + 1]);
                fs::create_dir_all(out.parent().unwrap()).unwrap();
                fs::write(out, "min").unwrap();
            }
            Ok(ToolOutput::default())
        }
    }

    fn setup() -> (TempDir, ProjectLayout) {
        let temp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(temp.path());
        fs::create_dir_all(layout.static_src().join("css")).unwrap();
        fs::create_dir_all(layout.static_src().join("js")).unwrap();
        fs::write(layout.static_src().join("css/style.css"), "body { color: red; }").unwrap();
        fs::write(layout.static_src().join("js/main.js"), "const answer = 42;").unwrap();
        fs::create_dir_all(layout.static_out()).unwrap();
        (temp, layout)
    }

    #[test]
    fn test_install_skipped_when_cache_present() {
        let (_temp, layout) = setup();
        fs::create_dir_all(layout.node_modules()).unwrap();
        let runner = FakeRunner::new(None);

        let ran = install_dependencies(&layout, &Toolchain::default(), &runner).unwrap();

        assert!(!ran);
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_install_runs_when_cache_absent() {
        let (_temp, layout) = setup();
        let runner = FakeRunner::new(None);

        let ran = install_dependencies(&layout, &Toolchain::default(), &runner).unwrap();

        assert!(ran);
        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].to_string(), "npm install --no-package-lock");
        assert_eq!(calls[0].cwd, layout.root);
    }

    #[test]
    fn test_install_failure_propagates() {
        let (_temp, layout) = setup();
        let runner = FakeRunner::new(Some("install"));

        let result = install_dependencies(&layout, &Toolchain::default(), &runner);

        assert!(matches!(result, Err(BuildError::ToolFailed { .. })));
    }

    #[test]
    fn test_minify_skips_missing_scripts() {
        let (_temp, layout) = setup();
        let runner = FakeRunner::new(None);

        let outcome =
            minify_assets(&layout, &Toolchain::default(), &runner, &AtomicBool::new(false))
                .unwrap();

        match outcome {
            MinifyOutcome::Minified(written) => {
                assert_eq!(written.len(), 2);
                assert!(written[0].ends_with("static/css/style.min.css"));
                assert!(written[1].ends_with("static/js/main.js"));
            }
            other => panic!("expected Minified, got {other:?}"),
        }
        // cleancss + terser on main.js only
        assert_eq!(runner.calls.borrow().len(), 2);
    }

    /// Succeeds like `FakeRunner` but reports warnings on both streams
    struct NoisyRunner(FakeRunner);

    impl CommandRunner for NoisyRunner {
        fn run(&self, command: &ToolCommand) -> Result<ToolOutput, BuildError> {
            self.0.run(command)?;
            Ok(ToolOutput {
                stdout: format!("{command}\n"),
                stderr: "WARNING: deprecated option\n".to_string(),
            })
        }
    }

    #[test]
    fn test_tool_warnings_do_not_fail_minification() {
        let (_temp, layout) = setup();
        let runner = NoisyRunner(FakeRunner::new(None));

        assert!(install_dependencies(&layout, &Toolchain::default(), &runner).unwrap());
        let outcome =
            minify_assets(&layout, &Toolchain::default(), &runner, &AtomicBool::new(false))
                .unwrap();

        assert!(matches!(outcome, MinifyOutcome::Minified(ref written) if written.len() == 2));
        assert_eq!(runner.0.calls.borrow().len(), 3);
    }

    #[test]
    fn test_script_command_arguments() {
        let layout = ProjectLayout::new("/site");
        let cmd = Toolchain::default().script_command(&layout, "main.js");
        assert_eq!(
            cmd.to_string(),
            "npx terser static/js/main.js --compress --mangle --output /site/build/static/js/main.js"
        );
    }

    #[test]
    fn test_stylesheet_command_arguments() {
        let layout = ProjectLayout::new("/site");
        let cmd = Toolchain::default().stylesheet_command(&layout);
        assert_eq!(
            cmd.to_string(),
            "npx cleancss --output /site/build/static/css/style.min.css static/css/style.css"
        );
    }

    #[test]
    fn test_minify_failure_falls_back_to_full_copy() {
        let (_temp, layout) = setup();
        let runner = FakeRunner::new(Some("terser"));

        let outcome =
            minify_assets(&layout, &Toolchain::default(), &runner, &AtomicBool::new(false))
                .unwrap();

        assert!(matches!(outcome, MinifyOutcome::Fallback { .. }));
        if let MinifyOutcome::Fallback { copied, .. } = outcome {
            assert_eq!(copied.files, 2);
        }
        // The partial minified script is overwritten with the original
        assert_eq!(
            fs::read_to_string(layout.static_out().join("js/main.js")).unwrap(),
            "const answer = 42;"
        );
        assert_eq!(
            fs::read_to_string(layout.static_out().join("css/style.css")).unwrap(),
            "body { color: red; }"
        );
    }

    #[test]
    fn test_first_failure_stops_remaining_invocations() {
        let (_temp, layout) = setup();
        let runner = FakeRunner::new(Some("cleancss"));

        let outcome =
            minify_assets(&layout, &Toolchain::default(), &runner, &AtomicBool::new(false))
                .unwrap();

        assert!(matches!(outcome, MinifyOutcome::Fallback { .. }));
        assert_eq!(runner.calls.borrow().len(), 1);
    }

    #[test]
    fn test_fallback_copy_failure_is_fatal() {
        let temp = TempDir::new().unwrap();
        // No static directory at all: cleancss fails and so does the fallback copy
        let layout = ProjectLayout::new(temp.path());
        let runner = FakeRunner::new(Some("cleancss"));

        let result =
            minify_assets(&layout, &Toolchain::default(), &runner, &AtomicBool::new(false));

        assert!(matches!(result, Err(BuildError::WalkFailed { .. })));
    }
}
