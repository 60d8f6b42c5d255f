//! Integration tests for the compile pipeline.
//!
//! Uses shell scripts standing in for `elm-make`.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use elm_kernel_core::scratch::{INPUT_FILE, OUTPUT_FILE};
use elm_kernel_core::{CellController, Error, ExecuteStatus, KernelConfig, RecordingHost};
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

/// Temporary project directory with a fake compiler in it.
struct FakeProject {
    dir: TempDir,
    compiler: PathBuf,
}

impl FakeProject {
    /// Create a project whose compiler runs `body` as a shell script.
    ///
    /// Inside the script `$1` is the input path and `$OUT` the output path.
    fn new(body: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let compiler = dir.path().join("fake-elm-make");
        let script = format!("#!/bin/sh\nOUT=\"${{3#--output=}}\"\n{}\n", body);
        fs::write(&compiler, script).expect("Failed to write fake compiler");
        fs::set_permissions(&compiler, fs::Permissions::from_mode(0o755))
            .expect("Failed to make fake compiler executable");
        Self { dir, compiler }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn controller(&self) -> CellController {
        let config = KernelConfig::default()
            .with_compiler(&self.compiler)
            .with_project_dir(self.path());
        CellController::new(config).expect("Failed to create controller")
    }
}

fn assert_scratch_files_removed(controller: &CellController) {
    let workspace = controller.workspace().path();
    assert!(workspace.is_dir(), "workspace should outlive the compile");
    assert!(!workspace.join(INPUT_FILE).exists());
    assert!(!workspace.join(OUTPUT_FILE).exists());
}

// =============================================================================
// Outcomes
// =============================================================================

#[test]
fn test_success_publishes_container_and_script() {
    let project = FakeProject::new("printf 'var x = 1;' > \"$OUT\"\nexit 0");
    let mut controller = project.controller();
    let mut host = RecordingHost::new(4);

    let status = controller
        .execute(&mut host, "-- compile-code\nmodule Main exposing (..)")
        .unwrap();

    assert_eq!(status, ExecuteStatus::Ok);
    assert_eq!(host.displays.len(), 2);
    assert_eq!(
        host.displays[0].data.text_html.as_deref(),
        Some("<div id=\"elm-div-4\"></div>")
    );

    let script = host.displays[1].data.application_javascript.as_deref().unwrap();
    assert!(script.contains("var x = 1;"));
    assert!(script.contains("Elm.Main.embed"));
    assert!(script.contains("elm-div-4"));

    assert!(controller.pending().is_empty());
    assert_scratch_files_removed(&controller);
}

#[test]
fn test_compile_failure_is_ok_status() {
    let project = FakeProject::new("echo 'TYPE MISMATCH'\nexit 1");
    let mut controller = project.controller();
    let mut host = RecordingHost::new(1);

    let status = controller.execute(&mut host, "-- compile-code").unwrap();

    assert_eq!(status, ExecuteStatus::Ok);
    assert_eq!(host.displays.len(), 1);
    let html = host.displays[0].data.text_html.as_deref().unwrap();
    assert!(html.starts_with("<pre>"));
    assert!(html.contains("TYPE MISMATCH"));

    assert!(controller.pending().is_empty());
    assert_scratch_files_removed(&controller);
}

#[test]
fn test_compile_failure_captures_stderr() {
    let project = FakeProject::new("echo 'first' \necho 'NAMING ERROR' >&2\nexit 2");
    let mut controller = project.controller();
    let mut host = RecordingHost::new(1);

    controller.execute(&mut host, "-- compile-code").unwrap();

    let html = host.displays[0].data.text_html.as_deref().unwrap();
    assert!(html.contains("first"));
    assert!(html.contains("NAMING ERROR"));
}

#[test]
fn test_missing_compiler_returns_error() {
    let project = FakeProject::new("exit 0");
    let config = KernelConfig::default()
        .with_compiler(project.path().join("no-such-compiler"))
        .with_project_dir(project.path());
    let mut controller = CellController::new(config).unwrap();
    let mut host = RecordingHost::new(1);

    let result = controller.execute(&mut host, "import Html\n");
    assert!(result.is_ok());

    let result = controller.execute(&mut host, "-- compile-code");
    assert!(matches!(result, Err(Error::CompilerNotFound(_))));
    assert_eq!(host.displays.len(), 1);
    assert!(host.displays[0].data.text_html.as_deref().unwrap().contains("compiler not found"));

    assert!(controller.pending().is_empty());
    assert_scratch_files_removed(&controller);
}

#[test]
fn test_success_without_output_file_is_infrastructure_failure() {
    let project = FakeProject::new("exit 0");
    let mut controller = project.controller();
    let mut host = RecordingHost::new(1);

    let result = controller.execute(&mut host, "-- compile-code");

    assert!(matches!(result, Err(Error::MissingOutput(_))));
    assert_eq!(host.displays.len(), 1);
    assert_scratch_files_removed(&controller);
}

// =============================================================================
// Accumulation
// =============================================================================

#[test]
fn test_unit_is_newline_joined_cells() {
    let project = FakeProject::new(concat!(
        "cp \"$1\" \"$(dirname \"$0\")/unit.elm\"\n",
        "printf 'ok' > \"$OUT\"",
    ));
    let record = project.path().join("unit.elm");

    let mut controller = project.controller();
    let mut host = RecordingHost::new(1);

    controller.execute(&mut host, "module Main exposing (main)").unwrap();
    controller.execute(&mut host, "import Html").unwrap();
    assert_eq!(controller.pending().len(), 2);
    assert!(host.displays.is_empty());

    controller
        .execute(&mut host, "-- compile-code\nmain = Html.text \"hi\"")
        .unwrap();

    assert_eq!(
        fs::read_to_string(&record).unwrap(),
        "module Main exposing (main)\nimport Html\n-- compile-code\nmain = Html.text \"hi\""
    );
}

#[test]
fn test_failed_compile_does_not_retain_cells() {
    let project = FakeProject::new("echo 'SYNTAX PROBLEM'\nexit 1");
    let mut controller = project.controller();
    let mut host = RecordingHost::new(1);

    controller.execute(&mut host, "main = ").unwrap();
    controller.execute(&mut host, "-- compile-code").unwrap();
    assert!(controller.pending().is_empty());

    controller.execute(&mut host, "main = 1").unwrap();
    assert_eq!(controller.pending(), ["main = 1"]);
}

#[test]
fn test_marker_on_later_line_keeps_accumulating() {
    let project = FakeProject::new("exit 1");
    let mut controller = project.controller();
    let mut host = RecordingHost::new(1);

    controller
        .execute(&mut host, "module Main\n-- compile-code")
        .unwrap();

    assert_eq!(controller.pending().len(), 1);
    assert!(host.displays.is_empty());
}

// =============================================================================
// Manifest staging
// =============================================================================

#[test]
fn test_manifest_copied_and_compiler_runs_in_workspace() {
    let project = FakeProject::new(concat!(
        "RECORD=\"$(dirname \"$0\")/listing.txt\"\n",
        "ls > \"$RECORD\"\n",
        "pwd >> \"$RECORD\"\n",
        "printf 'ok' > \"$OUT\"",
    ));
    let record = project.path().join("listing.txt");
    fs::write(project.path().join("elm-package.json"), "{}").unwrap();

    let mut controller = project.controller();
    let mut host = RecordingHost::new(1);
    controller.execute(&mut host, "-- compile-code").unwrap();

    let listing = fs::read_to_string(&record).unwrap();
    assert!(listing.contains("elm-package.json"));
    assert!(listing.contains("input.elm"));

    let workspace = controller.workspace().path().canonicalize().unwrap();
    let cwd = listing.lines().last().unwrap();
    assert_eq!(Path::new(cwd).canonicalize().unwrap(), workspace);
    assert_eq!(host.displays.len(), 2);
}

#[test]
fn test_absent_manifest_emits_nothing_extra() {
    let project = FakeProject::new("echo 'TYPE MISMATCH'\nexit 1");
    let mut controller = project.controller();
    let mut host = RecordingHost::new(1);

    controller.execute(&mut host, "-- compile-code").unwrap();

    assert_eq!(host.displays.len(), 1);
    assert!(!controller.workspace().path().join("elm-package.json").exists());
}

#[test]
fn test_unreadable_manifest_shows_permission_panel() {
    let project = FakeProject::new("printf 'var x = 1;' > \"$OUT\"");
    let manifest = project.path().join("elm-package.json");
    fs::write(&manifest, "{}").unwrap();
    fs::set_permissions(&manifest, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users read through file modes, so the copy cannot fail.
    if fs::read(&manifest).is_ok() {
        eprintln!("skipping: manifest is readable despite mode 000");
        return;
    }

    let mut controller = project.controller();
    let mut host = RecordingHost::new(1);
    let status = controller.execute(&mut host, "-- compile-code").unwrap();

    assert_eq!(status, ExecuteStatus::Ok);
    assert_eq!(host.displays.len(), 3);
    let panel = host.displays[0].data.text_html.as_deref().unwrap();
    assert!(panel.starts_with("<pre>Permission error: could not copy elm-package.json to "));
    assert!(panel.contains(&controller.workspace().path().display().to_string()));
    assert!(host.displays[2].data.application_javascript.is_some());
    assert_scratch_files_removed(&controller);
}
