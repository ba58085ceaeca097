//! Fake external tools shared by the integration tests.
//!
//! Each stand-in is a small `sh` script that honours the same command-line
//! contract as the real tool and leaves traces the tests can assert on:
//!
//! | Real tool | Stand-in | Behaviour |
//! |-----------|----------|-----------|
//! | `node render_excalidraw.js` | `sh excalidraw.sh <src> <dst>` | writes `<svg src="<src>"/>` |
//! | `npx mmdc` | `sh mmdc -i <in> -o <out>` run from the tool root | writes `<svg cwd="$(pwd)">` |
//! | `pandoc` | `pandoc.sh <md> -o <out> --resource-path <dir>` | checks images exist, copies `<md>` to `<out>` |
//!
//! All scripts are written once per test binary inside a `OnceLock`. Every
//! test calls [`tools`] before spawning anything, so no child is forked while
//! a script is still open for writing (which would fail with ETXTBSY).

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

pub struct FakeTools {
    _dir: TempDir,
    /// Tool root whose `mmdc` renders successfully.
    pub tool_root: PathBuf,
    /// Tool root whose `mmdc` exits 2.
    pub broken_tool_root: PathBuf,
    /// Excalidraw renderer script (run via `sh`).
    pub excalidraw: PathBuf,
    /// Excalidraw renderer script that always exits 2.
    pub excalidraw_failing: PathBuf,
    /// Executable pandoc stand-in.
    pub pandoc: PathBuf,
}

const EXCALIDRAW: &str = r#"[ -f "$1" ] || { echo "missing scene $1" >&2; exit 3; }
printf '<svg src="%s"/>' "$1" > "$2"
"#;

const EXCALIDRAW_FAILING: &str = r#"echo "[INFO] Input file: $1"
echo "render exploded" >&2
exit 2
"#;

const MMDC: &str = r#"[ "$1" = "-i" ] && [ "$3" = "-o" ] || { echo "usage: mmdc -i IN -o OUT" >&2; exit 64; }
[ -f "$2" ] || { echo "no input $2" >&2; exit 66; }
printf '<svg cwd="%s"/>' "$(pwd)" > "$4"
"#;

const MMDC_FAILING: &str = r#"echo "Parse error on line 1" >&2
exit 2
"#;

const PANDOC: &str = r#"#!/bin/sh
[ "$2" = "-o" ] && [ "$4" = "--resource-path" ] || { echo "bad args: $*" >&2; exit 64; }
for img in $(grep -o '[a-z]*-[0-9]*\.svg' "$1"); do
  [ -f "$5/$img" ] || { echo "missing image $img" >&2; exit 5; }
done
cp "$1" "$3"
"#;

pub fn tools() -> &'static FakeTools {
    static TOOLS: OnceLock<FakeTools> = OnceLock::new();
    TOOLS.get_or_init(|| {
        let dir = tempfile::tempdir().expect("create tools dir");
        let root = dir.path();

        let tool_root = root.join("tool");
        let broken_tool_root = root.join("broken-tool");
        fs::create_dir_all(&tool_root).unwrap();
        fs::create_dir_all(&broken_tool_root).unwrap();
        fs::write(tool_root.join("mmdc"), MMDC).unwrap();
        fs::write(broken_tool_root.join("mmdc"), MMDC_FAILING).unwrap();

        let excalidraw = root.join("excalidraw.sh");
        let excalidraw_failing = root.join("excalidraw-failing.sh");
        fs::write(&excalidraw, EXCALIDRAW).unwrap();
        fs::write(&excalidraw_failing, EXCALIDRAW_FAILING).unwrap();

        let pandoc = root.join("pandoc.sh");
        fs::write(&pandoc, PANDOC).unwrap();
        make_executable(&pandoc);

        FakeTools {
            tool_root: fs::canonicalize(&tool_root).unwrap(),
            broken_tool_root: fs::canonicalize(&broken_tool_root).unwrap(),
            excalidraw,
            excalidraw_failing,
            pandoc,
            _dir: dir,
        }
    })
}

#[cfg(unix)]
fn make_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// The single per-run workspace created under `workspace_root`.
pub fn only_workspace(workspace_root: &Path) -> PathBuf {
    let dirs: Vec<PathBuf> = fs::read_dir(workspace_root)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_dir())
        .collect();
    assert_eq!(dirs.len(), 1, "expected one workspace, found {dirs:?}");
    dirs.into_iter().next().unwrap()
}

/// Write `files` (relative path, contents) under `dir`.
pub fn write_files(dir: &Path, files: &[(&str, &str)]) {
    for (name, contents) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
}
