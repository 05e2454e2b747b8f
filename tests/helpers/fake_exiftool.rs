//! Stand-in ExifTool executables written as POSIX shell scripts.
//!
//! The scripts speak just enough of the `-stay_open` batch protocol for the
//! client: they collect argument lines until `-execute`, answer, print
//! `{ready}`, and exit on `-stay_open` / `false`. A few magic arguments
//! steer their behaviour:
//!
//! - `--echo`: print every following argument of the group verbatim
//! - `--blank`: print a line, a blank line, then another line
//! - `--die`: exit without answering
//! - `--hang`: sleep before answering
//!
//! File arguments are answered with canned tags (reads) or status lines
//! (writes, i.e. when the group contains `-TAG=VALUE`). Paths containing
//! `readonly`, `unchanged` or `missing` produce the matching failures.

#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const FAKE_VERSION: &str = "12.76";

const SCRIPT_TEMPLATE: &str = r#"#!/bin/sh
VERSION=@VERSION@
IGNORE_SHUTDOWN=@IGNORE_SHUTDOWN@
EXIT_ON_START=@EXIT_ON_START@

describe_file() {
    name=${1##*/}
    if [ "$2" -gt 0 ]; then
        case "$1" in
            *readonly*)
                echo "Error: File is read-only - $1"
                echo "    0 image files updated"
                echo "    1 files weren't updated due to errors" ;;
            *unchanged*)
                echo "    0 image files updated"
                echo "    1 image files unchanged" ;;
            *)
                echo "    1 image files updated" ;;
        esac
    else
        case "$1" in
            *missing*)
                echo "Error: File not found - $1"
                echo "    1 files could not be read" ;;
            *)
                echo "-System:FileName=$name"
                echo "-IFD0:Make=Canon"
                echo "-IFD0:Model=Canon EOS R5"
                echo "-ExifIFD:ISO=100" ;;
        esac
    fi
}

respond() {
    case "$1" in
        *--die*) exit 3 ;;
        *--hang*) sleep 5 ;;
    esac
    printf '%s' "$1" | {
        echo_mode=0
        writes=0
        while IFS= read -r arg; do
            if [ "$echo_mode" = 1 ]; then
                printf '%s\n' "$arg"
                continue
            fi
            case "$arg" in
                --echo) echo_mode=1 ;;
                --blank) echo "before blank"; echo ""; echo "after blank" ;;
                -ver) echo "$VERSION" ;;
                -*=*) writes=$((writes + 1)) ;;
                -*) ;;
                *) describe_file "$arg" "$writes" ;;
            esac
        done
    }
    echo "{ready}"
}

if [ "$EXIT_ON_START" = 1 ]; then
    exit 1
fi

if [ "$1" != "-stay_open" ]; then
    case "$1" in
        -ver)
            echo "$VERSION" ;;
        -overwrite_original)
            echo "    3 directories scanned"
            echo "    2 image files found"
            echo "    1 original files deleted" ;;
        *)
            exit 2 ;;
    esac
    exit 0
fi

args=""
stay_open=0
while IFS= read -r line; do
    if [ "$stay_open" = 1 ]; then
        stay_open=0
        if [ "$line" = false ] && [ "$IGNORE_SHUTDOWN" != 1 ]; then
            exit 0
        fi
        continue
    fi
    case "$line" in
        -stay_open) stay_open=1 ;;
        -execute) respond "$args"; args="" ;;
        *) args="$args$line
" ;;
    esac
done
"#;

/// Paths of the installed fake executables.
pub struct FakeExifTools {
    _dir: tempfile::TempDir,
    /// Well-behaved worker.
    pub standard: PathBuf,
    /// Worker that ignores the shutdown directive and must be killed.
    pub stubborn: PathBuf,
    /// Executable that exits immediately with status 1.
    pub broken: PathBuf,
}

/// Install the fake executables once per test binary.
///
/// All scripts are written before any test spawns a process, which keeps
/// a concurrent fork from inheriting a script's write handle (ETXTBSY).
pub fn fake_exiftools() -> &'static FakeExifTools {
    static TOOLS: OnceLock<FakeExifTools> = OnceLock::new();
    TOOLS.get_or_init(|| {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let standard = install(dir.path(), "exiftool", false, false);
        let stubborn = install(dir.path(), "exiftool-stubborn", true, false);
        let broken = install(dir.path(), "exiftool-broken", false, true);
        FakeExifTools {
            _dir: dir,
            standard,
            stubborn,
            broken,
        }
    })
}

fn install(dir: &Path, name: &str, ignore_shutdown: bool, exit_on_start: bool) -> PathBuf {
    let flag = |on: bool| if on { "1" } else { "0" };
    let script = SCRIPT_TEMPLATE
        .replace("@VERSION@", FAKE_VERSION)
        .replace("@IGNORE_SHUTDOWN@", flag(ignore_shutdown))
        .replace("@EXIT_ON_START@", flag(exit_on_start));

    let path = dir.join(name);
    std::fs::write(&path, script).expect("Failed to write fake exiftool");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make fake exiftool executable");
    path
}
