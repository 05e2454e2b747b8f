//! Process launching for the ExifTool executable.
//!
//! Two modes are supported:
//! - one-shot: spawn, capture stdout to completion, reap ([`Launcher::run`])
//! - worker: spawn with stdin and stdout piped for the batch protocol
//!   ([`Launcher::spawn_worker`])

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use crate::error::{ExifToolError, Result};

/// Arguments that put ExifTool into batch mode reading arguments from stdin.
///
/// Everything after `-common_args` is applied to every command group:
/// UTF-8 file names, family 1 group names (`-IFD0:Make`) and `-args` output.
pub const WORKER_STARTUP_ARGS: [&str; 9] = [
    "-stay_open",
    "true",
    "-@",
    "-",
    "-common_args",
    "-charset",
    "UTF8",
    "-G1",
    "-args",
];

/// Anything able to run a one-shot ExifTool invocation and return its stdout.
///
/// Arguments are OS strings so paths reach the process byte for byte.
pub trait OneShot {
    fn run_once(&self, args: &[&OsStr]) -> Result<String>;
}

/// A freshly spawned batch worker with both pipes taken.
#[derive(Debug)]
pub struct WorkerProcess {
    pub child: Child,
    pub stdin: ChildStdin,
    pub stdout: ChildStdout,
}

/// Launches the ExifTool executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launcher {
    executable: PathBuf,
}

impl Launcher {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Check that `path` names an existing executable file.
    ///
    /// Paths with a directory component are checked directly; bare names are
    /// searched for in `PATH`. Returns the resolved path.
    pub fn validate(path: &Path) -> Result<PathBuf> {
        let resolved = if path.components().count() > 1 || path.is_absolute() {
            path.is_file().then(|| path.to_path_buf())
        } else {
            search_path(path.as_os_str())
        };

        resolved.ok_or_else(|| {
            ExifToolError::launch(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "executable is missing"),
            )
        })
    }

    /// Validate the executable and return a launcher bound to its resolved path.
    pub fn validated(path: &Path) -> Result<Self> {
        Self::validate(path).map(Self::new)
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Run ExifTool once and return everything it wrote to stdout.
    ///
    /// The exit status is not inspected; ExifTool reports failures through
    /// its status lines.
    pub fn run<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args.into_iter().collect();
        log::debug!(
            target: "exifbatch::launcher",
            "One-shot {} {:?}",
            self.executable.display(),
            args.iter().map(AsRef::<OsStr>::as_ref).collect::<Vec<_>>()
        );

        let child = Command::new(&self.executable)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ExifToolError::launch(&self.executable, e))?;

        let output = child.wait_with_output()?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Query the ExifTool version string (`-ver`).
    pub fn version(&self) -> Result<String> {
        Ok(self.run(["-ver"])?.trim().to_string())
    }

    /// Spawn the persistent batch worker.
    pub fn spawn_worker(&self) -> Result<WorkerProcess> {
        log::debug!(
            target: "exifbatch::launcher",
            "Spawning worker {} {:?}",
            self.executable.display(),
            WORKER_STARTUP_ARGS
        );

        let mut child = Command::new(&self.executable)
            .args(WORKER_STARTUP_ARGS)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ExifToolError::launch(&self.executable, e))?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            // Pipes were requested above, so this only happens on a broken spawn.
            let _ = child.kill();
            let _ = child.wait();
            return Err(ExifToolError::startup("worker pipes are unavailable"));
        };

        Ok(WorkerProcess {
            child,
            stdin,
            stdout,
        })
    }
}

impl OneShot for Launcher {
    fn run_once(&self, args: &[&OsStr]) -> Result<String> {
        self.run(args)
    }
}

/// Search `PATH` for an executable file called `name`.
fn search_path(name: &OsStr) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
