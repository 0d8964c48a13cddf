//! Starting a second, independent instance of the editor.
//!
//! The launch is a request handed to a [`ProcessSupervisor`]; nothing comes
//! back to the caller. Failures are logged.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use tracing::{info, warn};

/// Spawn `program` with `args`, detached from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

pub trait ProcessSupervisor: Send + Sync {
    fn spawn_detached(&self, request: &LaunchRequest) -> io::Result<()>;
}

/// Spawns real processes with `std::process::Command`. On Unix the child gets
/// its own process group, so terminal signals aimed at the caller skip it. A
/// background thread reaps the child when it exits.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemSupervisor;

impl ProcessSupervisor for SystemSupervisor {
    fn spawn_detached(&self, request: &LaunchRequest) -> io::Result<()> {
        let mut command = Command::new(&request.program);
        command
            .args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let mut child = command.spawn()?;
        let pid = child.id();
        info!(pid, "started new instance");
        thread::Builder::new()
            .name(format!("reap-{pid}"))
            .spawn(move || {
                if let Err(e) = child.wait() {
                    warn!(pid, error = %e, "could not reap instance");
                }
            })?;
        Ok(())
    }
}

/// Asks `supervisor` to run this executable again with `path` as its only argument.
pub fn launch_new_instance(supervisor: &dyn ProcessSupervisor, path: &Path) {
    let program = match std::env::current_exe() {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "could not locate current executable");
            return;
        }
    };
    let request = LaunchRequest {
        program,
        args: vec![path.as_os_str().to_owned()],
    };
    if let Err(e) = supervisor.spawn_detached(&request) {
        warn!(program = %request.program.display(), path = %path.display(), error = %e, "failed to start new instance");
    }
}
