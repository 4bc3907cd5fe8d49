//! Run an executable from the active VM in place of this process.

use anyhow::{Result, anyhow};
use jem_core::Env;
use std::os::unix::process::CommandExt;
use std::process::Command;
use tracing::debug;

/// Replace the current process with `exe` from the active VM's `PATH`.
///
/// Only returns when the executable cannot be found or started.
pub fn exec(env: &Env, exe: &str, args: &[String]) -> Result<()> {
    let vm = env.active_vm()?;
    let path = vm.exec_path(exe)?;
    debug!(vm = vm.name(), path = %path.display(), "exec");

    let mut cmd = Command::new(&path);
    cmd.args(args);
    if let Some(home) = vm.java_home() {
        cmd.env("JAVA_HOME", home);
    }
    let err = cmd.exec();
    Err(anyhow!("Failed to execute {}: {err}", path.display()))
}
