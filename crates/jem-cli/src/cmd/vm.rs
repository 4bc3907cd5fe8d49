//! VM commands: listing, selection and active VM lookups.

use crate::ui::Output;
use crate::ui::list::print_vms;
use anyhow::{Result, bail};
use jem_core::{Env, JemError, ProcessIdentity, Scope};

/// List installed VMs, marking the active one.
pub fn list(env: &Env, out: &Output) -> Result<()> {
    if env.vms().is_empty() {
        bail!(
            "No Java VMs installed in {}",
            env.layout().vms_dir().display()
        );
    }

    let active = match env.active_vm() {
        Ok(vm) => env.vms().find(vm.name()),
        Err(JemError::NoActiveVm) => None,
        Err(e) => return Err(e.into()),
    };
    print_vms(out, env.vms(), active);
    Ok(())
}

/// Print the active VM's name.
pub fn show_active(env: &Env, out: &Output) -> Result<()> {
    out.line(env.active_vm()?.name());
    Ok(())
}

/// Point the system or user selection link at `token`.
pub fn set(env: &mut Env, token: &str, scope: Scope) -> Result<()> {
    env.set_vm(token, scope, &ProcessIdentity)?;
    Ok(())
}

/// Print every parameter of the VM named by `token`.
pub fn print(env: &Env, out: &Output, token: &str) -> Result<()> {
    let vm = env.find_vm(token)?;
    for param in vm.params() {
        out.line(&format!("{}=\"{}\"", param.name, param.value));
    }
    Ok(())
}

/// Print comma separated variables from the active VM, one per line.
pub fn get_env(env: &Env, out: &Output, vars: &str) -> Result<()> {
    let values = vars
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| env.vm_value(v))
        .collect::<Result<Vec<_>, _>>()?;
    for value in values {
        out.line(&value);
    }
    Ok(())
}

/// Print the path of `exe` in the active VM.
pub fn exe(env: &Env, out: &Output, exe: &str) -> Result<()> {
    let path = env.active_vm()?.exec_path(exe)?;
    out.line(&path.display().to_string());
    Ok(())
}

/// Print the active VM's tools.jar.
pub fn tools(env: &Env, out: &Output) -> Result<()> {
    let jar = env.active_vm()?.tools_jar()?;
    out.line(&jar.display().to_string());
    Ok(())
}
