//! Virtual package commands.

use crate::ui::Output;
use crate::ui::list::print_virtuals;
use anyhow::Result;
use jem_core::{Env, Provider, Reporter};

/// Print every installed virtual with its providers.
pub fn list(env: &Env, out: &Output) {
    print_virtuals(out, &env.installed_virtuals());
}

/// Print candidate providers for comma separated virtuals, comma joined.
pub fn providers(env: &Env, out: &Output, virtuals: &str, ignore_vm: bool) -> Result<()> {
    let providers = env.virtual_providers(virtuals, ignore_vm)?;
    if !providers.is_empty() {
        out.line(&providers.join(","));
    }
    Ok(())
}

/// Print the package that satisfies `name`.
pub fn active_provider(env: &Env, out: &Output, name: &str) -> Result<()> {
    match env.active_provider(name)? {
        Provider::Package(pkg) => out.line(&pkg),
        Provider::Vm => {
            let vm = env.active_vm()?;
            out.info(&format!("{name} is provided by the active VM {}", vm.name()));
        }
    }
    Ok(())
}
