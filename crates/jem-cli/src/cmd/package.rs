//! Package commands: listing, classpaths and descriptor queries.

use crate::ui::Output;
use crate::ui::list::print_packages;
use anyhow::Result;
use jem_core::Env;

/// List installed packages with their descriptions.
pub fn list(env: &Env, out: &Output) {
    let packages = env.installed_packages();
    if packages.is_empty() {
        out.line(&format!(
            "No Java packages installed in {}",
            env.layout().share_dir().display()
        ));
        return;
    }
    print_packages(out, packages);
}

/// Print the classpath of comma separated packages.
pub fn classpath(env: &Env, out: &Output, packages: &str, with_dependencies: bool) -> Result<()> {
    let cp = env.classpath(packages, with_dependencies)?;
    if !cp.is_empty() {
        out.line(&cp);
    }
    Ok(())
}

/// Print the values of comma separated parameters, one per line.
pub fn query(env: &Env, out: &Output, packages: &str, params: &str) -> Result<()> {
    for value in env.package_values(packages, params)? {
        out.line(&value);
    }
    Ok(())
}

/// Print the `LIBRARY_PATH` of comma separated packages, `:` joined.
pub fn library(env: &Env, out: &Output, packages: &str) -> Result<()> {
    let paths = env.package_values(packages, "LIBRARY_PATH")?;
    if !paths.is_empty() {
        out.line(&paths.join(":"));
    }
    Ok(())
}

/// Print the jar files a package installs.
pub fn jars(env: &Env, out: &Output, package: &str) -> Result<()> {
    for jar in env.store().jar_names(package)? {
        out.line(&jar);
    }
    Ok(())
}
