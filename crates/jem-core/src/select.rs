//! VM selection.
//!
//! Selecting a VM replaces the system or user selection symlink with one
//! pointing at the VM's installation directory. The replacement is remove
//! then create, so there is a short window with no link at all.

use crate::error::JemError;
use crate::paths::Layout;
use crate::reporter::Reporter;
use crate::vm::Vm;
use std::fmt;
use std::fs::DirBuilder;
use std::io::ErrorKind;
use std::os::unix::fs::DirBuilderExt;
use std::path::PathBuf;
use tracing::debug;

/// Whether the caller may change the system-wide selection.
pub trait Identity {
    fn is_privileged(&self) -> bool;
}

/// Identity of the running process: privileged when the effective uid is 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessIdentity;

impl Identity for ProcessIdentity {
    #[allow(unsafe_code)]
    fn is_privileged(&self) -> bool {
        // SAFETY: geteuid(2) takes no arguments, cannot fail and touches no
        // memory owned by Rust.
        unsafe { libc::geteuid() == 0 }
    }
}

/// Which selection link to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    System,
    User,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::System => "system",
            Self::User => "user",
        })
    }
}

/// Make `vm` the active VM for `scope` and return the link written.
///
/// The system link needs a privileged identity and the user link needs an
/// unprivileged one.
///
/// # Errors
///
/// Returns [`JemError::PrivilegeDenied`] on the wrong identity,
/// [`JemError::NotFound`] when the user link is requested without a home
/// directory, and [`JemError::Io`] or [`JemError::PermissionDenied`] when
/// the link or its parents cannot be written.
pub fn select_vm(
    layout: &Layout,
    vm: &Vm,
    scope: Scope,
    identity: &dyn Identity,
    reporter: &dyn Reporter,
) -> Result<PathBuf, JemError> {
    let privileged = identity.is_privileged();
    let link = match scope {
        Scope::System if !privileged => {
            return Err(JemError::PrivilegeDenied(
                "Only root can set the system VM".to_string(),
            ));
        }
        Scope::User if privileged => {
            return Err(JemError::PrivilegeDenied(
                "Root cannot set a user VM, use set-system-vm instead".to_string(),
            ));
        }
        Scope::System => layout.system_vm_link(),
        Scope::User => layout
            .user_vm_link()
            .ok_or_else(|| JemError::not_found("directory", "home"))?,
    };

    if let Some(parent) = link.parent() {
        DirBuilder::new()
            .recursive(true)
            .mode(0o755)
            .create(parent)
            .map_err(|e| match e.kind() {
                ErrorKind::PermissionDenied => JemError::PermissionDenied(parent.to_path_buf()),
                _ => JemError::io(format!("Failed to create {}", parent.display()), e),
            })?;
    }

    if link.symlink_metadata().is_ok_and(|m| m.file_type().is_symlink()) {
        std::fs::remove_file(&link)
            .map_err(|e| JemError::io(format!("Failed to remove {}", link.display()), e))?;
    }

    let target = layout.vm_home(vm.name());
    std::os::unix::fs::symlink(&target, &link).map_err(|e| {
        JemError::io(
            format!("Failed to create symlink {}, unable to set VM", link.display()),
            e,
        )
    })?;
    debug!(link = %link.display(), target = %target.display(), "selection link written");

    reporter.info(&format!("Now using {} as your {scope} JVM", vm.name()));
    if vm.is_build_only() {
        reporter.warning(&format!(
            "{} is marked as a build-only JVM. Using this vm is not recommended.",
            vm.name()
        ));
    }

    Ok(link)
}
