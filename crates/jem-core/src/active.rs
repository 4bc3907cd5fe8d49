//! Active VM resolution.
//!
//! The active VM comes from an explicit override when one is given, and
//! otherwise from the first selection symlink (user, then system) whose
//! target names a known VM. There is no fallback guess: with nothing
//! selected, callers get [`JemError::NoActiveVm`].

use crate::error::JemError;
use crate::paths::Layout;
use crate::reporter::Reporter;
use crate::vm::VmRegistry;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// Resolve the index of the active VM in `registry`.
///
/// # Errors
///
/// Returns [`JemError::NotFound`] when `override_token` names no VM, and
/// [`JemError::NoActiveVm`] when no selection link resolves.
pub fn resolve(
    registry: &VmRegistry,
    layout: &Layout,
    override_token: Option<&str>,
    reporter: &dyn Reporter,
) -> Result<usize, JemError> {
    if let Some(token) = override_token.filter(|t| !t.is_empty()) {
        return registry.find(token).map_or_else(
            || Err(JemError::not_found("VM", token)),
            |index| {
                debug!(vm = token, "active VM from override");
                Ok(index)
            },
        );
    }

    for link in layout.vm_links() {
        let name = match read_link_name(&link) {
            Ok(Some(name)) => name,
            Ok(None) => continue,
            Err(e) => {
                reporter.warning(&e.to_string());
                continue;
            }
        };

        if let Some(index) = registry.find(&name) {
            debug!(link = %link.display(), vm = %name, "active VM from selection link");
            return Ok(index);
        }
        debug!(link = %link.display(), vm = %name, "selection link names an unknown VM");
    }

    Err(JemError::NoActiveVm)
}

/// Basename of a selection link's target. `Ok(None)` when there is no link.
///
/// # Errors
///
/// Returns [`JemError::PermissionDenied`] or [`JemError::MalformedSymlink`]
/// when something is at `link` but cannot be read as a symlink.
pub fn read_link_name(link: &Path) -> Result<Option<String>, JemError> {
    match std::fs::read_link(link) {
        Ok(target) => Ok(target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => Ok(None),
            ErrorKind::PermissionDenied => Err(JemError::PermissionDenied(link.to_path_buf())),
            ErrorKind::InvalidInput => Err(JemError::MalformedSymlink {
                path: link.to_path_buf(),
                reason: "is not a symlink".to_string(),
            }),
            _ => Err(JemError::MalformedSymlink {
                path: link.to_path_buf(),
                reason: format!("could not be read: {e}"),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::{NullReporter, RecordingReporter};
    use crate::vm::Vm;
    use jem_schema::Params;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Layout, VmRegistry) {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("home");
        std::fs::create_dir_all(&home).unwrap();
        let layout = Layout::with_root(dir.path()).with_user_home(Some(home));
        let registry = VmRegistry::new(vec![
            Vm::new("/x/icedtea-8", Params::default()),
            Vm::new("/x/zulu-11", Params::default()),
        ]);
        (dir, layout, registry)
    }

    fn link(target: &str, at: &Path) {
        std::fs::create_dir_all(at.parent().unwrap()).unwrap();
        symlink(target, at).unwrap();
    }

    #[test]
    fn test_nothing_selected() {
        let (_dir, layout, registry) = setup();
        let err = resolve(&registry, &layout, None, &NullReporter).unwrap_err();
        assert!(matches!(err, JemError::NoActiveVm));
    }

    #[test]
    fn test_system_link() {
        let (_dir, layout, registry) = setup();
        link("/usr/lib/jvm/zulu-11", &layout.system_vm_link());
        assert_eq!(resolve(&registry, &layout, None, &NullReporter).unwrap(), 1);
    }

    #[test]
    fn test_user_link_wins_over_system() {
        let (_dir, layout, registry) = setup();
        link("/usr/lib/jvm/zulu-11", &layout.system_vm_link());
        link("/usr/lib/jvm/icedtea-8", &layout.user_vm_link().unwrap());
        assert_eq!(resolve(&registry, &layout, None, &NullReporter).unwrap(), 0);
    }

    #[test]
    fn test_unknown_user_vm_falls_through_to_system() {
        let (_dir, layout, registry) = setup();
        link("/usr/lib/jvm/removed-vm", &layout.user_vm_link().unwrap());
        link("/usr/lib/jvm/icedtea-8", &layout.system_vm_link());
        assert_eq!(resolve(&registry, &layout, None, &NullReporter).unwrap(), 0);
    }

    #[test]
    fn test_regular_file_is_warned_and_skipped() {
        let (_dir, layout, registry) = setup();
        let user = layout.user_vm_link().unwrap();
        std::fs::create_dir_all(user.parent().unwrap()).unwrap();
        std::fs::write(&user, "not a link").unwrap();
        link("/usr/lib/jvm/zulu-11", &layout.system_vm_link());

        let reporter = RecordingReporter::default();
        assert_eq!(resolve(&registry, &layout, None, &reporter).unwrap(), 1);
        assert_eq!(reporter.count("warning"), 1);
        assert!(reporter.contains("is not a symlink"));
    }

    #[test]
    fn test_override_beats_links() {
        let (_dir, layout, registry) = setup();
        link("/usr/lib/jvm/zulu-11", &layout.system_vm_link());
        assert_eq!(
            resolve(&registry, &layout, Some("icedtea"), &NullReporter).unwrap(),
            0
        );
    }

    #[test]
    fn test_unknown_override_is_not_found() {
        let (_dir, layout, registry) = setup();
        link("/usr/lib/jvm/zulu-11", &layout.system_vm_link());
        let err = resolve(&registry, &layout, Some("graal"), &NullReporter).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_empty_override_is_ignored() {
        let (_dir, layout, registry) = setup();
        link("/usr/lib/jvm/zulu-11", &layout.system_vm_link());
        assert_eq!(resolve(&registry, &layout, Some(""), &NullReporter).unwrap(), 1);
    }
}
