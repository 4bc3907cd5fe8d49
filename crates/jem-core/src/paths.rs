use dirs::home_dir;
use std::path::{Path, PathBuf};

/// File name of a package descriptor inside its share directory.
pub const PACKAGE_ENV: &str = "package.env";

/// Filesystem locations read and written by jem.
///
/// Every system path hangs off `root`, which is `/` in normal use. The user
/// VM link lives under the home directory and is absent when no home can be
/// determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
    home: Option<PathBuf>,
}

impl Layout {
    /// The live system rooted at `/`.
    pub fn system() -> Self {
        Self::with_root("/")
    }

    /// Layout rooted at `root`, using the current user's home directory.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            home: home_dir(),
        }
    }

    /// Replace the home directory the user VM link is derived from.
    pub fn with_user_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Filesystem root every system path is relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn sys(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// System configuration directory: /etc/jem
    pub fn config_dir(&self) -> PathBuf {
        self.sys("etc/jem")
    }

    /// System VM selection symlink: /etc/jem/vm
    pub fn system_vm_link(&self) -> PathBuf {
        self.config_dir().join("vm")
    }

    /// VM descriptors: /etc/jem/vms.d
    pub fn vms_dir(&self) -> PathBuf {
        self.config_dir().join("vms.d")
    }

    /// Flat virtual to provider override map: /etc/jem/virtuals
    pub fn virtuals_override(&self) -> PathBuf {
        self.config_dir().join("virtuals")
    }

    /// Package share root: /usr/share
    pub fn share_dir(&self) -> PathBuf {
        self.sys("usr/share")
    }

    /// A package's share directory: /usr/share/<name>
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.share_dir().join(name)
    }

    /// A package's descriptor: /usr/share/<name>/package.env
    pub fn package_env(&self, name: &str) -> PathBuf {
        self.package_dir(name).join(PACKAGE_ENV)
    }

    /// A package's jar directory: /usr/share/<name>/lib
    pub fn package_lib(&self, name: &str) -> PathBuf {
        self.package_dir(name).join("lib")
    }

    /// Virtual descriptors: /usr/share/jem/virtuals
    pub fn virtuals_dir(&self) -> PathBuf {
        self.share_dir().join("jem").join("virtuals")
    }

    /// A single virtual's descriptor.
    pub fn virtual_file(&self, name: &str) -> PathBuf {
        self.virtuals_dir().join(name)
    }

    /// VM installations: /usr/lib/jvm
    pub fn jvm_dir(&self) -> PathBuf {
        self.sys("usr/lib/jvm")
    }

    /// Installation directory of the VM called `name`; selection links point here.
    pub fn vm_home(&self, name: &str) -> PathBuf {
        self.jvm_dir().join(name)
    }

    /// Per-user VM selection symlink: ~/.java/vm
    pub fn user_vm_link(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|h| h.join(".java").join("vm"))
    }

    /// Selection symlinks in lookup order: user first, then system.
    pub fn vm_links(&self) -> Vec<PathBuf> {
        let mut links = Vec::with_capacity(2);
        if let Some(user) = self.user_vm_link() {
            links.push(user);
        }
        links.push(self.system_vm_link());
        links
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::system()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_paths() {
        let layout = Layout::system().with_user_home(None);
        assert_eq!(layout.system_vm_link(), PathBuf::from("/etc/jem/vm"));
        assert_eq!(layout.vms_dir(), PathBuf::from("/etc/jem/vms.d"));
        assert_eq!(
            layout.package_env("ant-core"),
            PathBuf::from("/usr/share/ant-core/package.env")
        );
        assert_eq!(
            layout.virtual_file("jdbc-api"),
            PathBuf::from("/usr/share/jem/virtuals/jdbc-api")
        );
        assert_eq!(layout.vm_home("icedtea-8"), PathBuf::from("/usr/lib/jvm/icedtea-8"));
    }

    #[test]
    fn test_links_without_home() {
        let layout = Layout::system().with_user_home(None);
        assert_eq!(layout.vm_links(), vec![PathBuf::from("/etc/jem/vm")]);
    }

    #[test]
    fn test_links_user_first() {
        let layout = Layout::with_root("/chroot").with_user_home(Some("/home/dev".into()));
        assert_eq!(
            layout.vm_links(),
            vec![
                PathBuf::from("/home/dev/.java/vm"),
                PathBuf::from("/chroot/etc/jem/vm")
            ]
        );
    }
}
