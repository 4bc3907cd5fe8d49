//! Per-invocation environment context.
//!
//! `Env` owns the layout and reporter for one run and loads the VM registry,
//! the active VM and the installed package list the first time each is asked
//! for. Nothing is shared between `Env` values.

use crate::active;
use crate::closure;
use crate::error::JemError;
use crate::package::{Listing, Lookup, Package, PackageStore};
use crate::paths::Layout;
use crate::reporter::Reporter;
use crate::select::{self, Identity, Scope};
use crate::virtuals::{ActiveVmSource, Provider, VirtualResolver};
use crate::vm::{Vm, VmRegistry};
use jem_schema::DependKind;
use std::cell::OnceCell;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Lazily populated view of the installed VMs and packages.
pub struct Env {
    layout: Layout,
    reporter: Arc<dyn Reporter>,
    vm_override: Option<String>,
    vms: OnceCell<VmRegistry>,
    active: OnceCell<Option<usize>>,
    packages: OnceCell<Vec<Package>>,
}

impl std::fmt::Debug for Env {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Env")
            .field("layout", &self.layout)
            .field("vm_override", &self.vm_override)
            .finish_non_exhaustive()
    }
}

impl Env {
    pub fn new(layout: Layout, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            layout,
            reporter,
            vm_override: None,
            vms: OnceCell::new(),
            active: OnceCell::new(),
            packages: OnceCell::new(),
        }
    }

    /// Use `token` as the active VM instead of the selection links.
    /// Empty tokens are ignored.
    pub fn with_vm_override(mut self, token: Option<String>) -> Self {
        self.vm_override = token.filter(|t| !t.is_empty());
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }

    /// Every installed VM, loaded on first use.
    pub fn vms(&self) -> &VmRegistry {
        self.vms
            .get_or_init(|| VmRegistry::load(&self.layout, self.reporter.as_ref()))
    }

    /// The active VM.
    ///
    /// # Errors
    ///
    /// Returns [`JemError::NoActiveVm`] when nothing is selected, or
    /// [`JemError::NotFound`] when the override names an unknown VM.
    pub fn active_vm(&self) -> Result<&Vm, JemError> {
        if let Some(cached) = self.active.get() {
            return cached
                .and_then(|i| self.vms().get(i))
                .ok_or(JemError::NoActiveVm);
        }

        let resolved = active::resolve(
            self.vms(),
            &self.layout,
            self.vm_override.as_deref(),
            self.reporter.as_ref(),
        );
        match resolved {
            Ok(index) => {
                let _ = self.active.set(Some(index));
                self.vms().get(index).ok_or(JemError::NoActiveVm)
            }
            Err(JemError::NoActiveVm) => {
                let _ = self.active.set(None);
                Err(JemError::NoActiveVm)
            }
            Err(e) => Err(e),
        }
    }

    /// Look a VM up by index, name or `JAVA_HOME`.
    ///
    /// # Errors
    ///
    /// Returns [`JemError::NotFound`] when nothing matches.
    pub fn find_vm(&self, token: &str) -> Result<&Vm, JemError> {
        self.vms()
            .find_vm(token)
            .ok_or_else(|| JemError::not_found("VM", token))
    }

    /// Point the `scope` selection link at the VM named by `token`.
    ///
    /// # Errors
    ///
    /// Returns [`JemError::NotFound`] for an unknown VM and any error from
    /// [`select::select_vm`].
    pub fn set_vm(
        &mut self,
        token: &str,
        scope: Scope,
        identity: &dyn Identity,
    ) -> Result<PathBuf, JemError> {
        let vm = self.find_vm(token)?;
        let link = select::select_vm(&self.layout, vm, scope, identity, self.reporter.as_ref())?;
        self.active.take();
        Ok(link)
    }

    /// Value of parameter `name` in the active VM.
    ///
    /// # Errors
    ///
    /// Returns [`JemError::NoActiveVm`] or [`JemError::NotFound`] when the
    /// VM does not set `name`.
    pub fn vm_value(&self, name: &str) -> Result<String, JemError> {
        let vm = self.active_vm()?;
        vm.get(name)
            .map(str::to_string)
            .ok_or_else(|| JemError::not_found("variable", format!("{name} in {}", vm.name())))
    }

    pub fn virtuals(&self) -> VirtualResolver<'_> {
        VirtualResolver::new(&self.layout, self)
    }

    pub fn store(&self) -> PackageStore<'_> {
        PackageStore::new(&self.layout, self.virtuals())
    }

    /// Installed packages sorted by name, loaded on first use.
    pub fn installed_packages(&self) -> &[Package] {
        self.packages
            .get_or_init(|| self.store().load_all(Listing::Packages, self.reporter.as_ref()))
    }

    /// Virtual descriptors sorted by name.
    pub fn installed_virtuals(&self) -> Vec<Package> {
        self.store()
            .load_all(Listing::Virtuals, self.reporter.as_ref())
    }

    /// Candidate providers for comma separated virtuals.
    ///
    /// # Errors
    ///
    /// See [`VirtualResolver::providers`].
    pub fn virtual_providers(&self, names: &str, ignore_vm_gate: bool) -> Result<Vec<String>, JemError> {
        self.virtuals().providers(names, ignore_vm_gate)
    }

    /// Provider actually used for virtual `name`.
    ///
    /// # Errors
    ///
    /// See [`VirtualResolver::active_provider`].
    pub fn active_provider(&self, name: &str) -> Result<Provider, JemError> {
        self.virtuals().active_provider(name)
    }

    /// Classpath for comma separated packages, `:` joined.
    ///
    /// Virtuals the active VM covers contribute nothing.
    ///
    /// # Errors
    ///
    /// The first package that fails aborts the whole result.
    pub fn classpath(&self, names: &str, with_dependencies: bool) -> Result<String, JemError> {
        let store = self.store();
        let mut entries = Vec::new();

        for name in split_list(names) {
            let pkg = match store.load(name)? {
                Lookup::Package(pkg) => pkg,
                Lookup::ProvidedByVm => {
                    debug!(package = name, "provided by the active VM");
                    continue;
                }
            };
            if with_dependencies {
                entries.push(closure::classpath(&store, &pkg, DependKind::Depend)?);
            } else if let Some(cp) = pkg.classpath() {
                entries.push(cp.to_string());
            }
        }

        entries.retain(|e| !e.is_empty());
        Ok(entries.join(":"))
    }

    /// Values of comma separated `params` in comma separated `packages`,
    /// package by package. Parameters a package does not set are skipped.
    ///
    /// # Errors
    ///
    /// Fails when any package cannot be loaded.
    pub fn package_values(&self, packages: &str, params: &str) -> Result<Vec<String>, JemError> {
        let store = self.store();
        let mut values = Vec::new();

        for name in split_list(packages) {
            let Lookup::Package(pkg) = store.load(name)? else {
                continue;
            };
            values.extend(
                split_list(params)
                    .filter_map(|param| pkg.get(param))
                    .map(str::to_string),
            );
        }

        Ok(values)
    }
}

impl ActiveVmSource for Env {
    fn provided_version(&self) -> Result<Option<String>, JemError> {
        Ok(self.active_vm()?.provides_version().map(str::to_string))
    }
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::tests::{add_virtual, install};
    use crate::reporter::RecordingReporter;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    struct Unprivileged;

    impl Identity for Unprivileged {
        fn is_privileged(&self) -> bool {
            false
        }
    }

    fn setup() -> (TempDir, Layout, Arc<RecordingReporter>) {
        let dir = tempfile::tempdir().unwrap();
        let layout =
            Layout::with_root(dir.path()).with_user_home(Some(dir.path().join("home/bob")));
        std::fs::create_dir_all(layout.vms_dir()).unwrap();
        std::fs::write(
            layout.vms_dir().join("icedtea-8"),
            "VERSION=\"IcedTea 3.12\"\nJAVA_HOME=/usr/lib/jvm/icedtea-8\nPROVIDES_VERSION=1.8\n",
        )
        .unwrap();
        std::fs::write(
            layout.vms_dir().join("openjdk-11"),
            "VERSION=\"OpenJDK 11\"\nJAVA_HOME=/usr/lib/jvm/openjdk-11\nPROVIDES_VERSION=11\n",
        )
        .unwrap();
        (dir, layout, Arc::new(RecordingReporter::default()))
    }

    fn select_system(layout: &Layout, name: &str) {
        let link = layout.system_vm_link();
        std::fs::create_dir_all(link.parent().unwrap()).unwrap();
        symlink(layout.vm_home(name), link).unwrap();
    }

    #[test]
    fn test_no_active_vm() {
        let (_dir, layout, reporter) = setup();
        let env = Env::new(layout, reporter);
        assert_eq!(env.vms().len(), 2);
        assert!(matches!(env.active_vm().unwrap_err(), JemError::NoActiveVm));
        assert!(matches!(env.vm_value("JAVA_HOME").unwrap_err(), JemError::NoActiveVm));
    }

    #[test]
    fn test_active_vm_from_link_and_override() {
        let (_dir, layout, reporter) = setup();
        select_system(&layout, "icedtea-8");

        let env = Env::new(layout.clone(), reporter.clone());
        assert_eq!(env.active_vm().unwrap().name(), "icedtea-8");
        assert_eq!(env.vm_value("JAVA_HOME").unwrap(), "/usr/lib/jvm/icedtea-8");
        assert!(env.vm_value("BOOTCLASSPATH").unwrap_err().is_not_found());

        let env = Env::new(layout, reporter).with_vm_override(Some("openjdk".to_string()));
        assert_eq!(env.active_vm().unwrap().name(), "openjdk-11");
    }

    #[test]
    fn test_set_user_vm_updates_active() {
        let (_dir, layout, reporter) = setup();
        select_system(&layout, "icedtea-8");

        let mut env = Env::new(layout, reporter.clone());
        assert_eq!(env.active_vm().unwrap().name(), "icedtea-8");
        env.set_vm("openjdk-11", Scope::User, &Unprivileged).unwrap();
        assert_eq!(env.active_vm().unwrap().name(), "openjdk-11");
        assert!(reporter.contains("Now using openjdk-11 as your user JVM"));

        assert!(env.set_vm("graal", Scope::User, &Unprivileged).unwrap_err().is_not_found());
    }

    #[test]
    fn test_version_gate_through_env() {
        let (_dir, layout, reporter) = setup();
        select_system(&layout, "openjdk-11");
        add_virtual(&layout, "jaf", "PROVIDERS=gnu-jaf\nVM=1.6\n");
        install(&layout, "gnu-jaf", "CLASSPATH=/jaf.jar\n");

        let env = Env::new(layout, reporter);
        assert!(env.virtual_providers("jaf", false).unwrap().is_empty());
        assert_eq!(env.virtual_providers("jaf", true).unwrap(), vec!["gnu-jaf"]);
        assert_eq!(env.active_provider("jaf").unwrap(), Provider::Vm);
        assert_eq!(env.classpath("jaf", false).unwrap(), "");
    }

    #[test]
    fn test_classpath_for_several_packages() {
        let (_dir, layout, reporter) = setup();
        install(&layout, "a", "CLASSPATH=/a.jar\nDEPEND=c\n");
        install(&layout, "b", "CLASSPATH=/b.jar\n");
        install(&layout, "c", "CLASSPATH=/c.jar\n");

        let env = Env::new(layout, reporter);
        assert_eq!(env.classpath("a,b", false).unwrap(), "/a.jar:/b.jar");
        assert_eq!(env.classpath("a,b", true).unwrap(), "/c.jar:/a.jar:/b.jar");
        assert!(env.classpath("a,missing", false).unwrap_err().is_not_found());
    }

    #[test]
    fn test_package_values_and_listing() {
        let (_dir, layout, reporter) = setup();
        install(&layout, "b", "DESCRIPTION=B\nLIBRARY_PATH=/usr/lib/b\n");
        install(&layout, "a", "DESCRIPTION=A\n");

        let env = Env::new(layout, reporter);
        assert_eq!(
            env.package_values("a,b", "DESCRIPTION,LIBRARY_PATH").unwrap(),
            vec!["A", "B", "/usr/lib/b"]
        );
        let names: Vec<_> = env.installed_packages().iter().map(Package::name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_installed_virtuals() {
        let (_dir, layout, reporter) = setup();
        add_virtual(&layout, "jdbc-api", "PROVIDERS=\"jdbc-mysql jdbc-postgresql\"\n");
        add_virtual(&layout, "jaf", "PROVIDERS=gnu-jaf\n");

        let env = Env::new(layout, reporter.clone());
        let virtuals = env.installed_virtuals();
        let names: Vec<_> = virtuals.iter().map(Package::name).collect();
        assert_eq!(names, vec!["jaf", "jdbc-api"]);
        assert_eq!(virtuals[1].get("PROVIDERS"), Some("jdbc-mysql jdbc-postgresql"));
        assert_eq!(reporter.count("error"), 0);
    }
}
