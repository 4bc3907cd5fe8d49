//! Dependency closure and classpath assembly.
//!
//! A closure starts from one package and follows one kind of dependency
//! transitively. Each package's own dependency list is expanded at most once
//! per run, which is what keeps cyclic declarations finite.

use crate::error::JemError;
use crate::package::{Lookup, Package, PackageStore};
use jem_schema::{DependKind, DependToken};
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use tracing::{debug, trace};

/// One package reached by the closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Concrete package name. A virtual is recorded under its provider;
    /// a name that failed to load is kept as declared.
    pub name: String,
    /// Jars the closure needs from this package. Empty means the whole
    /// package classpath.
    pub jars: Vec<String>,
    /// Whether this package's own dependencies have been merged.
    pub visited: bool,
}

impl Dependency {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            jars: Vec::new(),
            visited: false,
        }
    }
}

/// Transitive dependencies of a root package, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct Closure {
    root: String,
    deps: Vec<Dependency>,
    index: HashMap<String, usize>,
}

impl Closure {
    /// Follow `kind` dependencies from `root` until nothing new turns up.
    ///
    /// Packages that cannot be loaded while expanding stay in the closure
    /// unexpanded; [`classpath`] is where a missing package becomes fatal.
    pub fn resolve(store: &PackageStore<'_>, root: &Package, kind: DependKind) -> Self {
        let mut closure = Self {
            root: root.name().to_string(),
            ..Self::default()
        };
        closure.merge(store, root, kind);

        let mut pending: VecDeque<usize> = (0..closure.deps.len()).collect();
        while let Some(i) = pending.pop_front() {
            if closure.deps[i].visited {
                continue;
            }
            closure.deps[i].visited = true;

            let name = closure.deps[i].name.clone();
            let pkg = match store.load(&name) {
                Ok(Lookup::Package(pkg)) => pkg,
                Ok(Lookup::ProvidedByVm) => {
                    trace!(dependency = %name, "provided by the active VM");
                    continue;
                }
                Err(e) => {
                    debug!(dependency = %name, error = %e, "not expanding dependency");
                    continue;
                }
            };

            let before = closure.deps.len();
            closure.merge(store, &pkg, kind);
            pending.extend(before..closure.deps.len());
        }

        debug!(root = %closure.root, %kind, count = closure.deps.len(), "closure resolved");
        closure
    }

    /// Merge the `kind` tokens declared by `pkg`.
    ///
    /// Each token is looked up first so that a virtual and its provider share
    /// one entry. Tokens the active VM satisfies are dropped. A jar scoped
    /// token adds its jar unless the jar already appears on `pkg`'s own
    /// classpath.
    fn merge(&mut self, store: &PackageStore<'_>, pkg: &Package, kind: DependKind) {
        let Some(value) = pkg.depends(kind) else {
            return;
        };
        let own = pkg.classpath().unwrap_or_default();

        for token in DependToken::split(value) {
            let key = match store.load(&token.package) {
                Ok(Lookup::Package(dep)) => dep.name().to_string(),
                Ok(Lookup::ProvidedByVm) => {
                    trace!(dependency = %token.package, "provided by the active VM");
                    continue;
                }
                Err(e) => {
                    debug!(dependency = %token.package, error = %e, "keeping unresolved dependency");
                    token.package.clone()
                }
            };
            if key == self.root {
                continue;
            }

            let i = match self.index.get(&key) {
                Some(&i) => i,
                None => {
                    self.deps.push(Dependency::new(&key));
                    self.index.insert(key, self.deps.len() - 1);
                    self.deps.len() - 1
                }
            };

            let Some(jar) = token.jar else { continue };
            if on_classpath(own, &jar) {
                trace!(package = pkg.name(), jar = %jar, "jar already on own classpath");
                continue;
            }
            let jars = &mut self.deps[i].jars;
            if !jars.contains(&jar) {
                jars.push(jar);
            }
        }
    }

    /// Name of the package the closure started from.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Entry for a concrete package name.
    pub fn get(&self, name: &str) -> Option<&Dependency> {
        self.index.get(name).map(|&i| &self.deps[i])
    }

    /// Number of dependencies, excluding the root.
    pub fn len(&self) -> usize {
        self.deps.len()
    }

    /// True when the root needs no other package.
    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    /// Dependencies in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, Dependency> {
        self.deps.iter()
    }
}

impl<'a> IntoIterator for &'a Closure {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Classpath of `root` with its `kind` dependencies in front.
///
/// Jar scoped entries come first as `<share>/<pkg>/lib/<jar>`, then the
/// classpaths of whole package dependencies, then `root`'s own classpath.
/// Virtuals are followed to their provider and contribute nothing when the
/// active VM covers them.
///
/// # Errors
///
/// Returns [`JemError::DependencyMissing`] when any dependency cannot be
/// loaded. Nothing is returned in that case, not even a partial classpath.
pub fn classpath(
    store: &PackageStore<'_>,
    root: &Package,
    kind: DependKind,
) -> Result<String, JemError> {
    let closure = Closure::resolve(store, root, kind);

    let mut jars = Vec::new();
    let mut whole = Vec::new();
    for dep in &closure {
        let pkg = match store.load(&dep.name) {
            Ok(Lookup::Package(pkg)) => pkg,
            Ok(Lookup::ProvidedByVm) => continue,
            Err(e) => {
                debug!(dependency = %dep.name, error = %e, "dependency failed to load");
                return Err(JemError::DependencyMissing {
                    package: root.name().to_string(),
                    dependency: dep.name.clone(),
                });
            }
        };

        if dep.jars.is_empty() {
            if let Some(cp) = pkg.classpath() {
                whole.push(cp.to_string());
            }
        } else {
            let lib = store.layout().package_lib(pkg.name());
            jars.extend(
                dep.jars
                    .iter()
                    .map(|jar| lib.join(jar).display().to_string()),
            );
        }
    }

    let own = root.classpath().map(str::to_string);
    Ok(jars
        .into_iter()
        .chain(whole)
        .chain(own)
        .filter(|entry| !entry.is_empty())
        .collect::<Vec<_>>()
        .join(":"))
}

fn on_classpath(classpath: &str, jar: &str) -> bool {
    classpath
        .split(':')
        .filter_map(|entry| Path::new(entry).file_name())
        .any(|name| name == jar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::tests::{FixedVm, add_virtual, install, root};
    use crate::paths::Layout;
    use crate::virtuals::VirtualResolver;

    fn store<'a>(layout: &'a Layout, vm: &'a FixedVm) -> PackageStore<'a> {
        PackageStore::new(layout, VirtualResolver::new(layout, vm))
    }

    #[test]
    fn test_cycle_terminates() {
        let (_dir, layout) = root();
        install(&layout, "x", "DEPEND=y\nCLASSPATH=/x.jar\n");
        install(&layout, "y", "DEPEND=x\nCLASSPATH=/y.jar\n");
        let vm = FixedVm(None);
        let store = store(&layout, &vm);

        let x = store.load_package("x").unwrap();
        let closure = Closure::resolve(&store, &x, DependKind::Depend);
        assert_eq!(closure.len(), 1);
        let y = closure.get("y").unwrap();
        assert!(y.visited);
        assert!(closure.get("x").is_none());

        assert_eq!(
            classpath(&store, &x, DependKind::Depend).unwrap(),
            "/y.jar:/x.jar"
        );
    }

    #[test]
    fn test_transitive_and_shared() {
        let (_dir, layout) = root();
        install(&layout, "app", "DEPEND=a:b\n");
        install(&layout, "a", "DEPEND=c\nCLASSPATH=/a.jar\n");
        install(&layout, "b", "DEPEND=c\nCLASSPATH=/b.jar\n");
        install(&layout, "c", "CLASSPATH=/c.jar\n");
        let vm = FixedVm(None);
        let store = store(&layout, &vm);

        let app = store.load_package("app").unwrap();
        let closure = Closure::resolve(&store, &app, DependKind::Depend);
        let names: Vec<_> = closure.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(closure.iter().all(|d| d.visited));
    }

    #[test]
    fn test_jar_scope_is_precise() {
        let (_dir, layout) = root();
        install(&layout, "app", "DEPEND=foo@bar.jar\n");
        install(&layout, "foo", "CLASSPATH=/usr/share/foo/lib/bar.jar:/usr/share/foo/lib/baz.jar\n");
        let vm = FixedVm(None);
        let store = store(&layout, &vm);

        let app = store.load_package("app").unwrap();
        let closure = Closure::resolve(&store, &app, DependKind::Depend);
        assert_eq!(closure.get("foo").unwrap().jars, vec!["bar.jar"]);

        let cp = classpath(&store, &app, DependKind::Depend).unwrap();
        assert_eq!(
            cp,
            layout.package_lib("foo").join("bar.jar").display().to_string()
        );
    }

    #[test]
    fn test_end_to_end_order() {
        let (_dir, layout) = root();
        install(&layout, "app", "DEPEND=\"lib1:lib2@x.jar\"\nCLASSPATH=/app.jar\n");
        install(&layout, "lib1", "CLASSPATH=/a/lib1.env\n");
        install(&layout, "lib2", "CLASSPATH=/other.jar\n");
        let vm = FixedVm(None);
        let store = store(&layout, &vm);

        let app = store.load_package("app").unwrap();
        let expected = format!(
            "{}:/a/lib1.env:/app.jar",
            layout.package_lib("lib2").join("x.jar").display()
        );
        assert_eq!(classpath(&store, &app, DependKind::Depend).unwrap(), expected);
    }

    #[test]
    fn test_missing_dependency_aborts() {
        let (_dir, layout) = root();
        install(&layout, "app", "DEPEND=\"lib1:lib2@x.jar\"\nCLASSPATH=/app.jar\n");
        install(&layout, "lib2", "CLASSPATH=/other.jar\n");
        let vm = FixedVm(None);
        let store = store(&layout, &vm);

        let app = store.load_package("app").unwrap();
        let err = classpath(&store, &app, DependKind::Depend).unwrap_err();
        assert!(matches!(
            err,
            JemError::DependencyMissing { ref dependency, .. } if dependency == "lib1"
        ));
    }

    #[test]
    fn test_jar_already_on_own_classpath_is_skipped() {
        let (_dir, layout) = root();
        install(&layout, "app", "DEPEND=foo@bar.jar\nCLASSPATH=/opt/bar.jar\n");
        install(&layout, "foo", "CLASSPATH=/foo.jar\n");
        let vm = FixedVm(None);
        let store = store(&layout, &vm);

        let app = store.load_package("app").unwrap();
        let closure = Closure::resolve(&store, &app, DependKind::Depend);
        let foo = closure.get("foo").unwrap();
        assert!(foo.jars.is_empty());
    }

    #[test]
    fn test_dependency_kind_is_respected() {
        let (_dir, layout) = root();
        install(&layout, "app", "DEPEND=a\nBUILD_DEPEND=b\n");
        install(&layout, "a", "CLASSPATH=/a.jar\n");
        install(&layout, "b", "CLASSPATH=/b.jar\n");
        let vm = FixedVm(None);
        let store = store(&layout, &vm);

        let app = store.load_package("app").unwrap();
        assert_eq!(classpath(&store, &app, DependKind::BuildDepend).unwrap(), "/b.jar");
        assert_eq!(classpath(&store, &app, DependKind::Depend).unwrap(), "/a.jar");
    }

    #[test]
    fn test_virtual_dependency_follows_provider() {
        let (_dir, layout) = root();
        install(&layout, "app", "DEPEND=jdbc-api:jaf\n");
        add_virtual(&layout, "jdbc-api", "PROVIDERS=jdbc-postgresql\n");
        add_virtual(&layout, "jaf", "PROVIDERS=gnu-jaf\nVM=1.6\n");
        install(&layout, "jdbc-postgresql", "CLASSPATH=/pg.jar\n");
        let vm = FixedVm(Some("1.8"));
        let store = store(&layout, &vm);

        let app = store.load_package("app").unwrap();
        assert_eq!(classpath(&store, &app, DependKind::Depend).unwrap(), "/pg.jar");
    }

    #[test]
    fn test_virtual_and_provider_share_one_entry() {
        let (_dir, layout) = root();
        install(&layout, "app", "DEPEND=jdbc-api:jdbc-postgresql\nCLASSPATH=/app.jar\n");
        add_virtual(&layout, "jdbc-api", "PROVIDERS=jdbc-postgresql\n");
        install(&layout, "jdbc-postgresql", "DEPEND=util\nCLASSPATH=/pg.jar\n");
        install(&layout, "util", "CLASSPATH=/util.jar\n");
        let vm = FixedVm(None);
        let store = store(&layout, &vm);

        let app = store.load_package("app").unwrap();
        let closure = Closure::resolve(&store, &app, DependKind::Depend);
        let names: Vec<_> = closure.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["jdbc-postgresql", "util"]);
        assert!(closure.get("jdbc-api").is_none());

        assert_eq!(
            classpath(&store, &app, DependKind::Depend).unwrap(),
            "/pg.jar:/util.jar:/app.jar"
        );
    }

    #[test]
    fn test_vm_provided_virtual_gets_no_entry() {
        let (_dir, layout) = root();
        install(&layout, "app", "DEPEND=jaf\n");
        add_virtual(&layout, "jaf", "PROVIDERS=gnu-jaf\nVM=1.6\n");
        let vm = FixedVm(Some("1.8"));
        let store = store(&layout, &vm);

        let app = store.load_package("app").unwrap();
        let closure = Closure::resolve(&store, &app, DependKind::Depend);
        assert!(closure.is_empty());
    }
}
