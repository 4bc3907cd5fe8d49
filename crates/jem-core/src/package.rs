//! Installed Java packages and their descriptors.

use crate::error::JemError;
use crate::paths::{Layout, PACKAGE_ENV};
use crate::reporter::Reporter;
use crate::virtuals::{Provider, VirtualResolver};
use jem_schema::{DependKind, DescriptorError, Params};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A package (or virtual) descriptor.
#[derive(Debug, Clone)]
pub struct Package {
    filename: PathBuf,
    name: String,
    params: Params,
}

impl Package {
    pub fn new(filename: impl Into<PathBuf>, name: impl Into<String>, params: Params) -> Self {
        Self {
            filename: filename.into(),
            name: name.into(),
            params,
        }
    }

    /// Parse the descriptor at `filename` for the package called `name`.
    ///
    /// # Errors
    ///
    /// Returns the parser's error when the file cannot be read.
    pub fn load(filename: &Path, name: &str) -> Result<Self, DescriptorError> {
        Ok(Self::new(filename, name, Params::parse(filename)?))
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn description(&self) -> &str {
        self.get("DESCRIPTION").unwrap_or("No Description")
    }

    pub fn classpath(&self) -> Option<&str> {
        self.get("CLASSPATH")
    }

    pub fn library_path(&self) -> Option<&str> {
        self.get("LIBRARY_PATH")
    }

    pub fn target(&self) -> Option<&str> {
        self.get("TARGET")
    }

    /// Raw dependency value of the given kind.
    pub fn depends(&self, kind: DependKind) -> Option<&str> {
        self.get(kind.key())
    }

    /// Virtuals this package provides (`PROVIDES`).
    pub fn provides(&self) -> Vec<&str> {
        self.get("PROVIDES")
            .map(|p| p.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// Result of looking a name up in the store.
#[derive(Debug, Clone)]
pub enum Lookup {
    /// A concrete package, possibly reached through a virtual.
    Package(Package),
    /// The name is a virtual the active VM satisfies.
    ProvidedByVm,
}

/// Which descriptors [`PackageStore::load_all`] scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    /// `package.env` files under the share directory.
    Packages,
    /// Virtual descriptors.
    Virtuals,
}

/// Loads package descriptors, following virtuals to their provider.
///
/// Nothing is cached; every call reads from disk.
#[derive(Debug)]
pub struct PackageStore<'a> {
    layout: &'a Layout,
    virtuals: VirtualResolver<'a>,
}

impl<'a> PackageStore<'a> {
    pub fn new(layout: &'a Layout, virtuals: VirtualResolver<'a>) -> Self {
        Self { layout, virtuals }
    }

    pub fn layout(&self) -> &Layout {
        self.layout
    }

    pub fn virtuals(&self) -> &VirtualResolver<'a> {
        &self.virtuals
    }

    /// Load `name`, resolving it through the virtual resolver when it is
    /// not an installed package but a virtual.
    ///
    /// # Errors
    ///
    /// Returns [`JemError::NotFound`] when `name` is neither, and any error
    /// from virtual resolution.
    pub fn load(&self, name: &str) -> Result<Lookup, JemError> {
        let env = self.layout.package_env(name);
        if env.is_file() {
            return Ok(Lookup::Package(Package::load(&env, name)?));
        }

        if !self.virtuals.is_virtual(name) {
            return Err(JemError::not_found("package", name));
        }

        match self.virtuals.active_provider(name)? {
            Provider::Vm => Ok(Lookup::ProvidedByVm),
            Provider::Package(provider) => {
                debug!(virtual_name = name, provider = %provider, "virtual resolved");
                let env = self.layout.package_env(&provider);
                Ok(Lookup::Package(Package::load(&env, &provider)?))
            }
        }
    }

    /// Like [`PackageStore::load`], but a virtual covered by the VM is an
    /// error since there is no descriptor to return.
    ///
    /// # Errors
    ///
    /// Returns [`JemError::NotFound`] if no package descriptor applies.
    pub fn load_package(&self, name: &str) -> Result<Package, JemError> {
        match self.load(name)? {
            Lookup::Package(pkg) => Ok(pkg),
            Lookup::ProvidedByVm => Err(JemError::not_found(
                "package",
                format!("{name} (provided by the active VM)"),
            )),
        }
    }

    /// Every installed package or virtual, sorted by name.
    ///
    /// Descriptors that fail to load, dangling links included, are reported
    /// and left out.
    pub fn load_all(&self, listing: Listing, reporter: &dyn Reporter) -> Vec<Package> {
        let (root, depth) = match listing {
            Listing::Packages => (self.layout.share_dir(), 2),
            Listing::Virtuals => (self.layout.virtuals_dir(), 1),
        };

        let mut packages: Vec<Package> = WalkDir::new(&root)
            .min_depth(depth)
            .max_depth(depth)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| !e.file_type().is_dir())
            .filter_map(|entry| {
                let path = entry.path();
                let name = match listing {
                    Listing::Packages => {
                        if entry.file_name() != PACKAGE_ENV {
                            return None;
                        }
                        path.parent()?.file_name()?.to_string_lossy().into_owned()
                    }
                    Listing::Virtuals => entry.file_name().to_string_lossy().into_owned(),
                };
                match Package::load(path, &name) {
                    Ok(pkg) => Some(pkg),
                    Err(e) => {
                        reporter.error(&e.to_string());
                        None
                    }
                }
            })
            .collect();

        packages.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(?listing, count = packages.len(), "loaded descriptors");
        packages
    }

    /// Jar file names in the package's `lib` directory, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`JemError::NotFound`] when the package is not installed.
    pub fn jar_names(&self, name: &str) -> Result<Vec<String>, JemError> {
        if !self.layout.package_env(name).is_file() {
            return Err(JemError::not_found("package", name));
        }

        let mut jars: Vec<String> = WalkDir::new(self.layout.package_lib(name))
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| !e.file_type().is_dir())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.ends_with(".jar"))
            .collect();
        jars.sort();
        Ok(jars)
    }
}
