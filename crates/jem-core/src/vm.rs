//! Installed Java VMs.
//!
//! Each VM is described by one file under `vms.d`; the file name is the VM's
//! name and matches its installation directory under `/usr/lib/jvm`.

use crate::error::JemError;
use crate::paths::Layout;
use crate::reporter::Reporter;
use jem_schema::{DescriptorError, Params};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One installed VM descriptor.
#[derive(Debug, Clone)]
pub struct Vm {
    filename: PathBuf,
    name: String,
    params: Params,
}

impl Vm {
    /// Build a VM from an already parsed descriptor.
    pub fn new(filename: impl Into<PathBuf>, params: Params) -> Self {
        let filename = filename.into();
        let name = filename
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            filename,
            name,
            params,
        }
    }

    /// Parse the VM descriptor at `path`.
    ///
    /// # Errors
    ///
    /// Returns the parser's error when the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, DescriptorError> {
        Ok(Self::new(path, Params::parse(path)?))
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    /// Basename of the descriptor, e.g. `icedtea-bin-8`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn version(&self) -> Option<&str> {
        self.get("VERSION")
    }

    pub fn java_home(&self) -> Option<&str> {
        self.get("JAVA_HOME")
    }

    /// Raw `PROVIDES_TYPE`, e.g. `"JDK JRE"`.
    pub fn provides_type(&self) -> Option<&str> {
        self.get("PROVIDES_TYPE")
    }

    /// Java version this VM provides, e.g. `"1.8"` or `"11"`.
    pub fn provides_version(&self) -> Option<&str> {
        self.get("PROVIDES_VERSION")
    }

    /// Marked unsuitable for general runtime use (insecure or end of life).
    pub fn is_build_only(&self) -> bool {
        self.get("BUILD_ONLY").is_some_and(|v| {
            ["true", "yes", "1"]
                .iter()
                .any(|t| v.trim().eq_ignore_ascii_case(t))
        })
    }

    /// Case-insensitive membership of `kind` in `PROVIDES_TYPE`.
    pub fn is_type(&self, kind: &str) -> bool {
        self.provides_type()
            .is_some_and(|types| types.split_whitespace().any(|t| t.eq_ignore_ascii_case(kind)))
    }

    pub fn is_jdk(&self) -> bool {
        self.is_type("JDK")
    }

    pub fn is_jre(&self) -> bool {
        self.is_type("JRE")
    }

    /// Virtuals this VM satisfies by itself (`PROVIDES`).
    pub fn provides(&self) -> Vec<&str> {
        self.get("PROVIDES")
            .map(|p| p.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Whether the VM provides any of `virtuals`.
    pub fn provides_any(&self, virtuals: &[&str]) -> bool {
        self.provides()
            .iter()
            .any(|p| virtuals.iter().any(|v| p.eq_ignore_ascii_case(v)))
    }

    /// Locate executable `exe` in the VM's `PATH` entries.
    ///
    /// # Errors
    ///
    /// Returns [`JemError::NotFound`] when no `PATH` entry contains it.
    pub fn exec_path(&self, exe: &str) -> Result<PathBuf, JemError> {
        self.get("PATH")
            .into_iter()
            .flat_map(|paths| paths.split(':'))
            .filter(|dir| !dir.is_empty())
            .map(|dir| Path::new(dir).join(exe))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| JemError::not_found("executable", format!("{exe} in {}", self.name)))
    }

    /// `<JAVA_HOME>/lib/tools.jar`, when present.
    ///
    /// # Errors
    ///
    /// Returns [`JemError::NotFound`] if the VM has no `JAVA_HOME` or ships
    /// no tools.jar (VMs from Java 9 on do not).
    pub fn tools_jar(&self) -> Result<PathBuf, JemError> {
        let home = self
            .java_home()
            .ok_or_else(|| JemError::not_found("JAVA_HOME", self.name.clone()))?;
        let jar = Path::new(home).join("lib").join("tools.jar");
        if jar.is_file() {
            Ok(jar)
        } else {
            Err(JemError::not_found("tools.jar", jar.display().to_string()))
        }
    }
}

/// All installed VMs, sorted by name.
#[derive(Debug, Clone, Default)]
pub struct VmRegistry {
    vms: Vec<Vm>,
}

impl VmRegistry {
    /// Build a registry from VMs in any order.
    pub fn new(mut vms: Vec<Vm>) -> Self {
        vms.sort_by(|a, b| a.name.cmp(&b.name));
        Self { vms }
    }

    /// Load every descriptor under the layout's `vms.d`.
    ///
    /// A missing directory yields an empty registry. An unreadable directory
    /// or descriptor is reported and skipped.
    pub fn load(layout: &Layout, reporter: &dyn Reporter) -> Self {
        let dir = layout.vms_dir();
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "no VM directory");
                return Self::default();
            }
            Err(e) => {
                let msg = if e.kind() == std::io::ErrorKind::PermissionDenied {
                    format!("VMs config directory not readable: {}", dir.display())
                } else {
                    format!("Invalid VMs configuration directory {}: {e}", dir.display())
                };
                reporter.error(&msg);
                return Self::default();
            }
        };

        let mut vms = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            match Vm::load(&path) {
                Ok(vm) => vms.push(vm),
                Err(e) => reporter.error(&e.to_string()),
            }
        }

        debug!(count = vms.len(), "loaded VMs");
        Self::new(vms)
    }

    pub fn len(&self) -> usize {
        self.vms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vms.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Vm> {
        self.vms.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vm> {
        self.vms.iter()
    }

    /// Find a VM by 1-based index, file name, name prefix or `JAVA_HOME`.
    ///
    /// A single digit, or a token whose second character is a digit, is read
    /// as a 1-based index first. If it is out of range the token is matched
    /// by name instead, so `"11"` still finds `"11.0.1"` in a short list.
    /// Otherwise VMs are checked in order, each against the full file name,
    /// then a case-insensitive prefix of its name, then its `JAVA_HOME`.
    pub fn find(&self, token: &str) -> Option<usize> {
        if token.is_empty() {
            return None;
        }

        let bytes = token.as_bytes();
        let index = match bytes {
            [d] if d.is_ascii_digit() => leading_number(token),
            [_, d, ..] if d.is_ascii_digit() => leading_number(token),
            _ => None,
        };
        if let Some(n) = index.filter(|n| (1..=self.vms.len()).contains(n)) {
            return Some(n - 1);
        }

        self.vms.iter().position(|vm| {
            vm.filename
                .to_string_lossy()
                .eq_ignore_ascii_case(token)
                || has_prefix_ignore_case(&vm.name, token)
                || vm.java_home().is_some_and(|h| h.eq_ignore_ascii_case(token))
        })
    }

    /// Like [`VmRegistry::find`] but returns the VM itself.
    pub fn find_vm(&self, token: &str) -> Option<&Vm> {
        self.find(token).and_then(|i| self.vms.get(i))
    }
}

impl<'a> IntoIterator for &'a VmRegistry {
    type Item = &'a Vm;
    type IntoIter = std::slice::Iter<'a, Vm>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn leading_number(token: &str) -> Option<usize> {
    let end = token
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(token.len());
    token[..end].parse().ok()
}

fn has_prefix_ignore_case(name: &str, prefix: &str) -> bool {
    name.len() >= prefix.len()
        && name.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
