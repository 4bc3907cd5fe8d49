//! Virtual packages.
//!
//! A virtual names a capability (`jdbc-api`, `java-scripting`) rather than a
//! package. Its descriptor lists candidate providers in `PROVIDERS` and may
//! carry a `VM` requirement: when the active VM is at least that version the
//! VM itself satisfies the virtual and no package is needed.

use crate::error::JemError;
use crate::paths::Layout;
use jem_schema::{DescriptorError, Params};
use std::cmp::Ordering;
use tracing::debug;

/// Access to the active VM's provided Java version.
///
/// Passed into the resolver instead of reaching for global state, so virtual
/// resolution and VM selection do not depend on each other directly.
pub trait ActiveVmSource {
    /// `PROVIDES_VERSION` of the active VM, if it declares one.
    ///
    /// # Errors
    ///
    /// Returns [`JemError::NoActiveVm`] when no VM is selected.
    fn provided_version(&self) -> Result<Option<String>, JemError>;
}

/// What satisfies a virtual on this system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    /// The active VM provides it; no package substitution is needed.
    Vm,
    /// The first installed candidate package.
    Package(String),
}

/// Resolves virtual names to provider packages.
pub struct VirtualResolver<'a> {
    layout: &'a Layout,
    vm: &'a dyn ActiveVmSource,
}

impl std::fmt::Debug for VirtualResolver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualResolver")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl<'a> VirtualResolver<'a> {
    pub fn new(layout: &'a Layout, vm: &'a dyn ActiveVmSource) -> Self {
        Self { layout, vm }
    }

    /// Whether `name` has a virtual descriptor.
    pub fn is_virtual(&self, name: &str) -> bool {
        self.layout.virtual_file(name).is_file()
    }

    /// Parse the descriptor of virtual `name`.
    ///
    /// # Errors
    ///
    /// Returns the parser's error when the descriptor cannot be read.
    pub fn load(&self, name: &str) -> Result<Params, DescriptorError> {
        Params::parse(&self.layout.virtual_file(name))
    }

    /// Candidate providers for one or more comma separated virtuals.
    ///
    /// Candidates keep descriptor order and are concatenated across the
    /// requested virtuals. Virtuals without a descriptor contribute nothing.
    /// An empty result means the active VM already covers every request.
    ///
    /// # Errors
    ///
    /// Fails when a descriptor exists but cannot be read, or when a `VM`
    /// requirement has to be checked and no VM is active.
    pub fn providers(&self, names: &str, ignore_vm_gate: bool) -> Result<Vec<String>, JemError> {
        let mut providers = Vec::new();

        for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let params = match self.load(name) {
                Ok(params) => params,
                Err(DescriptorError::NotFound(_)) => {
                    debug!(virtual_name = name, "no virtual descriptor");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if !ignore_vm_gate {
                if let Some(required) = params.get("VM") {
                    if self.vm_satisfies(required)? {
                        debug!(virtual_name = name, required, "provided by the active VM");
                        continue;
                    }
                }
            }

            providers.extend(
                params
                    .get("PROVIDERS")
                    .unwrap_or_default()
                    .split_whitespace()
                    .map(str::to_string),
            );
        }

        Ok(providers)
    }

    /// The provider actually used for virtual `name`.
    ///
    /// The override map wins when it has an entry; otherwise the candidates
    /// come from [`VirtualResolver::providers`]. The first candidate with an
    /// installed package descriptor is returned.
    ///
    /// # Errors
    ///
    /// Returns [`JemError::NoVirtualProvider`] when candidates exist but none
    /// is installed.
    pub fn active_provider(&self, name: &str) -> Result<Provider, JemError> {
        let candidates = match self.override_for(name)? {
            Some(list) => {
                debug!(virtual_name = name, list = %list, "provider from override map");
                list.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect()
            }
            None => self.providers(name, false)?,
        };

        if candidates.is_empty() {
            return Ok(Provider::Vm);
        }

        candidates
            .into_iter()
            .find(|c| self.layout.package_env(c).is_file())
            .map(Provider::Package)
            .ok_or_else(|| JemError::NoVirtualProvider(name.to_string()))
    }

    fn override_for(&self, name: &str) -> Result<Option<String>, JemError> {
        match Params::parse(&self.layout.virtuals_override()) {
            Ok(map) => Ok(map.get(name).map(str::to_string)),
            Err(DescriptorError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn vm_satisfies(&self, required: &str) -> Result<bool, JemError> {
        let Some(required) = JavaVersion::parse(required) else {
            return Ok(false);
        };
        let provided = self.vm.provided_version()?;
        Ok(provided
            .as_deref()
            .and_then(JavaVersion::parse)
            .is_some_and(|p| p >= required))
    }
}

/// Numeric Java version used by the `VM` gate.
///
/// Leading non-digits are skipped (`>=virtual/jdk-1.6` reads as `1.6`) and
/// the legacy `1.x` scheme is folded onto the modern one, so `1.8` and `8`
/// compare equal and `11` is newer than both.
#[derive(Debug, Clone, PartialEq, Eq)]
struct JavaVersion(Vec<u64>);

impl JavaVersion {
    fn parse(text: &str) -> Option<Self> {
        let start = text.find(|c: char| c.is_ascii_digit())?;
        let rest = &text[start..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());

        let mut parts: Vec<u64> = rest[..end]
            .split('.')
            .map_while(|p| p.parse().ok())
            .collect();
        if parts.len() > 1 && parts[0] == 1 {
            parts.remove(0);
        }
        while parts.len() > 1 && parts.last() == Some(&0) {
            parts.pop();
        }
        (!parts.is_empty()).then_some(Self(parts))
    }
}

impl PartialOrd for JavaVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for JavaVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}
