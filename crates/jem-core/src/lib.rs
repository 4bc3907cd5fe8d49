//! Resolution engine for jem.
//!
//! Everything here works from descriptor files on disk: which Java VM is
//! active, which package satisfies a virtual, and what classpath a package
//! needs once its dependencies are followed. Output formatting and argument
//! handling live in `jem-cli`; the engine talks back to it only through the
//! [`Reporter`] trait.

pub mod active;
pub mod closure;
pub mod context;
pub mod error;
pub mod package;
pub mod paths;
pub mod reporter;
pub mod select;
pub mod virtuals;
pub mod vm;

pub use closure::{Closure, Dependency};
pub use context::Env;
pub use error::JemError;
pub use jem_schema::{DependKind, Params};
pub use package::{Listing, Lookup, Package, PackageStore};
pub use paths::Layout;
pub use reporter::{NullReporter, Reporter};
pub use select::{Identity, ProcessIdentity, Scope};
pub use virtuals::{ActiveVmSource, Provider, VirtualResolver};
pub use vm::{Vm, VmRegistry};

/// Environment variable naming a VM to use instead of the selected one.
pub const VM_OVERRIDE_VAR: &str = "JEM_VM";

/// Environment variable prefixing every system path, for chroots and tests.
pub const ROOT_VAR: &str = "JEM_ROOT";
