//! jem - Java environment manager
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Command line front end for `jem-core`: picks the active Java VM, looks
//! values up in VM and package descriptors, and prints classpaths for
//! installed Java packages.
//!
//! # Filesystem Layout
//!
//! ```text
//! /etc/jem/
//! ├── vm          # System VM selection symlink
//! ├── vms.d/      # One descriptor per installed VM
//! └── virtuals    # Optional virtual -> provider overrides
//! /usr/share/
//! ├── <pkg>/package.env
//! ├── <pkg>/lib/*.jar
//! └── jem/virtuals/<virtual>
//! ~/.java/vm      # User VM selection symlink
//! ```

pub mod cmd;
pub mod ui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "jem")]
#[command(author, version, about = "jem - Java environment manager")]
pub struct Cli {
    /// Disable color output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use this VM instead of the selected one when returning information
    #[arg(long, global = true, env = jem_core::VM_OVERRIDE_VAR, value_name = "VM")]
    pub active_vm: Option<String>,

    /// Filesystem root all system paths are resolved against
    #[arg(long, global = true, env = jem_core::ROOT_VAR, value_name = "DIR")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List available Java VMs
    #[command(alias = "list-available-vms")]
    ListVms,
    /// Print the active Java VM
    ShowActiveVm,
    /// Set the default Java VM for the system
    SetSystemVm {
        /// VM name, number from list-vms, or JAVA_HOME
        vm: String,
    },
    /// Set the default Java VM for the user
    SetUserVm {
        /// VM name, number from list-vms, or JAVA_HOME
        vm: String,
    },
    /// Print the environment of a VM
    Print {
        /// VM name, number from list-vms, or JAVA_HOME
        vm: String,
    },
    /// Print variable(s) from the active VM
    GetEnv {
        /// Variable name(s), comma separated
        vars: String,
    },
    /// Print the location of the java executable
    Java,
    /// Print the location of the javac executable
    Javac,
    /// Print the location of the jar executable
    Jar,
    /// Print the path to tools.jar
    Tools,
    /// Print version information for the active VM
    JavaVersion,
    /// Print JAVA_HOME of the active VM
    JdkHome,
    /// Print JAVA_HOME of the active VM
    JreHome,
    /// Print the runtime classpath
    Runtime,
    /// Run an executable from the active VM
    Exec {
        /// Executable name, e.g. java or keytool
        command: String,
        /// Arguments passed through unchanged
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// List all installed Java packages
    #[command(alias = "list-available-packages")]
    ListPackages,
    /// List installed virtuals and their providers
    ListVirtuals,
    /// Print the classpath for package(s)
    Classpath {
        /// Package name(s), comma separated
        packages: String,
        /// Include package dependencies
        #[arg(short = 'd', long)]
        with_dependencies: bool,
    },
    /// Print parameter(s) from package descriptors
    Query {
        /// Package name(s), comma separated
        packages: String,
        /// Parameter name(s), comma separated
        params: String,
    },
    /// Print java library paths for package(s)
    Library {
        /// Package name(s), comma separated
        packages: String,
    },
    /// List packages that provide virtual(s)
    #[command(alias = "get-virtual-providers")]
    VirtualProviders {
        /// Virtual name(s), comma separated
        virtuals: String,
        /// List providers even when the active VM covers the virtual
        #[arg(long)]
        ignore_vm: bool,
    },
    /// Print the provider used for a virtual
    ActiveProvider {
        /// Virtual name
        #[arg(value_name = "VIRTUAL")]
        name: String,
    },
    /// List the jars a package installs
    Jars {
        /// Package name
        package: String,
    },
}
