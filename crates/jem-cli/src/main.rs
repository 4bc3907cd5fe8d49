//! jem - Java environment manager CLI

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use jem_cli::ui::Output;
use jem_cli::{Cli, Commands, cmd};
use jem_core::{Env, Layout, Reporter, Scope};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let out = Arc::new(Output::new(!cli.no_color));

    let layout = cli.root.map_or_else(Layout::system, Layout::with_root);
    let mut env = Env::new(layout, out.clone()).with_vm_override(cli.active_vm);

    if let Err(e) = run(cli.command, &mut env, &out) {
        out.error(&e.to_string());
    }

    if out.has_failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(command: Commands, env: &mut Env, out: &Output) -> anyhow::Result<()> {
    match command {
        Commands::ListVms => cmd::vm::list(env, out),
        Commands::ShowActiveVm => cmd::vm::show_active(env, out),
        Commands::SetSystemVm { vm } => cmd::vm::set(env, &vm, Scope::System),
        Commands::SetUserVm { vm } => cmd::vm::set(env, &vm, Scope::User),
        Commands::Print { vm } => cmd::vm::print(env, out, &vm),
        Commands::GetEnv { vars } => cmd::vm::get_env(env, out, &vars),
        Commands::Java => cmd::vm::exe(env, out, "java"),
        Commands::Javac => cmd::vm::exe(env, out, "javac"),
        Commands::Jar => cmd::vm::exe(env, out, "jar"),
        Commands::Tools => cmd::vm::tools(env, out),
        Commands::JavaVersion => cmd::vm::get_env(env, out, "VERSION"),
        Commands::JdkHome | Commands::JreHome => cmd::vm::get_env(env, out, "JAVA_HOME"),
        Commands::Runtime => cmd::vm::get_env(env, out, "BOOTCLASSPATH"),
        Commands::Exec { command, args } => cmd::exec::exec(env, &command, &args),
        Commands::ListPackages => {
            cmd::package::list(env, out);
            Ok(())
        }
        Commands::ListVirtuals => {
            cmd::virtuals::list(env, out);
            Ok(())
        }
        Commands::Classpath {
            packages,
            with_dependencies,
        } => cmd::package::classpath(env, out, &packages, with_dependencies),
        Commands::Query { packages, params } => cmd::package::query(env, out, &packages, &params),
        Commands::Library { packages } => cmd::package::library(env, out, &packages),
        Commands::VirtualProviders {
            virtuals,
            ignore_vm,
        } => cmd::virtuals::providers(env, out, &virtuals, ignore_vm),
        Commands::ActiveProvider { name } => cmd::virtuals::active_provider(env, out, &name),
        Commands::Jars { package } => cmd::package::jars(env, out, &package),
    }
}
