//! List output formatting
//!
//! Column-aligned rows for `jem list-vms`, `jem list-packages` and
//! `jem list-virtuals`.

use super::output::Output;
use jem_core::{Package, Vm};

/// One `list-vms` row. `number` is 1-based, matching what `find` accepts.
pub fn vm_row(out: &Output, number: usize, vm: &Vm, active: bool) -> String {
    let theme = out.theme();
    let marker = if active { theme.marks.active } else { " " };
    let name = format!("{:<width$}", vm.name(), width = theme.layout.vm_width);
    let version = vm.version().unwrap_or_default();

    let mut row = format!(
        "{}{:>iw$}) {} {}",
        out.paint(marker, theme.colors.active),
        number,
        out.paint(&name, theme.colors.name),
        out.paint(version, theme.colors.secondary),
        iw = theme.layout.index_width,
    );
    if vm.is_build_only() {
        row.push(' ');
        row.push_str(&out.paint(theme.marks.build_only, theme.colors.warning));
    }
    row.trim_end().to_string()
}

/// One `list-packages` row: `[name] description (descriptor path)`.
pub fn package_row(out: &Output, pkg: &Package) -> String {
    let theme = out.theme();
    let name = format!(
        "{:<width$}",
        format!("[{}]", pkg.name()),
        width = theme.layout.package_width
    );
    format!(
        "{} {} {}",
        out.paint(&name, theme.colors.name),
        pkg.description(),
        out.paint(
            &format!("({})", pkg.filename().display()),
            theme.colors.secondary
        ),
    )
}

/// One `list-virtuals` row: `[name] providers`, plus the VM requirement
/// when the virtual has one.
pub fn virtual_row(out: &Output, virt: &Package) -> String {
    let theme = out.theme();
    let name = format!(
        "{:<width$}",
        format!("[{}]", virt.name()),
        width = theme.layout.package_width
    );
    let mut row = format!(
        "{} {}",
        out.paint(&name, theme.colors.name),
        virt.get("PROVIDERS").unwrap_or_default()
    );
    if let Some(vm) = virt.get("VM") {
        row.push(' ');
        row.push_str(&out.paint(&format!("(VM >= {vm})"), theme.colors.secondary));
    }
    row.trim_end().to_string()
}

/// Print the `list-vms` table.
pub fn print_vms<'a>(
    out: &Output,
    vms: impl IntoIterator<Item = &'a Vm>,
    active: Option<usize>,
) {
    out.line("Available Java Virtual Machines:");
    for (i, vm) in vms.into_iter().enumerate() {
        out.line(&vm_row(out, i + 1, vm, active == Some(i)));
    }
}

/// Print the `list-packages` table.
pub fn print_packages(out: &Output, packages: &[Package]) {
    for pkg in packages {
        out.line(&package_row(out, pkg));
    }
}

/// Print the `list-virtuals` table.
pub fn print_virtuals(out: &Output, virtuals: &[Package]) {
    for virt in virtuals {
        out.line(&virtual_row(out, virt));
    }
}
