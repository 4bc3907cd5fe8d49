//! Dependency value grammar.
//!
//! `DEPEND`, `BUILD_DEPEND` and `OPTIONAL_DEPEND` hold colon separated
//! tokens. A token is either a bare package name, meaning the whole package,
//! or a package name and a single jar joined by `@`.

use std::fmt;

/// Which dependency parameter of a descriptor to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependKind {
    /// Runtime dependencies (`DEPEND`).
    Depend,
    /// Build-time dependencies (`BUILD_DEPEND`).
    BuildDepend,
    /// Optional runtime dependencies (`OPTIONAL_DEPEND`).
    OptionalDepend,
}

impl DependKind {
    /// Descriptor parameter holding this kind of dependency.
    pub fn key(self) -> &'static str {
        match self {
            Self::Depend => "DEPEND",
            Self::BuildDepend => "BUILD_DEPEND",
            Self::OptionalDepend => "OPTIONAL_DEPEND",
        }
    }
}

impl fmt::Display for DependKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One parsed dependency token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependToken {
    /// Package the dependency points at.
    pub package: String,
    /// Jar within that package, when the dependency is jar scoped.
    pub jar: Option<String>,
}

impl DependToken {
    /// Parse a single token. Returns `None` for blank tokens and for tokens
    /// that name only a jar.
    ///
    /// The token is split at the last `@` not preceded by a backslash. The
    /// side ending in `.jar` is the jar and the other side is the package;
    /// when neither or both sides look like a jar, the text after the `@`
    /// is taken as the package, which is how descriptors written by the
    /// package builds lay it out.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }

        let Some(at) = last_unescaped_at(token) else {
            return Some(Self {
                package: unescape(token),
                jar: None,
            });
        };

        let (left, right) = (&token[..at], &token[at + 1..]);
        let (package, jar) = if is_jar(right) && !is_jar(left) {
            (left, right)
        } else {
            (right, left)
        };

        if package.is_empty() {
            // `foo@` names a whole package; `@bar.jar` names nothing.
            return (!jar.is_empty() && !is_jar(jar)).then(|| Self {
                package: unescape(jar),
                jar: None,
            });
        }

        Some(Self {
            package: unescape(package),
            jar: (!jar.is_empty()).then(|| unescape(jar)),
        })
    }

    /// Parse every token of a dependency value in order.
    pub fn split(value: &str) -> impl Iterator<Item = Self> + '_ {
        value.split(':').filter_map(Self::parse)
    }
}

fn is_jar(s: &str) -> bool {
    s.len() > 4 && s.as_bytes()[s.len() - 4..].eq_ignore_ascii_case(b".jar")
}

fn last_unescaped_at(token: &str) -> Option<usize> {
    let bytes = token.as_bytes();
    bytes
        .iter()
        .enumerate()
        .rev()
        .find(|&(i, &b)| b == b'@' && (i == 0 || bytes[i - 1] != b'\\'))
        .map(|(i, _)| i)
}

fn unescape(s: &str) -> String {
    s.replace("\\@", "@")
}
