//! `NAME=value` descriptor parsing.
//!
//! Every descriptor (`package.env`, a VM file under `vms.d`, a virtual) is a
//! list of assignments, one per line. Values may be wrapped in double quotes
//! and may reference parameters defined on earlier lines with `${NAME}`.
//!
//! Substitution only looks backwards: a reference to a parameter that has
//! not been assigned yet stops expansion for the rest of that value, which is
//! then kept verbatim. Existing descriptor files rely on this, so it is part
//! of the format rather than a bug to be fixed.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::trace;

/// Errors raised while reading a descriptor file.
#[derive(Error, Debug)]
pub enum DescriptorError {
    /// The file does not exist.
    #[error("Invalid file, does not exist: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but may not be read by this user.
    #[error("File not readable: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// Any other I/O failure.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// The descriptor being read.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
}

impl DescriptorError {
    /// Classify an I/O error raised while opening `path`.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Path of the descriptor that failed.
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(path) | Self::PermissionDenied(path) | Self::Io { path, .. } => path,
        }
    }
}

/// A single `NAME=value` assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Text before the first `=`.
    pub name: String,
    /// Value after quote stripping and `${NAME}` expansion.
    pub value: String,
}

/// Parameters of one descriptor, in file order.
///
/// Names are not required to be unique; [`Params::get`] returns the first
/// assignment, matching how the rest of the tooling reads these files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<Param>);

impl Params {
    /// Read and parse the descriptor at `path`.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::NotFound`] or
    /// [`DescriptorError::PermissionDenied`] when the file cannot be opened,
    /// and [`DescriptorError::Io`] for any other read failure.
    pub fn parse(path: &Path) -> Result<Self, DescriptorError> {
        let bytes = std::fs::read(path).map_err(|e| DescriptorError::from_io(path, e))?;
        let params = Self::parse_str(&String::from_utf8_lossy(&bytes));
        trace!(path = %path.display(), count = params.len(), "parsed descriptor");
        Ok(params)
    }

    /// Parse descriptor text that is already in memory.
    pub fn parse_str(content: &str) -> Self {
        let mut params = Self::default();

        for line in content.lines() {
            if line.starts_with('#') {
                continue;
            }
            let Some((name, raw)) = line.split_once('=') else {
                continue;
            };

            let raw = match raw.strip_prefix('"') {
                Some(inner) => inner.strip_suffix('"').unwrap_or(inner),
                None => raw,
            };

            let value = params.expand(raw);
            params.0.push(Param {
                name: name.to_string(),
                value,
            });
        }

        params
    }

    /// Expand `${NAME}` references against the parameters parsed so far.
    fn expand(&self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;

        while let Some(start) = rest.find("${") {
            let tail = &rest[start + 2..];
            let Some(end) = tail.find('}') else {
                break;
            };
            let name = &tail[..end];
            let Some(value) = self.get(name) else {
                trace!(name, "unresolved reference, leaving remainder verbatim");
                break;
            };
            out.push_str(&rest[..start]);
            out.push_str(value);
            rest = &tail[end + 1..];
        }

        out.push_str(rest);
        out
    }

    /// Value of the first parameter called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Append a parameter without any expansion.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push(Param {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Iterate parameters in file order.
    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.0.iter()
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the descriptor had no assignments at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::default();
        for (name, value) in iter {
            params.push(name, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_assignments() {
        let params = Params::parse_str("A=1\nB=two\n");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("A"), Some("1"));
        assert_eq!(params.get("B"), Some("two"));
        assert_eq!(params.get("C"), None);
    }

    #[test]
    fn test_comments_and_lines_without_equals_are_skipped() {
        let params = Params::parse_str("# A=commented\n\njust text\nB=ok\n");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("A"), None);
        assert_eq!(params.get("B"), Some("ok"));
    }

    #[test]
    fn test_value_keeps_later_equals() {
        let params = Params::parse_str("OPTS=-Dfoo=bar\n");
        assert_eq!(params.get("OPTS"), Some("-Dfoo=bar"));
    }

    #[test]
    fn test_quotes_are_stripped() {
        let params = Params::parse_str("DESCRIPTION=\"A library\"\nEMPTY=\"\"\n");
        assert_eq!(params.get("DESCRIPTION"), Some("A library"));
        assert_eq!(params.get("EMPTY"), Some(""));
    }

    #[test]
    fn test_empty_value_is_kept() {
        let params = Params::parse_str("A=\n");
        assert_eq!(params.get("A"), Some(""));
    }

    #[test]
    fn test_backward_substitution() {
        let params = Params::parse_str("A=1\nB=${A}-x\n");
        assert_eq!(params.get("B"), Some("1-x"));
    }

    #[test]
    fn test_forward_reference_stays_literal() {
        let params = Params::parse_str("B=${A}-x\nA=1\n");
        assert_eq!(params.get("B"), Some("${A}-x"));
        assert_eq!(params.get("A"), Some("1"));
    }

    #[test]
    fn test_multiple_references_expand_left_to_right() {
        let params = Params::parse_str(
            "JAVA_HOME=/usr/lib/jvm/icedtea-8\n\
             JDK_HOME=${JAVA_HOME}\n\
             PATH=\"${JAVA_HOME}/bin:${JDK_HOME}/jre/bin\"\n",
        );
        assert_eq!(
            params.get("PATH"),
            Some("/usr/lib/jvm/icedtea-8/bin:/usr/lib/jvm/icedtea-8/jre/bin")
        );
    }

    #[test]
    fn test_expansion_stops_at_first_unresolved_reference() {
        let params = Params::parse_str("A=a\nV=${A}:${MISSING}:${A}\n");
        assert_eq!(params.get("V"), Some("a:${MISSING}:${A}"));
    }

    #[test]
    fn test_unterminated_reference_is_literal() {
        let params = Params::parse_str("A=a\nV=${A}/${A\n");
        assert_eq!(params.get("V"), Some("a/${A"));
    }

    #[test]
    fn test_get_returns_first_match_and_is_idempotent() {
        let params = Params::parse_str("A=first\nA=second\n");
        assert_eq!(params.get("A"), Some("first"));
        assert_eq!(params.get("A"), params.get("A"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let params = Params::parse_str("A=1\r\nB=${A}\r\n");
        assert_eq!(params.get("A"), Some("1"));
        assert_eq!(params.get("B"), Some("1"));
    }

    #[test]
    fn test_parse_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.env");
        let err = Params::parse(&path).unwrap_err();
        assert!(matches!(err, DescriptorError::NotFound(_)));
        assert_eq!(err.path(), path.as_path());
    }

    #[test]
    fn test_parse_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.env");
        std::fs::write(&path, "CLASSPATH=/usr/share/foo/lib/foo.jar\n").unwrap();
        let params = Params::parse(&path).unwrap();
        assert_eq!(params.get("CLASSPATH"), Some("/usr/share/foo/lib/foo.jar"));
    }
}
