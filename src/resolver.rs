use std::ffi::{OsStr, OsString};
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use crate::executable_path::Executable;

/// Platform primitives the [`Locator`](crate::Locator) is built on.
///
/// Implementations must be pure apart from the filesystem reads done by
/// [`PlatformResolver::is_executable`].
pub trait PlatformResolver: Debug + Send + Sync {
    /// Splits a search-path string on the platform delimiter.
    ///
    /// Empty segments are kept, so `k` delimiters always give `k + 1` entries.
    fn split_search_path(&self, raw: &OsStr) -> Vec<PathBuf>;

    /// Absolute candidate locations of `program` inside `dir`, in priority
    /// order. Does not look at the filesystem.
    fn candidate_paths(&self, dir: &Path, program: &Path) -> Vec<PathBuf>;

    /// true iff `path` is an existing, executable regular file.
    fn is_executable(&self, path: &Path) -> bool;
}

/// Splits `raw` on an ASCII delimiter without going through UTF-8, so
/// directories with non-Unicode names survive unchanged.
fn split_on(raw: &OsStr, delimiter: char) -> Vec<PathBuf> {
    debug_assert!(delimiter.is_ascii());
    raw.as_encoded_bytes()
        .split(|byte| *byte == delimiter as u8)
        // SAFETY: the segments come from `as_encoded_bytes` and are cut only
        // at an ASCII byte, which is always a valid boundary.
        .map(|segment| PathBuf::from(unsafe { OsStr::from_encoded_bytes_unchecked(segment) }))
        .collect()
}

/// Joins `dir` and `program` and anchors the result at the current
/// directory when it is relative.
///
/// `None` for an empty `dir`: an empty search-path segment never matches.
fn join_absolute(dir: &Path, program: &Path) -> Option<PathBuf> {
    if dir.as_os_str().is_empty() {
        return None;
    }
    let joined = dir.join(program);
    match std::path::absolute(&joined) {
        Ok(absolute) => Some(absolute),
        Err(err) => {
            log::debug!("cannot make {} absolute: {err}", joined.display());
            Some(joined)
        }
    }
}

/// `:`-delimited search path, one candidate per directory, execute bit.
#[derive(Debug, Default, Clone, Copy)]
pub struct PosixResolver;

impl PosixResolver {
    pub const DELIMITER: char = ':';
}

impl PlatformResolver for PosixResolver {
    fn split_search_path(&self, raw: &OsStr) -> Vec<PathBuf> {
        split_on(raw, Self::DELIMITER)
    }

    fn candidate_paths(&self, dir: &Path, program: &Path) -> Vec<PathBuf> {
        join_absolute(dir, program).into_iter().collect()
    }

    fn is_executable(&self, path: &Path) -> bool {
        path.is_executable_file()
    }
}

/// `;`-delimited search path with executable-suffix enumeration.
///
/// A program name expands to one candidate per configured suffix, in order.
/// A name already ending in one of the suffixes (any case), or a resolver
/// without suffixes, yields the single joined candidate.
#[derive(Debug, Clone)]
pub struct WindowsResolver {
    extensions: Vec<OsString>,
}

impl WindowsResolver {
    pub const DELIMITER: char = ';';
    pub const DEFAULT_PATHEXT: &'static str = ".COM;.EXE;.BAT;.CMD";

    /// Suffixes taken from `PATHEXT`, falling back to [`Self::DEFAULT_PATHEXT`].
    pub fn from_env() -> Self {
        match std::env::var("PATHEXT") {
            Ok(raw) if !raw.trim().is_empty() => Self::from_pathext(&raw),
            _ => Self::from_pathext(Self::DEFAULT_PATHEXT),
        }
    }

    /// Parses a `PATHEXT`-style list such as `.EXE;.BAT`.
    pub fn from_pathext(raw: &str) -> Self {
        Self::with_extensions(raw.split(Self::DELIMITER))
    }

    pub fn with_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().to_owned())
            .filter(|ext| !ext.is_empty())
            .map(|ext| {
                if ext.starts_with('.') {
                    OsString::from(ext)
                } else {
                    OsString::from(format!(".{ext}"))
                }
            })
            .collect();
        Self { extensions }
    }

    /// One candidate per directory, no suffix expansion.
    pub fn without_extensions() -> Self {
        Self {
            extensions: Vec::new(),
        }
    }

    pub fn extensions(&self) -> &[OsString] {
        &self.extensions
    }

    fn has_known_extension(&self, program: &Path) -> bool {
        let Some(ext) = program.extension() else {
            return false;
        };
        self.extensions.iter().any(|known| {
            known
                .to_str()
                .and_then(|known| known.strip_prefix('.'))
                .is_some_and(|known| ext.eq_ignore_ascii_case(known))
        })
    }
}

impl Default for WindowsResolver {
    fn default() -> Self {
        Self::from_pathext(Self::DEFAULT_PATHEXT)
    }
}

impl PlatformResolver for WindowsResolver {
    fn split_search_path(&self, raw: &OsStr) -> Vec<PathBuf> {
        split_on(raw, Self::DELIMITER)
    }

    fn candidate_paths(&self, dir: &Path, program: &Path) -> Vec<PathBuf> {
        let Some(base) = join_absolute(dir, program) else {
            return Vec::new();
        };
        if self.extensions.is_empty() || self.has_known_extension(program) {
            return vec![base];
        }
        self.extensions
            .iter()
            .map(|ext| {
                let mut with_suffix = base.clone().into_os_string();
                with_suffix.push(ext);
                PathBuf::from(with_suffix)
            })
            .collect()
    }

    // no execute bit on Windows; existing regular files count
    fn is_executable(&self, path: &Path) -> bool {
        path.is_executable_file()
    }
}
