use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Path-like values that can be probed for executability or looked up on
/// the process search path.
pub trait Executable {
    fn is_executable_file(&self) -> bool;
    fn first_executable_match_in_path(&self) -> Option<PathBuf>;
    fn all_executable_matches_in_path(&self) -> Vec<PathBuf>;
    fn is_in_path(&self) -> bool;
}

impl<S> Executable for S
where
    S: AsRef<OsStr> + ?Sized,
{
    fn is_executable_file(&self) -> bool {
        let path = Path::new(self);
        let metadata = match path.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                log::trace!("cannot stat {}: {err}", path.display());
                return false;
            }
        };
        metadata.is_file() && has_execute_permission(&metadata)
    }

    fn first_executable_match_in_path(&self) -> Option<PathBuf> {
        crate::system().find_first(Path::new(self))
    }

    fn all_executable_matches_in_path(&self) -> Vec<PathBuf> {
        crate::system().find_all(Path::new(self))
    }

    fn is_in_path(&self) -> bool {
        crate::system().exists(Path::new(self))
    }
}

#[cfg(unix)]
fn has_execute_permission(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;

    // any of user, group or other
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_execute_permission(_metadata: &std::fs::Metadata) -> bool {
    true
}
