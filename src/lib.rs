//! Locate executables on a search path, the way `which` does.
//!
//! A [`Locator`] walks its directories in order and asks a
//! [`PlatformResolver`] for candidate paths and whether they are executable.
//! The program is never run.
//!
//! ```no_run
//! use which_path::Locator;
//!
//! let locator = Locator::from_env();
//! if let Some(path) = locator.find_first("cargo") {
//!     println!("{}", path.display());
//! }
//! ```

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;

mod error;
mod executable_path;
mod locator;
mod platform;
mod resolver;

pub use error::WhichError;
pub use executable_path::Executable;
pub use locator::{Locator, LocatorBuilder, SearchPathSource, SEARCH_PATH_VAR};
pub use platform::{platform_resolver, Platform};
pub use resolver::{PlatformResolver, PosixResolver, WindowsResolver};

static SYSTEM: Lazy<Locator> = Lazy::new(Locator::from_env);

/// The process-wide locator: `PATH` as it was on first use, host resolver.
pub fn system() -> &'static Locator {
    &SYSTEM
}

/// [`Locator::find_first`] on [`system`].
pub fn which(program: impl AsRef<Path>) -> Option<PathBuf> {
    system().find_first(program)
}

/// [`Locator::find_all`] on [`system`].
pub fn which_all(program: impl AsRef<Path>) -> Vec<PathBuf> {
    system().find_all(program)
}

/// [`Locator::exists`] on [`system`].
pub fn is_on_path(program: impl AsRef<Path>) -> bool {
    system().exists(program)
}
