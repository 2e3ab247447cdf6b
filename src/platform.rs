use std::sync::Arc;

use once_cell::sync::Lazy;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::WhichError;
use crate::resolver::{PlatformResolver, PosixResolver, WindowsResolver};

/// The resolver flavours a host can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, IntoStaticStr, Display, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum Platform {
    #[strum(to_string = "posix", serialize = "unix")]
    Posix,
    #[strum(serialize = "windows")]
    Windows,
}

impl Platform {
    /// Any identifier containing "windows" (case-insensitive) selects
    /// [`Platform::Windows`]; everything else is Posix.
    pub fn from_os_name(os_name: &str) -> Self {
        if os_name.to_ascii_lowercase().contains("windows") {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    /// The platform of the running process.
    pub fn host() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    /// Parses a user supplied platform name such as `posix` or `Windows`.
    pub fn parse(name: &str) -> Result<Self, WhichError> {
        name.parse().map_err(|_| WhichError::UnknownPlatform(name.to_owned()))
    }

    /// A fresh resolver of this flavour.
    pub fn resolver(self) -> Arc<dyn PlatformResolver> {
        match self {
            Self::Posix => Arc::new(PosixResolver),
            Self::Windows => Arc::new(WindowsResolver::from_env()),
        }
    }
}

static PLATFORM_RESOLVER: Lazy<Arc<dyn PlatformResolver>> = Lazy::new(|| {
    let platform = Platform::host();
    log::debug!("selected {platform} resolver for host `{}`", std::env::consts::OS);
    platform.resolver()
});

/// The process-wide resolver for the host platform, created on first use.
pub fn platform_resolver() -> Arc<dyn PlatformResolver> {
    Arc::clone(&PLATFORM_RESOLVER)
}
