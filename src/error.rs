use std::path::PathBuf;

/// Failures surfaced by the `?`-friendly parts of the API.
///
/// Plain lookups never fail: absence is `None`, an empty `Vec` or `false`.
#[derive(Debug, thiserror::Error)]
pub enum WhichError {
    #[error("{}: not found", program.display())]
    NotFound { program: PathBuf },
    #[error("unknown platform `{0}` (expected `posix` or `windows`)")]
    UnknownPlatform(String),
}
