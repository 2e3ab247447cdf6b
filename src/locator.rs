use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::WhichError;
use crate::platform::platform_resolver;
use crate::resolver::PlatformResolver;

/// Environment variable read when no search path is supplied.
pub const SEARCH_PATH_VAR: &str = "PATH";

/// Where a [`Locator`] takes its directories from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPathSource {
    /// A string in the resolver's native format, split on construction.
    Raw(OsString),
    /// Directories that are already split.
    Directories(Vec<PathBuf>),
}

impl SearchPathSource {
    /// Reads [`SEARCH_PATH_VAR`] once. A missing variable is an empty path.
    pub fn from_env() -> Self {
        Self::Raw(std::env::var_os(SEARCH_PATH_VAR).unwrap_or_default())
    }
}

/// Configures a [`Locator`]. Whatever is left unset is taken from the
/// process: `PATH` for the directories, the host platform for the resolver.
#[derive(Debug, Default)]
pub struct LocatorBuilder {
    source: Option<SearchPathSource>,
    resolver: Option<Arc<dyn PlatformResolver>>,
}

impl LocatorBuilder {
    pub fn search_path(mut self, raw: impl Into<OsString>) -> Self {
        self.source = Some(SearchPathSource::Raw(raw.into()));
        self
    }

    pub fn directories<I, P>(mut self, directories: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let directories = directories.into_iter().map(Into::into).collect();
        self.source = Some(SearchPathSource::Directories(directories));
        self
    }

    pub fn source(mut self, source: SearchPathSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn PlatformResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn build(self) -> Locator {
        let resolver = self.resolver.unwrap_or_else(platform_resolver);
        let directories = match self.source.unwrap_or_else(SearchPathSource::from_env) {
            SearchPathSource::Raw(raw) if raw.is_empty() => Vec::new(),
            SearchPathSource::Raw(raw) => resolver.split_search_path(&raw),
            SearchPathSource::Directories(directories) => directories,
        };
        log::debug!(
            "locator searches {} directories with {resolver:?}",
            directories.len()
        );
        Locator {
            directories,
            resolver,
        }
    }
}

/// Finds executables by walking an ordered list of directories.
///
/// Every lookup hits the filesystem again; nothing is cached. The search
/// path and resolver never change after construction, so a `Locator` can be
/// shared between threads freely.
#[derive(Debug, Clone)]
pub struct Locator {
    directories: Vec<PathBuf>,
    resolver: Arc<dyn PlatformResolver>,
}

impl Locator {
    pub fn builder() -> LocatorBuilder {
        LocatorBuilder::default()
    }

    /// Splits `raw` with `resolver`, or with the platform resolver if `None`.
    pub fn new(raw: impl Into<OsString>, resolver: Option<Arc<dyn PlatformResolver>>) -> Self {
        let builder = Self::builder().search_path(raw);
        let builder = match resolver {
            Some(resolver) => builder.resolver(resolver),
            None => builder,
        };
        builder.build()
    }

    pub fn from_directories<I, P>(directories: I, resolver: Arc<dyn PlatformResolver>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self::builder()
            .directories(directories)
            .resolver(resolver)
            .build()
    }

    /// `PATH` and the platform resolver.
    pub fn from_env() -> Self {
        Self::builder().build()
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    pub fn resolver(&self) -> &dyn PlatformResolver {
        self.resolver.as_ref()
    }

    /// Lazily yields every executable candidate, directory by directory.
    fn executable_candidates<'a>(
        &'a self,
        program: &'a Path,
    ) -> impl Iterator<Item = PathBuf> + 'a {
        let searchable = !program.as_os_str().is_empty();
        if !searchable {
            log::debug!("empty program name, nothing to look up");
        }
        self.directories
            .iter()
            .filter(move |_| searchable)
            .flat_map(move |dir| self.resolver.candidate_paths(dir, program))
            .filter(move |candidate| {
                let executable = self.resolver.is_executable(candidate);
                log::trace!("{} executable: {executable}", candidate.display());
                executable
            })
    }

    /// The first executable match in search-path order.
    pub fn find_first(&self, program: impl AsRef<Path>) -> Option<PathBuf> {
        let program = program.as_ref();
        let found = self.executable_candidates(program).next();
        log::debug!("{} -> {found:?}", program.display());
        found
    }

    /// Every executable match, in directory-then-candidate order.
    ///
    /// A directory listed twice contributes its matches twice.
    pub fn find_all(&self, program: impl AsRef<Path>) -> Vec<PathBuf> {
        self.executable_candidates(program.as_ref()).collect()
    }

    /// Stops at the first match without collecting the rest.
    pub fn exists(&self, program: impl AsRef<Path>) -> bool {
        self.executable_candidates(program.as_ref()).next().is_some()
    }

    /// Like [`Locator::find_first`], but absence is a [`WhichError::NotFound`].
    pub fn find_required(&self, program: impl AsRef<Path>) -> Result<PathBuf, WhichError> {
        let program = program.as_ref();
        self.find_first(program).ok_or_else(|| WhichError::NotFound {
            program: program.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{PosixResolver, WindowsResolver};
    use std::collections::HashSet;
    use std::ffi::OsStr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Colon-split resolver backed by a fixed set of "executable" paths.
    #[derive(Debug, Default)]
    struct FakeResolver {
        executables: HashSet<PathBuf>,
        probes: AtomicUsize,
    }

    impl FakeResolver {
        fn with(executables: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                executables: executables.iter().map(PathBuf::from).collect(),
                probes: AtomicUsize::new(0),
            })
        }
    }

    impl PlatformResolver for FakeResolver {
        fn split_search_path(&self, raw: &OsStr) -> Vec<PathBuf> {
            raw.to_str()
                .unwrap_or_default()
                .split(':')
                .map(PathBuf::from)
                .collect()
        }

        fn candidate_paths(&self, dir: &Path, program: &Path) -> Vec<PathBuf> {
            vec![dir.join(program)]
        }

        fn is_executable(&self, path: &Path) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.executables.contains(path)
        }
    }

    const SEARCH_PATH: &str = "/usr/bin:/usr/local/bin:/home/foo/bin";

    fn scenario() -> (Locator, Arc<FakeResolver>) {
        let resolver = FakeResolver::with(&[
            "/usr/local/bin/ffmpeg",
            "/usr/local/bin/gcc",
            "/home/foo/bin/gcc",
        ]);
        let shared: Arc<dyn PlatformResolver> = resolver.clone();
        let locator = Locator::new(SEARCH_PATH, Some(shared));
        (locator, resolver)
    }

    #[test]
    fn search_path_is_split_by_the_resolver() {
        let (locator, _) = scenario();
        assert_eq!(
            locator.directories(),
            ["/usr/bin", "/usr/local/bin", "/home/foo/bin"].map(PathBuf::from)
        );
    }

    #[test]
    fn finds_first_program() {
        let (locator, _) = scenario();
        assert_eq!(
            locator.find_first("ffmpeg"),
            Some(PathBuf::from("/usr/local/bin/ffmpeg"))
        );
    }

    #[test]
    fn finds_all_programs_in_order() {
        let (locator, _) = scenario();
        assert_eq!(
            locator.find_all("gcc"),
            vec![
                PathBuf::from("/usr/local/bin/gcc"),
                PathBuf::from("/home/foo/bin/gcc")
            ]
        );
        assert_eq!(
            locator.find_first("gcc"),
            Some(PathBuf::from("/usr/local/bin/gcc"))
        );
    }

    #[test]
    fn exists_reports_found_programs() {
        let (locator, _) = scenario();
        assert!(locator.exists("ffmpeg"));
        assert!(locator.exists("gcc"));
    }

    #[test]
    fn missing_programs_are_not_found() {
        let (locator, _) = scenario();
        assert_eq!(locator.find_first("gm"), None);
        assert!(locator.find_all("gm").is_empty());
        assert!(!locator.exists("gm"));
        assert!(matches!(
            locator.find_required("gm"),
            Err(WhichError::NotFound { program }) if program == Path::new("gm")
        ));
    }

    #[test]
    fn first_agrees_with_all_and_exists() {
        let (locator, _) = scenario();
        for name in ["ffmpeg", "gcc", "gm", "bin/gcc", ""] {
            let all = locator.find_all(name);
            assert_eq!(locator.find_first(name), all.first().cloned());
            assert_eq!(locator.exists(name), !all.is_empty());
        }
    }

    #[test]
    fn exists_short_circuits() {
        let (locator, resolver) = scenario();
        assert!(locator.exists("ffmpeg"));
        // /usr/bin/ffmpeg, then the hit in /usr/local/bin
        assert_eq!(resolver.probes.load(Ordering::SeqCst), 2);

        resolver.probes.store(0, Ordering::SeqCst);
        locator.find_all("ffmpeg");
        assert_eq!(resolver.probes.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn duplicate_directories_give_duplicate_matches() {
        let resolver = FakeResolver::with(&["/opt/bin/tool"]);
        let locator = Locator::from_directories(["/opt/bin", "/usr/bin", "/opt/bin"], resolver);
        assert_eq!(
            locator.find_all("tool"),
            vec![PathBuf::from("/opt/bin/tool"), PathBuf::from("/opt/bin/tool")]
        );
    }

    #[test]
    fn pre_resolved_program_path_is_accepted() {
        let resolver = FakeResolver::with(&["/home/foo/bin/gcc"]);
        let locator = Locator::from_directories(["/home/foo"], resolver);
        assert_eq!(
            locator.find_first(Path::new("bin").join("gcc")),
            Some(PathBuf::from("/home/foo/bin/gcc"))
        );
    }

    #[test]
    fn empty_search_path_finds_nothing() {
        let resolver = FakeResolver::with(&["/gcc"]);
        let shared: Arc<dyn PlatformResolver> = resolver.clone();
        let locator = Locator::new("", Some(shared));
        assert!(locator.directories().is_empty());
        assert!(!locator.exists("gcc"));
        assert_eq!(resolver.probes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_program_name_finds_nothing() {
        let (locator, resolver) = scenario();
        assert_eq!(locator.find_first(""), None);
        assert_eq!(resolver.probes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn builder_uses_given_resolver_for_splitting() {
        let locator = Locator::builder()
            .search_path(r"C:\a;C:\b")
            .resolver(Arc::new(WindowsResolver::default()))
            .build();
        assert_eq!(
            locator.directories(),
            [PathBuf::from(r"C:\a"), PathBuf::from(r"C:\b")]
        );

        let locator = Locator::builder()
            .source(SearchPathSource::Raw("/a:/b".into()))
            .resolver(Arc::new(PosixResolver))
            .build();
        assert_eq!(locator.directories().len(), 2);
    }

    #[test]
    fn default_builder_reads_the_environment() {
        let expected = match SearchPathSource::from_env() {
            SearchPathSource::Raw(raw) if raw.is_empty() => 0,
            SearchPathSource::Raw(raw) => platform_resolver().split_search_path(&raw).len(),
            SearchPathSource::Directories(dirs) => dirs.len(),
        };
        assert_eq!(Locator::from_env().directories().len(), expected);
    }

    #[test]
    fn locator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Locator>();
    }
}
