//! Repository discovery, initialization, and the handle that ties the
//! object database, refs, configuration, index and merge state together.

mod discover;
mod env;
mod error;
mod ignore;
mod init;
mod merge_heads;

pub use discover::{is_git_dir, parse_gitdir_file};
pub use env::EnvOverrides;
pub use error::RepoError;

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use sprig_config::ConfigSet;
use sprig_hash::ObjectId;
use sprig_index::{IgnoreStack, Index};
use sprig_odb::ObjectDatabase;
use sprig_ref::{FilesRefStore, RefName, RefStore, Reference};
use tracing::debug;

/// Type of repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryKind {
    /// Has a working tree.
    Normal,
    /// No working tree.
    Bare,
}

/// Where a repository was found, before anything is loaded.
#[derive(Debug)]
pub struct DiscoveredRepo {
    pub git_dir: PathBuf,
    pub work_tree: Option<PathBuf>,
    pub kind: RepositoryKind,
}

/// Options for [`Repository::init_opts`].
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    pub bare: bool,
    /// Branch HEAD points at; `main` when unset.
    pub default_branch: Option<String>,
}

/// An open repository.
///
/// The index is loaded on first use through `&mut self` and cached until
/// [`Repository::reload_index`]. Pending merge parents are read from
/// `MERGE_HEAD` when the repository is opened.
pub struct Repository {
    git_dir: PathBuf,
    work_tree: Option<PathBuf>,
    odb: ObjectDatabase,
    refs: FilesRefStore,
    config: ConfigSet,
    index: Option<Index>,
    index_path: PathBuf,
    merge_heads: Vec<ObjectId>,
    kind: RepositoryKind,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("git_dir", &self.git_dir)
            .field("work_tree", &self.work_tree)
            .field("kind", &self.kind)
            .field("merge_heads", &self.merge_heads)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Open the repository at `path`, which is either a git directory or
    /// the root of a working tree.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        Self::open_with_env(path, &EnvOverrides::from_env())
    }

    /// [`Repository::open`] with explicit overrides instead of the process
    /// environment.
    pub fn open_with_env(path: impl AsRef<Path>, env: &EnvOverrides) -> Result<Self, RepoError> {
        let path = path.as_ref();
        let discovered = if is_git_dir(path) {
            discover::open_git_dir(path)?
        } else if path.join(".git").exists() {
            discover::open_work_tree(path)?
        } else {
            return Err(RepoError::NotFound(path.to_path_buf()));
        };
        Self::from_discovered(discovered, env)
    }

    /// Find the repository containing `start`, honoring `GIT_DIR`,
    /// `GIT_WORK_TREE`, `GIT_INDEX_FILE` and `GIT_CEILING_DIRECTORIES`.
    pub fn discover(start: impl AsRef<Path>) -> Result<Self, RepoError> {
        Self::discover_with_env(start, &EnvOverrides::from_env())
    }

    /// [`Repository::discover`] with explicit overrides instead of the
    /// process environment.
    pub fn discover_with_env(start: impl AsRef<Path>, env: &EnvOverrides) -> Result<Self, RepoError> {
        let discovered = discover::discover_git_dir(start.as_ref(), env)?;
        Self::from_discovered(discovered, env)
    }

    /// Create a repository with a working tree at `path`.
    pub fn init(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        Self::init_opts(path, &InitOptions::default())
    }

    /// Create a bare repository at `path`.
    pub fn init_bare(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        Self::init_opts(
            path,
            &InitOptions {
                bare: true,
                ..Default::default()
            },
        )
    }

    pub fn init_opts(path: impl AsRef<Path>, opts: &InitOptions) -> Result<Self, RepoError> {
        let discovered = init::init_repository(path.as_ref(), opts)?;
        Self::from_discovered(discovered, &EnvOverrides::default())
    }

    fn from_discovered(discovered: DiscoveredRepo, env: &EnvOverrides) -> Result<Self, RepoError> {
        let DiscoveredRepo {
            git_dir,
            mut work_tree,
            mut kind,
        } = discovered;

        let mut config = ConfigSet::load(Some(&git_dir))?;
        for spec in &env.config {
            config.add_override(spec)?;
        }
        if let Some(wt) = &env.work_tree {
            work_tree = Some(wt.clone());
            kind = RepositoryKind::Normal;
        } else if config.get_bool("core.bare")? == Some(true) {
            work_tree = None;
            kind = RepositoryKind::Bare;
        }

        let objects_dir = env
            .object_directory
            .clone()
            .unwrap_or_else(|| git_dir.join("objects"));
        let index_path = env
            .index_file
            .clone()
            .unwrap_or_else(|| git_dir.join("index"));
        let merge_heads = merge_heads::read(&git_dir)?;

        debug!(
            git_dir = %git_dir.display(),
            work_tree = ?work_tree,
            ?kind,
            merge_heads = merge_heads.len(),
            "opened repository"
        );
        Ok(Repository {
            odb: ObjectDatabase::open(objects_dir),
            refs: FilesRefStore::new(&git_dir),
            git_dir,
            work_tree,
            config,
            index: None,
            index_path,
            merge_heads,
            kind,
        })
    }

    // --- Paths ---

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    /// Root of the working tree; `None` for bare repositories.
    pub fn work_tree(&self) -> Option<&Path> {
        self.work_tree.as_deref()
    }

    /// The working tree, or [`RepoError::BareNoWorkTree`].
    pub fn require_work_tree(&self) -> Result<&Path, RepoError> {
        self.work_tree().ok_or(RepoError::BareNoWorkTree)
    }

    pub fn kind(&self) -> RepositoryKind {
        self.kind
    }

    pub fn is_bare(&self) -> bool {
        self.kind == RepositoryKind::Bare
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    // --- Subsystems ---

    pub fn odb(&self) -> &ObjectDatabase {
        &self.odb
    }

    pub fn refs(&self) -> &FilesRefStore {
        &self.refs
    }

    pub fn config(&self) -> &ConfigSet {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigSet {
        &mut self.config
    }

    // --- Index ---

    /// The index, loaded from disk on first access.
    pub fn index(&mut self) -> Result<&Index, RepoError> {
        Ok(self.index_mut()?)
    }

    pub fn index_mut(&mut self) -> Result<&mut Index, RepoError> {
        let index = match self.index.take() {
            Some(index) => index,
            None => Index::load(&self.index_path)?,
        };
        Ok(self.index.insert(index))
    }

    /// The cached index if one is loaded, otherwise a fresh read from disk.
    pub fn current_index(&self) -> Result<Cow<'_, Index>, RepoError> {
        match &self.index {
            Some(index) => Ok(Cow::Borrowed(index)),
            None => Ok(Cow::Owned(Index::load(&self.index_path)?)),
        }
    }

    pub fn set_index(&mut self, index: Index) {
        self.index = Some(index);
    }

    /// Write the cached index back to disk. Does nothing if it was never loaded.
    pub fn write_index(&self) -> Result<(), RepoError> {
        if let Some(index) = &self.index {
            index.write_to(&self.index_path)?;
        }
        Ok(())
    }

    /// Drop the cached index and read it again.
    pub fn reload_index(&mut self) -> Result<&Index, RepoError> {
        self.index = None;
        self.index()
    }

    // --- HEAD ---

    /// The commit HEAD points at; `None` on an unborn branch.
    pub fn head_oid(&self) -> Result<Option<ObjectId>, RepoError> {
        Ok(self.refs.resolve_to_oid(&RefName::head())?)
    }

    /// Short name of the checked-out branch; `None` when HEAD is detached.
    pub fn current_branch(&self) -> Result<Option<String>, RepoError> {
        match self.refs.resolve(&RefName::head())? {
            Some(Reference::Symbolic { target, .. }) => Ok(Some(target.short_name().to_string())),
            Some(Reference::Direct { .. }) | None => Ok(None),
        }
    }

    /// Whether HEAD names a branch that has no commits yet.
    pub fn is_unborn(&self) -> Result<bool, RepoError> {
        match self.refs.resolve(&RefName::head())? {
            Some(Reference::Symbolic { target, .. }) => Ok(self.refs.resolve_to_oid(&target)?.is_none()),
            Some(Reference::Direct { .. }) => Ok(false),
            None => Ok(true),
        }
    }

    // --- Merge state ---

    /// Extra parents recorded by an in-progress merge, in order.
    pub fn merge_heads(&self) -> &[ObjectId] {
        &self.merge_heads
    }

    /// Record merge parents, replacing any already recorded.
    pub fn set_merge_heads(&mut self, heads: Vec<ObjectId>) -> Result<(), RepoError> {
        if heads.is_empty() {
            return self.clear_merge_heads();
        }
        merge_heads::write(&self.git_dir, &heads)?;
        self.merge_heads = heads;
        Ok(())
    }

    /// Forget the in-progress merge, in memory and on disk.
    pub fn clear_merge_heads(&mut self) -> Result<(), RepoError> {
        merge_heads::remove(&self.git_dir)?;
        self.merge_heads.clear();
        Ok(())
    }

    // --- Ignore rules ---

    /// Ignore rules for the working tree. Empty for bare repositories.
    pub fn ignore_stack(&self) -> Result<IgnoreStack, RepoError> {
        let Some(work_tree) = &self.work_tree else {
            return Ok(IgnoreStack::new());
        };
        let excludes_file = self
            .config
            .get_string("core.excludesfile")?
            .filter(|path| !path.is_empty())
            .map(|path| ignore::expand_home(&path));
        ignore::load(work_tree, &self.git_dir, excludes_file)
    }
}
