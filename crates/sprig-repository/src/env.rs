use std::path::PathBuf;

/// Environment variables that change where the repository lives.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    /// `GIT_DIR`
    pub git_dir: Option<PathBuf>,
    /// `GIT_WORK_TREE`
    pub work_tree: Option<PathBuf>,
    /// `GIT_CEILING_DIRECTORIES`, colon separated.
    pub ceiling_directories: Vec<PathBuf>,
    /// `GIT_OBJECT_DIRECTORY`
    pub object_directory: Option<PathBuf>,
    /// `GIT_INDEX_FILE`
    pub index_file: Option<PathBuf>,
    /// `-c key=value` assignments. They sit above every config file and are
    /// in place before `core.bare` is consulted.
    pub config: Vec<String>,
}

impl EnvOverrides {
    /// Read the overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var_os(name).map(|v| v.to_string_lossy().into_owned()))
    }

    /// Read the overrides through an arbitrary lookup; empty values count as unset.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let path = |name: &str| var(name).filter(|v| !v.is_empty()).map(PathBuf::from);
        let sep = if cfg!(windows) { ';' } else { ':' };
        Self {
            git_dir: path("GIT_DIR"),
            work_tree: path("GIT_WORK_TREE"),
            ceiling_directories: var("GIT_CEILING_DIRECTORIES")
                .map(|v| {
                    v.split(sep)
                        .filter(|p| !p.is_empty())
                        .map(PathBuf::from)
                        .collect()
                })
                .unwrap_or_default(),
            object_directory: path("GIT_OBJECT_DIRECTORY"),
            index_file: path("GIT_INDEX_FILE"),
            config: Vec::new(),
        }
    }

    /// Add command-line config assignments.
    pub fn with_config<I, S>(mut self, specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.extend(specs.into_iter().map(Into::into));
        self
    }
}
