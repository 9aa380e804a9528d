use std::path::{Path, PathBuf};

use bstr::{BStr, ByteSlice};
use tracing::debug;

use crate::file::ConfigFile;
use crate::{env_overrides, parse_bool, ConfigEntry, ConfigError, ConfigKey, ConfigScope};

/// All config layers of a repository, lowest precedence first.
#[derive(Debug, Clone, Default)]
pub struct ConfigSet {
    files: Vec<ConfigFile>,
    overrides: Vec<ConfigEntry>,
}

impl ConfigSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load system, global and local files plus environment entries from the
    /// process environment.
    pub fn load(git_dir: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(git_dir, |name| std::env::var(name).ok())
    }

    /// [`ConfigSet::load`] with an explicit environment lookup.
    ///
    /// Honors `GIT_CONFIG_NOSYSTEM`, `GIT_CONFIG_SYSTEM`, `GIT_CONFIG_GLOBAL`,
    /// `XDG_CONFIG_HOME` and `HOME`.
    pub fn load_with(
        git_dir: Option<&Path>,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut set = Self::new();

        let no_system = var("GIT_CONFIG_NOSYSTEM").is_some_and(|v| parse_bool(Some(v.as_bytes().as_bstr())) != Some(false));
        if !no_system {
            let system = var("GIT_CONFIG_SYSTEM").map_or_else(|| PathBuf::from("/etc/gitconfig"), PathBuf::from);
            set.load_file(&system, ConfigScope::System)?;
        }

        let globals = match var("GIT_CONFIG_GLOBAL") {
            Some(path) => vec![PathBuf::from(path)],
            None => {
                let home = var("HOME").map(PathBuf::from);
                let xdg = var("XDG_CONFIG_HOME")
                    .map(PathBuf::from)
                    .or_else(|| home.as_ref().map(|h| h.join(".config")));
                xdg.map(|x| x.join("git/config"))
                    .into_iter()
                    .chain(home.map(|h| h.join(".gitconfig")))
                    .collect()
            }
        };
        for path in &globals {
            set.load_file(path, ConfigScope::Global)?;
        }

        if let Some(git_dir) = git_dir {
            set.load_file(&git_dir.join("config"), ConfigScope::Local)?;
        }

        set.overrides = env_overrides(&var)?;
        Ok(set)
    }

    fn load_file(&mut self, path: &Path, scope: ConfigScope) -> Result<(), ConfigError> {
        if let Some(file) = ConfigFile::load(path, scope)? {
            debug!(path = %path.display(), ?scope, entries = file.entries().len(), "loaded config");
            self.add_file(file);
        }
        Ok(())
    }

    /// Add a file; files added later take precedence within the same scope.
    pub fn add_file(&mut self, file: ConfigFile) {
        let at = self.files.partition_point(|f| f.scope() <= file.scope());
        self.files.insert(at, file);
    }

    /// Apply a `-c` argument: `key=value`, or a bare `key` meaning true.
    pub fn add_override(&mut self, spec: &str) -> Result<(), ConfigError> {
        let (key, value) = match spec.split_once('=') {
            Some((key, value)) => (key, Some(value.into())),
            None => (spec, None),
        };
        self.overrides.push(ConfigEntry {
            key: ConfigKey::parse(key)?,
            value,
            scope: ConfigScope::Command,
        });
        Ok(())
    }

    /// Every assignment in precedence order, lowest first.
    pub fn entries(&self) -> impl Iterator<Item = &ConfigEntry> {
        self.files
            .iter()
            .flat_map(|f| f.entries())
            .chain(self.overrides.iter())
    }

    /// The winning assignment for `key`. The inner `None` is a bare key.
    pub fn get(&self, key: &str) -> Result<Option<Option<&BStr>>, ConfigError> {
        let key = ConfigKey::parse(key)?;
        Ok(self
            .entries()
            .filter(|e| e.key == key)
            .last()
            .map(|e| e.value.as_ref().map(|v| v.as_bstr())))
    }

    pub fn get_string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self
            .get(key)?
            .map(|v| v.map(|v| v.to_str_lossy().into_owned()).unwrap_or_default()))
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        match self.get(key)? {
            None => Ok(None),
            Some(value) => parse_bool(value).map(Some).ok_or_else(|| ConfigError::InvalidBool {
                key: key.to_string(),
                value: value.map(|v| v.to_string()).unwrap_or_default(),
            }),
        }
    }

    /// Bool with a default for unset keys.
    pub fn get_bool_or(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        Ok(self.get_bool(key)?.unwrap_or(default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(text: &str, scope: ConfigScope) -> ConfigFile {
        ConfigFile::parse(text.as_bytes(), None, scope).unwrap()
    }

    #[test]
    fn narrower_scopes_win() {
        let mut set = ConfigSet::new();
        set.add_file(file("[user]\nname = Local\n", ConfigScope::Local));
        set.add_file(file("[user]\nname = Global\nemail = g@x\n", ConfigScope::Global));
        assert_eq!(set.get_string("user.name").unwrap().as_deref(), Some("Local"));
        assert_eq!(set.get_string("user.email").unwrap().as_deref(), Some("g@x"));

        set.add_override("user.name=Cmd").unwrap();
        assert_eq!(set.get_string("USER.NAME").unwrap().as_deref(), Some("Cmd"));
        assert_eq!(set.get_string("user.signingkey").unwrap(), None);
    }

    #[test]
    fn booleans_and_bare_overrides() {
        let mut set = ConfigSet::new();
        set.add_file(file("[core]\nbare = no\n[status]\nrenames = bogus\n", ConfigScope::Local));
        assert_eq!(set.get_bool("core.bare").unwrap(), Some(false));
        assert!(!set.get_bool_or("diff.renames", false).unwrap());
        assert!(matches!(
            set.get_bool("status.renames"),
            Err(ConfigError::InvalidBool { .. })
        ));

        set.add_override("core.bare").unwrap();
        assert_eq!(set.get_bool("core.bare").unwrap(), Some(true));
    }

    #[test]
    fn load_reads_layers_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let home = dir.path().join("home");
        let git_dir = dir.path().join("repo/.git");
        std::fs::create_dir_all(&home).unwrap();
        std::fs::create_dir_all(&git_dir).unwrap();
        std::fs::write(home.join(".gitconfig"), "[user]\n\tname = Home User\n\temail = home@x\n").unwrap();
        std::fs::write(git_dir.join("config"), "[user]\n\temail = repo@x\n").unwrap();

        let home_str = home.to_string_lossy().into_owned();
        let set = ConfigSet::load_with(Some(&git_dir), |name| match name {
            "HOME" => Some(home_str.clone()),
            "GIT_CONFIG_NOSYSTEM" => Some("1".into()),
            "GIT_CONFIG_COUNT" => Some("1".into()),
            "GIT_CONFIG_KEY_0" => Some("core.bare".into()),
            "GIT_CONFIG_VALUE_0" => Some("true".into()),
            _ => None,
        })
        .unwrap();

        assert_eq!(set.get_string("user.name").unwrap().as_deref(), Some("Home User"));
        assert_eq!(set.get_string("user.email").unwrap().as_deref(), Some("repo@x"));
        assert_eq!(set.get_bool("core.bare").unwrap(), Some(true));
    }
}
