use crate::{ConfigEntry, ConfigError, ConfigKey, ConfigScope};

/// Entries passed through `GIT_CONFIG_COUNT`, `GIT_CONFIG_KEY_<n>` and
/// `GIT_CONFIG_VALUE_<n>`, read through `var` so callers choose the source.
pub fn env_overrides(var: impl Fn(&str) -> Option<String>) -> Result<Vec<ConfigEntry>, ConfigError> {
    let Some(count) = var("GIT_CONFIG_COUNT") else {
        return Ok(Vec::new());
    };
    let count: usize = count.trim().parse().map_err(|_| ConfigError::InvalidInt {
        key: "GIT_CONFIG_COUNT".into(),
        value: count.clone(),
    })?;

    (0..count)
        .map(|i| {
            let key = var(&format!("GIT_CONFIG_KEY_{i}"))
                .ok_or_else(|| ConfigError::InvalidKey(format!("GIT_CONFIG_KEY_{i} is missing")))?;
            let value = var(&format!("GIT_CONFIG_VALUE_{i}")).unwrap_or_default();
            Ok(ConfigEntry {
                key: ConfigKey::parse(&key)?,
                value: Some(value.into()),
                scope: ConfigScope::Command,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn no_count_means_nothing() {
        assert!(env_overrides(vars(&[])).unwrap().is_empty());
    }

    #[test]
    fn reads_numbered_pairs() {
        let entries = env_overrides(vars(&[
            ("GIT_CONFIG_COUNT", "2"),
            ("GIT_CONFIG_KEY_0", "user.name"),
            ("GIT_CONFIG_VALUE_0", "Env Name"),
            ("GIT_CONFIG_KEY_1", "core.bare"),
        ]))
        .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key.to_string(), "user.name");
        assert_eq!(entries[0].value.as_ref().unwrap(), "Env Name");
        assert_eq!(entries[1].value.as_ref().unwrap(), "");
    }

    #[test]
    fn missing_key_or_bad_count_fails() {
        assert!(env_overrides(vars(&[("GIT_CONFIG_COUNT", "1")])).is_err());
        assert!(env_overrides(vars(&[("GIT_CONFIG_COUNT", "x")])).is_err());
    }
}
