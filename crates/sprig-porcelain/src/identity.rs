//! Author and committer identities.
//!
//! An explicit signature is validated as given. Otherwise the identity comes
//! from `GIT_<ROLE>_NAME`, `GIT_<ROLE>_EMAIL` and `GIT_<ROLE>_DATE`, falling
//! back to `user.name` and `user.email` and the current time.

use sprig_config::ConfigSet;
use sprig_repository::Repository;
use sprig_utils::{GitDate, Signature};

use crate::{PorcelainError, Result};

/// Which side of a commit an identity signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Author,
    Committer,
}

impl Role {
    fn env_prefix(self) -> &'static str {
        match self {
            Role::Author => "AUTHOR",
            Role::Committer => "COMMITTER",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Role::Author => "author",
            Role::Committer => "committer",
        }
    }
}

/// Check a caller-supplied signature.
pub fn validate_signature(sig: &Signature) -> Result<()> {
    sig.validate()
        .map_err(|e| PorcelainError::InvalidSignature(e.to_string()))
}

/// Parse `Name <email>` (as given to `--author`) stamped with `date`.
pub fn parse_identity(input: &str, date: GitDate) -> Result<Signature> {
    Signature::parse_ident(input, date).map_err(|e| PorcelainError::InvalidSignature(e.to_string()))
}

/// The identity used for `role` when none is given, from the process
/// environment and the repository config.
pub fn default_identity(repo: &Repository, role: Role) -> Result<Signature> {
    default_identity_with(repo.config(), role, |name| std::env::var(name).ok())
}

/// [`default_identity`] with an explicit environment lookup.
pub fn default_identity_with(
    config: &ConfigSet,
    role: Role,
    var: impl Fn(&str) -> Option<String>,
) -> Result<Signature> {
    let prefix = role.env_prefix();
    let lookup = |suffix: &str, key: &str| -> Result<Option<String>> {
        if let Some(value) = var(&format!("GIT_{prefix}_{suffix}")).filter(|v| !v.is_empty()) {
            return Ok(Some(value));
        }
        Ok(config.get_string(key)?.filter(|v| !v.trim().is_empty()))
    };

    let missing = || PorcelainError::NoIdentityConfigured {
        role: role.label(),
        env: prefix,
    };
    let name = lookup("NAME", "user.name")?.ok_or_else(missing)?;
    let email = lookup("EMAIL", "user.email")?.ok_or_else(missing)?;

    let date = match var(&format!("GIT_{prefix}_DATE")).filter(|v| !v.is_empty()) {
        Some(raw) => GitDate::parse(&raw).map_err(|e| PorcelainError::InvalidSignature(e.to_string()))?,
        None => GitDate::now(),
    };

    Signature::new(name.trim(), email.trim(), date).map_err(|e| PorcelainError::InvalidSignature(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprig_config::{ConfigFile, ConfigScope};

    fn config(text: &str) -> ConfigSet {
        let mut set = ConfigSet::new();
        set.add_file(ConfigFile::parse(text.as_bytes(), None, ConfigScope::Local).unwrap());
        set
    }

    #[test]
    fn environment_beats_config() {
        let cfg = config("[user]\n\tname = Config Name\n\temail = config@example.com\n");
        let sig = default_identity_with(&cfg, Role::Author, |name| match name {
            "GIT_AUTHOR_NAME" => Some("Env Name".into()),
            "GIT_AUTHOR_DATE" => Some("1700000000 +0130".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(sig.name, "Env Name");
        assert_eq!(sig.email, "config@example.com");
        assert_eq!(sig.date, GitDate::new(1_700_000_000, 90));

        // The committer variables do not leak into the author.
        let sig = default_identity_with(&cfg, Role::Author, |name| match name {
            "GIT_COMMITTER_NAME" => Some("Committer".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(sig.name, "Config Name");
    }

    #[test]
    fn missing_identity() {
        let cfg = config("[user]\n\tname = Only Name\n");
        assert!(matches!(
            default_identity_with(&cfg, Role::Committer, |_| None),
            Err(PorcelainError::NoIdentityConfigured { role: "committer", .. })
        ));
        let empty = ConfigSet::new();
        assert!(matches!(
            default_identity_with(&empty, Role::Author, |name| (name == "GIT_AUTHOR_NAME").then(|| String::new())),
            Err(PorcelainError::NoIdentityConfigured { role: "author", .. })
        ));
    }

    #[test]
    fn malformed_identities_are_rejected() {
        let cfg = config("[user]\n\tname = A\n\temail = a<b@example.com\n");
        assert!(matches!(
            default_identity_with(&cfg, Role::Author, |_| None),
            Err(PorcelainError::InvalidSignature(_))
        ));

        let cfg = config("[user]\n\tname = A\n\temail = a@example.com\n");
        assert!(matches!(
            default_identity_with(&cfg, Role::Author, |name| (name == "GIT_AUTHOR_DATE").then(|| "yesterday-ish".to_string())),
            Err(PorcelainError::InvalidSignature(_))
        ));
    }

    #[test]
    fn explicit_signatures() {
        let date = GitDate::new(0, 0);
        let sig = parse_identity("Jane Doe <jane@example.com>", date).unwrap();
        assert!(validate_signature(&sig).is_ok());
        assert!(parse_identity("no email here", date).is_err());

        let bad = Signature {
            name: "".into(),
            email: "x@example.com".into(),
            date,
        };
        assert!(matches!(validate_signature(&bad), Err(PorcelainError::InvalidSignature(_))));
    }
}
