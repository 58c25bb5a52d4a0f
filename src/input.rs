//! Assembling desired [`Settings`] from what the caller supplied.
//!
//! Desired state comes from exactly one source, in this order of preference:
//! an explicit JSON object (`--input`), JSON lines piped on stdin, or the
//! per-field flags. Sources are never merged with each other.

use tracing::warn;

use crate::error::TstoyError;
use crate::settings::Settings;
use crate::types::{Ensure, Frequency, Scope};

/// The per-field flags of `get`, `set` and `test`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsFlags {
    pub scope: Option<Scope>,
    pub ensure: Option<Ensure>,
    pub update_automatically: Option<bool>,
    pub update_frequency: Option<Frequency>,
}

impl SettingsFlags {
    /// Build a desired state, defaulting ensure to present once a scope is given.
    pub fn into_settings(self) -> Settings {
        with_default_ensure(Settings {
            scope: self.scope,
            ensure: self.ensure,
            update_automatically: self.update_automatically,
            update_frequency: self.update_frequency.unwrap_or_default(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self == &SettingsFlags::default()
    }
}

/// Parse one desired-settings JSON object.
///
/// Unknown keys are logged and skipped. Trailing content after the object is
/// an error.
pub fn parse_settings(json: &str) -> Result<Settings, TstoyError> {
    let mut de = serde_json::Deserializer::from_str(json);
    let settings: Settings = serde_ignored::deserialize(&mut de, |path| {
        warn!(key = %path, "ignoring unknown settings key");
    })
    .map_err(|source| TstoyError::InvalidInput { source })?;
    de.end().map_err(|source| TstoyError::InvalidInput { source })?;
    Ok(with_default_ensure(settings))
}

/// Parse JSON lines: one desired-settings object per nonempty line.
pub fn read_batch(text: &str) -> Result<Vec<Settings>, TstoyError> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_settings)
        .collect()
}

/// Pick the desired states for one invocation.
///
/// `input` (one JSON object) wins over `stdin` (JSON lines), and either wins
/// over `flags`.
pub fn assemble(
    input: Option<&str>,
    stdin: Option<&str>,
    flags: SettingsFlags,
) -> Result<Vec<Settings>, TstoyError> {
    if let Some(json) = input {
        warn_ignored(&flags, "--input");
        return parse_settings(json).map(|settings| vec![settings]);
    }
    if let Some(text) = stdin {
        let batch = read_batch(text)?;
        if !batch.is_empty() {
            warn_ignored(&flags, "stdin");
            return Ok(batch);
        }
    }
    Ok(vec![flags.into_settings()])
}

fn warn_ignored(flags: &SettingsFlags, source: &str) {
    if !flags.is_empty() {
        warn!(source, "ignoring per-field flags in favour of JSON input");
    }
}

fn with_default_ensure(mut settings: Settings) -> Settings {
    if settings.scope.is_some() && settings.ensure.is_none() {
        settings.ensure = Some(Ensure::Present);
    }
    settings
}

/// Scopes named by a batch of desired states, for `get`.
///
/// Every entry must name a scope.
pub fn scopes_of(desired: &[Settings]) -> Result<Vec<Scope>, TstoyError> {
    desired
        .iter()
        .map(|settings| settings.scope.ok_or(TstoyError::UndefinedScope))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_default_ensure_when_scope_given() {
        let flags = SettingsFlags {
            scope: Some(Scope::User),
            update_frequency: Some(Frequency(45)),
            ..SettingsFlags::default()
        };
        assert_eq!(
            flags.into_settings(),
            Settings::new(Scope::User)
                .with_ensure(Ensure::Present)
                .with_update_frequency(45)
        );
    }

    #[test]
    fn flags_without_scope_stay_undefined() {
        let settings = SettingsFlags::default().into_settings();
        assert_eq!(settings.scope, None);
        assert_eq!(settings.ensure, None);
        assert!(matches!(settings.validate(), Err(TstoyError::UndefinedScope)));
    }

    #[test]
    fn explicit_absent_is_kept() {
        let flags = SettingsFlags {
            scope: Some(Scope::Machine),
            ensure: Some(Ensure::Absent),
            ..SettingsFlags::default()
        };
        assert_eq!(flags.into_settings().ensure, Some(Ensure::Absent));
    }

    #[test]
    fn parse_settings_defaults_ensure() {
        let settings = parse_settings(r#"{"scope": "user", "updateAutomatically": false}"#).unwrap();
        assert_eq!(settings.ensure, Some(Ensure::Present));
        assert_eq!(settings.update_automatically, Some(false));
        assert!(settings.update_frequency.is_unset());
    }

    #[test]
    fn parse_settings_null_means_unset() {
        let settings =
            parse_settings(r#"{"scope": "user", "ensure": null, "updateFrequency": null}"#).unwrap();
        assert_eq!(settings.ensure, Some(Ensure::Present));
        assert!(settings.update_frequency.is_unset());
    }

    #[test]
    fn parse_settings_skips_unknown_keys() {
        let settings = parse_settings(r#"{"scope": "machine", "colour": "blue"}"#).unwrap();
        assert_eq!(settings.scope, Some(Scope::Machine));
    }

    #[test]
    fn parse_settings_rejects_bad_values() {
        for json in [
            r#"{"scope": "global"}"#,
            r#"{"scope": "user", "updateFrequency": "weekly"}"#,
            r#"{"scope": "user"} trailing"#,
            "not json",
        ] {
            assert!(
                matches!(parse_settings(json), Err(TstoyError::InvalidInput { .. })),
                "{json}"
            );
        }
    }

    #[test]
    fn batch_skips_blank_lines() {
        let batch = read_batch(
            "{\"scope\": \"machine\"}\n\n  \n{\"scope\": \"user\", \"ensure\": \"absent\"}\n",
        )
        .unwrap();
        assert_eq!(
            batch,
            vec![
                Settings::new(Scope::Machine).with_ensure(Ensure::Present),
                Settings::absent(Scope::User),
            ]
        );
    }

    #[test]
    fn batch_fails_on_any_bad_line() {
        assert!(read_batch("{\"scope\": \"user\"}\n{oops}\n").is_err());
    }

    #[test]
    fn input_wins_over_stdin_and_flags() {
        let flags = SettingsFlags {
            scope: Some(Scope::Machine),
            ..SettingsFlags::default()
        };
        let desired = assemble(
            Some(r#"{"scope": "user"}"#),
            Some("{\"scope\": \"machine\"}\n"),
            flags,
        )
        .unwrap();
        assert_eq!(desired.len(), 1);
        assert_eq!(desired[0].scope, Some(Scope::User));
    }

    #[test]
    fn stdin_wins_over_flags() {
        let flags = SettingsFlags {
            scope: Some(Scope::Machine),
            update_automatically: Some(true),
            ..SettingsFlags::default()
        };
        let desired = assemble(None, Some("{\"scope\": \"user\"}\n"), flags).unwrap();
        assert_eq!(desired, vec![Settings::new(Scope::User).with_ensure(Ensure::Present)]);
    }

    #[test]
    fn empty_stdin_falls_back_to_flags() {
        let flags = SettingsFlags {
            scope: Some(Scope::User),
            ..SettingsFlags::default()
        };
        let desired = assemble(None, Some("\n"), flags).unwrap();
        assert_eq!(desired[0].scope, Some(Scope::User));
    }

    #[test]
    fn scopes_of_requires_every_scope() {
        let desired = vec![Settings::new(Scope::User), Settings::default()];
        assert!(matches!(scopes_of(&desired), Err(TstoyError::UndefinedScope)));
        assert_eq!(scopes_of(&desired[..1]).unwrap(), vec![Scope::User]);
    }
}
