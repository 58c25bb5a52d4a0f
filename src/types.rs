//! Base vocabulary: the string-coded value types shared by every layer, plus
//! the framework-independent [`ConfigAction`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseValueError;
use crate::settings::Settings;

/// Which of the application's configuration files a record targets.
///
/// "Not yet chosen" is represented as `Option::<Scope>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Scope {
    /// The file that applies to every user of the machine.
    Machine,
    /// The file that applies to the current user only.
    User,
}

impl Scope {
    pub const ALL: [Scope; 2] = [Scope::Machine, Scope::User];

    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Machine => "machine",
            Scope::User => "user",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "machine" => Ok(Scope::Machine),
            "user" => Ok(Scope::User),
            _ => Err(ParseValueError {
                key: "scope",
                value: s.to_string(),
                expected: "one of: 'machine', 'user'",
            }),
        }
    }
}

impl TryFrom<String> for Scope {
    type Error = ParseValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Whether a scope's configuration file should exist.
///
/// An unset ensure (`None`) is treated as [`Ensure::Present`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Ensure {
    /// The file must exist, with the requested keys set.
    #[default]
    Present,
    /// The file must not exist.
    Absent,
}

impl Ensure {
    pub fn as_str(self) -> &'static str {
        match self {
            Ensure::Present => "present",
            Ensure::Absent => "absent",
        }
    }
}

impl fmt::Display for Ensure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Ensure {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "present" => Ok(Ensure::Present),
            "absent" => Ok(Ensure::Absent),
            _ => Err(ParseValueError {
                key: "ensure",
                value: s.to_string(),
                expected: "one of: 'present', 'absent'",
            }),
        }
    }
}

impl TryFrom<String> for Ensure {
    type Error = ParseValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Update check interval in days.
///
/// `0` means "unset" (no opinion), `1..=90` are explicit intervals. Anything
/// else can be represented so that it can be reported, but fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frequency(pub i64);

impl Frequency {
    pub const UNSET: Frequency = Frequency(0);
    pub const MAX_DAYS: i64 = 90;

    /// True iff the value lies in `[0, 90]`. Zero is valid as "unset".
    pub fn is_valid(&self) -> bool {
        (0..=Self::MAX_DAYS).contains(&self.0)
    }

    pub fn is_unset(&self) -> bool {
        self.0 == 0
    }

    pub fn days(&self) -> i64 {
        self.0
    }
}

impl From<i64> for Frequency {
    fn from(days: i64) -> Self {
        Frequency(days)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Frequency {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Frequency)
            .map_err(|_| ParseValueError {
                key: "updateFrequency",
                value: s.to_string(),
                expected: "an integer number of days",
            })
    }
}

/// Where a scope's configuration directory lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigDir {
    /// The platform's default directory for the scope (see [`paths`](crate::paths)).
    Platform,
    /// An explicit directory.
    Path(PathBuf),
}

/// One layer of the merged configuration view, for `show --only`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Default,
    Machine,
    User,
    Final,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Default, Layer::Machine, Layer::User, Layer::Final];

    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Default => "default",
            Layer::Machine => "machine",
            Layer::User => "user",
            Layer::Final => "final",
        }
    }
}

impl FromStr for Layer {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Layer::Default),
            "machine" => Ok(Layer::Machine),
            "user" => Ok(Layer::User),
            "final" => Ok(Layer::Final),
            _ => Err(ParseValueError {
                key: "layer",
                value: s.to_string(),
                expected: "one of: 'default', 'machine', 'user', 'final'",
            }),
        }
    }
}

/// A tstoy operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigAction {
    /// Report the actual state of each scope, in order.
    Get { scopes: Vec<Scope> },
    /// Enforce each desired state, in order.
    Set { desired: Vec<Settings> },
    /// Compare each desired state with the actual one without writing.
    Test { desired: Vec<Settings> },
    /// Print the config file path of each scope.
    ShowPath { scopes: Vec<Scope> },
    /// Print the selected layers of the merged configuration view.
    Show { only: Vec<Layer> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_parses_case_insensitively() {
        assert_eq!("machine".parse::<Scope>().unwrap(), Scope::Machine);
        assert_eq!("User".parse::<Scope>().unwrap(), Scope::User);
        assert_eq!("MACHINE".parse::<Scope>().unwrap(), Scope::Machine);
    }

    #[test]
    fn scope_rejects_unknown() {
        let err = "global".parse::<Scope>().unwrap_err();
        assert_eq!(err.key, "scope");
        assert!(err.to_string().contains("global"));
    }

    #[test]
    fn scope_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Scope::User).unwrap(), "\"user\"");
        let scope: Scope = serde_json::from_str("\"Machine\"").unwrap();
        assert_eq!(scope, Scope::Machine);
    }

    #[test]
    fn ensure_round_trips_through_json() {
        assert_eq!(serde_json::to_string(&Ensure::Absent).unwrap(), "\"absent\"");
        let ensure: Ensure = serde_json::from_str("\"PRESENT\"").unwrap();
        assert_eq!(ensure, Ensure::Present);
        assert!(serde_json::from_str::<Ensure>("\"maybe\"").is_err());
    }

    #[test]
    fn ensure_defaults_to_present() {
        assert_eq!(Ensure::default(), Ensure::Present);
    }

    #[test]
    fn frequency_validity_bounds() {
        assert!(Frequency(0).is_valid());
        assert!(Frequency(1).is_valid());
        assert!(Frequency(90).is_valid());
        assert!(!Frequency(91).is_valid());
        assert!(!Frequency(-1).is_valid());
        assert!(!Frequency(1000).is_valid());
    }

    #[test]
    fn frequency_parses_integers_only() {
        assert_eq!("45".parse::<Frequency>().unwrap(), Frequency(45));
        assert_eq!("-3".parse::<Frequency>().unwrap(), Frequency(-3));
        assert!("weekly".parse::<Frequency>().is_err());
    }

    #[test]
    fn frequency_is_a_bare_integer_in_json() {
        assert_eq!(serde_json::to_string(&Frequency(30)).unwrap(), "30");
        let f: Frequency = serde_json::from_str("7").unwrap();
        assert_eq!(f.days(), 7);
    }

    #[test]
    fn layer_parses_known_names() {
        assert_eq!("Final".parse::<Layer>().unwrap(), Layer::Final);
        assert!("everything".parse::<Layer>().is_err());
    }
}
