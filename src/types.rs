use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;

/// Family of code generator a template-like source file belongs to.
///
/// - `Legacy`: quicktemplate sources (`.qtpl`), compiled by `qtc`.
/// - `Modern`: templ sources (`.templ`), compiled by `templ generate`.
///
/// "No regeneration required" is expressed as `Option::<GeneratorKind>::None`
/// by the staleness detector rather than as a third variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    Legacy,
    Modern,
}

impl GeneratorKind {
    pub const ALL: [GeneratorKind; 2] = [GeneratorKind::Legacy, GeneratorKind::Modern];

    pub fn as_str(&self) -> &'static str {
        match self {
            GeneratorKind::Legacy => "legacy",
            GeneratorKind::Modern => "modern",
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeneratorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(GeneratorKind::Legacy),
            "modern" => Ok(GeneratorKind::Modern),
            other => Err(format!(
                "invalid generator kind: {other} (expected \"legacy\" or \"modern\")"
            )),
        }
    }
}

/// Modification time with millisecond resolution.
///
/// `Timestamp::MISSING` stands for "path does not exist / could not be
/// stat'ed" and orders before every real timestamp, so a missing derived
/// artifact is always older than its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(Option<i64>);

impl Timestamp {
    pub const MISSING: Timestamp = Timestamp(None);

    pub fn from_millis(millis: i64) -> Self {
        Timestamp(Some(millis))
    }

    pub fn from_system_time(time: SystemTime) -> Self {
        let millis = match time.duration_since(UNIX_EPOCH) {
            Ok(d) => i64::try_from(d.as_millis()).unwrap_or(i64::MAX),
            Err(before) => -i64::try_from(before.duration().as_millis()).unwrap_or(i64::MAX),
        };
        Timestamp(Some(millis))
    }

    pub fn is_missing(&self) -> bool {
        self.0.is_none()
    }

    /// Milliseconds since the Unix epoch, if present.
    pub fn millis(&self) -> Option<i64> {
        self.0
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        Timestamp::from_system_time(time)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ms) => write!(f, "{ms}ms"),
            None => f.write_str("missing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn missing_is_older_than_everything() {
        assert!(Timestamp::MISSING < Timestamp::from_millis(i64::MIN));
        assert!(Timestamp::MISSING < Timestamp::from_millis(0));
        assert_eq!(Timestamp::default(), Timestamp::MISSING);
    }

    #[test]
    fn system_time_is_truncated_to_millis() {
        let t = UNIX_EPOCH + Duration::from_micros(1_500_999);
        assert_eq!(Timestamp::from(t).millis(), Some(1_500));

        let before = UNIX_EPOCH - Duration::from_millis(20);
        assert_eq!(Timestamp::from(before).millis(), Some(-20));
    }

    #[test]
    fn generator_kind_parses_case_insensitively() {
        assert_eq!("Legacy".parse::<GeneratorKind>(), Ok(GeneratorKind::Legacy));
        assert_eq!(" modern ".parse::<GeneratorKind>(), Ok(GeneratorKind::Modern));
        assert!("none".parse::<GeneratorKind>().is_err());
    }
}
