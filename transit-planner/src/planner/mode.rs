//! Cost modes.

use std::fmt;
use std::str::FromStr;

use super::config::SearchConfig;

/// Error returned when parsing an unknown cost mode token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid mode {token:?}: expected TIME or TRANSFERS")]
pub struct InvalidMode {
    token: String,
}

/// What a search minimizes.
///
/// # Examples
///
/// ```
/// use transit_planner::planner::CostMode;
///
/// assert_eq!("TIME".parse::<CostMode>().unwrap(), CostMode::Time);
/// assert_eq!("transfers".parse::<CostMode>().unwrap(), CostMode::Transfers);
/// assert!("fastest".parse::<CostMode>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CostMode {
    /// Earliest arrival; changing lines costs nothing extra.
    #[default]
    Time,
    /// Fewest line changes; each change costs a large fixed penalty and
    /// ties fall back to earliest arrival.
    Transfers,
}

impl CostMode {
    /// Penalty in seconds charged for one line change.
    pub fn transfer_penalty_secs(self, config: &SearchConfig) -> u32 {
        match self {
            CostMode::Time => 0,
            CostMode::Transfers => config.transfer_penalty_secs,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CostMode::Time => "TIME",
            CostMode::Transfers => "TRANSFERS",
        }
    }
}

impl FromStr for CostMode {
    type Err = InvalidMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TIME" => Ok(CostMode::Time),
            "TRANSFERS" => Ok(CostMode::Transfers),
            _ => Err(InvalidMode {
                token: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for CostMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penalty_per_mode() {
        let config = SearchConfig::default();
        assert_eq!(CostMode::Time.transfer_penalty_secs(&config), 0);
        assert_eq!(CostMode::Transfers.transfer_penalty_secs(&config), 1800);
    }

    #[test]
    fn display_roundtrip() {
        for mode in [CostMode::Time, CostMode::Transfers] {
            assert_eq!(mode.to_string().parse::<CostMode>().unwrap(), mode);
        }
    }

    #[test]
    fn invalid_mode_message() {
        let err = "walk".parse::<CostMode>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid mode \"walk\": expected TIME or TRANSFERS"
        );
    }
}
