//! Environment-supplied request defaults.

use anyhow::{Context, Result};

/// Default league/season applied when a request omits them. An unset
/// variable is `None`; a set-but-unparseable one is a startup error rather
/// than a silent zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EspnDefaults {
    pub league_id: Option<u32>,
    pub season: Option<u16>,
}

impl EspnDefaults {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            league_id: parse_var("ESPN_LEAGUE_ID")?,
            season: parse_var("ESPN_SEASON")?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e).with_context(|| format!("Failed to read {name}")),
        Ok(raw) => raw
            .parse()
            .map(Some)
            .with_context(|| format!("Failed to parse {name}={raw:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests mutate process state; keep them in one test so they
    // cannot race each other under the parallel test runner.
    #[test]
    fn test_from_env_unset_set_and_invalid() {
        std::env::remove_var("ESPN_LEAGUE_ID");
        std::env::remove_var("ESPN_SEASON");
        assert_eq!(EspnDefaults::from_env().unwrap(), EspnDefaults::default());

        std::env::set_var("ESPN_LEAGUE_ID", "123456");
        std::env::set_var("ESPN_SEASON", "2024");
        let defaults = EspnDefaults::from_env().unwrap();
        assert_eq!(defaults.league_id, Some(123456));
        assert_eq!(defaults.season, Some(2024));

        std::env::set_var("ESPN_SEASON", "not-a-year");
        assert!(EspnDefaults::from_env().is_err());

        std::env::remove_var("ESPN_LEAGUE_ID");
        std::env::remove_var("ESPN_SEASON");
    }
}
