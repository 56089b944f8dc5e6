//! Mist cloud environments.

use std::fmt;
use std::str::FromStr;

use crate::error::MistError;

/// Mist cloud instances, each with its own API endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    Global01,
    Global02,
    Global03,
    Global04,
    Global05,
    Emea01,
    Emea02,
    Emea03,
    Apac01,
}

impl Environment {
    /// All environments in menu order.
    pub const ALL: [Environment; 9] = [
        Environment::Global01,
        Environment::Global02,
        Environment::Global03,
        Environment::Global04,
        Environment::Global05,
        Environment::Emea01,
        Environment::Emea02,
        Environment::Emea03,
        Environment::Apac01,
    ];

    /// Short key used on the command line and for credential file names.
    pub fn key(&self) -> &'static str {
        match self {
            Environment::Global01 => "global01",
            Environment::Global02 => "global02",
            Environment::Global03 => "global03",
            Environment::Global04 => "global04",
            Environment::Global05 => "global05",
            Environment::Emea01 => "emea01",
            Environment::Emea02 => "emea02",
            Environment::Emea03 => "emea03",
            Environment::Apac01 => "apac01",
        }
    }

    /// Human readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Environment::Global01 => "Mist Global 01",
            Environment::Global02 => "Mist Global 02",
            Environment::Global03 => "Mist Global 03",
            Environment::Global04 => "Mist Global 04",
            Environment::Global05 => "Mist Global 05",
            Environment::Emea01 => "Mist EMEA 01",
            Environment::Emea02 => "Mist EMEA 02",
            Environment::Emea03 => "Mist EMEA 03",
            Environment::Apac01 => "Mist APAC 01",
        }
    }

    /// API base URL, always with a trailing slash.
    pub fn api_url(&self) -> &'static str {
        match self {
            Environment::Global01 => "https://api.mist.com/api/v1/",
            Environment::Global02 => "https://api.gc1.mist.com/api/v1/",
            Environment::Global03 => "https://api.ac2.mist.com/api/v1/",
            Environment::Global04 => "https://api.gc2.mist.com/api/v1/",
            Environment::Global05 => "https://api.gc4.mist.com/api/v1/",
            Environment::Emea01 => "https://api.eu.mist.com/api/v1/",
            Environment::Emea02 => "https://api.gc3.mist.com/api/v1/",
            Environment::Emea03 => "https://api.ac6.mist.com/api/v1/",
            Environment::Apac01 => "https://api.ac5.mist.com/api/v1/",
        }
    }

    fn valid_keys() -> String {
        Self::ALL
            .iter()
            .map(Environment::key)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Environment {
    type Err = MistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|env| env.key() == key)
            .ok_or_else(|| MistError::InvalidEnvironment(s.to_string(), Self::valid_keys()))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_display() {
        assert_eq!(Environment::Global01.to_string(), "Mist Global 01");
        assert_eq!(Environment::Emea03.to_string(), "Mist EMEA 03");
        assert_eq!(Environment::Apac01.to_string(), "Mist APAC 01");
    }

    #[test]
    fn test_environment_parse_is_case_insensitive() {
        assert_eq!("EMEA01".parse::<Environment>().unwrap(), Environment::Emea01);
        assert_eq!(" global05 ".parse::<Environment>().unwrap(), Environment::Global05);
    }

    #[test]
    fn test_environment_parse_unknown() {
        let err = "mars01".parse::<Environment>().unwrap_err();
        match err {
            MistError::InvalidEnvironment(given, choices) => {
                assert_eq!(given, "mars01");
                assert!(choices.starts_with("global01, global02"));
                assert!(choices.ends_with("apac01"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_api_urls_have_trailing_slash() {
        for env in Environment::ALL {
            assert!(env.api_url().starts_with("https://api."));
            assert!(env.api_url().ends_with("/api/v1/"));
        }
        assert_eq!(Environment::Emea01.api_url(), "https://api.eu.mist.com/api/v1/");
    }

    #[test]
    fn test_keys_round_trip() {
        for env in Environment::ALL {
            assert_eq!(env.key().parse::<Environment>().unwrap(), env);
        }
    }
}
