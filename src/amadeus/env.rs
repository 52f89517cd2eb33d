//! Amadeus API environments and their hosts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Amadeus self-service environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AmadeusEnv {
    /// Sandbox with cached, partial data
    #[default]
    Test,
    Production,
}

impl AmadeusEnv {
    /// Returns the API host for this environment.
    pub fn host(&self) -> &'static str {
        match self {
            AmadeusEnv::Test => "test.api.amadeus.com",
            AmadeusEnv::Production => "api.amadeus.com",
        }
    }

    /// Returns the base URL for this environment.
    pub fn base_url(&self) -> String {
        format!("https://{}", self.host())
    }

    /// Returns all environments.
    pub fn all() -> &'static [AmadeusEnv] {
        &[AmadeusEnv::Test, AmadeusEnv::Production]
    }
}

impl fmt::Display for AmadeusEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmadeusEnv::Test => write!(f, "test"),
            AmadeusEnv::Production => write!(f, "production"),
        }
    }
}

impl FromStr for AmadeusEnv {
    type Err = EnvParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "test" | "sandbox" => Ok(AmadeusEnv::Test),
            "production" | "prod" | "live" => Ok(AmadeusEnv::Production),
            _ => Err(EnvParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnvParseError(String);

impl fmt::Display for EnvParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown environment '{}'. Valid environments: test, production", self.0)
    }
}

impl std::error::Error for EnvParseError {}
