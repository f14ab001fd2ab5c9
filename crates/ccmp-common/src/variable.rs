//! Wind variables carried by CCMP daily and aggregate grids.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A wind variable present in both the daily grids and the yearly means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindVariable {
    /// Eastward wind (m/s)
    Uwnd,
    /// Northward wind (m/s)
    Vwnd,
    /// Wind speed (m/s)
    Ws,
}

impl WindVariable {
    /// All variables the validator samples from.
    pub const ALL: [WindVariable; 3] = [WindVariable::Uwnd, WindVariable::Vwnd, WindVariable::Ws];

    /// NetCDF variable name.
    pub fn name(&self) -> &'static str {
        match self {
            WindVariable::Uwnd => "uwnd",
            WindVariable::Vwnd => "vwnd",
            WindVariable::Ws => "ws",
        }
    }

    /// Name of the companion observation-count variable in the aggregate file.
    pub fn nobs_name(&self) -> String {
        format!("{}_nobs", self.name())
    }
}

impl fmt::Display for WindVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown wind variable: {0}")]
pub struct UnknownVariable(pub String);

impl FromStr for WindVariable {
    type Err = UnknownVariable;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "uwnd" => Ok(WindVariable::Uwnd),
            "vwnd" => Ok(WindVariable::Vwnd),
            "ws" => Ok(WindVariable::Ws),
            _ => Err(UnknownVariable(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(WindVariable::Vwnd.name(), "vwnd");
        assert_eq!(WindVariable::Vwnd.nobs_name(), "vwnd_nobs");
        assert_eq!(WindVariable::Ws.to_string(), "ws");
    }

    #[test]
    fn test_parse() {
        assert_eq!("UWND".parse::<WindVariable>().unwrap(), WindVariable::Uwnd);
        assert!("nobs".parse::<WindVariable>().is_err());
    }
}
