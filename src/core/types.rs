use crate::core::error::{EngineError, InputError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

/// Where the current dataset came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceType {
    Inline,
    Local(std::path::PathBuf),
    Remote { host: String, path: String },
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline => write!(f, "inline"),
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote { host, path } => write!(f, "{host}:{path}"),
        }
    }
}

/// Rows per page. Only these sizes are offered to the user.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display,
)]
#[serde(try_from = "usize", into = "usize")]
pub enum PageSize {
    #[strum(serialize = "5")]
    Five,
    #[default]
    #[strum(serialize = "10")]
    Ten,
    #[strum(serialize = "20")]
    Twenty,
    #[strum(serialize = "50")]
    Fifty,
    #[strum(serialize = "100")]
    Hundred,
}

impl PageSize {
    pub fn get(self) -> usize {
        match self {
            Self::Five => 5,
            Self::Ten => 10,
            Self::Twenty => 20,
            Self::Fifty => 50,
            Self::Hundred => 100,
        }
    }
}

impl TryFrom<usize> for PageSize {
    type Error = EngineError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        match n {
            5 => Ok(Self::Five),
            10 => Ok(Self::Ten),
            20 => Ok(Self::Twenty),
            50 => Ok(Self::Fifty),
            100 => Ok(Self::Hundred),
            other => Err(EngineError::InvalidPageSize(other)),
        }
    }
}

impl From<PageSize> for usize {
    fn from(size: PageSize) -> Self {
        size.get()
    }
}

/// Expression dialect used by the transformer.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TransformLanguage {
    /// A single SQL query over the table `df`.
    #[default]
    Sql,
    /// A JMESPath expression applied to every row.
    Jmes,
}

/// Credentials and address for the remote fetch collaborator.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub hostname: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl ConnectionParams {
    pub const DEFAULT_PORT: u16 = 22;

    /// Build from the raw text a form would collect, trimming every field.
    pub fn from_fields(
        hostname: &str,
        port: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, InputError> {
        let port = port.trim();
        let port = if port.is_empty() {
            Self::DEFAULT_PORT
        } else {
            u16::from_str(port).map_err(|_| InputError::InvalidPort(port.to_string()))?
        };
        let params = Self {
            hostname: hostname.trim().to_string(),
            port,
            username: username.trim().to_string(),
            password: password.trim().to_string(),
        };
        params.validate()?;
        Ok(params)
    }

    /// Every field has to be filled in before a connection is attempted.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.hostname.is_empty() {
            return Err(InputError::MissingField("hostname"));
        }
        if self.username.is_empty() {
            return Err(InputError::MissingField("username"));
        }
        if self.password.is_empty() {
            return Err(InputError::MissingField("password"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_page_size_allowed_set() {
        let sizes: Vec<usize> = PageSize::iter().map(PageSize::get).collect();
        assert_eq!(sizes, vec![5, 10, 20, 50, 100]);
        assert_eq!(PageSize::default().get(), 10);
        assert!(PageSize::try_from(7).is_err());
        assert_eq!(PageSize::try_from(50).unwrap(), PageSize::Fifty);
        assert_eq!(PageSize::Twenty.to_string(), "20");
    }

    #[test]
    fn test_transform_language_from_str() {
        assert_eq!(TransformLanguage::from_str("SQL").unwrap(), TransformLanguage::Sql);
        assert_eq!(TransformLanguage::from_str("jmes").unwrap(), TransformLanguage::Jmes);
        assert!(TransformLanguage::from_str("python").is_err());
    }

    #[test]
    fn test_connection_params_from_fields() {
        let p = ConnectionParams::from_fields(" 10.0.0.1 ", "", "me", "pw").unwrap();
        assert_eq!(p.port, 22);
        assert_eq!(p.hostname, "10.0.0.1");
        assert!(!format!("{p:?}").contains("pw"));

        assert!(matches!(
            ConnectionParams::from_fields("h", "twenty-two", "me", "pw"),
            Err(InputError::InvalidPort(_))
        ));
        assert!(matches!(
            ConnectionParams::from_fields("h", "22", "", "pw"),
            Err(InputError::MissingField("username"))
        ));
    }
}
