use serde::Deserialize;

use rowset_api::CursorError;

use crate::coerce::Charset;
use crate::temporal::Calendar;

/// Cursor configuration, parsed from TOML.
///
/// ```toml
/// default_offset = "+03:00"
/// charset = "ascii"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CursorConfig {
    /// UTC offset of the default calendar used to read date/time strings.
    #[serde(default = "default_offset")]
    pub default_offset: String,

    /// Charset for `get_bytes`.
    #[serde(default)]
    pub charset: Charset,
}

fn default_offset() -> String {
    "UTC".to_string()
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            default_offset: default_offset(),
            charset: Charset::default(),
        }
    }
}

impl CursorConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, CursorError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CursorError::Config(format!("{path}: {e}")))?;
        Self::parse(&content).map_err(|e| e.with_context(path))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, CursorError> {
        toml::from_str(toml_str).map_err(|e| CursorError::Config(e.to_string()))
    }

    /// Validate into runtime options.
    pub fn options(&self) -> Result<CursorOptions, CursorError> {
        let calendar = Calendar::parse(&self.default_offset).ok_or_else(|| {
            CursorError::Config(format!("invalid default_offset '{}'", self.default_offset))
        })?;
        Ok(CursorOptions {
            calendar,
            charset: self.charset,
        })
    }
}

/// Validated options a cursor runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorOptions {
    /// Calendar date/time strings are interpreted in when no calendar is passed.
    pub calendar: Calendar,
    pub charset: Charset,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let options = CursorConfig::parse("").unwrap().options().unwrap();
        assert_eq!(options, CursorOptions::default());
    }

    #[test]
    fn parses_offset_and_charset() {
        let config = CursorConfig::parse(
            r#"
            default_offset = "-05:00"
            charset = "ascii"
            "#,
        )
        .unwrap();
        let options = config.options().unwrap();
        assert_eq!(options.calendar, Calendar::east(-5 * 3600).unwrap());
        assert_eq!(options.charset, Charset::Ascii);
    }

    #[test]
    fn rejects_bad_offset() {
        let config = CursorConfig::parse(r#"default_offset = "Mars/Olympus""#).unwrap();
        let err = config.options().unwrap_err();
        assert_eq!(err.kind(), rowset_api::ErrorKind::Config);
    }

    #[test]
    fn rejects_unknown_charset() {
        let err = CursorConfig::parse(r#"charset = "ebcdic""#).unwrap_err();
        assert_eq!(err.kind(), rowset_api::ErrorKind::Config);
    }
}
