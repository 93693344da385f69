use serde::{Deserialize, Serialize};

use super::error::CalcError;

/// Upper bound for rounding precision.
pub const MAX_DECIMALS: u32 = 10;

/// Calculator configuration.
///
/// Deserializable so callers can load it from their own configuration
/// source; missing fields fall back to [`Default`]. Tax codes named here
/// are checked against the catalog by
/// [`Calculator::with_settings`](super::Calculator::with_settings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorSettings {
    /// Decimal places for subtotal and total rounding (default: 2).
    pub decimals: u32,
    /// Zero-rate code for exempt lines and margin-scheme cost bases.
    /// `None` keeps the catalog's own zero rate.
    pub zero_rate_code: Option<String>,
    /// Code given to lines that arrive without a tax code.
    pub default_tax_code: Option<String>,
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        Self {
            decimals: 2,
            zero_rate_code: None,
            default_tax_code: None,
        }
    }
}

impl CalculatorSettings {
    pub fn validate(&self) -> Result<(), CalcError> {
        if self.decimals > MAX_DECIMALS {
            return Err(CalcError::Settings(format!(
                "decimals must be at most {MAX_DECIMALS}, got {}",
                self.decimals
            )));
        }
        for (name, code) in [
            ("zero_rate_code", &self.zero_rate_code),
            ("default_tax_code", &self.default_tax_code),
        ] {
            if code.as_deref().is_some_and(|c| c.trim().is_empty()) {
                return Err(CalcError::Settings(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_two_decimals() {
        let s = CalculatorSettings::default();
        assert_eq!(s.decimals, 2);
        assert!(s.zero_rate_code.is_none());
        assert!(s.default_tax_code.is_none());
        assert!(s.validate().is_ok());
    }

    #[test]
    fn too_many_decimals() {
        let s = CalculatorSettings {
            decimals: 11,
            ..Default::default()
        };
        assert!(matches!(s.validate(), Err(CalcError::Settings(_))));
    }

    #[test]
    fn blank_tax_code_rejected() {
        let s = CalculatorSettings {
            default_tax_code: Some("  ".into()),
            ..Default::default()
        };
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("default_tax_code"));
    }
}
