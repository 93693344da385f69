//! VAT exemption reasons (Ley 37/1992 del IVA), as reported to the SII.

use serde::{Deserialize, Serialize};

/// Exemption reason stamped on exempt lines (`excepcioniva`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExemptionReason {
    /// E1: exempt under art. 20 (interior operations).
    Article20,
    /// E2: exempt under art. 21 (exports).
    Article21,
    /// E3: exempt under art. 22 (assimilated to exports).
    Article22,
    /// E4: exempt under art. 23 and 24 (customs regimes).
    Articles23And24,
    /// E5: exempt under art. 25 (intra-community supplies).
    Article25,
    /// E6: exempt for other reasons.
    Other,
}

impl ExemptionReason {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Article20 => "E1",
            Self::Article21 => "E2",
            Self::Article22 => "E3",
            Self::Articles23And24 => "E4",
            Self::Article25 => "E5",
            Self::Other => "E6",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "E1" => Some(Self::Article20),
            "E2" => Some(Self::Article21),
            "E3" => Some(Self::Article22),
            "E4" => Some(Self::Articles23And24),
            "E5" => Some(Self::Article25),
            "E6" => Some(Self::Other),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_roundtrip() {
        for reason in [
            ExemptionReason::Article20,
            ExemptionReason::Article21,
            ExemptionReason::Article22,
            ExemptionReason::Articles23And24,
            ExemptionReason::Article25,
            ExemptionReason::Other,
        ] {
            assert_eq!(ExemptionReason::from_code(reason.code()), Some(reason));
        }
    }

    #[test]
    fn unknown_code() {
        assert_eq!(ExemptionReason::from_code("E7"), None);
        assert_eq!(ExemptionReason::from_code("e1"), None);
    }
}
