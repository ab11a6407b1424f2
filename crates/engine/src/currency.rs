use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO-like currency code attached to expenses, settlements and rate entries.
///
/// The set of valid codes is open: whatever the current exchange-rate
/// snapshot lists is usable, so the type validates shape only (3 to 8 ASCII
/// letters) and normalizes to uppercase. `"eur"`, `" EUR "` and `"EUR"` all
/// construct the same value.
///
/// Every conversion is quoted against a fixed US dollar base (see
/// `RateTable`), which is why `USD` gets an accessor of its own.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    /// Code of the fixed conversion base.
    pub const BASE_CODE: &'static str = "USD";

    /// US dollar, the base every rate is quoted against.
    #[must_use]
    pub fn usd() -> Self {
        Currency(Self::BASE_CODE.to_string())
    }

    /// Canonical uppercase currency code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the conversion base (USD).
    #[must_use]
    pub fn is_base(&self) -> bool {
        self.0 == Self::BASE_CODE
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let code = value.trim().to_ascii_uppercase();
        if !(3..=8).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(EngineError::InvalidRecord(format!(
                "invalid currency code: {value:?}"
            )));
        }
        Ok(Currency(code))
    }
}

impl TryFrom<String> for Currency {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Currency::try_from(value.as_str())
    }
}

impl From<Currency> for String {
    fn from(value: Currency) -> Self {
        value.0
    }
}
