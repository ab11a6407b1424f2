//! Exchange-rate snapshots and currency conversion.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Currency, EngineError, ResultEngine};

/// Rounds an amount to two decimal places for display and settle-up
/// prefills. Internal netting stays at full precision.
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Point-in-time exchange-rate snapshot, quoted against a fixed USD base.
///
/// `rate(c)` is how many units of `c` one US dollar buys, so converting
/// between two non-base currencies always goes through the base:
/// `amount / rate(from)` into USD, `* rate(to)` out of it.
///
/// The snapshot is just data. It has no opinion on freshness; the caller
/// that fetched it decides when to replace it (`fetched_at` is carried for
/// exactly that purpose).
///
/// Deserializes from a bare `{ "EUR": 0.93, ... }` object; `fetched_at` is
/// stamped at construction time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RateTable {
    #[serde(flatten)]
    rates: BTreeMap<Currency, f64>,
    #[serde(skip, default = "Utc::now")]
    fetched_at: DateTime<Utc>,
}

impl RateTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rates: BTreeMap::new(),
            fetched_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_fetched_at(mut self, at: DateTime<Utc>) -> Self {
        self.fetched_at = at;
        self
    }

    pub fn insert(&mut self, currency: Currency, rate: f64) {
        self.rates.insert(currency, rate);
    }

    /// Raw stored rate, if any. Does not filter unusable entries.
    #[must_use]
    pub fn rate(&self, currency: &Currency) -> Option<f64> {
        self.rates.get(currency).copied()
    }

    /// When this snapshot was fetched; drives the caller's refresh policy.
    #[must_use]
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Returns `true` when `currency` can appear as a conversion endpoint.
    ///
    /// The base is always convertible. A stored entry that is non-finite or
    /// non-positive is garbage and counts as absent.
    #[must_use]
    pub fn has_rate(&self, currency: &Currency) -> bool {
        self.usable_rate(currency).is_ok()
    }

    /// Converts `amount` from one currency to another through the USD base.
    ///
    /// `from == to` short-circuits and returns `amount` bit-for-bit without
    /// touching the table, so a mono-currency group works with an empty
    /// snapshot. Any other endpoint without a usable rate yields
    /// [`EngineError::MissingRate`] naming that currency; the table never
    /// substitutes a guess.
    pub fn convert(&self, amount: f64, from: &Currency, to: &Currency) -> ResultEngine<f64> {
        if from == to {
            return Ok(amount);
        }
        let from_rate = self.usable_rate(from)?;
        let to_rate = self.usable_rate(to)?;
        Ok(amount / from_rate * to_rate)
    }

    /// The distinct entries of `currencies` this table cannot convert into
    /// `display`. Callers use it to partition convertible amounts from ones
    /// that must surface unconverted.
    #[must_use]
    pub fn missing_for<'a>(
        &self,
        currencies: impl IntoIterator<Item = &'a Currency>,
        display: &Currency,
    ) -> BTreeSet<Currency> {
        let display_ok = self.has_rate(display);
        let mut missing = BTreeSet::new();
        for currency in currencies {
            if currency == display {
                continue;
            }
            if !display_ok || !self.has_rate(currency) {
                missing.insert(currency.clone());
            }
        }
        missing
    }

    fn usable_rate(&self, currency: &Currency) -> ResultEngine<f64> {
        if currency.is_base() {
            return Ok(1.0);
        }
        match self.rates.get(currency) {
            Some(&rate) if rate.is_finite() && rate > 0.0 => Ok(rate),
            _ => Err(EngineError::MissingRate(currency.clone())),
        }
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<(Currency, f64)> for RateTable {
    fn from_iter<T: IntoIterator<Item = (Currency, f64)>>(iter: T) -> Self {
        Self {
            rates: iter.into_iter().collect(),
            fetched_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eur() -> Currency {
        Currency::try_from("EUR").unwrap()
    }

    fn table() -> RateTable {
        RateTable::from_iter([
            (Currency::usd(), 1.0),
            (eur(), 0.93),
            (Currency::try_from("JPY").unwrap(), 147.2),
        ])
    }

    #[test]
    fn identity_conversion_never_consults_the_table() {
        let empty = RateTable::new();
        let ghs = Currency::try_from("GHS").unwrap();
        assert_eq!(empty.convert(12.34, &ghs, &ghs).unwrap(), 12.34);
    }

    #[test]
    fn converts_through_the_base() {
        let table = table();
        let usd = table.convert(50.0, &eur(), &Currency::usd()).unwrap();
        assert!((usd - 50.0 / 0.93).abs() < 1e-9);

        let jpy = Currency::try_from("JPY").unwrap();
        let yen = table.convert(50.0, &eur(), &jpy).unwrap();
        assert!((yen - 50.0 / 0.93 * 147.2).abs() < 1e-9);
    }

    #[test]
    fn missing_and_garbage_rates_are_reported() {
        let mut table = table();
        let gbp = Currency::try_from("GBP").unwrap();
        assert_eq!(
            table.convert(1.0, &gbp, &Currency::usd()).unwrap_err(),
            EngineError::MissingRate(gbp.clone())
        );

        table.insert(gbp.clone(), f64::NAN);
        assert_eq!(
            table.convert(1.0, &gbp, &Currency::usd()).unwrap_err(),
            EngineError::MissingRate(gbp.clone())
        );

        table.insert(gbp.clone(), 0.0);
        assert!(!table.has_rate(&gbp));
    }

    #[test]
    fn round_trip_stays_within_tolerance() {
        let table = table();
        let jpy = Currency::try_from("JPY").unwrap();
        let there = table.convert(123.45, &eur(), &jpy).unwrap();
        let back = table.convert(there, &jpy, &eur()).unwrap();
        assert!((back - 123.45).abs() / 123.45 < 1e-9);
    }

    #[test]
    fn missing_for_partitions_by_display_currency() {
        let table = table();
        let gbp = Currency::try_from("GBP").unwrap();
        let used = [eur(), gbp.clone(), Currency::usd()];

        let missing = table.missing_for(used.iter(), &eur());
        assert_eq!(missing.into_iter().collect::<Vec<_>>(), vec![gbp.clone()]);

        // An unconvertible display currency poisons everything but itself.
        let missing = table.missing_for(used.iter(), &gbp);
        assert_eq!(missing.len(), 2);
    }
}
