use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NATIONAL_AVERAGE_RATE_PER_KWH: f64 = 0.16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    RegionalTable,
    NationalAverage,
    Override,
}

impl RateSource {
    pub const fn label(self) -> &'static str {
        match self {
            Self::RegionalTable => "Regional Table",
            Self::NationalAverage => "National Average",
            Self::Override => "Request Override",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UtilityRate {
    pub rate_per_kwh: f64,
    pub source: RateSource,
}

impl UtilityRate {
    pub fn overridden(rate_per_kwh: f64) -> Self {
        Self {
            rate_per_kwh,
            source: RateSource::Override,
        }
    }
}

/// Static utility rate lookup keyed by five-digit ZIP code.
#[derive(Debug, Clone)]
pub struct UtilityRateTable {
    rates: BTreeMap<String, f64>,
    default_rate: f64,
}

impl UtilityRateTable {
    pub fn standard() -> Self {
        let rates = [
            ("85001", 0.14),
            ("90210", 0.24),
            ("10001", 0.22),
            ("33101", 0.12),
            ("75001", 0.11),
        ]
        .into_iter()
        .map(|(zip, rate)| (zip.to_string(), rate))
        .collect();

        Self {
            rates,
            default_rate: NATIONAL_AVERAGE_RATE_PER_KWH,
        }
    }

    pub fn with_rate(mut self, zip: impl Into<String>, rate_per_kwh: f64) -> Self {
        self.rates.insert(zip.into(), rate_per_kwh);
        self
    }

    pub fn lookup(&self, zip: &str) -> UtilityRate {
        match self.rates.get(zip.trim()) {
            Some(rate) => UtilityRate {
                rate_per_kwh: *rate,
                source: RateSource::RegionalTable,
            },
            None => UtilityRate {
                rate_per_kwh: self.default_rate,
                source: RateSource::NationalAverage,
            },
        }
    }

    /// Looks up the rate for the first ZIP code found in a free-form address.
    pub fn lookup_address(&self, address: &str) -> UtilityRate {
        self.lookup(extract_zip(address).unwrap_or_default())
    }
}

impl Default for UtilityRateTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// First standalone five-digit token in `address`, ignoring any ZIP+4 suffix.
pub fn extract_zip(address: &str) -> Option<&str> {
    let bytes = address.as_bytes();
    let is_word = |byte: u8| byte.is_ascii_alphanumeric() || byte == b'_';

    for start in 0..bytes.len() {
        if start > 0 && is_word(bytes[start - 1]) {
            continue;
        }
        let end = start + 5;
        if end > bytes.len() || !bytes[start..end].iter().all(u8::is_ascii_digit) {
            continue;
        }
        if end == bytes.len() || !is_word(bytes[end]) {
            return Some(&address[start..end]);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regional_rates_win_over_the_national_average() {
        let table = UtilityRateTable::standard();
        assert_eq!(
            table.lookup("90210"),
            UtilityRate {
                rate_per_kwh: 0.24,
                source: RateSource::RegionalTable
            }
        );
        assert_eq!(table.lookup("59801").source, RateSource::NationalAverage);
        assert_eq!(table.lookup("59801").rate_per_kwh, 0.16);
    }

    #[test]
    fn extracts_zip_from_addresses() {
        assert_eq!(extract_zip("12 Palm Dr, Miami, FL 33101"), Some("33101"));
        assert_eq!(extract_zip("1 Main St, Dallas, TX 75001-1234"), Some("75001"));
        assert_eq!(extract_zip("Suite 123456, Nowhere"), None);
        assert_eq!(extract_zip("PO Box A12345"), None);
        assert_eq!(extract_zip(""), None);
    }

    #[test]
    fn addresses_without_zip_fall_back_to_the_average() {
        let table = UtilityRateTable::standard();
        let rate = table.lookup_address("Unknown road");
        assert_eq!(rate.source, RateSource::NationalAverage);
    }

    #[test]
    fn custom_rates_extend_the_table() {
        let table = UtilityRateTable::standard().with_rate("97201", 0.13);
        assert_eq!(table.lookup_address("Portland, OR 97201").rate_per_kwh, 0.13);
    }
}
