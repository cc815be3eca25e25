use std::collections::HashMap;

use itertools::Itertools;

use super::*;

/// Number of languages kept on the card.
pub const TOP_LANGUAGES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub name: String,
    /// Share of the retained languages, one fractional digit (`"80.0"`).
    pub percentage: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct LanguageBreakdown(Vec<LanguageEntry>);

impl LanguageBreakdown {
    /// Builds the breakdown out of cumulative byte counts per language.
    ///
    /// Languages are ordered by descending byte count (ties by name) and only the
    /// first [`TOP_LANGUAGES`] are kept. Percentages are relative to the bytes of
    /// the kept languages, not to the bytes of every language the user has.
    pub fn from_bytes(bytes: HashMap<String, u64>) -> Self {
        let top: Vec<(String, u64)> = bytes
            .into_iter()
            .sorted_by(|(a_name, a_bytes), (b_name, b_bytes)| {
                b_bytes.cmp(a_bytes).then_with(|| a_name.cmp(b_name))
            })
            .take(TOP_LANGUAGES)
            .collect();

        let total: u64 = top.iter().map(|(_, bytes)| *bytes).sum();
        if total == 0 {
            return Self::default();
        }

        Self(
            top.into_iter()
                .map(|(name, bytes)| LanguageEntry {
                    name,
                    percentage: one_decimal(bytes as f64 / total as f64 * 100.0),
                })
                .collect(),
        )
    }

    pub fn entries(&self) -> &[LanguageEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Formats with one fractional digit, rounding halves up (`12.25` is `"12.3"`).
fn one_decimal(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0)
}
