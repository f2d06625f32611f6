//! Synthetic text source backed by `fake`.

use std::fmt;

use fake::Fake;
use rand::RngCore;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocaleKey {
    #[default]
    #[serde(rename = "en_US")]
    EnUs,
    #[serde(rename = "pt_BR")]
    PtBr,
}

impl LocaleKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en_US",
            Self::PtBr => "pt_BR",
        }
    }
}

impl fmt::Display for LocaleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// City name used for customer locations.
pub fn city(locale: LocaleKey, rng: &mut dyn RngCore) -> String {
    match locale {
        LocaleKey::EnUs => fake::faker::address::en::CityName().fake_with_rng(rng),
        LocaleKey::PtBr => fake::faker::address::pt_br::CityName().fake_with_rng(rng),
    }
}

/// Company name used for brands and suppliers.
pub fn company(locale: LocaleKey, rng: &mut dyn RngCore) -> String {
    match locale {
        LocaleKey::EnUs => fake::faker::company::en::CompanyName().fake_with_rng(rng),
        LocaleKey::PtBr => fake::faker::company::pt_br::CompanyName().fake_with_rng(rng),
    }
}

/// Single word with its first letter upper-cased, used for product names.
pub fn capitalized_word(locale: LocaleKey, rng: &mut dyn RngCore) -> String {
    let word: String = match locale {
        LocaleKey::EnUs => fake::faker::lorem::en::Word().fake_with_rng(rng),
        LocaleKey::PtBr => fake::faker::lorem::pt_br::Word().fake_with_rng(rng),
    };
    capitalize(&word)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn capitalize_handles_empty_and_unicode() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("apple"), "Apple");
        assert_eq!(capitalize("élan"), "Élan");
    }

    #[test]
    fn same_seed_same_text() {
        let mut a = ChaCha8Rng::seed_from_u64(9);
        let mut b = ChaCha8Rng::seed_from_u64(9);
        assert_eq!(city(LocaleKey::EnUs, &mut a), city(LocaleKey::EnUs, &mut b));
        assert_eq!(
            company(LocaleKey::PtBr, &mut a),
            company(LocaleKey::PtBr, &mut b)
        );
    }

    #[test]
    fn locale_names_match_serialized_form() {
        for locale in [LocaleKey::EnUs, LocaleKey::PtBr] {
            let json = serde_json::to_string(&locale).expect("json");
            assert_eq!(json, format!("\"{locale}\""));
        }
        assert!(serde_json::from_str::<LocaleKey>("\"fr_FR\"").is_err());
    }
}
