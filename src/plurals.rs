//! Plural categories per locale.
//!
//! Legacy plural strings are `;`-separated forms ordered by the locale's
//! legacy plural rule. Each rule number maps to the CLDR categories its forms
//! stand for, in form order. That order is *not* always canonical: rule 6
//! (Lithuanian) lists `one, other, few`.

use std::fmt;

use serde::Deserialize;

/// A CLDR plural category. The derived order is the canonical one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluralCategory {
    Zero,
    One,
    Two,
    Few,
    Many,
    Other,
}

impl PluralCategory {
    /// The variant key used in Fluent select expressions.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::One => "one",
            Self::Two => "two",
            Self::Few => "few",
            Self::Many => "many",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PluralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use PluralCategory::{Few, Many, One, Other, Two, Zero};

/// Categories of each legacy plural rule, indexed by rule number.
const RULES: [&[PluralCategory]; 20] = [
    // 0: Asian languages, no plural forms
    &[Other],
    // 1: English and most Germanic and Romance languages
    &[One, Other],
    // 2: French, Brazilian Portuguese
    &[One, Other],
    // 3: Latvian
    &[Zero, One, Other],
    // 4: Scottish Gaelic
    &[One, Two, Few, Other],
    // 5: Romanian
    &[One, Few, Other],
    // 6: Lithuanian
    &[One, Other, Few],
    // 7: Russian, Ukrainian, Belarusian
    &[One, Few, Many],
    // 8: Czech, Slovak
    &[One, Few, Other],
    // 9: Polish
    &[One, Few, Many],
    // 10: Slovenian, Sorbian
    &[One, Two, Few, Other],
    // 11: Irish
    &[One, Two, Few, Many, Other],
    // 12: Arabic
    &[Zero, One, Two, Few, Many, Other],
    // 13: Maltese
    &[One, Few, Many, Other],
    // 14: unused
    &[One, Two, Other],
    // 15: Icelandic, Macedonian
    &[One, Other],
    // 16: Breton
    &[One, Two, Few, Many, Other],
    // 17: Shuar
    &[Zero, Other],
    // 18: Welsh
    &[Zero, One, Two, Few, Many, Other],
    // 19: Bosnian, Croatian, Serbian
    &[One, Few, Other],
];

/// Legacy plural rule numbers for locales that do not use rule 1.
const LOCALE_RULES: &[(&str, usize)] = &[
    ("ach", 1),
    ("ak", 2),
    ("ar", 12),
    ("be", 7),
    ("br", 16),
    ("bs", 19),
    ("cs", 8),
    ("cy", 18),
    ("dsb", 10),
    ("ff", 2),
    ("fr", 2),
    ("ga-IE", 11),
    ("gd", 4),
    ("hr", 19),
    ("hsb", 10),
    ("id", 0),
    ("is", 15),
    ("ja", 0),
    ("ja-JP-mac", 0),
    ("jiv", 17),
    ("ka", 0),
    ("km", 0),
    ("ko", 0),
    ("lo", 0),
    ("lt", 6),
    ("lv", 3),
    ("mk", 15),
    ("ms", 0),
    ("mt", 13),
    ("my", 0),
    ("oc", 2),
    ("pl", 9),
    ("pt-BR", 2),
    ("ro", 5),
    ("ru", 7),
    ("sk", 8),
    ("sl", 10),
    ("sr", 19),
    ("th", 0),
    ("tr", 0),
    ("uk", 7),
    ("vi", 0),
    ("wo", 0),
    ("zh-CN", 0),
    ("zh-TW", 0),
];

/// The legacy plural rule number for `locale`.
///
/// Exact matches win; otherwise the language subtag is tried, and unknown
/// locales fall back to rule 1.
#[must_use]
pub fn rule_for_locale(locale: &str) -> usize {
    let lookup = |code: &str| {
        LOCALE_RULES
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, rule)| *rule)
    };
    lookup(locale)
        .or_else(|| {
            let language = locale.split(['-', '_']).next().unwrap_or(locale);
            lookup(language)
        })
        .unwrap_or(1)
}

/// The plural categories of `rule`, in legacy form order.
#[must_use]
pub fn categories_for_rule(rule: usize) -> Option<&'static [PluralCategory]> {
    RULES.get(rule).copied()
}

/// The plural categories of `locale`, in legacy form order.
#[must_use]
pub fn categories_for_locale(locale: &str) -> Vec<PluralCategory> {
    categories_for_rule(rule_for_locale(locale))
        .unwrap_or(&[One, Other])
        .to_vec()
}
