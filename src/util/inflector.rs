//! English word inflection.
//!
//! [`Inflector::pluralize`] and [`Inflector::singularize`] run the same three
//! steps, each with its own ruleset:
//!
//! 1. **Uncountables**: words like `sheep` or `information` come back
//!    unchanged.
//! 2. **Irregulars**: a fixed table matched on the word's suffix, so
//!    `salesperson` pluralizes through `person → people`.
//! 3. **Suffix rules**: an ordered list of regex rewrites. The first rule
//!    that matches wins, so the list runs from most to least specific.
//!
//! Rules run on the lower-cased word. The result is then conformed to the
//! input's letter case: `Person → People`, `URL → URLs` (not `URLS`). Pass
//! `fix_case = false` to get the raw lower-case result.
//!
//! Results are cached per input word for each ruleset, for the lifetime of
//! the `Inflector`.

use crate::util::string::{CaseClass, case_class, ucfirst};
use regex::Regex;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::LazyLock;

const UNCOUNTABLE: [&str; 15] = [
    "^equipment$",
    "^information$",
    "^rice$",
    "^money$",
    "^species$",
    "^series$",
    "fish$",
    "sheep$",
    "deer$",
    "^news$",
    "^moose$",
    "^police$",
    "^jeans$",
    "^metadata$",
    "ware$",
];

/// (singular, plural)
const IRREGULAR: [(&str, &str); 11] = [
    ("person", "people"),
    ("human", "humans"),
    ("man", "men"),
    ("child", "children"),
    ("sex", "sexes"),
    ("move", "moves"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("goose", "geese"),
    ("cactus", "cacti"),
    ("zombie", "zombies"),
];

const PLURAL_RULES: [(&str, &str); 21] = [
    ("(quiz)$", "${1}zes"),
    ("^(oxen)$", "${1}"),
    ("^(ox)$", "${1}en"),
    ("^(m|l)ice$", "${1}ice"),
    ("^(m|l)ouse$", "${1}ice"),
    ("(matr|vert|ind)(?:ix|ex)$", "${1}ices"),
    ("(x|ch|ss|sh)$", "${1}es"),
    ("([^aeiouy]|qu)y$", "${1}ies"),
    ("(hive)$", "${1}s"),
    ("(?:([^f])fe|([lr])f)$", "${1}${2}ves"),
    ("sis$", "ses"),
    ("([ti])a$", "${1}a"),
    ("([ti])um$", "${1}a"),
    ("(buffal|tomat|potat|her)o$", "${1}oes"),
    ("(bu)s$", "${1}ses"),
    ("(alias|status)$", "${1}es"),
    ("(octop|vir)i$", "${1}i"),
    ("(octop|vir)us$", "${1}i"),
    ("^(ax|test)is$", "${1}es"),
    ("s$", "s"),
    ("$", "s"),
];

const SINGULAR_RULES: [(&str, &str); 26] = [
    ("(database)s$", "${1}"),
    ("(quiz)zes$", "${1}"),
    ("(matr)ices$", "${1}ix"),
    ("(vert|ind)ices$", "${1}ex"),
    ("^(ox)en", "${1}"),
    ("(alias|status)(?:es)?$", "${1}"),
    ("(octop|vir)(?:us|i)$", "${1}us"),
    ("^(a)x[ie]s$", "${1}xis"),
    ("(cris|test)(?:is|es)$", "${1}is"),
    ("(shoe)s$", "${1}"),
    ("(o)es$", "${1}"),
    ("(bus)(?:es)?$", "${1}"),
    ("^(m|l)ice$", "${1}ouse"),
    ("(x|ch|ss|sh)es$", "${1}"),
    ("(m)ovies$", "${1}ovie"),
    ("(s)eries$", "${1}eries"),
    ("([^aeiouy]|qu)ies$", "${1}y"),
    ("([lr])ves$", "${1}f"),
    ("(tive)s$", "${1}"),
    ("(hive)s$", "${1}"),
    ("([^f])ves$", "${1}fe"),
    (
        "((a)naly|(b)a|(d)iagno|(p)arenthe|(p)rogno|(s)ynop|(t)he)(?:sis|ses)$",
        "${1}sis",
    ),
    ("([ti])a$", "${1}um"),
    ("(n)ews$", "${1}ews"),
    ("(ss)$", "${1}"),
    ("s$", ""),
];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("inflection pattern must compile"))
        .collect()
}

fn compile_rules(rules: &[(&str, &'static str)]) -> Vec<(Regex, &'static str)> {
    rules
        .iter()
        .map(|(p, r)| (Regex::new(p).expect("inflection rule must compile"), *r))
        .collect()
}

static UNCOUNTABLE_RE: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(&UNCOUNTABLE));
static PLURAL_RE: LazyLock<Vec<(Regex, &'static str)>> =
    LazyLock::new(|| compile_rules(&PLURAL_RULES));
static SINGULAR_RE: LazyLock<Vec<(Regex, &'static str)>> =
    LazyLock::new(|| compile_rules(&SINGULAR_RULES));

/// Irregular pairs, longest suffix first so `human` wins over `man`.
static IRREGULAR_BY_LENGTH: LazyLock<Vec<(&'static str, &'static str)>> = LazyLock::new(|| {
    let mut pairs = IRREGULAR.to_vec();
    pairs.sort_by_key(|(singular, _)| std::cmp::Reverse(singular.len()));
    pairs
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Ruleset {
    Plural,
    Singular,
}

/// Word inflector with per-word result caching.
#[derive(Debug, Default)]
pub struct Inflector {
    cache: RefCell<HashMap<(Ruleset, String, bool), String>>,
}

impl Inflector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pluralize(&self, word: &str) -> String {
        self.inflect(Ruleset::Plural, word, true)
    }

    pub fn singularize(&self, word: &str) -> String {
        self.inflect(Ruleset::Singular, word, true)
    }

    pub fn pluralize_with(&self, word: &str, fix_case: bool) -> String {
        self.inflect(Ruleset::Plural, word, fix_case)
    }

    pub fn singularize_with(&self, word: &str, fix_case: bool) -> String {
        self.inflect(Ruleset::Singular, word, fix_case)
    }

    /// `1 item`, `2 items`.
    pub fn count(&self, n: i64, word: &str) -> String {
        if n == 1 || n == -1 {
            format!("{n} {word}")
        } else {
            format!("{n} {}", self.pluralize(word))
        }
    }

    fn inflect(&self, ruleset: Ruleset, word: &str, fix_case: bool) -> String {
        let key = (ruleset, word.to_string(), fix_case);
        if let Some(hit) = self.cache.borrow().get(&key) {
            return hit.clone();
        }
        let lower = word.to_lowercase();
        let result = match apply(ruleset, &lower) {
            None => word.to_string(),
            Some(inflected) if fix_case => conform_case(word, &inflected),
            Some(inflected) => inflected,
        };
        self.cache.borrow_mut().insert(key, result.clone());
        result
    }
}

/// Run a ruleset over a lower-case word. `None` means leave the word alone.
fn apply(ruleset: Ruleset, lower: &str) -> Option<String> {
    if lower.is_empty() || UNCOUNTABLE_RE.iter().any(|re| re.is_match(lower)) {
        return None;
    }
    for (singular, plural) in IRREGULAR_BY_LENGTH.iter() {
        let (from, to) = match ruleset {
            Ruleset::Plural => (singular, plural),
            Ruleset::Singular => (plural, singular),
        };
        if let Some(stem) = lower.strip_suffix(from) {
            return Some(format!("{stem}{to}"));
        }
    }
    // A word that is already the target form of an irregular pair stays put
    let already_inflected = IRREGULAR_BY_LENGTH.iter().any(|(singular, plural)| match ruleset {
        Ruleset::Plural => lower == *plural,
        Ruleset::Singular => lower == *singular,
    });
    if already_inflected {
        return None;
    }
    let rules = match ruleset {
        Ruleset::Plural => &*PLURAL_RE,
        Ruleset::Singular => &*SINGULAR_RE,
    };
    rules
        .iter()
        .find(|(re, _)| re.is_match(lower))
        .map(|(re, replacement)| re.replace(lower, *replacement).into_owned())
}

/// Give `inflected` (lower case) the letter case of `original`.
///
/// The shared stem keeps the original's exact letters. An all-upper word
/// becomes all-upper, except that an abbreviation kept whole and given a
/// plain `s` keeps it lower case (`URL` → `URLs`).
fn conform_case(original: &str, inflected: &str) -> String {
    let original_chars: Vec<char> = original.chars().collect();
    let inflected_chars: Vec<char> = inflected.chars().collect();
    let shared = original_chars
        .iter()
        .zip(&inflected_chars)
        .take_while(|(a, b)| a.to_lowercase().eq(b.to_lowercase()))
        .count();
    if case_class(original) == CaseClass::Upper {
        let abbreviation_s = shared == original_chars.len()
            && inflected_chars[shared..].iter().collect::<String>() == "s";
        if !abbreviation_s {
            return inflected.to_uppercase();
        }
    }
    if shared == 0 {
        return match case_class(original) {
            CaseClass::Title => ucfirst(inflected),
            CaseClass::Upper => inflected.to_uppercase(),
            CaseClass::Lower | CaseClass::Mixed => inflected.to_string(),
        };
    }
    original_chars[..shared]
        .iter()
        .chain(&inflected_chars[shared..])
        .collect()
}

/// `1st`, `2nd`, `3rd`, `11th`, `22nd`.
pub fn ordinalize(n: i64) -> String {
    let abs = n.unsigned_abs();
    let suffix = match (abs % 10, abs % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// `PageTemplate` → `page_template`
pub fn underscore(word: &str) -> String {
    let mut out = String::with_capacity(word.len() + 4);
    let chars: Vec<char> = word.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if prev_lower || (prev_upper && next_lower) {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else if *c == '-' || *c == ' ' {
            out.push('_');
        } else {
            out.push(*c);
        }
    }
    out
}

/// `page_template` → `PageTemplate`
pub fn camelize(word: &str) -> String {
    word.split(['_', '-', ' '])
        .filter(|part| !part.is_empty())
        .map(ucfirst)
        .collect()
}

/// `author_id` → `Author`, `page_title` → `Page title`
pub fn humanize(word: &str) -> String {
    let trimmed = word.strip_suffix("_id").unwrap_or(word);
    ucfirst(&trimmed.replace('_', " ").to_lowercase())
}

/// `the_page title` → `The Page Title`
pub fn titleize(word: &str) -> String {
    underscore(word)
        .split('_')
        .filter(|part| !part.is_empty())
        .map(ucfirst)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIRS: [(&str, &str); 28] = [
        ("post", "posts"),
        ("box", "boxes"),
        ("quiz", "quizzes"),
        ("category", "categories"),
        ("wife", "wives"),
        ("half", "halves"),
        ("hive", "hives"),
        ("person", "people"),
        ("salesperson", "salespeople"),
        ("child", "children"),
        ("woman", "women"),
        ("matrix", "matrices"),
        ("index", "indices"),
        ("analysis", "analyses"),
        ("status", "statuses"),
        ("bus", "buses"),
        ("tomato", "tomatoes"),
        ("mouse", "mice"),
        ("octopus", "octopi"),
        ("search", "searches"),
        ("wish", "wishes"),
        ("fix", "fixes"),
        ("process", "processes"),
        ("medium", "media"),
        ("axis", "axes"),
        ("query", "queries"),
        ("alias", "aliases"),
        ("foot", "feet"),
    ];

    #[test]
    fn pluralizes_word_list() {
        let inflector = Inflector::new();
        for (singular, plural) in PAIRS {
            assert_eq!(inflector.pluralize(singular), plural, "pluralize {singular}");
        }
    }

    #[test]
    fn singularizes_word_list() {
        let inflector = Inflector::new();
        for (singular, plural) in PAIRS {
            assert_eq!(inflector.singularize(plural), singular, "singularize {plural}");
        }
    }

    #[test]
    fn round_trips() {
        let inflector = Inflector::new();
        for (singular, plural) in PAIRS {
            assert_eq!(inflector.singularize(&inflector.pluralize(singular)), singular);
            assert_eq!(inflector.pluralize(&inflector.singularize(plural)), plural);
        }
    }

    #[test]
    fn uncountables_unchanged() {
        let inflector = Inflector::new();
        for word in ["sheep", "information", "news", "software", "swordfish"] {
            assert_eq!(inflector.pluralize(word), word);
            assert_eq!(inflector.singularize(word), word);
        }
    }

    #[test]
    fn already_inflected_irregulars_stay() {
        let inflector = Inflector::new();
        assert_eq!(inflector.pluralize("people"), "people");
        assert_eq!(inflector.singularize("person"), "person");
    }

    #[test]
    fn case_is_conformed() {
        let inflector = Inflector::new();
        assert_eq!(inflector.pluralize("URL"), "URLs");
        assert_eq!(inflector.singularize("URLs"), "URL");
        assert_eq!(inflector.pluralize("Person"), "People");
        assert_eq!(inflector.pluralize("Category"), "Categories");
        assert_eq!(inflector.pluralize("iPhone"), "iPhones");
    }

    #[test]
    fn upper_case_words_stay_upper_case() {
        let inflector = Inflector::new();
        assert_eq!(inflector.pluralize("PERSON"), "PEOPLE");
        assert_eq!(inflector.pluralize("MOUSE"), "MICE");
        assert_eq!(inflector.pluralize("CHILD"), "CHILDREN");
        assert_eq!(inflector.pluralize("BOX"), "BOXES");
        assert_eq!(inflector.singularize("PEOPLE"), "PERSON");
        assert_eq!(inflector.singularize("MICE"), "MOUSE");
    }

    #[test]
    fn words_ending_in_an_irregular_form_still_inflect() {
        let inflector = Inflector::new();
        for word in ["specimen", "omen", "abdomen", "stamen"] {
            assert_eq!(inflector.pluralize(word), format!("{word}s"));
        }
        assert_eq!(inflector.singularize("specimens"), "specimen");
    }

    #[test]
    fn case_fixing_can_be_disabled() {
        let inflector = Inflector::new();
        assert_eq!(inflector.pluralize_with("URL", false), "urls");
        // Cached per flag, so the fixed form is still available
        assert_eq!(inflector.pluralize("URL"), "URLs");
    }

    #[test]
    fn count_phrases() {
        let inflector = Inflector::new();
        assert_eq!(inflector.count(1, "page"), "1 page");
        assert_eq!(inflector.count(3, "page"), "3 pages");
        assert_eq!(inflector.count(0, "child"), "0 children");
    }

    #[test]
    fn ordinals() {
        let cases = [(1, "1st"), (2, "2nd"), (3, "3rd"), (4, "4th"), (11, "11th"), (12, "12th"), (13, "13th"), (21, "21st"), (112, "112th"), (-2, "-2nd")];
        for (n, expected) in cases {
            assert_eq!(ordinalize(n), expected);
        }
    }

    #[test]
    fn word_shapes() {
        assert_eq!(underscore("PageTemplate"), "page_template");
        assert_eq!(underscore("HTMLParser"), "html_parser");
        assert_eq!(camelize("page_template"), "PageTemplate");
        assert_eq!(humanize("author_id"), "Author");
        assert_eq!(humanize("page_title"), "Page title");
        assert_eq!(titleize("the_page title"), "The Page Title");
    }
}
