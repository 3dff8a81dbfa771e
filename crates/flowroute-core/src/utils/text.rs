//! String utility functions.
//!
//! [`rewrite_for_uri`] turns arbitrary text (titles, names) into a path
//! segment that is safe to use in a URI without further encoding.

use regex::Regex;
use std::sync::OnceLock;

/// Replaces German umlauts and `ß` with their ASCII digraphs and folds other
/// Latin letters with diacritics to their base letter.
///
/// Characters without a known folding are kept unchanged.
///
/// # Examples
///
/// ```
/// use flowroute_core::utils::text::transliterate;
///
/// assert_eq!(transliterate("Größe"), "Groesse");
/// assert_eq!(transliterate("Crème brûlée"), "Creme brulee");
/// ```
pub fn transliterate(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match fold_char(c) {
            Some(folded) => out.push_str(folded),
            None => out.push(c),
        }
    }
    out
}

fn fold_char(c: char) -> Option<&'static str> {
    let folded = match c {
        'ä' => "ae",
        'Ä' => "Ae",
        'ö' => "oe",
        'Ö' => "Oe",
        'ü' => "ue",
        'Ü' => "Ue",
        'ß' => "ss",
        'à' | 'á' | 'â' | 'ã' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'À' | 'Á' | 'Â' | 'Ã' | 'Å' | 'Ā' | 'Ă' | 'Ą' => "A",
        'æ' => "ae",
        'Æ' => "AE",
        'ç' | 'ć' | 'ĉ' | 'ċ' | 'č' => "c",
        'Ç' | 'Ć' | 'Ĉ' | 'Ċ' | 'Č' => "C",
        'ď' | 'đ' | 'ð' => "d",
        'Ď' | 'Đ' | 'Ð' => "D",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ĕ' | 'ė' | 'ę' | 'ě' => "e",
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ĕ' | 'Ė' | 'Ę' | 'Ě' => "E",
        'ĝ' | 'ğ' | 'ġ' | 'ģ' => "g",
        'Ĝ' | 'Ğ' | 'Ġ' | 'Ģ' => "G",
        'ĥ' | 'ħ' => "h",
        'Ĥ' | 'Ħ' => "H",
        'ì' | 'í' | 'î' | 'ï' | 'ĩ' | 'ī' | 'ĭ' | 'į' | 'ı' => "i",
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ĩ' | 'Ī' | 'Ĭ' | 'Į' | 'İ' => "I",
        'ĵ' => "j",
        'Ĵ' => "J",
        'ķ' => "k",
        'Ķ' => "K",
        'ĺ' | 'ļ' | 'ľ' | 'ŀ' | 'ł' => "l",
        'Ĺ' | 'Ļ' | 'Ľ' | 'Ŀ' | 'Ł' => "L",
        'ñ' | 'ń' | 'ņ' | 'ň' => "n",
        'Ñ' | 'Ń' | 'Ņ' | 'Ň' => "N",
        'ò' | 'ó' | 'ô' | 'õ' | 'ø' | 'ō' | 'ŏ' | 'ő' => "o",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ø' | 'Ō' | 'Ŏ' | 'Ő' => "O",
        'œ' => "oe",
        'Œ' => "OE",
        'ŕ' | 'ŗ' | 'ř' => "r",
        'Ŕ' | 'Ŗ' | 'Ř' => "R",
        'ś' | 'ŝ' | 'ş' | 'š' => "s",
        'Ś' | 'Ŝ' | 'Ş' | 'Š' => "S",
        'ţ' | 'ť' | 'ŧ' => "t",
        'Ţ' | 'Ť' | 'Ŧ' => "T",
        'ù' | 'ú' | 'û' | 'ũ' | 'ū' | 'ŭ' | 'ů' | 'ű' | 'ų' => "u",
        'Ù' | 'Ú' | 'Û' | 'Ũ' | 'Ū' | 'Ŭ' | 'Ů' | 'Ű' | 'Ų' => "U",
        'ŵ' => "w",
        'Ŵ' => "W",
        'ý' | 'ÿ' | 'ŷ' => "y",
        'Ý' | 'Ÿ' | 'Ŷ' => "Y",
        'ź' | 'ż' | 'ž' => "z",
        'Ź' | 'Ż' | 'Ž' => "Z",
        'þ' => "th",
        'Þ' => "TH",
        _ => return None,
    };
    Some(folded)
}

/// Rewrites a string so it can be used as a URI path segment.
///
/// 1. Umlauts, `ß` and Latin diacritics are transliterated.
/// 2. Runs of whitespace, `-`, `+` and `_` become one `separator`.
/// 3. Characters other than ASCII letters, digits, `.`, `-` and the
///    separator are removed.
/// 4. Repeated separators are collapsed and leading/trailing ones trimmed.
///
/// Case is preserved.
///
/// # Examples
///
/// ```
/// use flowroute_core::utils::text::rewrite_for_uri;
///
/// assert_eq!(rewrite_for_uri("Die Größe zählt!", "-"), "Die-Groesse-zaehlt");
/// assert_eq!(rewrite_for_uri("  a + b__c ", "_"), "a_b_c");
/// ```
pub fn rewrite_for_uri(value: &str, separator: &str) -> String {
    static SPACING: OnceLock<Regex> = OnceLock::new();
    let spacing = SPACING.get_or_init(|| Regex::new(r"[\s\-+_]+").unwrap());

    let transliterated = transliterate(value);
    let spaced = spacing.replace_all(&transliterated, regex::NoExpand(separator));

    let stripped: String = spaced
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '-' || separator.contains(*c))
        .collect();

    if separator.is_empty() {
        return stripped;
    }

    let doubled = separator.repeat(2);
    let mut collapsed = stripped;
    while collapsed.contains(&doubled) {
        collapsed = collapsed.replace(&doubled, separator);
    }

    let mut trimmed: &str = &collapsed;
    while let Some(rest) = trimmed.strip_prefix(separator) {
        trimmed = rest;
    }
    while let Some(rest) = trimmed.strip_suffix(separator) {
        trimmed = rest;
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── transliterate ────────────────────────────────────────────────

    #[test]
    fn test_transliterate_umlauts() {
        assert_eq!(transliterate("äöüÄÖÜß"), "aeoeueAeOeUess");
    }

    #[test]
    fn test_transliterate_diacritics() {
        assert_eq!(transliterate("Ça va, señor Dvořák?"), "Ca va, senor Dvorak?");
    }

    #[test]
    fn test_transliterate_leaves_ascii_and_unknown() {
        assert_eq!(transliterate("plain 123 日本"), "plain 123 日本");
    }

    // ── rewrite_for_uri ──────────────────────────────────────────────

    #[test]
    fn test_rewrite_basic() {
        assert_eq!(rewrite_for_uri("Hello World", "-"), "Hello-World");
    }

    #[test]
    fn test_rewrite_umlauts() {
        assert_eq!(rewrite_for_uri("Überraschung für Äpfel", "-"), "Ueberraschung-fuer-Aepfel");
    }

    #[test]
    fn test_rewrite_strips_special_chars() {
        assert_eq!(rewrite_for_uri("What? (really) #1!", "-"), "What-really-1");
    }

    #[test]
    fn test_rewrite_keeps_dots() {
        assert_eq!(rewrite_for_uri("version 1.2.3", "-"), "version-1.2.3");
    }

    #[test]
    fn test_rewrite_collapses_spacing_runs() {
        assert_eq!(rewrite_for_uri("a  -  b__+c", "-"), "a-b-c");
    }

    #[test]
    fn test_rewrite_collapses_separators_left_by_stripping() {
        assert_eq!(rewrite_for_uri("a - ! - b", "-"), "a-b");
    }

    #[test]
    fn test_rewrite_trims_separators() {
        assert_eq!(rewrite_for_uri(" -leading and trailing- ", "-"), "leading-and-trailing");
    }

    #[test]
    fn test_rewrite_custom_separator() {
        assert_eq!(rewrite_for_uri("The Quick-Brown fox", "_"), "The_Quick_Brown_fox");
    }

    #[test]
    fn test_rewrite_multi_char_separator() {
        assert_eq!(rewrite_for_uri("one two", "--"), "one--two");
    }

    #[test]
    fn test_rewrite_empty() {
        assert_eq!(rewrite_for_uri("", "-"), "");
        assert_eq!(rewrite_for_uri("!!!", "-"), "");
    }
}
