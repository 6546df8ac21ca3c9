//! Citation normalization: reduce the many historical spellings of an opinion
//! number ("OAG 78 339", "0AG 95-17", "No. 15-OAG-003", "96-ORD-43", ...) to a
//! single canonical string.
//!
//! Normalization is an ordered, first-match-wins table of rules. Structured
//! formats (ORD/OMD, explicit "OAG") sit ahead of the looser numeric-only
//! forms because several patterns overlap.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

#[cfg(test)]
#[path = "citations_test.rs"]
mod citations_test;

/// Marker the issuing office prints for opinions published without a number.
pub const NO_NUMBER_IN_ORIGINAL: &str = "[NO NUMBER IN ORIGINAL]";

/// First OAG series printed with two-digit opinion numbers.
const TWO_DIGIT_SERIES_START: u32 = 20;

// ============================================================================
// Rule Table
// ============================================================================

type Canonicalize = fn(&Captures) -> Option<String>;

struct Rule {
    name: &'static str,
    pattern: Regex,
    canonicalize: Canonicalize,
}

fn rule(name: &'static str, pattern: &str, canonicalize: Canonicalize) -> Rule {
    Rule {
        name,
        pattern: Regex::new(pattern).unwrap(),
        canonicalize,
    }
}

lazy_static! {
    // Order is the precedence contract: the first rule whose pattern matches decides.
    static ref RULES: Vec<Rule> = vec![
        // Open Records Log Number 200000214
        rule("open-records-log", r"Open Records Log Number [0-9]+", |caps| {
            Some(caps[0].to_string())
        }),
        // 96-ORD-43
        rule("ord-suffixed", r"([0-9]{2,3})-ORD-([0-9]{1,3})", |caps| {
            Some(format!("{}-ORD-{:0>3}", &caps[1], &caps[2]))
        }),
        // ORD 97-132
        rule("ord-prefixed", r"ORD ([0-9]{2,3})-([0-9]{1,3})", |caps| {
            Some(format!("{}-ORD-{:0>3}", &caps[1], &caps[2]))
        }),
        // 96-OMD-43
        rule("omd-suffixed", r"([0-9]{1,3})-OMD-([0-9]{1,3})", |caps| {
            Some(format!("{}-OMD-{:0>3}", &caps[1], &caps[2]))
        }),
        // OMD 97-124
        rule("omd-prefixed", r"OMD ([0-9]{2,3})-([0-9]{1,3})", |caps| {
            Some(format!("{}-OMD-{:0>3}", &caps[1], &caps[2]))
        }),
        // OAG 78-823, OAG 78 339, OAG 2020-01, OAG17-021, OAG No. 04-005, 0AG 95-17, Oag 03-003
        rule("oag", r"[O0][Aa][Gg] ?(?:No\. )?([0-9]{1,4})[ \-]([0-9]{1,3})", oag_series_number),
        // No. 80-320, No. OAG 80 349
        rule("numbered", r"No\. (?:OAG )?([0-9]{1,2})[ \-]([0-9]{1,3})", oag_series_number),
        // No. 15-OAG-003
        rule("numbered-oag-infix", r"No\. ([0-9]{1,4})-OAG-([0-9]{1,3})", oag_series_number),
        // 87-71, 90-5
        rule("bare", r"\s+([0-9]{2})-([0-9]{1,3})\s+", oag_series_number),
    ];
}

fn oag_series_number(caps: &Captures) -> Option<String> {
    let series = &caps[1];
    let number = pad_number(&caps[2], series)?;
    Some(format!("OAG {}-{}", series, number))
}

/// Zero-pad an OAG opinion number to the width used in its series: three
/// digits before series 20, two digits from series 20 on. Numbers already
/// wider than the target are left alone. Returns `None` if `series` is not
/// an ASCII number.
pub fn pad_number(number: &str, series: &str) -> Option<String> {
    let series: u32 = series.parse().ok()?;
    let width = if series < TWO_DIGIT_SERIES_START { 3 } else { 2 };
    Some(format!("{:0>width$}", number, width = width))
}

// ============================================================================
// Normalization
// ============================================================================

/// Normalize a fragment believed to hold one citation.
///
/// Returns the canonical citation (`OAG 78-823`, `96-ORD-043`, `97-OMD-124`,
/// `Open Records Log Number 200000214`), the [`NO_NUMBER_IN_ORIGINAL`]
/// sentinel, or `None` when no rule recognizes the text. Never panics,
/// whatever the input.
pub fn normalize_citation(text: &str) -> Option<String> {
    if text.contains(NO_NUMBER_IN_ORIGINAL) {
        return Some(NO_NUMBER_IN_ORIGINAL.to_string());
    }
    RULES
        .iter()
        .find_map(|rule| rule.pattern.captures(text).map(|caps| (rule, caps)))
        .and_then(|(rule, caps)| (rule.canonicalize)(&caps))
}

/// Name of the rule that decides how `text` is normalized, if any.
/// The sentinel check is reported as `"no-number"`.
pub fn matching_rule(text: &str) -> Option<&'static str> {
    if text.contains(NO_NUMBER_IN_ORIGINAL) {
        return Some("no-number");
    }
    RULES
        .iter()
        .find(|rule| rule.pattern.is_match(text))
        .map(|rule| rule.name)
}

/// Rule names in evaluation order.
pub fn rule_names() -> Vec<&'static str> {
    RULES.iter().map(|rule| rule.name).collect()
}
