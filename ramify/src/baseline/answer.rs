//! Numeric answer extraction for grading free-text replies.

use once_cell::sync::Lazy;
use regex::Regex;

static REFERENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"####\s*(-?[\d,]+)").expect("reference-answer regex"));

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d[\d,]*(?:\.\d+)?").expect("number regex"));

/// Answer in grade-school-math reference format: the integer after `####`.
pub fn extract_reference_answer(text: &str) -> Option<i64> {
    let raw = REFERENCE_RE.captures(text)?.get(1)?.as_str().replace(',', "");
    raw.parse().ok()
}

/// Last number in `text`, when it is integral. Thousands separators are ignored.
pub fn extract_final_number(text: &str) -> Option<i64> {
    let raw = NUMBER_RE.find_iter(text).last()?.as_str().replace(',', "");
    let value: f64 = raw.parse().ok()?;
    if value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}

/// True when the reply's final number equals the reference answer.
pub fn answers_match(reference: &str, reply: &str) -> bool {
    match (extract_reference_answer(reference), extract_final_number(reply)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_answer_after_hashes() {
        assert_eq!(extract_reference_answer("so 3 + 4 = 7\n#### 7"), Some(7));
        assert_eq!(extract_reference_answer("#### 1,234"), Some(1234));
        assert_eq!(extract_reference_answer("####-5"), Some(-5));
        assert_eq!(extract_reference_answer("no marker 12"), None);
    }

    #[test]
    fn final_number_is_last_integral_number() {
        assert_eq!(extract_final_number("first 3 then 18."), Some(18));
        assert_eq!(extract_final_number("total is $1,050"), Some(1050));
        assert_eq!(extract_final_number("x = 2.0"), Some(2));
        assert_eq!(extract_final_number("about 2.5"), None);
        assert_eq!(extract_final_number("nothing"), None);
    }

    #[test]
    fn answers_match_compares_extracted_values() {
        assert!(answers_match("#### 72", "She sold 72 clips."));
        assert!(!answers_match("#### 72", "She sold 70 clips."));
        assert!(!answers_match("72", "72"));
    }
}
