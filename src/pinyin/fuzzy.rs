//! Fuzzy phonetic merging of pinyin syllables.
//!
//! Commonly confused sounds collapse onto one canonical spelling so that
//! indexing and querying with the same projection match each other:
//!
//! - initials `zh`/`ch`/`sh` become `z`/`c`/`s`
//! - initial `n` becomes `l`
//! - finals `ang`/`eng`/`ing` become `an`/`en`/`in`

use super::split::is_syllable;

/// Fuzzy form of one transliterated unit.
///
/// Only standard syllables fold; digits, English words and interjection
/// readings such as `ng` are kept as they are.
pub fn fuzzy_unit(unit: &str) -> String {
    if is_syllable(unit) {
        fuzzy_syllable(unit)
    } else {
        unit.to_string()
    }
}

/// Project one syllable onto its fuzzy form.
///
/// Input that is not lowercase ASCII letters (digits, mixed runs) is
/// returned unchanged.
pub fn fuzzy_syllable(syllable: &str) -> String {
    if syllable.is_empty() || !syllable.bytes().all(|b| b.is_ascii_lowercase()) {
        return syllable.to_string();
    }

    let mut out = if let Some(rest) = syllable.strip_prefix("zh") {
        format!("z{rest}")
    } else if let Some(rest) = syllable.strip_prefix("ch") {
        format!("c{rest}")
    } else if let Some(rest) = syllable.strip_prefix("sh") {
        format!("s{rest}")
    } else if let Some(rest) = syllable.strip_prefix('n').filter(|rest| !rest.is_empty()) {
        // a bare "n" (as in 嗯) is left alone
        format!("l{rest}")
    } else {
        syllable.to_string()
    };

    for (long, short) in [("ang", "an"), ("eng", "en"), ("ing", "in")] {
        if out.ends_with(long) {
            out.truncate(out.len() - long.len());
            out.push_str(short);
            break;
        }
    }
    out
}
