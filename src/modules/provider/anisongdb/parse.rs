//! Text parsing helpers for the AniSongDB feed.

use std::sync::OnceLock;

use regex::Regex;

use crate::modules::catalog::domain::SongUseType;

fn artist_split_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\s*(?:,|/|&| feat\. | feat | ft\. | x )\s*")
            .unwrap_or_else(|e| panic!("invalid artist split regex: {e}"))
    })
}

fn num_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\d+)").unwrap_or_else(|e| panic!("invalid sequence regex: {e}"))
    })
}

fn type_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(opening|ending|insert song|insert|op|ed|in)\b")
            .unwrap_or_else(|e| panic!("invalid use-type regex: {e}"))
    })
}

/// Parses a free-form song type label into a use type and sequence.
///
/// Accepts `OP`, `OP 1`, `Opening 2`, `Ending 10`, `Insert Song`,
/// `Insert 3`, underscore/hyphen variants, etc. The sequence is the first
/// integer anywhere in the label.
pub fn parse_use_type_and_seq(label: Option<&str>) -> (Option<SongUseType>, Option<i32>) {
    let Some(label) = label else {
        return (None, None);
    };
    let low = label.trim().to_lowercase().replace(['_', '-'], " ");
    if low.is_empty() {
        return (None, None);
    }

    let seq = num_re()
        .find(&low)
        .and_then(|m| m.as_str().parse::<i32>().ok());

    let use_type = type_re().find(&low).map(|m| match m.as_str() {
        "op" | "opening" => SongUseType::Op,
        "ed" | "ending" => SongUseType::Ed,
        _ => SongUseType::In,
    });

    (use_type, seq)
}

/// Splits a combined credit string (`"A, B feat. C"`) into distinct names,
/// preserving order and dropping case-insensitive duplicates.
pub fn explode_names(s: Option<&str>) -> Vec<String> {
    let Some(s) = s else {
        return Vec::new();
    };

    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for part in artist_split_re().split(s) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if seen.insert(part.to_lowercase()) {
            out.push(part.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_numbered_types() {
        assert_eq!(parse_use_type_and_seq(Some("OP")), (Some(SongUseType::Op), None));
        assert_eq!(parse_use_type_and_seq(Some("OP 1")), (Some(SongUseType::Op), Some(1)));
        assert_eq!(
            parse_use_type_and_seq(Some("Ending 10")),
            (Some(SongUseType::Ed), Some(10))
        );
        assert_eq!(
            parse_use_type_and_seq(Some("Insert Song")),
            (Some(SongUseType::In), None)
        );
        assert_eq!(
            parse_use_type_and_seq(Some("insert_3")),
            (Some(SongUseType::In), Some(3))
        );
    }

    #[test]
    fn unknown_type_still_yields_sequence() {
        assert_eq!(parse_use_type_and_seq(Some("Theme 2")), (None, Some(2)));
        assert_eq!(parse_use_type_and_seq(None), (None, None));
        assert_eq!(parse_use_type_and_seq(Some("   ")), (None, None));
    }

    #[test]
    fn explodes_separators_and_dedupes() {
        assert_eq!(
            explode_names(Some("Yoko Takahashi, Megumi Hayashibara")),
            vec!["Yoko Takahashi", "Megumi Hayashibara"]
        );
        assert_eq!(
            explode_names(Some("LiSA feat. Uru / LISA")),
            vec!["LiSA", "Uru"]
        );
        assert_eq!(explode_names(Some("A x B & C")), vec!["A", "B", "C"]);
        assert!(explode_names(None).is_empty());
    }
}
