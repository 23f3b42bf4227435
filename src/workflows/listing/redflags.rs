use super::domain::{RedFlag, RiskLevel, TextAnalysis};

/// Euphemism dictionary: lowercase phrase -> honest meaning. Hyphenated
/// spellings sit next to their spaced variants so either form can fire.
const RED_FLAG_DICTIONARY: &[(&str, &str)] = &[
    ("cozy", "Very small"),
    ("charming", "Old, needs updates"),
    ("fixer-upper", "Major repairs needed"),
    ("fixer upper", "Major repairs needed"),
    ("up-and-coming", "Currently less desirable area"),
    ("up and coming", "Currently less desirable area"),
    ("vintage charm", "Outdated, no renovations"),
    ("needs tlc", "Serious problems"),
    ("needs some tlc", "Serious problems"),
    ("investment opportunity", "Uninhabitable or major work needed"),
    ("as-is", "Seller won't fix anything"),
    ("as is", "Seller won't fix anything"),
    ("handyman special", "Needs extensive repairs"),
    ("bring your imagination", "Major renovation required"),
    ("good bones", "Everything else needs work"),
    ("unique", "Strange layout or features"),
    ("intimate", "Very small rooms"),
    ("efficient", "Extremely small"),
    ("rustic", "Old and worn"),
    ("classic", "Outdated"),
    ("motivated seller", "Desperate to sell (possible issues)"),
    ("priced to sell", "Below market value (possible issues)"),
    ("convenient to", "Not actually in desirable area"),
];

/// Scan a listing description for euphemisms. The text is split into
/// sentence-like segments on `.` `!` `?`; within each segment every
/// dictionary phrase that occurs is flagged, ordered by where it first
/// appears in the text, and each phrase is reported at most once across the
/// whole description.
pub fn extract_red_flags(description: &str) -> Vec<RedFlag> {
    let mut flags: Vec<RedFlag> = Vec::new();

    for segment in description.split(['.', '!', '?']) {
        if segment.is_empty() {
            continue;
        }

        let lowered = segment.to_lowercase();
        let mut hits: Vec<(usize, &str, &str)> = RED_FLAG_DICTIONARY
            .iter()
            .filter_map(|(phrase, translation)| {
                lowered.find(phrase).map(|pos| (pos, *phrase, *translation))
            })
            .collect();
        hits.sort_by_key(|(pos, _, _)| *pos);

        for (_, phrase, translation) in hits {
            if !flags.iter().any(|flag| flag.phrase == phrase) {
                flags.push(RedFlag {
                    phrase: phrase.to_string(),
                    translation: translation.to_string(),
                });
            }
        }
    }

    flags
}

/// Offline stand-in for the language-model text collaborator. Confidence is
/// derived from the flag count using the same bands the model is instructed
/// to use (0-1 flags low, 2-3 medium, 4+ high), then passed through the
/// shared banding so the level/confidence invariant holds.
pub fn fallback_text_analysis(description: &str) -> TextAnalysis {
    let red_flags = extract_red_flags(description);

    let confidence = match red_flags.len() {
        0 => 10,
        1 => 30,
        2 | 3 => 55,
        _ => 80,
    };

    let recommendations = red_flags
        .iter()
        .map(|flag| format!("Ask what \"{}\" means in practice", flag.phrase))
        .collect();

    TextAnalysis {
        confidence,
        risk_level: RiskLevel::from_confidence(confidence),
        red_flags,
        recommendations,
    }
}
