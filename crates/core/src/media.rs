//! Deterministic image attachment rule for rendered replies.
//!
//! A vehicle image accompanies a reply only when the reply quotes a per-day price in the
//! configured currency *and* names the vehicle exactly as `"{make} {model}"`. Greetings,
//! clarifying questions and casual mentions of a model never carry images. Name matching
//! is exact and case-sensitive; a misspelled model yields no image.

use std::collections::BTreeSet;

use crate::domain::vehicle::Vehicle;

pub const MAX_MEDIA_PER_REPLY: usize = 3;

const PER_DAY_SUFFIXES: &[&str] = &["/day", "/ day", "per day"];

/// True when `text` contains `currency_code` as a whole word and a per-day suffix.
pub fn has_per_day_price(text: &str, currency_code: &str) -> bool {
    contains_currency_token(text, currency_code) && contains_per_day_suffix(text)
}

fn contains_currency_token(text: &str, currency_code: &str) -> bool {
    let code = currency_code.trim();
    if code.is_empty() {
        return false;
    }
    text.split(|ch: char| !ch.is_ascii_alphanumeric()).any(|token| token == code)
}

fn contains_per_day_suffix(text: &str) -> bool {
    let lowered = text.to_lowercase();
    PER_DAY_SUFFIXES.iter().any(|suffix| lowered.contains(suffix))
}

/// Image URLs for the vehicles named in `reply_text`, in catalog order, one per vehicle,
/// at most [`MAX_MEDIA_PER_REPLY`].
pub fn select_media(reply_text: &str, catalog: &[Vehicle], currency_code: &str) -> Vec<String> {
    if !has_per_day_price(reply_text, currency_code) {
        return Vec::new();
    }

    let mut seen = BTreeSet::new();
    catalog
        .iter()
        .filter(|vehicle| reply_text.contains(&vehicle.name()))
        .filter(|vehicle| seen.insert(vehicle.id))
        .filter_map(|vehicle| vehicle.image_url.clone())
        .take(MAX_MEDIA_PER_REPLY)
        .collect()
}
