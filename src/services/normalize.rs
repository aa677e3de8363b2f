use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use crate::models::NormalizedDateTime;

/// Final score below this means the parse was a guess: the pipeline must
/// stop and ask the user instead of scheduling.
pub const CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Day-part vocabulary. Matching is substring-based over the whole phrase
/// and the first entry in this order wins, so behavior is deterministic
/// even when a phrase mentions two day parts.
const TIME_OF_DAY: &[(&str, (u32, u32))] = &[
    ("morning", (9, 0)),
    ("afternoon", (13, 0)),
    ("evening", (18, 0)),
    ("night", (21, 0)),
    ("noon", (12, 0)),
    ("midnight", (0, 0)),
];

fn weekday_index(name: &str) -> Option<i64> {
    // Monday = 0 .. Sunday = 6, matching chrono's num_days_from_monday
    match name {
        "monday" => Some(0),
        "tuesday" => Some(1),
        "wednesday" => Some(2),
        "thursday" => Some(3),
        "friday" => Some(4),
        "saturday" => Some(5),
        "sunday" => Some(6),
        _ => None,
    }
}

/// Resolve a (date phrase, time phrase) pair to a concrete calendar moment
/// in the zone carried by `now`. Returns `None` when either phrase is
/// unresolvable; the caller maps that to a clarification request. The clock
/// is an explicit parameter so tests can pin "now".
pub fn normalize(
    date_phrase: &str,
    time_phrase: &str,
    now: DateTime<Tz>,
) -> Option<NormalizedDateTime> {
    let date_phrase = date_phrase.trim().to_lowercase();
    let time_phrase = time_phrase.trim().to_lowercase();

    let today = now.date_naive();
    let today_weekday = today.weekday().num_days_from_monday() as i64;

    let mut confidence: f64 = 1.0;
    let mut ambiguous = false;

    // Date branch
    let date = if date_phrase == "today" || date_phrase == "tomorrow" {
        confidence *= 0.95;
        today + Duration::days(if date_phrase == "tomorrow" { 1 } else { 0 })
    } else if let Some(rest) = date_phrase.strip_prefix("next ") {
        let day_name = rest.split_whitespace().next().unwrap_or("");
        if let Some(target) = weekday_index(day_name) {
            // "next monday" said on a Monday means 7 days out, never today
            let mut days_ahead = (target - today_weekday).rem_euclid(7);
            if days_ahead == 0 {
                days_ahead = 7;
            }
            confidence *= 0.9;
            today + Duration::days(days_ahead)
        } else {
            confidence *= 0.7;
            ambiguous = true;
            parse_date_fallback(&date_phrase, today)?
        }
    } else if let Some(rest) = date_phrase.strip_prefix("this ") {
        let day_name = rest.split_whitespace().next().unwrap_or("");
        if let Some(target) = weekday_index(day_name) {
            // "this tuesday" on a Tuesday is today
            let days_ahead = (target - today_weekday).rem_euclid(7);
            confidence *= 0.8;
            ambiguous = true;
            today + Duration::days(days_ahead)
        } else {
            confidence *= 0.6;
            ambiguous = true;
            parse_date_fallback(&date_phrase, today)?
        }
    } else {
        confidence *= 0.95;
        parse_date_fallback(&date_phrase, today)?
    };

    // Time branch: an empty phrase is never defaulted
    if time_phrase.is_empty() {
        return None;
    }

    let mut time = None;
    for (keyword, (hour, minute)) in TIME_OF_DAY {
        if time_phrase.contains(keyword) {
            time = NaiveTime::from_hms_opt(*hour, *minute, 0);
            confidence *= 0.9;
            break;
        }
    }
    let time = match time {
        Some(t) => t,
        None => {
            confidence *= 0.95;
            parse_clock_time(&time_phrase)?
        }
    };

    if ambiguous {
        confidence *= 0.9;
    }

    let confidence = (confidence.clamp(0.0, 1.0) * 100.0).round() / 100.0;

    Some(NormalizedDateTime {
        date,
        time,
        tz: now.timezone().name().to_string(),
        confidence,
    })
}

fn parse_clock_time(phrase: &str) -> Option<NaiveTime> {
    let phrase = phrase.trim();

    const FORMATS: &[&str] = &["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p", "%I %p", "%I%p"];
    for fmt in FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(phrase, fmt) {
            return Some(time);
        }
    }

    // Bare hour, e.g. "15"
    if let Ok(hour) = phrase.parse::<u32>() {
        return NaiveTime::from_hms_opt(hour, 0, 0);
    }

    None
}

/// Free-form date fallback seeded with "now" for missing fields. Covers
/// ISO and common numeric dates, day + month-name forms with or without a
/// year (the year defaults from today), ordinal suffixes, and a bare
/// weekday name (next on-or-after occurrence, today allowed).
fn parse_date_fallback(phrase: &str, today: NaiveDate) -> Option<NaiveDate> {
    let cleaned = strip_ordinal_suffixes(phrase);
    let cleaned = cleaned.trim();

    const ABSOLUTE: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    for fmt in ABSOLUTE {
        if let Ok(date) = NaiveDate::parse_from_str(cleaned, fmt) {
            return Some(date);
        }
    }

    const WITH_YEAR: &[&str] = &[
        "%d %B %Y",
        "%B %d %Y",
        "%d %b %Y",
        "%b %d %Y",
        "%B %d, %Y",
        "%b %d, %Y",
    ];
    for fmt in WITH_YEAR {
        if let Ok(date) = NaiveDate::parse_from_str(cleaned, fmt) {
            return Some(date);
        }
    }

    const WITHOUT_YEAR: &[&str] = &["%d %B %Y", "%B %d %Y", "%d %b %Y", "%b %d %Y"];
    let seeded = format!("{cleaned} {}", today.year());
    for fmt in WITHOUT_YEAR {
        if let Ok(date) = NaiveDate::parse_from_str(&seeded, fmt) {
            return Some(date);
        }
    }

    if let Some(target) = weekday_index(cleaned) {
        let today_weekday = today.weekday().num_days_from_monday() as i64;
        let days_ahead = (target - today_weekday).rem_euclid(7);
        return Some(today + Duration::days(days_ahead));
    }

    None
}

fn strip_ordinal_suffixes(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(|word| {
            let digits = word.chars().take_while(|c| c.is_ascii_digit()).count();
            if digits > 0 && matches!(&word[digits..], "st" | "nd" | "rd" | "th") {
                &word[..digits]
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const WEEKDAYS: &[&str] = &[
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
        "sunday",
    ];

    fn kolkata() -> Tz {
        "Asia/Kolkata".parse().unwrap()
    }

    /// 2025-06-18 is a Wednesday.
    fn wednesday_now() -> DateTime<Tz> {
        kolkata().with_ymd_and_hms(2025, 6, 18, 10, 0, 0).unwrap()
    }

    /// 2025-06-17 is a Tuesday.
    fn tuesday_now() -> DateTime<Tz> {
        kolkata().with_ymd_and_hms(2025, 6, 17, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_today_and_tomorrow() {
        let now = wednesday_now();
        let today = normalize("today", "3pm", now).unwrap();
        assert_eq!(today.date, now.date_naive());
        assert_eq!(today.time, NaiveTime::from_hms_opt(15, 0, 0).unwrap());

        let tomorrow = normalize("tomorrow", "3pm", now).unwrap();
        assert_eq!(tomorrow.date, now.date_naive() + Duration::days(1));
        // 0.95 * 0.95 = 0.9025 -> 0.9
        assert_eq!(tomorrow.confidence, 0.9);
    }

    #[test]
    fn test_next_weekday_never_resolves_to_today() {
        let now = wednesday_now();
        for day in WEEKDAYS {
            let result = normalize(&format!("next {day}"), "noon", now).unwrap();
            let offset = (result.date - now.date_naive()).num_days();
            assert!(
                (1..=7).contains(&offset),
                "next {day} resolved {offset} days out"
            );
        }
    }

    #[test]
    fn test_next_same_weekday_is_seven_days_out() {
        let now = wednesday_now();
        let result = normalize("next wednesday", "noon", now).unwrap();
        assert_eq!((result.date - now.date_naive()).num_days(), 7);
    }

    #[test]
    fn test_this_weekday_may_resolve_to_today() {
        let now = wednesday_now();
        let result = normalize("this wednesday", "noon", now).unwrap();
        assert_eq!(result.date, now.date_naive());
    }

    #[test]
    fn test_next_friday_on_wednesday() {
        let now = wednesday_now();
        let result = normalize("next Friday", "3pm", now).unwrap();
        assert_eq!((result.date - now.date_naive()).num_days(), 2);
        assert_eq!(result.time, NaiveTime::from_hms_opt(15, 0, 0).unwrap());
        // 0.9 * 0.95 = 0.855 -> 0.86, no ambiguity penalty
        assert_eq!(result.confidence, 0.86);
        assert!(result.confidence >= CONFIDENCE_THRESHOLD);
    }

    #[test]
    fn test_this_tuesday_morning_on_tuesday() {
        let now = tuesday_now();
        let result = normalize("this Tuesday", "morning", now).unwrap();
        assert_eq!(result.date, now.date_naive());
        assert_eq!(result.time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        // 0.8 * 0.9 * 0.9 = 0.648 -> 0.65, below threshold
        assert_eq!(result.confidence, 0.65);
        assert!(result.confidence < CONFIDENCE_THRESHOLD);
    }

    #[test]
    fn test_empty_time_phrase_is_unresolvable() {
        let now = wednesday_now();
        assert!(normalize("tomorrow", "", now).is_none());
        assert!(normalize("2025-07-01", "   ", now).is_none());
    }

    #[test]
    fn test_unparseable_phrases_are_unresolvable() {
        let now = wednesday_now();
        assert!(normalize("whenever works", "3pm", now).is_none());
        assert!(normalize("tomorrow", "sometime", now).is_none());
        assert!(normalize("next funday", "3pm", now).is_none());
    }

    #[test]
    fn test_first_day_part_keyword_wins() {
        let now = wednesday_now();
        // "evening" precedes "night" in the table
        let result = normalize("today", "night or evening", now).unwrap();
        assert_eq!(result.time, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
    }

    #[test]
    fn test_afternoon_is_not_noon() {
        let now = wednesday_now();
        let result = normalize("today", "in the afternoon", now).unwrap();
        assert_eq!(result.time, NaiveTime::from_hms_opt(13, 0, 0).unwrap());
    }

    #[test]
    fn test_literal_date_and_time_formats() {
        let now = wednesday_now();
        let result = normalize("2025-07-01", "14:30", now).unwrap();
        assert_eq!(result.date, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        assert_eq!(result.time, NaiveTime::from_hms_opt(14, 30, 0).unwrap());
        // 0.95 * 0.95 = 0.9025 -> 0.9
        assert_eq!(result.confidence, 0.9);
    }

    #[test]
    fn test_month_name_seeded_with_current_year() {
        let now = wednesday_now();
        let result = normalize("5th september", "noon", now).unwrap();
        assert_eq!(result.date, NaiveDate::from_ymd_opt(2025, 9, 5).unwrap());
    }

    #[test]
    fn test_bare_weekday_fallback() {
        let now = wednesday_now();
        let result = normalize("friday", "noon", now).unwrap();
        assert_eq!((result.date - now.date_naive()).num_days(), 2);
    }

    #[test]
    fn test_unknown_weekday_after_next_uses_fallback() {
        let now = wednesday_now();
        // The word after "next" is not a weekday, so
        // the fallback parses the phrase... which fails here, and that is
        // fine: the branch only applies when the fallback succeeds.
        assert!(normalize("next 5th september", "noon", now).is_none());
    }

    #[test]
    fn test_confidence_always_in_range_and_two_decimals() {
        let now = wednesday_now();
        let cases = [
            ("today", "3pm"),
            ("tomorrow", "morning"),
            ("next friday", "noon"),
            ("this sunday", "midnight"),
            ("2025-12-25", "23:59"),
            ("friday", "evening"),
        ];
        for (d, t) in cases {
            let result = normalize(d, t, now).unwrap();
            assert!((0.0..=1.0).contains(&result.confidence), "{d}/{t}");
            let scaled = result.confidence * 100.0;
            assert!((scaled - scaled.round()).abs() < 1e-9, "{d}/{t} not rounded");
        }
    }

    #[test]
    fn test_timezone_carried_through() {
        let result = normalize("today", "noon", wednesday_now()).unwrap();
        assert_eq!(result.tz, "Asia/Kolkata");
    }
}
