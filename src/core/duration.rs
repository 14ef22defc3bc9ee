// TuneSift - core/duration.rs
//
// Video length parsing. The hosting API reports ISO-8601 durations such as
// `PT1H2M31S`; tables written by other tools hold plain seconds.

use regex::Regex;
use std::sync::OnceLock;

fn iso8601_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^P(?:(?P<weeks>\d+)W)?(?:(?P<days>\d+)D)?(?:T(?:(?P<hours>\d+)H)?(?:(?P<minutes>\d+)M)?(?:(?P<seconds>\d+)(?:\.\d+)?S)?)?$",
        )
        .expect("duration regex is valid")
    })
}

/// Parse a video length into whole seconds.
///
/// Accepts ISO-8601 durations (`PT4M13S`, `PT1H`, `P1DT2H`, `PT0S`) and
/// non-negative numeric seconds (`"253"`, `"253.0"`). Missing components
/// count as zero; fractional seconds are truncated. Returns `None` for
/// anything else, including a bare `P` or `PT`.
pub fn parse_duration_secs(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(secs) = raw.parse::<u64>() {
        return Some(secs);
    }
    if let Ok(secs) = raw.parse::<f64>() {
        return (secs.is_finite() && secs >= 0.0).then(|| secs.trunc() as u64);
    }

    let upper = raw.to_ascii_uppercase();
    if upper == "P" || upper.ends_with('T') {
        return None;
    }
    let caps = iso8601_pattern().captures(&upper)?;
    let field = |name: &str| -> Option<u64> {
        caps.name(name)
            .map_or(Some(0), |m| m.as_str().parse::<u64>().ok())
    };

    let total = field("weeks")?
        .checked_mul(7 * 86_400)?
        .checked_add(field("days")?.checked_mul(86_400)?)?
        .checked_add(field("hours")?.checked_mul(3_600)?)?
        .checked_add(field("minutes")?.checked_mul(60)?)?
        .checked_add(field("seconds")?)?;
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso8601_durations() {
        assert_eq!(parse_duration_secs("PT1H2M31S"), Some(3751));
        assert_eq!(parse_duration_secs("PT4M13S"), Some(253));
        assert_eq!(parse_duration_secs("PT45S"), Some(45));
        assert_eq!(parse_duration_secs("PT1H"), Some(3600));
        assert_eq!(parse_duration_secs("PT10M"), Some(600));
        assert_eq!(parse_duration_secs("P1DT2H"), Some(93_600));
        assert_eq!(parse_duration_secs("P1W"), Some(604_800));
        assert_eq!(parse_duration_secs("PT0S"), Some(0));
        assert_eq!(parse_duration_secs("pt3m"), Some(180));
        assert_eq!(parse_duration_secs("PT1.5S"), Some(1));
    }

    #[test]
    fn test_plain_seconds() {
        assert_eq!(parse_duration_secs("253"), Some(253));
        assert_eq!(parse_duration_secs(" 253.0 "), Some(253));
        assert_eq!(parse_duration_secs("60.9"), Some(60));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_duration_secs(""), None);
        assert_eq!(parse_duration_secs("P"), None);
        assert_eq!(parse_duration_secs("PT"), None);
        assert_eq!(parse_duration_secs("-5"), None);
        assert_eq!(parse_duration_secs("NaN"), None);
        assert_eq!(parse_duration_secs("4 minutes"), None);
        assert_eq!(parse_duration_secs("1H2M"), None);
    }
}
