const MAX_NAME_CHARS: usize = 16;

pub fn sanitize_name(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return "PLAYER".to_string();
    }
    trimmed
        .chars()
        .filter(|ch| !ch.is_control())
        .take(MAX_NAME_CHARS)
        .collect()
}

pub fn parse_ranking_limit(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranking_limit_parsing_is_lenient_for_invalid_values() {
        assert_eq!(parse_ranking_limit(Some("8")), Some(8));
        assert_eq!(parse_ranking_limit(Some(" 12 ")), Some(12));
        assert_eq!(parse_ranking_limit(Some("0")), Some(0));
        assert_eq!(parse_ranking_limit(Some("abc")), None);
        assert_eq!(parse_ranking_limit(Some("-1")), None);
        assert_eq!(parse_ranking_limit(None), None);
    }

    #[test]
    fn sanitize_name_applies_trim_empty_and_max_len() {
        assert_eq!(sanitize_name(""), "PLAYER");
        assert_eq!(sanitize_name("   "), "PLAYER");
        assert_eq!(sanitize_name(" Alice "), "Alice");
        assert_eq!(sanitize_name("12345678901234567890"), "1234567890123456");
        assert_eq!(sanitize_name("a\u{7}b"), "ab");
    }
}
