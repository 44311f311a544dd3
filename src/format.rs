// 🔢 Display formatting - currency, large numbers, timers

/// `$` followed by the amount with a fixed number of decimals
pub fn format_currency(amount: f64, decimals: usize) -> String {
    format!("${:.*}", decimals, amount)
}

/// Compact large numbers: 1500 → "1.5K", 2_000_000 → "2.0M"
pub fn format_number(num: u64) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

/// Thousands separators: 10000 → "10,000"
pub fn format_thousands(num: u64) -> String {
    let digits = num.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Elapsed seconds as a `mm:ss` clock
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Cut to `max_chars` characters and append "..." (always appended, like
/// the preview buttons do)
pub fn preview(text: &str, max_chars: usize) -> String {
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}

/// Truncate only when longer than `max_chars`, never splitting a character
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let keep = max_chars.saturating_sub(3);
        let cut: String = text.chars().take(keep).collect();
        format!("{}...", cut)
    }
}

/// Plural suffix helper
pub fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0123456, 4), "$0.0123");
        assert_eq!(format_currency(1234.5, 2), "$1234.50");
        assert_eq!(format_currency(0.0, 6), "$0.000000");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_500), "1.5K");
        assert_eq!(format_number(10_000), "10.0K");
        assert_eq!(format_number(2_000_000), "2.0M");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(500), "500");
        assert_eq!(format_thousands(10_000), "10,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(75), "01:15");
        assert_eq!(format_elapsed(3600), "60:00");
    }

    #[test]
    fn test_preview_and_truncate() {
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("ab", 3), "ab...");
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer sentence", 10), "a longe...");
        // multi-byte characters are never split
        assert_eq!(truncate("ééééééééééé", 5), "éé...");
    }
}
