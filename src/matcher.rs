// 🔎 Keyword Matcher - first matching trigger wins
//
// Canned answers are picked by scanning an ordered trigger table.
// No scoring, no ranking: the first rule with any matching trigger wins,
// otherwise the fallback.

use regex::Regex;

// ============================================================================
// TRIGGER
// ============================================================================

#[derive(Debug, Clone)]
pub enum Trigger {
    /// Case-insensitive substring (stored lowercased)
    Contains(String),
    /// Regular expression, matched as written
    Pattern(Regex),
}

impl Trigger {
    pub fn contains(needle: &str) -> Self {
        Trigger::Contains(needle.to_lowercase())
    }

    /// Regex trigger for built-in literals. Panics on an invalid pattern;
    /// anything not written in source goes through `try_pattern`.
    pub fn pattern(pattern: &str) -> Self {
        Trigger::try_pattern(pattern).unwrap_or_else(|e| {
            panic!("invalid built-in trigger pattern {:?}: {}", pattern, e)
        })
    }

    pub fn try_pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Trigger::Pattern(Regex::new(pattern)?))
    }

    /// `lowered` must be the lowercased form of `text`
    fn matches(&self, text: &str, lowered: &str) -> bool {
        match self {
            Trigger::Contains(needle) => lowered.contains(needle.as_str()),
            Trigger::Pattern(re) => re.is_match(text),
        }
    }
}

// ============================================================================
// RULE TABLE
// ============================================================================

#[derive(Debug, Clone)]
pub struct MatchRule<T> {
    pub triggers: Vec<Trigger>,
    pub value: T,
}

impl<T> MatchRule<T> {
    pub fn matches(&self, text: &str, lowered: &str) -> bool {
        self.triggers.iter().any(|t| t.matches(text, lowered))
    }
}

#[derive(Debug, Clone)]
pub struct KeywordMatcher<T> {
    rules: Vec<MatchRule<T>>,
    fallback: T,
}

impl<T> KeywordMatcher<T> {
    pub fn new(fallback: T) -> Self {
        KeywordMatcher {
            rules: Vec::new(),
            fallback,
        }
    }

    /// Append a rule matching any of the given substrings
    pub fn keywords(mut self, keywords: &[&str], value: T) -> Self {
        self.rules.push(MatchRule {
            triggers: keywords.iter().map(|k| Trigger::contains(k)).collect(),
            value,
        });
        self
    }

    pub fn rule(mut self, triggers: Vec<Trigger>, value: T) -> Self {
        self.rules.push(MatchRule { triggers, value });
        self
    }

    /// Index and value of the first matching rule, if any
    pub fn find_match(&self, text: &str) -> Option<(usize, &T)> {
        let lowered = text.to_lowercase();
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.matches(text, &lowered))
            .map(|(i, rule)| (i, &rule.value))
    }

    /// First matching value, or the fallback
    pub fn find(&self, text: &str) -> &T {
        self.find_match(text)
            .map(|(_, value)| value)
            .unwrap_or(&self.fallback)
    }

    pub fn fallback(&self) -> &T {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> KeywordMatcher<&'static str> {
        KeywordMatcher::new("default")
            .keywords(&["remote", "work from home"], "remote")
            .keywords(&["pto", "vacation"], "pto")
            .rule(vec![Trigger::pattern(r"\d{3}-\d{2}-\d{4}")], "ssn")
    }

    #[test]
    fn test_case_insensitive_substring() {
        let m = matcher();
        assert_eq!(*m.find("Can I WORK FROM HOME?"), "remote");
        assert_eq!(*m.find("how much Vacation do I get"), "pto");
    }

    #[test]
    fn test_first_match_wins() {
        let m = matcher();
        // both "remote" and "vacation" appear; the earlier rule wins
        assert_eq!(*m.find("remote vacation policy"), "remote");
        assert_eq!(m.find_match("remote vacation").map(|(i, _)| i), Some(0));
    }

    #[test]
    fn test_regex_trigger() {
        let m = matcher();
        assert_eq!(*m.find("my ssn is 123-45-6789"), "ssn");
    }

    #[test]
    fn test_try_pattern_reports_bad_regex() {
        assert!(Trigger::try_pattern(r"(\d{3}").is_err());

        let m = KeywordMatcher::new("default").rule(vec![Trigger::try_pattern(r"^\d+$").unwrap()], "digits");
        assert_eq!(*m.find("12345"), "digits");
        assert_eq!(*m.find("12a45"), "default");
    }

    #[test]
    fn test_fallback() {
        let m = matcher();
        assert_eq!(*m.find("what is the weather"), "default");
        assert!(m.find_match("what is the weather").is_none());
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn test_substring_inside_word_matches() {
        // plain substring semantics: "api" matches inside "rapid"
        let m = KeywordMatcher::new(0).keywords(&["api"], 1);
        assert_eq!(*m.find("rapid growth"), 1);
    }
}
