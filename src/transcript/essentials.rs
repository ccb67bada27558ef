//! Keyword extraction of decisions, action points and conclusions

use regex::Regex;
use std::sync::OnceLock;

fn decision_regex() -> &'static Regex {
    static DECISIONS: OnceLock<Regex> = OnceLock::new();
    DECISIONS.get_or_init(|| {
        Regex::new(r"(?i)(?:it was decided that|we decided to).*?\.")
            .expect("Failed to compile decision regex")
    })
}

fn action_regex() -> &'static Regex {
    static ACTIONS: OnceLock<Regex> = OnceLock::new();
    ACTIONS.get_or_init(|| {
        Regex::new(r"(?i)(?:action:|responsible:|deadline:).*?\.")
            .expect("Failed to compile action regex")
    })
}

fn conclusion_regex() -> &'static Regex {
    static CONCLUSIONS: OnceLock<Regex> = OnceLock::new();
    CONCLUSIONS.get_or_init(|| {
        Regex::new(r"(?i)(?:we conclude that|in summary).*?\.")
            .expect("Failed to compile conclusion regex")
    })
}

/// Sentences flagged by explicit cue phrases, in transcript order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Essentials {
    pub decisions: Vec<String>,
    pub actions: Vec<String>,
    pub conclusions: Vec<String>,
}

impl Essentials {
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty() && self.actions.is_empty() && self.conclusions.is_empty()
    }
}

/// Pull out "it was decided that ...", "action: ...", "deadline: ...",
/// "we conclude that ..." style sentences. Each match runs from the cue
/// phrase to the next period on the same line.
pub fn extract_essentials(text: &str) -> Essentials {
    Essentials {
        decisions: find_all(decision_regex(), text),
        actions: find_all(action_regex(), text),
        conclusions: find_all(conclusion_regex(), text),
    }
}

fn find_all(re: &Regex, text: &str) -> Vec<String> {
    re.find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .collect()
}
