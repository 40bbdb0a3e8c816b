//! Text helpers: report normalization, sentences, steps, contacts

use super::{ClassifyError, Contact};
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Keys tried, in order, when the worker returns an object instead of text
pub const REPORT_KEYS: &[&str] = &[
    "output",
    "result",
    "final_result",
    "finalResult",
    "text",
    "report",
    "summary",
    "message",
];

/// Upper bound on extracted steps
pub const MAX_STEPS: usize = 10;

/// Fragments this short (in chars) are dropped as noise
const MIN_STEP_CHARS: usize = 4;

struct Patterns {
    sentence_break: Regex,
    step_marker: Regex,
    bullet_prefix: Regex,
    profile_url: Regex,
}

impl Patterns {
    fn new() -> Option<Self> {
        Some(Self {
            sentence_break: Regex::new(r"[.!?]\s+").ok()?,
            step_marker: Regex::new(r"(?m)(?:^|\s)\d{1,2}[.)]\s+").ok()?,
            bullet_prefix: Regex::new(r"^[\s\-*•>]+").ok()?,
            profile_url: Regex::new(
                r"(?i)(?:https?://)?(?:[a-z]{2,3}\.)?linkedin\.com/in/([a-z0-9_%\-]+)/?",
            )
            .ok()?,
        })
    }
}

static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();

fn patterns() -> Result<&'static Patterns, ClassifyError> {
    PATTERNS
        .get_or_init(Patterns::new)
        .as_ref()
        .ok_or_else(|| ClassifyError::Unreadable("text patterns failed to compile".to_string()))
}

/// Turn a raw terminal payload into report text.
pub fn normalize(raw: &Value) -> Result<String, ClassifyError> {
    let text = match raw {
        Value::Null => return Err(ClassifyError::EmptyReport),
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            let picked = REPORT_KEYS
                .iter()
                .filter_map(|key| map.get(*key))
                .find_map(|v| match v {
                    Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
                    _ => None,
                });
            match picked {
                Some(s) => s,
                None => serde_json::to_string(raw)
                    .map_err(|e| ClassifyError::Unreadable(e.to_string()))?,
            }
        }
        other => serde_json::to_string(other).map_err(|e| ClassifyError::Unreadable(e.to_string()))?,
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(ClassifyError::EmptyReport);
    }
    Ok(text.to_string())
}

/// Verbatim string form of a payload, kept as `details`
pub fn raw_to_string(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Split on `.`, `!` or `?` followed by whitespace. Terminators are kept.
pub fn sentences(text: &str) -> Result<Vec<&str>, ClassifyError> {
    let p = patterns()?;
    let mut out = Vec::new();
    let mut start = 0;
    for m in p.sentence_break.find_iter(text) {
        let sentence = text[start..m.start() + 1].trim();
        if !sentence.is_empty() {
            out.push(sentence);
        }
        start = m.end();
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    Ok(out)
}

/// First sentence containing `indicator` (case-insensitive)
pub fn sentence_containing<'t>(
    text: &'t str,
    indicator: &str,
) -> Result<Option<&'t str>, ClassifyError> {
    Ok(sentences(text)?
        .into_iter()
        .find(|s| s.to_lowercase().contains(indicator)))
}

/// Ordered step list. Enumerated items win over plain lines when present.
pub fn steps(text: &str) -> Result<Vec<String>, ClassifyError> {
    let p = patterns()?;
    let markers: Vec<_> = p.step_marker.find_iter(text).collect();

    let fragments: Vec<&str> = if markers.is_empty() {
        text.lines().collect()
    } else {
        markers
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let end = markers.get(i + 1).map_or(text.len(), |next| next.start());
                // only the first line belongs to the item
                text[m.end()..end].lines().next().unwrap_or_default()
            })
            .collect()
    };

    Ok(fragments
        .into_iter()
        .map(|f| p.bullet_prefix.replace(f, "").trim().to_string())
        .filter(|f| f.chars().count() >= MIN_STEP_CHARS)
        .take(MAX_STEPS)
        .collect())
}

/// Professional-network contacts, one per distinct profile URL
pub fn contacts(text: &str) -> Result<Vec<Contact>, ClassifyError> {
    let p = patterns()?;
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for line in text.lines() {
        for caps in p.profile_url.captures_iter(line) {
            let (Some(whole), Some(slug)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let slug = slug.as_str().to_lowercase();
            if !seen.insert(slug.clone()) {
                continue;
            }

            let (name, title) = split_name_title(p, &line[..whole.start()]);
            out.push(Contact {
                name: name.unwrap_or_else(|| name_from_slug(&slug)),
                title,
                profile_url: format!("https://www.linkedin.com/in/{}", slug),
            });
        }
    }
    Ok(out)
}

/// `"1. Jane Doe - Technical Recruiter: "` -> (`Jane Doe`, `Technical Recruiter`)
fn split_name_title(p: &Patterns, prefix: &str) -> (Option<String>, Option<String>) {
    let cleaned = p.step_marker.replace(prefix, " ");
    let cleaned = p.bullet_prefix.replace(&cleaned, "");
    let cleaned = cleaned
        .trim()
        .trim_end_matches(|c: char| matches!(c, ':' | '-' | '–' | '|' | '(' | ',') || c.is_whitespace())
        .trim();

    if cleaned.is_empty() {
        return (None, None);
    }

    let split = [" - ", " – ", " | ", ", "]
        .iter()
        .find_map(|sep| cleaned.split_once(sep));

    match split {
        Some((name, title)) => {
            let name = name.trim();
            let title = title.trim();
            (
                (!name.is_empty()).then(|| name.to_string()),
                (!title.is_empty()).then(|| title.to_string()),
            )
        }
        None => (Some(cleaned.to_string()), None),
    }
}

/// `jane-doe-4b1a2` -> `Jane Doe`
fn name_from_slug(slug: &str) -> String {
    let words: Vec<String> = slug
        .split(['-', '_'])
        .filter(|w| !w.is_empty() && !w.chars().any(|c| c.is_ascii_digit()))
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();

    if words.is_empty() {
        slug.to_string()
    } else {
        words.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(&json!("  done  ")).unwrap(), "done");
        assert_eq!(
            normalize(&json!({"status": "ok", "output": "Applied."})).unwrap(),
            "Applied."
        );
        assert_eq!(
            normalize(&json!({"result": "", "summary": "Summary text"})).unwrap(),
            "Summary text"
        );
        assert_eq!(normalize(&json!({"n": 1})).unwrap(), r#"{"n":1}"#);
        assert_eq!(normalize(&json!([1, 2])).unwrap(), "[1,2]");
        assert_eq!(normalize(&Value::Null), Err(ClassifyError::EmptyReport));
        assert_eq!(normalize(&json!("   ")), Err(ClassifyError::EmptyReport));
    }

    #[test]
    fn test_sentences() {
        let text = "Opened the page. Login required to continue! Stopped? yes";
        assert_eq!(
            sentences(text).unwrap(),
            vec![
                "Opened the page.",
                "Login required to continue!",
                "Stopped?",
                "yes"
            ]
        );
        assert_eq!(
            sentence_containing(text, "login required").unwrap(),
            Some("Login required to continue!")
        );
        assert_eq!(sentence_containing(text, "captcha").unwrap(), None);
    }

    #[test]
    fn test_steps_from_inline_enumeration() {
        let text = "Application submitted. Steps: 1. Opened form 2. Filled fields 3. Submitted";
        assert_eq!(steps(text).unwrap(), vec!["Opened form", "Filled fields", "Submitted"]);
    }

    #[test]
    fn test_steps_from_lines() {
        let text = "Navigated to the careers page\n- Clicked apply\n\n.\n* ok\n• Uploaded resume";
        assert_eq!(
            steps(text).unwrap(),
            vec!["Navigated to the careers page", "Clicked apply", "Uploaded resume"]
        );
    }

    #[test]
    fn test_steps_capped() {
        let text = (1..=15)
            .map(|i| format!("{}. Step number {}", i, i))
            .collect::<Vec<_>>()
            .join("\n");
        let extracted = steps(&text).unwrap();
        assert_eq!(extracted.len(), MAX_STEPS);
        assert_eq!(extracted[0], "Step number 1");
    }

    #[test]
    fn test_contacts() {
        let text = "I found the following:\n\
                    1. Jane Doe - Technical Recruiter: https://www.linkedin.com/in/jane-doe-4b1a2/\n\
                    2. linkedin.com/in/john-smith\n\
                    Again: https://linkedin.com/in/Jane-Doe-4b1a2";
        let found = contacts(text).unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "Jane Doe");
        assert_eq!(found[0].title.as_deref(), Some("Technical Recruiter"));
        assert_eq!(found[0].profile_url, "https://www.linkedin.com/in/jane-doe-4b1a2");
        assert_eq!(found[1].name, "John Smith");
        assert_eq!(found[1].title, None);
    }
}
