//! Rule-based classification engine
//!
//! Classifies one piece of captured text as a task or a note using an
//! ordered cascade of rule tiers. Priority is data, not control flow: the
//! tiers live in an ordered list and the first matching tier wins, so a
//! text containing both an intent phrase and an obligation phrase resolves
//! by tier order, never by regex specificity.
//!
//! Tier order: intent/desire → question → scheduling → obligation →
//! action verbs (with a gentle-context softener) → note indicators →
//! default. Signal extraction (dates, times, urgency) runs independently
//! of category selection.
//!
//! `classify` never fails, whatever the input. A captured thought must
//! never be dropped by a classification failure.

use regex::Regex;
use tracing::debug;

use crate::models::{Category, Classification, ClassificationSignals, Urgency};

/// Confidence constants keyed by rule tier.
///
/// Calibration lives here and nowhere else. Values must stay monotonic
/// with tier certainty: intent/question/scheduling/obligation matches
/// score at least as high as note-indicator and default matches.
pub mod confidence {
    pub const INTENT: f64 = 0.85;
    pub const QUESTION: f64 = 0.85;
    pub const SCHEDULING: f64 = 0.9;
    pub const OBLIGATION: f64 = 0.9;
    pub const ACTION: f64 = 0.8;
    /// Action verb present, but softened by a gentle qualifier
    pub const SOFTENED_ACTION: f64 = 0.7;
    pub const NOTE_INDICATOR: f64 = 0.7;
    pub const DEFAULT: f64 = 0.5;
    pub const EMPTY: f64 = 0.3;
}

/// Compile a static pattern, case-insensitive
fn re(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){}", pattern)).expect("valid regex")
}

/// Flips a rule's verdict when a qualifier is also present
///
/// Softened suggestions ("maybe buy a new chair") read as musings, not
/// commitments, so the action tier demotes them to notes.
struct Softener {
    qualifier: Regex,
    category: Category,
    confidence: f64,
    reason: &'static str,
}

/// One tier of the decision list
struct Rule {
    patterns: Vec<Regex>,
    category: Category,
    confidence: f64,
    reason: &'static str,
    softener: Option<Softener>,
}

/// The static, ordered rule tiers
struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    fn builtin() -> Self {
        let rules = vec![
            // 1. Intent/desire: expressed desire is reflective, not
            // actionable, even when an action verb appears later.
            Rule {
                patterns: vec![
                    re(r"\bi\s+want\s+to\b"),
                    re(r"\bi'?d\s+like\s+to\b"),
                    re(r"\bi'?m\s+thinking\s+(about|of)\b"),
                    re(r"\bwould\s+like\s+to\b"),
                    re(r"\bi\s+wish\b"),
                ],
                category: Category::Notes,
                confidence: confidence::INTENT,
                reason: "expressed intent or desire",
                softener: None,
            },
            // 2. Questions
            Rule {
                patterns: vec![
                    re(r"\bwhat\s+should\s+i\b"),
                    re(r"\bhow\s+(do|can|should)\s+i\b"),
                    re(r"\?\s*$"),
                ],
                category: Category::Notes,
                confidence: confidence::QUESTION,
                reason: "question",
                softener: None,
            },
            // 3. Scheduling/appointments
            Rule {
                patterns: vec![
                    re(r"\b(schedule|book|arrange)\b"),
                    re(r"\b(appointment|meeting|call)\b"),
                    re(r"\bremind\s+me\s+to\b"),
                ],
                category: Category::Tasks,
                confidence: confidence::SCHEDULING,
                reason: "scheduling language",
                softener: None,
            },
            // 4. Strong obligation
            Rule {
                patterns: vec![
                    re(r"\b(need|have)\s+to\b"),
                    re(r"\bmust\b"),
                    re(r"\bremember\s+to\b"),
                    re(r"\bdon'?t\s+forget\s+to\b"),
                    re(r"\bmake\s+sure\s+to\b"),
                    re(r"\b(todo|task)\b"),
                ],
                category: Category::Tasks,
                confidence: confidence::OBLIGATION,
                reason: "strong obligation",
                softener: None,
            },
            // 5. Action verbs, unless softened by a gentle qualifier
            Rule {
                patterns: vec![re(
                    r"\b(buy|purchase|get|pick\s+up|finish|complete|submit|fix|create|email|send|pay|clean|update|review|write)\b",
                )],
                category: Category::Tasks,
                confidence: confidence::ACTION,
                reason: "action verb",
                softener: Some(Softener {
                    qualifier: re(r"\b(maybe|perhaps|could|might|should\s+probably)\b"),
                    category: Category::Notes,
                    confidence: confidence::SOFTENED_ACTION,
                    reason: "softened suggestion",
                }),
            },
            // 6. Explicit note indicators
            Rule {
                patterns: vec![
                    re(r"\b(idea|thought|note|insight|interesting)\b"),
                    re(r"\bremember\s+this\b"),
                ],
                category: Category::Notes,
                confidence: confidence::NOTE_INDICATOR,
                reason: "note indicator",
                softener: None,
            },
        ];

        Self { rules }
    }
}

/// Date/time and urgency extraction patterns
struct SignalPatterns {
    date: Regex,
    time: Regex,
    urgent: Regex,
    soon: Regex,
    future: Regex,
}

impl SignalPatterns {
    fn builtin() -> Self {
        Self {
            date: re(
                r"\b(today|tomorrow|tonight|next\s+(week|month|year)|this\s+(week|weekend|month)|monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b",
            ),
            time: re(r"\b\d{1,2}:\d{2}\b|\b\d{1,2}\s*(am|pm)\b|\b(noon|midnight)\b"),
            urgent: re(r"\b(urgent|urgently|asap|immediately|right\s+now|emergency)\b"),
            soon: re(r"\b(soon|shortly|quickly|this\s+week)\b"),
            future: re(r"\b(someday|eventually|later|at\s+some\s+point)\b"),
        }
    }
}

/// Deterministic text categorizer with metadata extraction
pub struct Classifier {
    rules: RuleSet,
    signals: SignalPatterns,
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            rules: RuleSet::builtin(),
            signals: SignalPatterns::builtin(),
        }
    }

    /// Classify one text. Never fails, including on empty input.
    pub fn classify(&self, text: &str) -> Classification {
        let trimmed = text.trim();

        if trimmed.is_empty() {
            return Classification {
                category: Category::Notes,
                confidence: confidence::EMPTY,
                reasoning: "empty input".to_string(),
                metadata: ClassificationSignals::default(),
            };
        }

        let mut metadata = self.extract_signals(trimmed);

        for rule in &self.rules.rules {
            let matched = rule
                .patterns
                .iter()
                .find_map(|p| p.find(trimmed).map(|m| m.as_str().to_string()));

            let Some(cue) = matched else {
                continue;
            };
            metadata.patterns.push(cue.clone());

            // First matching tier wins; only its own softener can demote it.
            if let Some(softener) = &rule.softener {
                if let Some(q) = softener.qualifier.find(trimmed) {
                    metadata.patterns.push(q.as_str().to_string());
                    debug!(cue = %cue, qualifier = %q.as_str(), "verdict softened");
                    return Classification {
                        category: softener.category,
                        confidence: softener.confidence,
                        reasoning: softener.reason.to_string(),
                        metadata,
                    };
                }
            }

            debug!(cue = %cue, reason = rule.reason, "rule matched");
            return Classification {
                category: rule.category,
                confidence: rule.confidence,
                reasoning: rule.reason.to_string(),
                metadata,
            };
        }

        Classification {
            category: Category::Notes,
            confidence: confidence::DEFAULT,
            reasoning: "no actionable cues".to_string(),
            metadata,
        }
    }

    /// Extract date/time/urgency signals, independent of category selection
    fn extract_signals(&self, text: &str) -> ClassificationSignals {
        let date_match = self.signals.date.find(text).map(|m| m.as_str().to_string());
        let time_match = self.signals.time.find(text).map(|m| m.as_str().to_string());

        let urgency = if self.signals.urgent.is_match(text) {
            Urgency::Immediate
        } else if self.signals.soon.is_match(text) {
            Urgency::Soon
        } else if self.signals.future.is_match(text) {
            Urgency::Future
        } else {
            Urgency::None
        };

        ClassificationSignals {
            has_date: date_match.is_some(),
            has_time: time_match.is_some(),
            date_info: date_match.or(time_match),
            urgency,
            patterns: Vec::new(),
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}
