//! Thematic pattern mining over the classified corpus
//!
//! A fixed catalog of themes, each a keyword regex, is scanned against
//! every classified item. One item may contribute to several themes at
//! once; items without a classification are skipped entirely.

use regex::Regex;

use crate::models::{Category, Pattern, VoiceItem};

/// Confidence assumed for a matching item that carries no confidence value
const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Cap on the number of patterns returned
const MAX_PATTERNS: usize = 8;

struct Theme {
    name: &'static str,
    keywords: Regex,
}

fn theme(name: &'static str, pattern: &str) -> Theme {
    Theme {
        name,
        keywords: Regex::new(&format!("(?i){}", pattern)).expect("valid regex"),
    }
}

/// Scans items against the fixed theme catalog
pub struct ThemeMatcher {
    themes: Vec<Theme>,
}

impl ThemeMatcher {
    pub fn new() -> Self {
        let themes = vec![
            theme(
                "Work",
                r"\b(work|job|office|boss|client|project|deadline|meeting|colleague|presentation)\b",
            ),
            theme(
                "Food",
                r"\b(food|eat|cook|recipe|dinner|lunch|breakfast|groceries|restaurant|meal)\b",
            ),
            theme(
                "Health",
                r"\b(health|doctor|dentist|gym|exercise|workout|medicine|sleep|diet|therapy)\b",
            ),
            theme(
                "Family",
                r"\b(family|mom|dad|mother|father|sister|brother|kids?|parents?|grandma|grandpa)\b",
            ),
            theme(
                "Travel",
                r"\b(travel|trip|flight|hotel|vacation|airport|passport|visit|journey)\b",
            ),
            theme(
                "Finance",
                r"\b(money|budget|pay|bill|bank|invest|savings?|tax|rent|insurance)\b",
            ),
            theme(
                "Learning",
                r"\b(learn|study|course|book|read|class|tutorial|practice|research)\b",
            ),
            theme(
                "Creative",
                r"\b(write|draw|paint|music|song|design|create|art|photo|craft)\b",
            ),
            theme(
                "Home",
                r"\b(home|house|clean|laundry|garden|repair|furniture|kitchen|garage|yard)\b",
            ),
            theme(
                "Social",
                r"\b(friends?|party|birthday|wedding|dinner\s+party|hang\s+out|catch\s+up|invite)\b",
            ),
        ];

        Self { themes }
    }

    /// Rank themes across the corpus by match count
    ///
    /// For each theme with at least one match: `count` is the number of
    /// matching items, `confidence` the mean of their confidences (2
    /// decimals, 0.5 substituted where absent), and `category` the
    /// category of the theme's *last-seen* matching item. Last-write-wins
    /// is pinned observable behavior, not a majority vote; do not "fix"
    /// it without flagging downstream.
    pub fn find_patterns(&self, items: &[VoiceItem]) -> Vec<Pattern> {
        struct Tally {
            count: usize,
            confidence_sum: f64,
            last_category: Category,
        }

        let mut tallies: Vec<Option<Tally>> = (0..self.themes.len()).map(|_| None).collect();

        for item in items {
            let Some(classification) = &item.classification else {
                continue;
            };
            let item_confidence = item.confidence.unwrap_or(FALLBACK_CONFIDENCE);
            // Committed items carry their final category; items still in
            // review fall back to the classifier's suggestion.
            let item_category = item.category.unwrap_or(classification.category);

            for (theme, tally) in self.themes.iter().zip(tallies.iter_mut()) {
                if !theme.keywords.is_match(&item.text) {
                    continue;
                }
                match tally {
                    Some(t) => {
                        t.count += 1;
                        t.confidence_sum += item_confidence;
                        t.last_category = item_category;
                    }
                    None => {
                        *tally = Some(Tally {
                            count: 1,
                            confidence_sum: item_confidence,
                            last_category: item_category,
                        });
                    }
                }
            }
        }

        let mut patterns: Vec<Pattern> = self
            .themes
            .iter()
            .zip(tallies)
            .filter_map(|(theme, tally)| {
                let t = tally?;
                Some(Pattern {
                    theme: theme.name.to_string(),
                    count: t.count,
                    confidence: (t.confidence_sum / t.count as f64 * 100.0).round() / 100.0,
                    category: t.last_category,
                })
            })
            .collect();

        patterns.sort_by(|a, b| b.count.cmp(&a.count));
        patterns.truncate(MAX_PATTERNS);
        patterns
    }
}

impl Default for ThemeMatcher {
    fn default() -> Self {
        Self::new()
    }
}
