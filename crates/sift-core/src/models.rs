//! Domain models for sift
//!
//! Everything here is plain data: items, sessions, the aggregate root,
//! and the stats snapshot produced by the analytics aggregator. All records
//! serialize to camelCase JSON so they can be displayed or cached by
//! external collaborators without translation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a committed item lives: actionable task or reflective note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Tasks,
    Notes,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Notes => "notes",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tasks" | "task" => Ok(Self::Tasks),
            "notes" | "note" => Ok(Self::Notes),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How soon a captured thought needs attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Immediate,
    Soon,
    Future,
    #[default]
    None,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Soon => "soon",
            Self::Future => "future",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Task priority, derived from urgency when an item is committed as a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Map extracted urgency onto a task priority
    pub fn from_urgency(urgency: Urgency) -> Self {
        match urgency {
            Urgency::Immediate => Self::High,
            Urgency::Soon => Self::Medium,
            Urgency::Future | Urgency::None => Self::Low,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Signals extracted from the text while classifying
///
/// Extraction runs independently of category selection: an intent-tier
/// match still gets its date/urgency signals filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationSignals {
    pub has_date: bool,
    pub has_time: bool,
    /// The date/time phrase that matched (e.g. "tomorrow", "3pm")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_info: Option<String>,
    #[serde(default)]
    pub urgency: Urgency,
    /// Matched cue phrases, for display alongside the reasoning
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,
}

/// The Classifier's verdict for one piece of text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub category: Category,
    /// Always within [0, 1]
    pub confidence: f64,
    /// Human-readable explanation: rule name or matched cue
    pub reasoning: String,
    #[serde(default)]
    pub metadata: ClassificationSignals,
}

/// Item-level bookkeeping accumulated during review and commit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
    /// Copy of the classifier's reasoning, kept after commit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// True once the user overrode the suggested category during review
    #[serde(default)]
    pub user_corrected: bool,
    /// The classifier's original suggestion, preserved across an override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_suggestion: Option<Category>,
    #[serde(default)]
    pub pinned: bool,
}

/// One captured thought
///
/// An item belongs to exactly one of {braindump, tasks, notes} at any time.
/// Moving between collections is removal + insertion, never duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceItem {
    pub id: String,
    /// Original captured text, immutable after creation
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Link to the owning session (optional before commit)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// True once moved out of the braindump collection
    pub processed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    /// Mirror of `classification.confidence` for fast access.
    /// Invariant: equals `classification.confidence` whenever both are set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Populated once committed as a task or note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub metadata: ItemMetadata,
}

impl VoiceItem {
    /// Create a fresh, unclassified braindump item
    pub fn new(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            timestamp,
            session_id: None,
            processed: false,
            classification: None,
            confidence: None,
            category: None,
            completed: None,
            priority: None,
            tags: Vec::new(),
            metadata: ItemMetadata::default(),
        }
    }

    /// Attach a classification, keeping the confidence mirror in sync
    pub fn attach_classification(&mut self, classification: Classification) {
        self.confidence = Some(classification.confidence);
        self.metadata.reasoning = Some(classification.reasoning.clone());
        self.classification = Some(classification);
    }

    /// Word count of the captured text
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// Per-session stats, filled once the session has been fully organized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_words: usize,
    /// Seconds between the session's first and last capture
    pub duration: i64,
    pub tasks_created: usize,
    pub notes_created: usize,
    pub average_confidence: f64,
}

/// One capture episode grouping one or more items
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BraindumpSession {
    pub id: String,
    pub start_time: DateTime<Utc>,
    /// Last capture instant; rolls forward as items are appended
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub item_count: usize,
    /// True once every item from this session has been committed
    pub processed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<SessionStats>,
}

impl BraindumpSession {
    pub fn new(start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            start_time,
            end_time: None,
            item_count: 0,
            processed: false,
            processed_at: None,
            stats: None,
        }
    }
}

/// The aggregate root: everything the user has captured and organized
///
/// The processing state machine is the only writer of `processed` flags
/// and cross-collection moves; the analytics aggregator only reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub tasks: Vec<VoiceItem>,
    pub notes: Vec<VoiceItem>,
    pub braindump: Vec<VoiceItem>,
    pub sessions: Vec<BraindumpSession>,
}

impl AppData {
    /// All items across the three collections, braindump first
    pub fn all_items(&self) -> impl Iterator<Item = &VoiceItem> {
        self.braindump
            .iter()
            .chain(self.tasks.iter())
            .chain(self.notes.iter())
    }
}

/// A thematic keyword cluster detected across many items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub theme: String,
    pub count: usize,
    /// Mean confidence of matching items, rounded to 2 decimals
    pub confidence: f64,
    /// Category of the last-seen matching item (pinned behavior)
    pub category: Category,
}

/// Per-week rollup keyed by "{year}-{weekNumber}"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub week: String,
    pub item_count: usize,
    pub session_count: usize,
    /// Integer percentage 0-100
    pub accuracy: u32,
}

/// Item volume for one hour of the day (UTC)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityTrend {
    pub hour: u32,
    pub item_count: usize,
    /// 12-hour clock label, e.g. "12 AM", "1 PM"
    pub label: String,
}

/// Task/note split across the committed collections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub tasks: usize,
    pub notes: usize,
    /// Rounded independently of notes_percentage; the pair may not sum to 100
    pub tasks_percentage: u32,
    pub notes_percentage: u32,
}

/// Coarse time-of-day bucket for the most-productive-time metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
            Self::Night => "Night",
        }
    }

    /// Bucket an hour of day: Morning [5,12), Afternoon [12,17),
    /// Evening [17,21), Night otherwise
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=20 => Self::Evening,
            _ => Self::Night,
        }
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ephemeral analytics snapshot, recomputed on demand and never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BraindumpStats {
    pub total_sessions: usize,
    /// Raw capture volume: size of the braindump corpus, not tasks+notes
    pub total_items: usize,
    pub avg_items_per_session: f64,
    /// Minutes, one decimal
    pub avg_session_duration: f64,
    /// Integer percentage 0-100 of classified items with confidence > 0.7.
    /// This is already a percentage; consumers must not multiply by 100.
    pub organization_accuracy: u32,
    pub most_productive_time: TimeOfDay,
    pub top_patterns: Vec<Pattern>,
    pub weekly_stats: Vec<WeeklyStats>,
    pub category_breakdown: CategoryBreakdown,
    pub productivity_trends: Vec<ProductivityTrend>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_category_round_trip() {
        assert_eq!(Category::Tasks.as_str(), "tasks");
        assert_eq!(Category::from_str("note").unwrap(), Category::Notes);
        assert!(Category::from_str("junk").is_err());

        let json = serde_json::to_string(&Category::Notes).unwrap();
        assert_eq!(json, "\"notes\"");
    }

    #[test]
    fn test_priority_from_urgency() {
        assert_eq!(Priority::from_urgency(Urgency::Immediate), Priority::High);
        assert_eq!(Priority::from_urgency(Urgency::Soon), Priority::Medium);
        assert_eq!(Priority::from_urgency(Urgency::None), Priority::Low);
    }

    #[test]
    fn test_time_of_day_buckets() {
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(12), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(3), TimeOfDay::Night);
    }

    #[test]
    fn test_attach_classification_syncs_confidence() {
        let mut item = VoiceItem::new("call mom", chrono::Utc::now());
        item.attach_classification(Classification {
            category: Category::Tasks,
            confidence: 0.9,
            reasoning: "action verb".to_string(),
            metadata: ClassificationSignals::default(),
        });

        assert_eq!(item.confidence, Some(0.9));
        assert_eq!(
            item.confidence.unwrap(),
            item.classification.as_ref().unwrap().confidence
        );
        assert_eq!(item.metadata.reasoning.as_deref(), Some("action verb"));
    }

    #[test]
    fn test_item_serializes_camel_case() {
        let mut item = VoiceItem::new("buy milk", chrono::Utc::now());
        item.session_id = Some("s1".to_string());

        let value = serde_json::to_value(&item).unwrap();
        assert!(value.get("sessionId").is_some());
        assert!(value.get("session_id").is_none());
        // Unset optionals stay off the wire
        assert!(value.get("classification").is_none());
    }
}
