//! Braindump processing state machine
//!
//! Sequences raw capture → per-item classification → user review/override
//! → committed organization. Only the terminal commit mutates the
//! persisted collections: a batch abandoned during processing or review
//! leaves `AppData` untouched.
//!
//! Items are classified sequentially in stable input order. Progress
//! reporting and the theme matcher's last-write-wins category attribution
//! both depend on that ordering, so classification is never parallelized.

use tracing::{debug, info, warn};

use crate::classify::Classifier;
use crate::error::{Error, Result};
use crate::models::{
    AppData, BraindumpSession, Category, Classification, ClassificationSignals, Priority,
    SessionStats, VoiceItem,
};

/// Progress callback for the processing stage
/// Parameters: (current, total)
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Classification seam for the state machine
///
/// The built-in `Classifier` never fails, but the batch isolates per-item
/// failures anyway: losing a captured thought to a classification error is
/// never acceptable, so a failing item defaults to a note instead of
/// aborting the batch.
pub trait Classify {
    fn classify(&self, text: &str) -> Result<Classification>;
}

impl Classify for Classifier {
    fn classify(&self, text: &str) -> Result<Classification> {
        Ok(Classifier::classify(self, text))
    }
}

/// Stage of a batch, processing → review → complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizeState {
    Processing,
    Review,
    Complete,
}

/// One item under review, with its suggested and final categories
#[derive(Debug, Clone)]
pub struct ReviewItem {
    pub item: VoiceItem,
    /// What the classifier suggested
    pub suggested: Category,
    /// Where the item will land on apply; starts equal to `suggested`
    pub category: Category,
}

/// Result of applying a reviewed batch
///
/// Every item carries `processed = true` and its final category. The
/// caller inserts these into `AppData` (see [`AppData::absorb`]); the
/// batch itself never touches the aggregate.
#[derive(Debug, Clone)]
pub struct OrganizeOutcome {
    pub tasks: Vec<VoiceItem>,
    pub notes: Vec<VoiceItem>,
    /// Non-fatal per-item anomalies from the processing stage
    pub warnings: Vec<String>,
}

/// A batch of braindump items moving through the state machine
///
/// `apply` consumes the batch, so applying twice is a compile error
/// rather than a runtime double-insert.
pub struct OrganizeBatch {
    items: Vec<ReviewItem>,
    warnings: Vec<String>,
    state: OrganizeState,
}

impl OrganizeBatch {
    /// Classify a batch of unclassified items, in input order
    ///
    /// A per-item classification failure is logged, recorded as a warning,
    /// and the item defaults to notes with confidence 0; the batch
    /// continues. Ends in the review state.
    pub fn start<C: Classify>(
        items: Vec<VoiceItem>,
        classifier: &C,
        progress: Option<&ProgressCallback>,
    ) -> Self {
        let mut batch = Self {
            items: items
                .into_iter()
                .map(|item| ReviewItem {
                    item,
                    suggested: Category::Notes,
                    category: Category::Notes,
                })
                .collect(),
            warnings: Vec::new(),
            state: OrganizeState::Processing,
        };
        batch.run_classification(classifier, progress);
        batch
    }

    fn run_classification<C: Classify>(
        &mut self,
        classifier: &C,
        progress: Option<&ProgressCallback>,
    ) {
        self.state = OrganizeState::Processing;
        let total = self.items.len();

        for (index, entry) in self.items.iter_mut().enumerate() {
            let classification = match classifier.classify(&entry.item.text) {
                Ok(c) => c,
                Err(e) => {
                    warn!(item_id = %entry.item.id, error = %e, "classification failed, defaulting to notes");
                    self.warnings.push(format!(
                        "classification failed for item {}: {}",
                        entry.item.id, e
                    ));
                    Classification {
                        category: Category::Notes,
                        confidence: 0.0,
                        reasoning: "classification failed".to_string(),
                        metadata: ClassificationSignals::default(),
                    }
                }
            };

            entry.suggested = classification.category;
            entry.category = classification.category;
            entry.item.attach_classification(classification);

            if let Some(cb) = progress {
                cb(index + 1, total);
            }
        }

        debug!(total, warnings = self.warnings.len(), "batch classified");
        self.state = OrganizeState::Review;
    }

    pub fn state(&self) -> OrganizeState {
        self.state
    }

    /// Items awaiting review, in original capture order
    pub fn items(&self) -> &[ReviewItem] {
        &self.items
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Override an item's category during review
    ///
    /// Marks the item user-corrected and preserves the original suggestion.
    /// Setting an item back to its suggestion clears the correction. No
    /// classification is re-run.
    pub fn override_category(&mut self, item_id: &str, category: Category) -> Result<()> {
        if self.state != OrganizeState::Review {
            return Err(Error::InvalidState(
                "overrides are only allowed during review".to_string(),
            ));
        }

        let entry = self
            .items
            .iter_mut()
            .find(|e| e.item.id == item_id)
            .ok_or_else(|| Error::NotFound(format!("item {}", item_id)))?;

        entry.category = category;
        if category != entry.suggested {
            entry.item.metadata.user_corrected = true;
            entry.item.metadata.original_suggestion = Some(entry.suggested);
        } else {
            entry.item.metadata.user_corrected = false;
            entry.item.metadata.original_suggestion = None;
        }
        Ok(())
    }

    /// Discard current classifications and run the processing stage again
    ///
    /// Supported at any point before completion; overrides are reset.
    pub fn reprocess<C: Classify>(&mut self, classifier: &C, progress: Option<&ProgressCallback>) {
        for entry in &mut self.items {
            entry.item.classification = None;
            entry.item.confidence = None;
            entry.item.metadata.reasoning = None;
            entry.item.metadata.user_corrected = false;
            entry.item.metadata.original_suggestion = None;
        }
        self.warnings.clear();
        self.run_classification(classifier, progress);
    }

    /// Abandon the batch without side effects
    pub fn cancel(self) {
        debug!(items = self.items.len(), "batch cancelled");
    }

    /// Commit the reviewed batch: partition into tasks and notes
    ///
    /// Every source item is marked processed; tasks pick up a completion
    /// flag and a priority derived from their extracted urgency. Consumes
    /// the batch.
    pub fn apply(self) -> OrganizeOutcome {
        let mut tasks = Vec::new();
        let mut notes = Vec::new();

        for entry in self.items {
            let mut item = entry.item;
            item.processed = true;
            item.category = Some(entry.category);

            match entry.category {
                Category::Tasks => {
                    item.completed = Some(false);
                    let urgency = item
                        .classification
                        .as_ref()
                        .map(|c| c.metadata.urgency)
                        .unwrap_or_default();
                    item.priority = Some(Priority::from_urgency(urgency));
                    tasks.push(item);
                }
                Category::Notes => notes.push(item),
            }
        }

        info!(
            tasks = tasks.len(),
            notes = notes.len(),
            "batch applied"
        );

        OrganizeOutcome {
            tasks,
            notes,
            warnings: self.warnings,
        }
    }
}

impl AppData {
    /// Move an applied batch into the committed collections
    ///
    /// Each item is removed from the braindump and inserted into exactly
    /// one of tasks/notes. Items already absent from the braindump and
    /// already present in a committed collection are skipped, so replaying
    /// an outcome cannot duplicate.
    pub fn absorb(&mut self, outcome: OrganizeOutcome) {
        for item in outcome.tasks {
            self.braindump.retain(|b| b.id != item.id);
            if !self.tasks.iter().any(|t| t.id == item.id) {
                self.tasks.push(item);
            }
        }
        for item in outcome.notes {
            self.braindump.retain(|b| b.id != item.id);
            if !self.notes.iter().any(|n| n.id == item.id) {
                self.notes.push(item);
            }
        }
    }
}

/// Stats for a fully organized session, from its committed items
pub fn session_outcome_stats(data: &AppData, session: &BraindumpSession) -> SessionStats {
    let committed: Vec<&VoiceItem> = data
        .tasks
        .iter()
        .chain(data.notes.iter())
        .filter(|i| i.session_id.as_deref() == Some(session.id.as_str()))
        .collect();

    let total_words = committed.iter().map(|i| i.word_count()).sum();
    let duration = session
        .end_time
        .map(|end| (end - session.start_time).num_seconds())
        .unwrap_or(0);
    let tasks_created = committed
        .iter()
        .filter(|i| i.category == Some(Category::Tasks))
        .count();
    let notes_created = committed
        .iter()
        .filter(|i| i.category == Some(Category::Notes))
        .count();

    let confidences: Vec<f64> = committed.iter().filter_map(|i| i.confidence).collect();
    let average_confidence = if confidences.is_empty() {
        0.0
    } else {
        confidences.iter().sum::<f64>() / confidences.len() as f64
    };

    SessionStats {
        total_words,
        duration,
        tasks_created,
        notes_created,
        average_confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    fn items(texts: &[&str]) -> Vec<VoiceItem> {
        texts.iter().map(|t| VoiceItem::new(*t, Utc::now())).collect()
    }

    /// Fails on any text containing "boom"
    struct FlakyClassifier {
        inner: Classifier,
    }

    impl Classify for FlakyClassifier {
        fn classify(&self, text: &str) -> Result<Classification> {
            if text.contains("boom") {
                return Err(Error::Classification("synthetic failure".to_string()));
            }
            Ok(Classifier::classify(&self.inner, text))
        }
    }

    #[test]
    fn test_start_classifies_in_order() {
        let classifier = Classifier::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_cb = Arc::clone(&seen);
        let progress: ProgressCallback =
            Box::new(move |current, total| seen_in_cb.lock().unwrap().push((current, total)));

        let batch = OrganizeBatch::start(
            items(&["buy milk", "idea for a blog post", "call the bank"]),
            &classifier,
            Some(&progress),
        );

        assert_eq!(batch.state(), OrganizeState::Review);
        assert_eq!(*seen.lock().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(batch.items()[0].suggested, Category::Tasks);
        assert_eq!(batch.items()[1].suggested, Category::Notes);
    }

    #[test]
    fn test_failure_is_isolated_per_item() {
        let classifier = FlakyClassifier {
            inner: Classifier::new(),
        };
        let batch = OrganizeBatch::start(
            items(&["buy milk", "boom", "fix the door"]),
            &classifier,
            None,
        );

        assert_eq!(batch.warnings().len(), 1);

        let failed = &batch.items()[1];
        assert_eq!(failed.suggested, Category::Notes);
        assert_eq!(failed.item.confidence, Some(0.0));

        // Neighbors classified normally
        assert_eq!(batch.items()[0].suggested, Category::Tasks);
        assert_eq!(batch.items()[2].suggested, Category::Tasks);
    }

    #[test]
    fn test_override_preserves_original_suggestion() {
        let classifier = Classifier::new();
        let mut batch = OrganizeBatch::start(items(&["buy milk"]), &classifier, None);
        let id = batch.items()[0].item.id.clone();

        batch.override_category(&id, Category::Notes).unwrap();
        let entry = &batch.items()[0];
        assert!(entry.item.metadata.user_corrected);
        assert_eq!(entry.item.metadata.original_suggestion, Some(Category::Tasks));

        // Setting back to the suggestion clears the correction
        batch.override_category(&id, Category::Tasks).unwrap();
        let entry = &batch.items()[0];
        assert!(!entry.item.metadata.user_corrected);
        assert!(entry.item.metadata.original_suggestion.is_none());
    }

    #[test]
    fn test_override_unknown_item() {
        let classifier = Classifier::new();
        let mut batch = OrganizeBatch::start(items(&["buy milk"]), &classifier, None);
        assert!(batch
            .override_category("nope", Category::Notes)
            .is_err());
    }

    #[test]
    fn test_apply_round_trip() {
        let classifier = Classifier::new();
        let source = items(&["buy milk", "idea for a song", "need to file taxes"]);
        let source_ids: HashSet<String> = source.iter().map(|i| i.id.clone()).collect();

        let batch = OrganizeBatch::start(source, &classifier, None);
        let outcome = batch.apply();

        let committed: Vec<&VoiceItem> =
            outcome.tasks.iter().chain(outcome.notes.iter()).collect();
        let committed_ids: HashSet<String> = committed.iter().map(|i| i.id.clone()).collect();

        // Union of tasks+notes equals the batch by id, no dupes, no omissions
        assert_eq!(committed_ids, source_ids);
        assert_eq!(committed.len(), source_ids.len());
        assert!(committed.iter().all(|i| i.processed));
        assert!(committed.iter().all(|i| i.category.is_some()));
    }

    #[test]
    fn test_apply_sets_task_fields() {
        let classifier = Classifier::new();
        let batch = OrganizeBatch::start(
            items(&["need to submit the report asap"]),
            &classifier,
            None,
        );
        let outcome = batch.apply();

        let task = &outcome.tasks[0];
        assert_eq!(task.completed, Some(false));
        assert_eq!(task.priority, Some(Priority::High));
    }

    #[test]
    fn test_reprocess_resets_overrides() {
        let classifier = Classifier::new();
        let mut batch = OrganizeBatch::start(items(&["buy milk"]), &classifier, None);
        let id = batch.items()[0].item.id.clone();
        batch.override_category(&id, Category::Notes).unwrap();

        batch.reprocess(&classifier, None);

        let entry = &batch.items()[0];
        assert_eq!(entry.category, Category::Tasks);
        assert!(!entry.item.metadata.user_corrected);
    }

    #[test]
    fn test_absorb_moves_exactly_once() {
        let classifier = Classifier::new();
        let mut data = AppData::default();
        data.braindump = items(&["buy milk", "idea for a mural"]);

        let batch = OrganizeBatch::start(data.braindump.clone(), &classifier, None);
        let outcome = batch.apply();
        let replay = outcome.clone();

        data.absorb(outcome);
        assert!(data.braindump.is_empty());
        assert_eq!(data.tasks.len(), 1);
        assert_eq!(data.notes.len(), 1);

        // Replaying the same outcome must not duplicate
        data.absorb(replay);
        assert_eq!(data.tasks.len(), 1);
        assert_eq!(data.notes.len(), 1);
    }

    #[test]
    fn test_session_outcome_stats() {
        use chrono::Duration;

        let classifier = Classifier::new();
        let mut data = AppData::default();
        let mut session = BraindumpSession::new(Utc::now() - Duration::seconds(120));
        session.end_time = Some(session.start_time + Duration::seconds(90));

        let mut captured = items(&["buy milk today", "thought about gardening"]);
        for item in &mut captured {
            item.session_id = Some(session.id.clone());
        }
        data.braindump = captured.clone();

        let outcome = OrganizeBatch::start(captured, &classifier, None).apply();
        data.absorb(outcome);

        let stats = session_outcome_stats(&data, &session);
        assert_eq!(stats.duration, 90);
        assert_eq!(stats.total_words, 6);
        assert_eq!(stats.tasks_created, 1);
        assert_eq!(stats.notes_created, 1);
        assert!(stats.average_confidence > 0.0);
    }
}
