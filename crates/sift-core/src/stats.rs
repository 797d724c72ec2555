//! Analytics aggregation over the classified corpus
//!
//! `calculate_stats` is a pure function over `AppData`: no mutation, no
//! I/O, identical output for identical input. The item-level projections
//! (hour bucket, time-of-day bucket, week key, confidence counters) are
//! gathered in a single pass over the union of the three collections.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use std::collections::BTreeMap;

use crate::models::{
    AppData, BraindumpStats, CategoryBreakdown, ProductivityTrend, TimeOfDay, VoiceItem,
    WeeklyStats,
};
use crate::themes::ThemeMatcher;

/// Confidence above which a classified item counts as accurately organized
const ACCURACY_THRESHOLD: f64 = 0.7;

/// Number of trailing weeks kept in the weekly rollup
const WEEKS_KEPT: usize = 8;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Week key "{year}-{weekNumber:02}"
///
/// The week number counts 7-day windows from January 1st, shifted by
/// Jan 1st's weekday so weeks align to Sunday boundaries:
/// `ceil((days_since_jan1 + jan1_weekday + 1) / 7)`.
fn week_key(at: DateTime<Utc>) -> String {
    let jan1 = Utc
        .with_ymd_and_hms(at.year(), 1, 1, 0, 0, 0)
        .single()
        .expect("valid January 1st");
    let days = (at - jan1).num_seconds() as f64 / 86_400.0;
    let offset = jan1.weekday().num_days_from_sunday() as f64;
    let week = ((days + offset + 1.0) / 7.0).ceil() as u32;
    format!("{}-{:02}", at.year(), week)
}

#[derive(Default)]
struct WeekAccum {
    session_count: usize,
    item_count: usize,
    confidence_sum: f64,
}

/// Single-pass accumulator over the item union
#[derive(Default)]
struct ItemScan {
    hour_counts: [usize; 24],
    bucket_counts: [usize; 4],
    classified: usize,
    accurate: usize,
    week_confidence: BTreeMap<String, f64>,
}

impl ItemScan {
    fn visit(&mut self, item: &VoiceItem) {
        let hour = item.timestamp.hour();
        self.hour_counts[hour as usize] += 1;
        self.bucket_counts[bucket_index(TimeOfDay::from_hour(hour))] += 1;

        // Missing classification/confidence excludes an item from the
        // confidence-based metrics, never from the raw counts above.
        if let (Some(_), Some(confidence)) = (&item.classification, item.confidence) {
            self.classified += 1;
            if confidence > ACCURACY_THRESHOLD {
                self.accurate += 1;
            }
            *self
                .week_confidence
                .entry(week_key(item.timestamp))
                .or_insert(0.0) += confidence;
        }
    }
}

const BUCKET_ORDER: [TimeOfDay; 4] = [
    TimeOfDay::Morning,
    TimeOfDay::Afternoon,
    TimeOfDay::Evening,
    TimeOfDay::Night,
];

fn bucket_index(bucket: TimeOfDay) -> usize {
    BUCKET_ORDER
        .iter()
        .position(|b| *b == bucket)
        .expect("bucket in order table")
}

/// 12-hour clock label for an hour of day, "12 AM" through "11 PM"
fn hour_label(hour: u32) -> String {
    match hour {
        0 => "12 AM".to_string(),
        1..=11 => format!("{} AM", hour),
        12 => "12 PM".to_string(),
        _ => format!("{} PM", hour - 12),
    }
}

/// Compute a stats snapshot over the whole data set
pub fn calculate_stats(data: &AppData) -> BraindumpStats {
    let mut scan = ItemScan::default();
    for item in data.all_items() {
        scan.visit(item);
    }

    let total_sessions = data.sessions.len();
    // Raw capture volume, not tasks+notes
    let total_items = data.braindump.len();

    let avg_items_per_session = if total_sessions == 0 {
        0.0
    } else {
        let item_sum: usize = data.sessions.iter().map(|s| s.item_count).sum();
        round1(item_sum as f64 / total_sessions as f64)
    };

    // Only sessions that both ended and were finalized carry a duration
    let durations: Vec<i64> = data
        .sessions
        .iter()
        .filter(|s| s.end_time.is_some())
        .filter_map(|s| s.stats.as_ref().map(|st| st.duration))
        .collect();
    let avg_session_duration = if durations.is_empty() {
        0.0
    } else {
        let mean_seconds = durations.iter().sum::<i64>() as f64 / durations.len() as f64;
        round1(mean_seconds / 60.0)
    };

    let organization_accuracy = if scan.classified == 0 {
        0
    } else {
        (scan.accurate as f64 / scan.classified as f64 * 100.0).round() as u32
    };

    // Running maximum seeded at Morning; replaced only on strictly greater
    // counts, so ties resolve to the earliest bucket in the scan order.
    let mut most_productive_time = TimeOfDay::Morning;
    let mut best_count = scan.bucket_counts[bucket_index(TimeOfDay::Morning)];
    for bucket in BUCKET_ORDER {
        let count = scan.bucket_counts[bucket_index(bucket)];
        if count > best_count {
            most_productive_time = bucket;
            best_count = count;
        }
    }

    let top_patterns = ThemeMatcher::new().find_patterns(&data.braindump);

    // Weekly rollup: sessions keyed by start time, item confidence keyed
    // by item timestamp, joined on the week key.
    let mut weeks: BTreeMap<String, WeekAccum> = BTreeMap::new();
    for session in &data.sessions {
        let accum = weeks.entry(week_key(session.start_time)).or_default();
        accum.session_count += 1;
        accum.item_count += session.item_count;
    }
    for (key, confidence_sum) in scan.week_confidence {
        weeks.entry(key).or_default().confidence_sum += confidence_sum;
    }

    let weekly: Vec<WeeklyStats> = weeks
        .into_iter()
        .map(|(week, accum)| WeeklyStats {
            week,
            item_count: accum.item_count,
            session_count: accum.session_count,
            accuracy: if accum.item_count == 0 {
                0
            } else {
                (accum.confidence_sum / accum.item_count as f64 * 100.0).round() as u32
            },
        })
        .collect();
    let weekly_stats = if weekly.len() > WEEKS_KEPT {
        weekly[weekly.len() - WEEKS_KEPT..].to_vec()
    } else {
        weekly
    };

    let tasks = data.tasks.len();
    let notes = data.notes.len();
    let category_breakdown = if tasks + notes == 0 {
        CategoryBreakdown::default()
    } else {
        let total = (tasks + notes) as f64;
        CategoryBreakdown {
            tasks,
            notes,
            // Rounded independently; the pair may not sum to exactly 100
            tasks_percentage: (tasks as f64 / total * 100.0).round() as u32,
            notes_percentage: (notes as f64 / total * 100.0).round() as u32,
        }
    };

    let productivity_trends: Vec<ProductivityTrend> = (0..24)
        .filter(|hour| scan.hour_counts[*hour as usize] > 0)
        .map(|hour| ProductivityTrend {
            hour,
            item_count: scan.hour_counts[hour as usize],
            label: hour_label(hour),
        })
        .collect();

    BraindumpStats {
        total_sessions,
        total_items,
        avg_items_per_session,
        avg_session_duration,
        organization_accuracy,
        most_productive_time,
        top_patterns,
        weekly_stats,
        category_breakdown,
        productivity_trends,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BraindumpSession, Category, Classification, ClassificationSignals, SessionStats,
    };

    fn ts(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, month, day, hour, 0, 0).unwrap()
    }

    fn classified(text: &str, category: Category, confidence: f64, at: DateTime<Utc>) -> VoiceItem {
        let mut item = VoiceItem::new(text, at);
        item.attach_classification(Classification {
            category,
            confidence,
            reasoning: "test".to_string(),
            metadata: ClassificationSignals::default(),
        });
        item
    }

    #[test]
    fn test_empty_data_is_all_zero() {
        let stats = calculate_stats(&AppData::default());

        assert_eq!(stats.total_sessions, 0);
        assert_eq!(stats.total_items, 0);
        assert_eq!(stats.avg_items_per_session, 0.0);
        assert_eq!(stats.avg_session_duration, 0.0);
        assert_eq!(stats.organization_accuracy, 0);
        assert_eq!(stats.most_productive_time, TimeOfDay::Morning);
        assert!(stats.top_patterns.is_empty());
        assert!(stats.weekly_stats.is_empty());
        assert_eq!(stats.category_breakdown, CategoryBreakdown::default());
        assert!(stats.productivity_trends.is_empty());
    }

    #[test]
    fn test_avg_items_per_session() {
        let mut data = AppData::default();
        let mut s1 = BraindumpSession::new(ts(3, 1, 9));
        s1.item_count = 2;
        let mut s2 = BraindumpSession::new(ts(3, 2, 9));
        s2.item_count = 1;
        data.sessions = vec![s1, s2];

        assert_eq!(calculate_stats(&data).avg_items_per_session, 1.5);
    }

    #[test]
    fn test_avg_session_duration_skips_unfinished() {
        let mut data = AppData::default();

        let mut done = BraindumpSession::new(ts(3, 1, 9));
        done.end_time = Some(ts(3, 1, 9) + chrono::Duration::seconds(180));
        done.stats = Some(SessionStats {
            total_words: 5,
            duration: 180,
            tasks_created: 1,
            notes_created: 0,
            average_confidence: 0.9,
        });

        // Open session: no end time, no stats; excluded from the mean
        let open = BraindumpSession::new(ts(3, 2, 9));
        data.sessions = vec![done, open];

        assert_eq!(calculate_stats(&data).avg_session_duration, 3.0);
    }

    #[test]
    fn test_organization_accuracy_all_above_threshold() {
        let mut data = AppData::default();
        data.braindump = vec![
            classified("a", Category::Notes, 0.85, ts(3, 1, 9)),
            classified("b", Category::Notes, 0.75, ts(3, 1, 10)),
            classified("c", Category::Notes, 0.90, ts(3, 1, 11)),
        ];

        assert_eq!(calculate_stats(&data).organization_accuracy, 100);
    }

    #[test]
    fn test_organization_accuracy_spans_collections() {
        let mut data = AppData::default();
        data.braindump = vec![classified("a", Category::Notes, 0.9, ts(3, 1, 9))];
        data.tasks = vec![classified("b", Category::Tasks, 0.5, ts(3, 1, 10))];
        // Unclassified item counts nowhere
        data.notes = vec![VoiceItem::new("c", ts(3, 1, 11))];

        assert_eq!(calculate_stats(&data).organization_accuracy, 50);
    }

    #[test]
    fn test_most_productive_time_tie_breaks_to_morning() {
        let mut data = AppData::default();
        data.braindump = vec![
            classified("a", Category::Notes, 0.8, ts(3, 1, 9)),
            classified("b", Category::Notes, 0.8, ts(3, 1, 10)),
            classified("c", Category::Notes, 0.8, ts(3, 1, 14)),
            classified("d", Category::Notes, 0.8, ts(3, 1, 16)),
        ];

        assert_eq!(
            calculate_stats(&data).most_productive_time,
            TimeOfDay::Morning
        );
    }

    #[test]
    fn test_most_productive_time_strict_winner() {
        let mut data = AppData::default();
        data.braindump = vec![
            classified("a", Category::Notes, 0.8, ts(3, 1, 19)),
            classified("b", Category::Notes, 0.8, ts(3, 1, 20)),
            classified("c", Category::Notes, 0.8, ts(3, 1, 9)),
        ];

        assert_eq!(
            calculate_stats(&data).most_productive_time,
            TimeOfDay::Evening
        );
    }

    #[test]
    fn test_category_breakdown_rounds_independently() {
        let mut data = AppData::default();
        data.tasks = vec![
            classified("a", Category::Tasks, 0.9, ts(3, 1, 9)),
            classified("b", Category::Tasks, 0.9, ts(3, 1, 9)),
        ];
        data.notes = vec![classified("c", Category::Notes, 0.9, ts(3, 1, 9))];

        let breakdown = calculate_stats(&data).category_breakdown;
        assert_eq!(breakdown.tasks, 2);
        assert_eq!(breakdown.notes, 1);
        assert_eq!(breakdown.tasks_percentage, 67);
        assert_eq!(breakdown.notes_percentage, 33);
    }

    #[test]
    fn test_productivity_trends_labels_and_gaps() {
        let mut data = AppData::default();
        data.braindump = vec![
            classified("a", Category::Notes, 0.8, ts(3, 1, 0)),
            classified("b", Category::Notes, 0.8, ts(3, 1, 13)),
            classified("c", Category::Notes, 0.8, ts(3, 1, 13)),
        ];

        let trends = calculate_stats(&data).productivity_trends;
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].hour, 0);
        assert_eq!(trends[0].label, "12 AM");
        assert_eq!(trends[0].item_count, 1);
        assert_eq!(trends[1].hour, 13);
        assert_eq!(trends[1].label, "1 PM");
        assert_eq!(trends[1].item_count, 2);
    }

    #[test]
    fn test_weekly_stats_grouping_and_accuracy() {
        let mut data = AppData::default();

        let mut session = BraindumpSession::new(ts(3, 2, 9));
        session.item_count = 2;
        data.sessions = vec![session];
        data.braindump = vec![
            classified("a", Category::Notes, 0.8, ts(3, 2, 10)),
            classified("b", Category::Notes, 0.6, ts(3, 2, 11)),
        ];

        let weekly = calculate_stats(&data).weekly_stats;
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].week, week_key(ts(3, 2, 9)));
        assert_eq!(weekly[0].session_count, 1);
        assert_eq!(weekly[0].item_count, 2);
        // (0.8 + 0.6) / 2 * 100 = 70
        assert_eq!(weekly[0].accuracy, 70);
    }

    #[test]
    fn test_weekly_stats_keeps_last_eight() {
        let mut data = AppData::default();
        for week in 0..10 {
            let mut session = BraindumpSession::new(ts(1, 4, 9) + chrono::Duration::weeks(week));
            session.item_count = 1;
            data.sessions.push(session);
        }

        let weekly = calculate_stats(&data).weekly_stats;
        assert_eq!(weekly.len(), 8);
        // Ascending by week key, earliest two dropped
        let mut sorted = weekly.clone();
        sorted.sort_by(|a, b| a.week.cmp(&b.week));
        assert_eq!(weekly, sorted);
    }

    #[test]
    fn test_week_key_formula() {
        // Jan 1 2026 is a Thursday (weekday offset 4 from Sunday):
        // ceil((0 + 4 + 1) / 7) = 1
        assert_eq!(week_key(ts(1, 1, 0)), "2026-01");
        // Jan 4 2026 is the first Sunday: ceil((3 + 4 + 1) / 7) = 2
        assert_eq!(week_key(ts(1, 4, 0)), "2026-02");
        // Zero-padding holds through mid-year
        assert!(week_key(ts(6, 15, 0)).starts_with("2026-2"));
    }

    #[test]
    fn test_calculate_stats_is_pure() {
        let mut data = AppData::default();
        let mut session = BraindumpSession::new(ts(3, 2, 9));
        session.item_count = 1;
        data.sessions = vec![session];
        data.braindump = vec![classified(
            "work deadline tomorrow",
            Category::Tasks,
            0.9,
            ts(3, 2, 10),
        )];

        let first = calculate_stats(&data);
        let second = calculate_stats(&data);
        assert_eq!(first, second);
    }
}
