//! Command implementations for the sift CLI

use anyhow::{anyhow, bail, Result};
use chrono::Utc;

use sift_core::{
    calculate_stats, session_outcome_stats, Category, Classifier, OrganizeBatch, ReviewItem,
    SessionTracker, VoiceItem,
};

use crate::store::JsonStore;

/// Short display form of an item id
fn short(id: &str) -> &str {
    &id[..id.len().min(8)]
}

fn truncated(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

pub fn cmd_capture(store: &JsonStore, text: &str) -> Result<()> {
    if text.trim().is_empty() {
        bail!("nothing to capture");
    }

    let mut data = store.load()?;
    let now = Utc::now();

    let mut tracker = SessionTracker::new(&mut data.sessions);
    let session_id = tracker.ensure_open(now);
    tracker.record_item(&session_id, now)?;

    let mut item = VoiceItem::new(text, now);
    item.session_id = Some(session_id);
    let id = item.id.clone();
    data.braindump.push(item);

    store.save(&data)?;

    // Non-binding preview; the real verdict lands during `sift organize`
    let preview = Classifier::new().classify(text);
    println!("✅ Captured [{}]", short(&id));
    println!(
        "   Suggested: {} ({}, {:.0}%)",
        preview.category,
        preview.reasoning,
        preview.confidence * 100.0
    );
    Ok(())
}

pub fn cmd_classify(text: &str) -> Result<()> {
    let classification = Classifier::new().classify(text);

    println!();
    println!("  Category:   {}", classification.category);
    println!("  Confidence: {:.0}%", classification.confidence * 100.0);
    println!("  Reasoning:  {}", classification.reasoning);

    let signals = &classification.metadata;
    if let Some(info) = &signals.date_info {
        println!("  When:       {}", info);
    }
    if signals.urgency != sift_core::Urgency::None {
        println!("  Urgency:    {}", signals.urgency);
    }
    if !signals.patterns.is_empty() {
        println!("  Cues:       {}", signals.patterns.join(", "));
    }
    println!();
    Ok(())
}

/// Resolve an id or unique id prefix against the batch
fn resolve_item_id(items: &[ReviewItem], prefix: &str) -> Result<String> {
    let matches: Vec<&ReviewItem> = items
        .iter()
        .filter(|e| e.item.id.starts_with(prefix))
        .collect();
    match matches.len() {
        0 => Err(anyhow!("no item matches id '{}'", prefix)),
        1 => Ok(matches[0].item.id.clone()),
        n => Err(anyhow!("id '{}' is ambiguous ({} matches)", prefix, n)),
    }
}

pub fn cmd_organize(
    store: &JsonStore,
    dry_run: bool,
    task_overrides: &[String],
    note_overrides: &[String],
) -> Result<()> {
    let mut data = store.load()?;

    if data.braindump.is_empty() {
        println!("Braindump is empty — nothing to organize.");
        return Ok(());
    }

    let classifier = Classifier::new();
    let mut batch = OrganizeBatch::start(data.braindump.clone(), &classifier, None);

    for prefix in task_overrides {
        let id = resolve_item_id(batch.items(), prefix)?;
        batch.override_category(&id, Category::Tasks)?;
    }
    for prefix in note_overrides {
        let id = resolve_item_id(batch.items(), prefix)?;
        batch.override_category(&id, Category::Notes)?;
    }

    println!();
    println!("  {} item(s) reviewed:", batch.items().len());
    for entry in batch.items() {
        let marker = match entry.category {
            Category::Tasks => "☐ task",
            Category::Notes => "✎ note",
        };
        let corrected = if entry.item.metadata.user_corrected {
            " (overridden)"
        } else {
            ""
        };
        let confidence = entry.item.confidence.unwrap_or(0.0);
        println!(
            "  [{}] {} {:>3.0}%  {}{}",
            short(&entry.item.id),
            marker,
            confidence * 100.0,
            truncated(&entry.item.text, 48),
            corrected
        );
    }

    for warning in batch.warnings() {
        println!("  ⚠️  {}", warning);
    }

    if dry_run {
        println!();
        println!("  Dry run — nothing committed.");
        return Ok(());
    }

    let outcome = batch.apply();
    let task_count = outcome.tasks.len();
    let note_count = outcome.notes.len();
    data.absorb(outcome);

    // Finalize sessions whose items have all been committed
    let finished: Vec<_> = data
        .sessions
        .iter()
        .filter(|s| !s.processed && s.item_count > 0)
        .filter(|s| {
            !data
                .braindump
                .iter()
                .any(|i| i.session_id.as_deref() == Some(s.id.as_str()))
        })
        .cloned()
        .collect();
    for session in finished {
        let stats = session_outcome_stats(&data, &session);
        SessionTracker::new(&mut data.sessions).finalize(&session.id, stats)?;
    }

    store.save(&data)?;

    println!();
    println!("  Committed {} task(s) and {} note(s).", task_count, note_count);
    Ok(())
}

pub fn cmd_stats(store: &JsonStore) -> Result<()> {
    let data = store.load()?;
    let stats = calculate_stats(&data);

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│            🧠 Sift Dashboard            │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Sessions:          {}", stats.total_sessions);
    println!("  In braindump:      {}", stats.total_items);
    println!("  Items per session: {:.1}", stats.avg_items_per_session);
    println!("  Session length:    {:.1} min", stats.avg_session_duration);
    println!(
        "  Accuracy:          {}% classified confidently",
        stats.organization_accuracy
    );
    println!("  Best time of day:  {}", stats.most_productive_time);
    println!();

    let breakdown = &stats.category_breakdown;
    println!(
        "  ☐ Tasks: {} ({}%)   ✎ Notes: {} ({}%)",
        breakdown.tasks, breakdown.tasks_percentage, breakdown.notes, breakdown.notes_percentage
    );

    if !stats.top_patterns.is_empty() {
        println!();
        println!("  Themes:");
        for pattern in &stats.top_patterns {
            println!(
                "    {:<10} {:>3}  (avg {:.0}%, mostly {})",
                pattern.theme,
                pattern.count,
                pattern.confidence * 100.0,
                pattern.category
            );
        }
    }

    if !stats.weekly_stats.is_empty() {
        println!();
        println!("  Recent weeks:");
        for week in &stats.weekly_stats {
            println!(
                "    {}  {} item(s), {} session(s), {}%",
                week.week, week.item_count, week.session_count, week.accuracy
            );
        }
    }

    if !stats.productivity_trends.is_empty() {
        println!();
        println!("  By hour:");
        for trend in &stats.productivity_trends {
            println!(
                "    {:>5}  {}",
                trend.label,
                "▪".repeat(trend.item_count.min(40))
            );
        }
    }

    println!();
    Ok(())
}

pub fn cmd_list(store: &JsonStore, collection: &str) -> Result<()> {
    let data = store.load()?;

    let items: &[VoiceItem] = match collection {
        "braindump" => &data.braindump,
        "tasks" => &data.tasks,
        "notes" => &data.notes,
        other => bail!("unknown collection '{}' (use braindump, tasks or notes)", other),
    };

    if items.is_empty() {
        println!("({} is empty)", collection);
        return Ok(());
    }

    println!();
    for item in items {
        let mut flags = String::new();
        if item.completed == Some(true) {
            flags.push_str(" ✔");
        }
        if item.metadata.user_corrected {
            flags.push_str(" (corrected)");
        }
        println!(
            "  [{}] {}  {}{}",
            short(&item.id),
            item.timestamp.format("%Y-%m-%d %H:%M"),
            truncated(&item.text, 60),
            flags
        );
        if let Some(classification) = &item.classification {
            println!(
                "           {} — {} ({:.0}%)",
                classification.category,
                classification.reasoning,
                classification.confidence * 100.0
            );
        }
    }
    println!();
    Ok(())
}
