//! Sift Core Library
//!
//! Shared functionality for the sift braindump organizer:
//! - Rule-based classification engine with metadata extraction
//! - Thematic pattern mining across the captured corpus
//! - Capture session tracking
//! - Processing state machine (classify → review → commit)
//! - Analytics aggregation into an on-demand stats snapshot
//!
//! The core is synchronous and pure computation: capture, persistence and
//! rendering are external collaborators that exchange plain data records
//! with it.

pub mod classify;
pub mod error;
pub mod models;
pub mod organize;
pub mod session;
pub mod stats;
pub mod themes;

pub use classify::Classifier;
pub use error::{Error, Result};
pub use models::{
    AppData, BraindumpSession, BraindumpStats, Category, CategoryBreakdown, Classification,
    ClassificationSignals, ItemMetadata, Pattern, Priority, ProductivityTrend, SessionStats,
    TimeOfDay, Urgency, VoiceItem, WeeklyStats,
};
pub use organize::{
    session_outcome_stats, Classify, OrganizeBatch, OrganizeOutcome, OrganizeState,
    ProgressCallback, ReviewItem,
};
pub use session::{SessionConfig, SessionTracker};
pub use stats::calculate_stats;
pub use themes::ThemeMatcher;
