//! Training pipeline plumbing
//!
//! Stock [`TrainingObserver`] implementations for progress display, metrics,
//! and JSON Lines export.

pub mod observers;

pub use observers::{JsonlObserver, MetricsObserver, MetricsSummary, ObserverSet, ProgressObserver};

pub use crate::ports::TrainingObserver;
