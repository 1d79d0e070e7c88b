//! mcqeval-core: item analysis for multiple-choice tests.
//!
//! This crate defines the response data model, grading, student scoring,
//! quartile selection, item difficulty and discrimination, distractor
//! tables and the report envelope that the rest of mcqeval builds on.

pub mod config;
pub mod diagnostics;
pub mod distractors;
pub mod engine;
pub mod error;
pub mod grading;
pub mod items;
pub mod levels;
pub mod model;
pub mod normalize;
pub mod report;
pub mod scoring;
