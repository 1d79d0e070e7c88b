//! mcqeval-report: renders analysis reports for people.

pub mod html;
