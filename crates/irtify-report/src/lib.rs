//! irtify-report: report persistence and rendering.
//!
//! Wraps an [`irtify_core::engine::Analysis`] with run metadata, persists it as
//! JSON, and renders markdown and self-contained HTML.

pub mod html;
pub mod report;
