//! irtify-core: psychometric estimation engine.
//!
//! This crate turns an answer key plus a set of examinee responses into
//! Classical Test Theory item statistics, proxy three-parameter-logistic
//! item parameters, and Differential Item Functioning results. It performs
//! no I/O; callers build a [`model::ResponseMatrix`] and render whatever
//! comes back.

pub mod ctt;
pub mod dif;
pub mod engine;
pub mod error;
pub mod irt;
pub mod model;
pub mod scores;
pub mod statistics;
pub mod topics;

pub use ctt::estimate_ctt;
pub use dif::analyze_dif;
pub use error::{PsychometricError, Result};
pub use irt::{estimate_irt, icc};
pub use scores::compute_scores;
