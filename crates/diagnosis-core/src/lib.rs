//! diagnosis-core — shared library for tumor diagnosis.
//!
//! Provides feature parsing, scaler and classifier artifacts, the fail-soft
//! artifact loader, and result reporting used by both the web and CLI frontends.

pub mod classifier;
pub mod error;
pub mod features;
pub mod fingerprint;
pub mod report;
pub mod scaler;
pub mod service;

pub use error::DiagnosisError;
pub use service::{ArtifactPaths, DiagnosisService};
