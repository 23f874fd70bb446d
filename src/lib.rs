//! Donor Intake - donation intake service with receipts and CRM sync
//!
//! Records each donation to a CSV file, emails the donor a PDF tax receipt
//! and pushes the donor to Bloomerang, reusing an existing constituent when
//! the matcher finds one.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::config::Settings;
pub use crate::core::{score_candidate, ConstituentDirectory, ConstituentMatcher, MatchDecision, NormalizedDonor};
pub use crate::models::{CandidateConstituent, DonorRecord, MatchResult, MatchWeights};
