// Core algorithm exports
pub mod matcher;
pub mod normalize;
pub mod scoring;
pub mod template;

pub use matcher::{ConstituentDirectory, ConstituentMatch, ConstituentMatcher, MatchDecision, ScanLimits};
pub use normalize::{normalize_email, normalize_name, normalize_phone, NormalizedDonor};
pub use scoring::{score_candidate, MatchScore};
pub use template::{render_email_body, DEFAULT_EMAIL_TEMPLATE};
