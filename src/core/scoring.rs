use crate::core::normalize::{normalize_email, normalize_name, normalize_phone, NormalizedDonor};
use crate::models::{CandidateConstituent, MatchField, MatchWeights};

/// Score of a single candidate against the donor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchScore {
    pub score: u32,
    pub matched: Vec<MatchField>,
}

impl MatchScore {
    pub fn is_accepted(&self, weights: &MatchWeights) -> bool {
        self.score >= weights.threshold
    }

    /// Matched fields joined for logging, e.g. `email + name`
    pub fn describe(&self) -> String {
        self.matched
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

/// Calculate the additive match score for a candidate
///
/// Scoring rules (all-or-nothing per rule):
/// - email equal after normalization, both non-empty: `weights.email`
/// - phone digits equal, both non-empty, donor has at least
///   `weights.min_phone_digits` digits: `weights.phone`
/// - first AND last name equal after normalization: `weights.name`
pub fn score_candidate(
    donor: &NormalizedDonor,
    candidate: &CandidateConstituent,
    weights: &MatchWeights,
) -> MatchScore {
    let mut score = 0;
    let mut matched = Vec::with_capacity(3);

    let candidate_email = normalize_email(candidate.email());
    if !donor.email.is_empty() && !candidate_email.is_empty() && candidate_email == donor.email {
        score += weights.email;
        matched.push(MatchField::Email);
    }

    let candidate_phone = normalize_phone(candidate.phone());
    if !donor.phone.is_empty()
        && !candidate_phone.is_empty()
        && candidate_phone == donor.phone
        && donor.phone.len() >= weights.min_phone_digits
    {
        score += weights.phone;
        matched.push(MatchField::Phone);
    }

    let first = normalize_name(candidate.first_name.as_deref().unwrap_or(""));
    let last = normalize_name(candidate.last_name.as_deref().unwrap_or(""));
    if first == donor.first_name && last == donor.last_name {
        score += weights.name;
        matched.push(MatchField::Name);
    }

    MatchScore { score, matched }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PrimaryEmail, PrimaryPhone};

    fn donor(email: &str, phone: &str) -> NormalizedDonor {
        NormalizedDonor::new(email, phone, "Jane", "Doe")
    }

    fn candidate(first: &str, last: &str) -> CandidateConstituent {
        CandidateConstituent {
            id: 7,
            full_name: Some(format!("{} {}", first, last)),
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_email_match_alone_is_accepted() {
        let weights = MatchWeights::default();
        let mut c = candidate("Someone", "Else");
        c.primary_email = Some(PrimaryEmail { value: Some("jane@example.com".into()) });

        let result = score_candidate(&donor("Jane@Example.com ", ""), &c, &weights);

        assert_eq!(result.score, 100);
        assert_eq!(result.matched, vec![MatchField::Email]);
        assert!(result.is_accepted(&weights));
    }

    #[test]
    fn test_phone_and_name_reach_threshold() {
        let weights = MatchWeights::default();
        let mut c = candidate("Jane", "Doe");
        c.phone_number = Some("305-555-1234".into());

        let result = score_candidate(&donor("", "(305) 555-1234"), &c, &weights);

        assert_eq!(result.score, 80);
        assert_eq!(result.describe(), "phone + name");
        assert!(result.is_accepted(&weights));
    }

    #[test]
    fn test_phone_alone_is_rejected() {
        let weights = MatchWeights::default();
        let mut c = candidate("John", "Doe");
        c.primary_phone = Some(PrimaryPhone { number: Some("3055551234".into()) });

        let result = score_candidate(&donor("", "305 555 1234"), &c, &weights);

        assert_eq!(result.score, 50);
        assert!(!result.is_accepted(&weights));
    }

    #[test]
    fn test_name_alone_is_rejected() {
        let weights = MatchWeights::default();
        let result = score_candidate(&donor("a@b.org", ""), &candidate(" JANE", "doe "), &weights);

        assert_eq!(result.score, 30);
        assert!(!result.is_accepted(&weights));
    }

    #[test]
    fn test_short_phone_never_scores() {
        let weights = MatchWeights::default();
        let mut c = candidate("Jane", "Doe");
        c.phone_number = Some("555-1234".into());

        let result = score_candidate(&donor("", "555-1234"), &c, &weights);

        assert_eq!(result.matched, vec![MatchField::Name]);
    }

    #[test]
    fn test_empty_emails_do_not_match() {
        let weights = MatchWeights::default();
        let mut c = candidate("X", "Y");
        c.email_address = Some("   ".into());

        let result = score_candidate(&donor("  ", ""), &c, &weights);

        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_primary_email_falls_back_to_legacy_field() {
        let weights = MatchWeights::default();
        let mut c = candidate("X", "Y");
        c.primary_email = Some(PrimaryEmail { value: Some(String::new()) });
        c.email_address = Some("JANE@example.com".into());

        let result = score_candidate(&donor("jane@example.com", ""), &c, &weights);

        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_missing_candidate_names_are_empty() {
        let weights = MatchWeights::default();
        let c = CandidateConstituent { id: 1, ..Default::default() };
        let anonymous = NormalizedDonor::new("", "", "", "");

        let result = score_candidate(&anonymous, &c, &weights);

        assert_eq!(result.matched, vec![MatchField::Name]);
    }

    #[test]
    fn test_all_fields_sum() {
        let weights = MatchWeights::default();
        let mut c = candidate("Jane", "Doe");
        c.primary_email = Some(PrimaryEmail { value: Some("jane@example.com".into()) });
        c.primary_phone = Some(PrimaryPhone { number: Some("(305) 555-1234".into()) });

        let result = score_candidate(&donor("jane@example.com", "3055551234"), &c, &weights);

        assert_eq!(result.score, 180);
        assert_eq!(result.describe(), "email + phone + name");
    }
}
