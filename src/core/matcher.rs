use async_trait::async_trait;

use crate::core::normalize::NormalizedDonor;
use crate::core::scoring::{score_candidate, MatchScore};
use crate::models::{CandidateConstituent, DonorRecord, MatchWeights, NewConstituent};

/// Read-only, paginated listing of CRM constituents
///
/// Implementations return candidates ordered by descending identifier.
/// An empty page signals the end of the data.
#[async_trait]
pub trait ConstituentDirectory: Send + Sync {
    type Error: std::fmt::Display + Send;

    async fn list_constituents(
        &self,
        skip: usize,
        take: usize,
    ) -> Result<Vec<CandidateConstituent>, Self::Error>;
}

/// Bounds of a directory scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits {
    pub page_size: usize,
    pub max_pages: usize,
}

impl Default for ScanLimits {
    fn default() -> Self {
        Self {
            page_size: 50,
            max_pages: 10,
        }
    }
}

/// Candidate accepted as the donor's existing constituent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstituentMatch {
    pub id: i64,
    pub full_name: String,
    pub score: MatchScore,
}

/// What the caller should do with the donor
#[derive(Debug, Clone, PartialEq)]
pub enum MatchDecision {
    Existing(ConstituentMatch),
    CreateNew(NewConstituent),
}

/// Constituent deduplication matcher
///
/// Scans the directory page by page and accepts the first candidate whose
/// score reaches the threshold. The scan ends early on an empty page, on a
/// failed page fetch, or once a candidate is accepted. Nothing is cached
/// between calls.
#[derive(Debug, Clone, Default)]
pub struct ConstituentMatcher {
    weights: MatchWeights,
    limits: ScanLimits,
}

impl ConstituentMatcher {
    pub fn new(weights: MatchWeights, limits: ScanLimits) -> Self {
        Self { weights, limits }
    }

    /// Resolve a donor to an existing constituent or a create instruction
    pub async fn resolve<D>(&self, donor: &DonorRecord, directory: &D) -> MatchDecision
    where
        D: ConstituentDirectory + ?Sized,
    {
        match self.find_existing(donor, directory).await {
            Some(found) => {
                tracing::info!(
                    "Found existing constituent: {} ({})",
                    found.id,
                    found.full_name
                );
                MatchDecision::Existing(found)
            }
            None => {
                tracing::info!(
                    "No matching constituent found for {}, creating new...",
                    donor.email
                );
                MatchDecision::CreateNew(NewConstituent::from_donor(donor))
            }
        }
    }

    /// Scan the directory for the first accepted candidate
    pub async fn find_existing<D>(
        &self,
        donor: &DonorRecord,
        directory: &D,
    ) -> Option<ConstituentMatch>
    where
        D: ConstituentDirectory + ?Sized,
    {
        let normalized = NormalizedDonor::from(donor);
        let mut scanned = 0usize;

        for page in 0..self.limits.max_pages {
            let skip = page * self.limits.page_size;

            let candidates = match directory
                .list_constituents(skip, self.limits.page_size)
                .await
            {
                Ok(candidates) => candidates,
                Err(e) => {
                    tracing::warn!("Search page {} failed: {}", page, e);
                    break;
                }
            };

            if candidates.is_empty() {
                break;
            }

            scanned += candidates.len();

            for candidate in candidates {
                let score = score_candidate(&normalized, &candidate, &self.weights);
                if score.is_accepted(&self.weights) {
                    tracing::info!(
                        "Match found (score: {}, matched: {}): {}",
                        score.score,
                        score.describe(),
                        candidate.display_name()
                    );
                    return Some(ConstituentMatch {
                        id: candidate.id,
                        full_name: candidate.display_name().to_string(),
                        score,
                    });
                }
            }
        }

        tracing::debug!("Scanned {} candidates without a match", scanned);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrimaryEmail;
    use std::sync::Mutex;

    /// Directory serving fixed pages and recording every requested offset
    struct PagedDirectory {
        pages: Vec<Result<Vec<CandidateConstituent>, String>>,
        requested: Mutex<Vec<(usize, usize)>>,
    }

    impl PagedDirectory {
        fn new(pages: Vec<Result<Vec<CandidateConstituent>, String>>) -> Self {
            Self {
                pages,
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<(usize, usize)> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ConstituentDirectory for PagedDirectory {
        type Error = String;

        async fn list_constituents(
            &self,
            skip: usize,
            take: usize,
        ) -> Result<Vec<CandidateConstituent>, String> {
            self.requested.lock().unwrap().push((skip, take));
            self.pages
                .get(skip / take)
                .cloned()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn donor() -> DonorRecord {
        DonorRecord {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "(305) 555-1234".to_string(),
            address: "1 Ocean Dr".to_string(),
            donation_type: "merchandise".to_string(),
            merchandise_items: vec!["Books".to_string()],
            donation_date: "2024-01-15".to_string(),
            location: "Main Office".to_string(),
        }
    }

    fn stranger(id: i64) -> CandidateConstituent {
        CandidateConstituent {
            id,
            full_name: Some(format!("Stranger {}", id)),
            first_name: Some("Stranger".to_string()),
            last_name: Some(id.to_string()),
            ..Default::default()
        }
    }

    fn page_of_strangers(start: i64) -> Vec<CandidateConstituent> {
        (start..start + 50).map(stranger).collect()
    }

    fn with_email(id: i64, email: &str) -> CandidateConstituent {
        CandidateConstituent {
            primary_email: Some(PrimaryEmail {
                value: Some(email.to_string()),
            }),
            ..stranger(id)
        }
    }

    #[tokio::test]
    async fn test_stops_at_first_accepted_candidate() {
        let mut second_page = page_of_strangers(100);
        second_page[3] = with_email(42, "JANE@example.com");
        second_page[4] = with_email(43, "jane@example.com");
        let directory = PagedDirectory::new(vec![
            Ok(page_of_strangers(0)),
            Ok(second_page),
            Ok(page_of_strangers(200)),
        ]);

        let decision = ConstituentMatcher::default().resolve(&donor(), &directory).await;

        match decision {
            MatchDecision::Existing(found) => assert_eq!(found.id, 42),
            other => panic!("expected existing match, got {:?}", other),
        }
        assert_eq!(directory.requested(), vec![(0, 50), (50, 50)]);
    }

    #[tokio::test]
    async fn test_empty_page_ends_scan() {
        let directory = PagedDirectory::new(vec![Ok(page_of_strangers(0)), Ok(vec![])]);

        let decision = ConstituentMatcher::default().resolve(&donor(), &directory).await;

        assert!(matches!(decision, MatchDecision::CreateNew(_)));
        assert_eq!(directory.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_never_scans_past_max_pages() {
        let pages = (0..12).map(|p| Ok(page_of_strangers(p * 50))).collect();
        let directory = PagedDirectory::new(pages);

        let decision = ConstituentMatcher::default().resolve(&donor(), &directory).await;

        assert!(matches!(decision, MatchDecision::CreateNew(_)));
        let requested = directory.requested();
        assert_eq!(requested.len(), 10);
        assert_eq!(requested.last(), Some(&(450, 50)));
    }

    #[tokio::test]
    async fn test_failed_page_falls_through_to_create() {
        let directory = PagedDirectory::new(vec![
            Ok(page_of_strangers(0)),
            Err("status 500".to_string()),
            Ok(vec![with_email(9, "jane@example.com")]),
        ]);

        let decision = ConstituentMatcher::default().resolve(&donor(), &directory).await;

        match decision {
            MatchDecision::CreateNew(payload) => {
                assert_eq!(payload.first_name, "Jane");
                assert_eq!(payload.primary_email.value, "jane@example.com");
            }
            other => panic!("expected create instruction, got {:?}", other),
        }
        assert_eq!(directory.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_phone_match_with_different_name_creates_new() {
        let candidate = CandidateConstituent {
            id: 5,
            first_name: Some("John".to_string()),
            last_name: Some("Doe".to_string()),
            phone_number: Some("305-555-1234".to_string()),
            ..Default::default()
        };
        let directory = PagedDirectory::new(vec![Ok(vec![candidate])]);

        let decision = ConstituentMatcher::default().resolve(&donor(), &directory).await;

        assert!(matches!(decision, MatchDecision::CreateNew(_)));
    }

    #[tokio::test]
    async fn test_email_match_resolves_existing() {
        let directory = PagedDirectory::new(vec![Ok(vec![with_email(77, "jane@example.com")])]);

        let decision = ConstituentMatcher::default().resolve(&donor(), &directory).await;

        match decision {
            MatchDecision::Existing(found) => {
                assert_eq!(found.id, 77);
                assert_eq!(found.score.score, 100);
            }
            other => panic!("expected existing constituent, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_custom_limits_are_respected() {
        let pages = (0..5).map(|p| Ok(page_of_strangers(p * 50))).collect();
        let directory = PagedDirectory::new(pages);
        let matcher = ConstituentMatcher::new(
            MatchWeights::default(),
            ScanLimits {
                page_size: 50,
                max_pages: 2,
            },
        );

        matcher.resolve(&donor(), &directory).await;

        assert_eq!(directory.requested(), vec![(0, 50), (50, 50)]);
    }
}
