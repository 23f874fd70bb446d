// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CandidateConstituent, DonorRecord, MatchField, MatchResult, MatchWeights, NewConstituent,
    PrimaryEmail, PrimaryPhone, SubmissionReport,
};
pub use requests::{EmailTemplateRequest, FormTitleRequest, LocationRequest, TestEmailRequest};
pub use responses::{
    CrmTestResponse, EmailTemplateResponse, FormTitleResponse, HealthResponse, LocationsResponse,
    StatusResponse, SubmitDonationResponse,
};
