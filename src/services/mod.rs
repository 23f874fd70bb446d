// Service exports
pub mod bloomerang;
pub mod crm;
pub mod graph;
pub mod intake;
pub mod mailer;
pub mod receipt;
pub mod records;
pub mod site;
pub mod smtp;

pub use bloomerang::{BloomerangClient, BloomerangError};
pub use crm::{CrmCheckError, CrmSync};
pub use graph::GraphMailer;
pub use intake::DonationIntake;
pub use mailer::{build_mailer, MailAttachment, MailError, Mailer, OutgoingEmail};
pub use receipt::{ReceiptError, ReceiptRenderer};
pub use records::{RecordError, RecordStore};
pub use site::{SiteError, SiteStore};
pub use smtp::SmtpMailer;
