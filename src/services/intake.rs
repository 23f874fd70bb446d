use chrono::Local;
use std::sync::Arc;

use crate::core::render_email_body;
use crate::models::{DonorRecord, SubmissionReport};
use crate::services::crm::CrmSync;
use crate::services::mailer::{receipt_filename, MailAttachment, Mailer, OutgoingEmail, RECEIPT_SUBJECT};
use crate::services::receipt::ReceiptRenderer;
use crate::services::records::RecordStore;
use crate::services::site::SiteStore;

/// Runs one donation through record keeping, receipt email and CRM sync
///
/// The steps run one after another. A failing step is logged and reported in
/// the [`SubmissionReport`] without stopping the steps that follow it.
#[derive(Clone)]
pub struct DonationIntake {
    records: Arc<RecordStore>,
    receipts: Arc<ReceiptRenderer>,
    mailer: Arc<dyn Mailer>,
    site: Arc<SiteStore>,
    crm: Arc<CrmSync>,
}

impl DonationIntake {
    pub fn new(
        records: Arc<RecordStore>,
        receipts: Arc<ReceiptRenderer>,
        mailer: Arc<dyn Mailer>,
        site: Arc<SiteStore>,
        crm: Arc<CrmSync>,
    ) -> Self {
        Self {
            records,
            receipts,
            mailer,
            site,
            crm,
        }
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    pub fn mailer(&self) -> &Arc<dyn Mailer> {
        &self.mailer
    }

    pub fn site(&self) -> &SiteStore {
        &self.site
    }

    pub fn crm(&self) -> &CrmSync {
        &self.crm
    }

    pub async fn submit(&self, donor: &DonorRecord) -> SubmissionReport {
        tracing::info!(
            "Processing {} donation from {} at {}",
            donor.donation_type,
            donor.full_name(),
            donor.location
        );

        let record_saved = self.save_record(donor).await;
        let email_sent = self.send_receipt(donor).await;
        let crm = self.crm.sync(donor).await;

        tracing::info!(
            "Donation processed: record_saved={}, email_sent={}, crm_synced={} ({})",
            record_saved,
            email_sent,
            crm.synced,
            crm.message
        );

        SubmissionReport {
            record_saved,
            email_sent,
            crm,
        }
    }

    async fn save_record(&self, donor: &DonorRecord) -> bool {
        let records = Arc::clone(&self.records);
        let row = donor.clone();
        let recorded_at = Local::now().naive_local();

        match tokio::task::spawn_blocking(move || records.append(&row, recorded_at)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::error!("Failed to save donor record: {}", e);
                false
            }
            Err(e) => {
                tracing::error!("Donor record task failed: {}", e);
                false
            }
        }
    }

    async fn send_receipt(&self, donor: &DonorRecord) -> bool {
        if donor.email.trim().is_empty() {
            tracing::warn!("No email address for {}, receipt not sent", donor.full_name());
            return false;
        }

        let now = Local::now();
        let pdf = match self.receipts.render(donor, now.naive_local()) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!("Failed to render receipt: {}", e);
                return false;
            }
        };

        let template = self.site.email_template().await;
        let email = OutgoingEmail {
            to: donor.email.trim().to_string(),
            subject: RECEIPT_SUBJECT.to_string(),
            body: render_email_body(&template, donor),
            attachment: Some(MailAttachment::pdf(receipt_filename(now.date_naive()), pdf)),
        };

        match self.mailer.send(email).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to send receipt via {}: {}", self.mailer.mode().label(), e);
                false
            }
        }
    }
}
