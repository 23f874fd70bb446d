use chrono::NaiveDateTime;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use thiserror::Error;

use crate::config::OrganizationSettings;
use crate::core::template::{capitalize, format_date};
use crate::models::DonorRecord;

const PAGE_WIDTH_IN: f32 = 8.5;
const PAGE_HEIGHT_IN: f32 = 11.0;

#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("PDF error: {0}")]
    Pdf(#[from] printpdf::Error),
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

/// Writes text lines top-down in inches from the page's bottom-left corner
struct Cursor<'a> {
    layer: &'a PdfLayerReference,
    y: f32,
}

impl<'a> Cursor<'a> {
    fn line(&mut self, text: &str, size: f32, x: f32, font: &IndirectFontRef, advance: f32) {
        self.layer.use_text(text, size, inches(x), inches(self.y), font);
        self.y -= advance;
    }

    fn skip(&mut self, advance: f32) {
        self.y -= advance;
    }
}

fn inches(value: f32) -> Mm {
    Mm(value * 25.4)
}

/// Renders letter-sized tax receipts for non-cash donations
#[derive(Debug, Clone)]
pub struct ReceiptRenderer {
    organization: OrganizationSettings,
}

impl ReceiptRenderer {
    pub fn new(organization: OrganizationSettings) -> Self {
        Self { organization }
    }

    /// Render the receipt, stamping it with `generated_at`
    pub fn render(
        &self,
        donor: &DonorRecord,
        generated_at: NaiveDateTime,
    ) -> Result<Vec<u8>, ReceiptError> {
        let (doc, page, layer) = PdfDocument::new(
            "Donation Receipt",
            inches(PAGE_WIDTH_IN),
            inches(PAGE_HEIGHT_IN),
            "Receipt",
        );
        let fonts = Fonts {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
            bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
            oblique: doc.add_builtin_font(BuiltinFont::HelveticaOblique)?,
        };
        let layer = doc.get_page(page).get_layer(layer);
        let org = &self.organization;

        let mut cursor = Cursor {
            layer: &layer,
            y: PAGE_HEIGHT_IN - 0.8,
        };

        cursor.line("This is your Tax Receipt", 20.0, 1.0, &fonts.bold, 0.3);
        cursor.line(&org.name, 10.0, 1.0, &fonts.regular, 0.2);
        cursor.line(&org.address, 10.0, 1.0, &fonts.regular, 0.2);
        for line in organization_lines(org) {
            cursor.line(&line, 10.0, 1.0, &fonts.regular, 0.2);
        }
        cursor.skip(0.2);

        let received_on = format_date(&donor.donation_date, "%m/%d/%Y");
        cursor.line(
            &format!("{} acknowledges that a non-cash donation", org.name),
            11.0,
            1.0,
            &fonts.regular,
            0.2,
        );
        cursor.line(&format!("was received on {}.", received_on), 11.0, 1.0, &fonts.regular, 0.3);
        cursor.line(
            &format!("{} is a 501(c)(3) non-profit organization.", org.name),
            11.0,
            1.0,
            &fonts.regular,
            0.2,
        );
        cursor.line(
            "Your donations are tax deductible to the fullest extent of the law.",
            11.0,
            1.0,
            &fonts.regular,
            0.2,
        );
        cursor.line(
            "No goods or services were provided in exchange for this donation.",
            11.0,
            1.0,
            &fonts.regular,
            0.4,
        );

        cursor.line(
            "For your records, below please find your itemized donation(s):",
            11.0,
            1.0,
            &fonts.bold,
            0.3,
        );
        for item in itemized(donor) {
            cursor.line(&format!("- {}", item), 11.0, 1.2, &fonts.regular, 0.2);
        }
        cursor.skip(0.2);

        cursor.line(
            "IRS Regulations prohibit charitable organizations from establishing or affirming",
            10.0,
            1.0,
            &fonts.oblique,
            0.2,
        );
        cursor.line("the value of contributions.", 10.0, 1.0, &fonts.oblique, 0.5);

        cursor.line("Donor Information:", 12.0, 1.0, &fonts.bold, 0.3);
        for line in donor_lines(donor) {
            cursor.line(&line, 10.0, 1.0, &fonts.regular, 0.2);
        }

        // Footer is anchored to the bottom of the page
        let mut footer = Cursor { layer: &layer, y: 1.2 };
        footer.line("Thank you for your generous donation!", 9.0, 1.0, &fonts.oblique, 0.2);
        footer.line(
            "Please consult with a tax professional regarding deductibility.",
            9.0,
            1.0,
            &fonts.oblique,
            0.3,
        );
        footer.line(
            &format!(
                "Receipt Generated: {}",
                generated_at.format("%B %d, %Y at %I:%M %p")
            ),
            8.0,
            1.0,
            &fonts.regular,
            0.0,
        );

        Ok(doc.save_to_bytes()?)
    }
}

/// Items listed on the receipt
pub fn itemized(donor: &DonorRecord) -> Vec<String> {
    if donor.itemizes_merchandise() {
        donor.merchandise_items.clone()
    } else {
        vec![capitalize(&donor.donation_type)]
    }
}

/// Optional contact lines under the organization address
fn organization_lines(org: &OrganizationSettings) -> Vec<String> {
    [("Tax ID", &org.tax_id), ("Phone", &org.phone), ("Email", &org.email)]
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(label, value)| format!("{}: {}", label, value))
        .collect()
}

fn donor_lines(donor: &DonorRecord) -> Vec<String> {
    vec![
        format!("Name: {}", donor.full_name()),
        format!("Email: {}", donor.email),
        format!("Phone: {}", donor.phone),
        format!("Address: {}", donor.address),
        format!("Location: {}", donor.location),
    ]
}
