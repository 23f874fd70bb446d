use chrono::NaiveDate;

use crate::models::DonorRecord;

/// Thank-you email sent with every receipt unless a custom template was saved
pub const DEFAULT_EMAIL_TEMPLATE: &str = "Dear {firstName} {lastName},

On behalf of the 6,000 people we serve, we would like to thank you for your donation. Your continued support makes a significant impact to people with disabilities and other barriers in Miami-Dade, Broward and Monroe Counties.

With each donation, 28 million pounds of reusable items are kept out of landfills and are used to fill our store shelves. When these items are purchased at our 35 Goodwill stores, the money is used to help fund our training, employment and job placement programs.

Because of loyal supporters like you, we can make a lasting impact on the environment, in our community and in the lives of people with disabilities and other barriers.

Donation Details:
- Type: {donationType}
- Date: {donationDate}
- Location: {location}

Please find your donation receipt attached to this email for your records.

Thank You!

Your friends at Goodwill South Florida";

/// Fill the template placeholders with donor fields
pub fn render_email_body(template: &str, donor: &DonorRecord) -> String {
    template
        .replace("{firstName}", &donor.first_name)
        .replace("{lastName}", &donor.last_name)
        .replace("{donationType}", &capitalize(&donor.donation_type))
        .replace("{donationDate}", &format_date(&donor.donation_date, "%B %d, %Y"))
        .replace("{location}", &donor.location)
}

/// Upper-case the first character and lower-case the rest
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => {
            let rest = chars.as_str().to_lowercase();
            first.to_uppercase().chain(rest.chars()).collect()
        }
        None => String::new(),
    }
}

/// Reformat a `YYYY-MM-DD` date, returning the raw value when it does not parse
pub fn format_date(raw: &str, format: &str) -> String {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.format(format).to_string(),
        Err(_) => raw.to_string(),
    }
}
