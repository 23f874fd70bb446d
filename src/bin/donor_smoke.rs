//! End-to-end smoke check against a running donor intake server
//!
//! ```bash
//! donor-smoke --base-url http://localhost:5000 [--skip-submit] [--check-crm https://api.bloomerang.co]
//! ```

use clap::Parser;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::process::ExitCode;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[clap(name = "donor-smoke")]
#[clap(about = "Smoke-test a running donor intake server")]
struct Args {
    /// Server to test
    #[clap(long, default_value = "http://localhost:5000")]
    base_url: String,

    /// Do not submit the sample donation
    #[clap(long)]
    skip_submit: bool,

    /// Also check that this CRM host is reachable over TLS
    #[clap(long, value_name = "URL")]
    check_crm: Option<String>,
}

type CheckResult = Result<String, String>;

fn sample_donation() -> Value {
    json!({
        "firstName": "John",
        "lastName": "Doe",
        "email": "test@example.com",
        "phone": "(555) 123-4567",
        "address": "123 Test Street, Miami, FL 33101",
        "donationType": "merchandise",
        "merchandiseItems": ["Clothing", "Books"],
        "donationDate": "2024-01-15",
        "location": "Main Office"
    })
}

async fn check_pages(client: &Client, base: &str) -> CheckResult {
    for path in ["/", "/api/health"] {
        let response = client
            .get(format!("{}{}", base, path))
            .send()
            .await
            .map_err(|e| format!("error connecting to {}: {}", path, e))?;
        if response.status() != StatusCode::OK {
            return Err(format!("{} returned status code {}", path, response.status()));
        }
    }
    Ok("server is accessible".to_string())
}

async fn check_submit(client: &Client, base: &str) -> CheckResult {
    let response = client
        .post(format!("{}/api/submit-donation", base))
        .json(&sample_donation())
        .send()
        .await
        .map_err(|e| format!("error submitting donation: {}", e))?;

    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("status code {}: {}", status, body));
    }

    let result: Value = response.json().await.map_err(|e| e.to_string())?;
    if result["success"] != json!(true) {
        return Err(format!("submission failed: {}", result["message"]));
    }

    if result["emailSent"] != json!(true) {
        warn!("Email sending failed (check email configuration)");
    }
    if result["bloomerangSynced"] != json!(true) {
        warn!("Bloomerang not synced: {}", result["bloomerangMessage"]);
    }

    Ok(format!("donation recorded (submission {})", result["submissionId"]))
}

async fn check_csv(client: &Client, base: &str) -> CheckResult {
    let response = client
        .get(format!("{}/api/download-csv", base))
        .send()
        .await
        .map_err(|e| format!("error downloading CSV: {}", e))?;

    match response.status() {
        StatusCode::OK => {
            let bytes = response.bytes().await.map_err(|e| e.to_string())?;
            Ok(format!("CSV size: {} bytes", bytes.len()))
        }
        StatusCode::NOT_FOUND => Ok("no CSV data available yet".to_string()),
        status => Err(format!("CSV download failed with status code {}", status)),
    }
}

async fn check_crm(client: &Client, url: &str) -> CheckResult {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("TLS connection to {} failed: {}", url, e))?;
    Ok(format!("TLS connection successful (status {})", response.status()))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_target(false)
        .without_time()
        .init();

    let args = Args::parse();
    let base = args.base_url.trim_end_matches('/').to_string();
    let client = match Client::builder().build() {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Testing {}", base);

    let mut results: Vec<(&str, CheckResult)> = vec![("Server", check_pages(&client, &base).await)];
    if !args.skip_submit {
        results.push(("Submit donation", check_submit(&client, &base).await));
    }
    results.push(("Download CSV", check_csv(&client, &base).await));
    if let Some(url) = &args.check_crm {
        results.push(("CRM TLS", check_crm(&client, url).await));
    }

    println!("{}", "=".repeat(50));
    println!("Test Summary");
    println!("{}", "=".repeat(50));
    for (name, result) in &results {
        match result {
            Ok(detail) => println!("{}: PASS ({})", name, detail),
            Err(reason) => println!("{}: FAIL ({})", name, reason),
        }
    }

    let passed = results.iter().filter(|(_, r)| r.is_ok()).count();
    println!("{}", "=".repeat(50));
    println!("Results: {}/{} checks passed", passed, results.len());

    if passed == results.len() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
