//! Scoring API Probe
//!
//! Exercises a running scoring service end to end: health, model info,
//! single predictions against known-legitimate and known-suspicious
//! samples, batch scoring, and error handling.

use std::time::Instant;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::{error, info};

fn legitimate_transaction() -> Value {
    json!({
        "amount": 45.50,
        "transaction_hour": 14,
        "merchant_category": "Grocery",
        "foreign_transaction": 0,
        "location_mismatch": 0,
        "device_trust_score": 85,
        "velocity_last_24h": 2,
        "cardholder_age": 35
    })
}

fn suspicious_transaction() -> Value {
    json!({
        "amount": 1500.00,
        "transaction_hour": 3,
        "merchant_category": "Electronics",
        "foreign_transaction": 1,
        "location_mismatch": 1,
        "device_trust_score": 25,
        "velocity_last_24h": 8,
        "cardholder_age": 22
    })
}

struct Probe {
    client: reqwest::Client,
    base_url: String,
    passed: u32,
    failed: u32,
}

impl Probe {
    fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            passed: 0,
            failed: 0,
        }
    }

    fn record(&mut self, ok: bool, name: &str) {
        if ok {
            self.passed += 1;
            info!("PASS: {}", name);
        } else {
            self.failed += 1;
            error!("FAIL: {}", name);
        }
    }

    async fn check_health(&mut self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .context("Health request failed")?;

        let status = response.status();
        let body: Value = response.json().await?;

        info!(
            status = %body["status"],
            model_loaded = %body["model_loaded"],
            "Health response"
        );
        self.record(
            status.as_u16() == 200 && body["status"] == "healthy",
            "health endpoint",
        );
        Ok(())
    }

    async fn check_model_info(&mut self) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/api/model_info", self.base_url))
            .send()
            .await
            .context("Model info request failed")?;

        let status = response.status();
        let body: Value = response.json().await?;

        if status.as_u16() == 200 {
            info!(
                model_type = %body["model_type"],
                features = body["features"].as_array().map(|f| f.len()).unwrap_or(0),
                version = %body["version"],
                "Model info"
            );
        } else {
            error!(error = %body["error"], "Model info unavailable");
        }

        self.record(
            status.as_u16() == 200
                && body["features"].as_array().map(|f| f.len()) == Some(8)
                && body["status"] == "active",
            "model info endpoint",
        );
        Ok(())
    }

    async fn check_prediction(
        &mut self,
        name: &str,
        payload: Value,
        expected_fraud: u64,
        expected_tier: &str,
    ) -> Result<()> {
        let started = Instant::now();
        let response = self
            .client
            .post(format!("{}/api/predict", self.base_url))
            .json(&payload)
            .send()
            .await
            .context("Predict request failed")?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let status = response.status();
        let body: Value = response.json().await?;

        if status.as_u16() != 200 {
            error!(error = %body["error"], "Prediction rejected");
            self.record(false, name);
            return Ok(());
        }

        info!(
            is_fraud = %body["is_fraud"],
            probability = %body["fraud_probability"],
            risk_level = %body["risk_level"],
            confidence = %body["confidence"],
            response_ms = format!("{:.2}", elapsed_ms),
            "Prediction"
        );

        self.record(
            body["is_fraud"] == expected_fraud && body["risk_level"] == expected_tier,
            name,
        );
        Ok(())
    }

    async fn check_batch(&mut self) -> Result<()> {
        let mut legit = legitimate_transaction();
        legit["transaction_id"] = json!("T001");
        let mut suspicious = suspicious_transaction();
        suspicious["transaction_id"] = json!("T002");
        let third = json!({
            "transaction_id": "T003",
            "amount": 75.00,
            "transaction_hour": 10,
            "merchant_category": "Food",
            "foreign_transaction": 0,
            "location_mismatch": 0,
            "device_trust_score": 90,
            "velocity_last_24h": 1,
            "cardholder_age": 45
        });

        let response = self
            .client
            .post(format!("{}/api/batch_predict", self.base_url))
            .json(&json!({ "transactions": [legit, suspicious, third] }))
            .send()
            .await
            .context("Batch request failed")?;

        let status = response.status();
        let body: Value = response.json().await?;

        if status.as_u16() != 200 {
            error!(error = %body["error"], "Batch rejected");
            self.record(false, "batch endpoint");
            return Ok(());
        }

        info!(
            total = %body["total_transactions"],
            fraud_detected = %body["fraud_detected"],
            failed = %body["failed"],
            "Batch summary"
        );
        for row in body["predictions"].as_array().into_iter().flatten() {
            info!(
                transaction_id = %row["transaction_id"],
                is_fraud = %row["is_fraud"],
                risk_level = %row["risk_level"],
                "Batch row"
            );
        }

        let rows = body["predictions"].as_array().map(|p| p.len()).unwrap_or(0);
        self.record(
            body["total_transactions"] == 3 && body["failed"] == 0 && rows == 3,
            "batch endpoint",
        );
        Ok(())
    }

    async fn check_missing_field(&mut self) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/api/predict", self.base_url))
            .json(&json!({ "amount": 100.00 }))
            .send()
            .await
            .context("Invalid-payload request failed")?;

        let status = response.status();
        let body: Value = response.json().await?;

        info!(status = status.as_u16(), error = %body["error"], "Invalid payload response");
        self.record(
            status.as_u16() == 400
                && body["error"]
                    .as_str()
                    .is_some_and(|msg| msg.starts_with("Missing required field:")),
            "missing-field rejection",
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_probe=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let base_url = args
        .get(1)
        .map(|s| s.trim_end_matches('/').to_string())
        .unwrap_or_else(|| "http://localhost:8080".to_string());

    info!(base_url = %base_url, "Starting scoring API probe");

    let mut probe = Probe::new(base_url);

    probe.check_health().await?;
    probe.check_model_info().await?;
    probe
        .check_prediction("legitimate prediction", legitimate_transaction(), 0, "LOW")
        .await?;
    probe
        .check_prediction("suspicious prediction", suspicious_transaction(), 1, "HIGH")
        .await?;
    probe.check_batch().await?;
    probe.check_missing_field().await?;

    info!(
        "Results: {}/{} checks passed",
        probe.passed,
        probe.passed + probe.failed
    );

    if probe.failed > 0 {
        anyhow::bail!("{} checks failed", probe.failed);
    }
    Ok(())
}
