use reqwest::Client;
use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};
use async_trait::async_trait;

/// Reply used when the service returns neither a disease nor a message.
pub const FALLBACK_REPLY: &str = "I'm analyzing your symptoms. Could you provide more details?";

/// Reply rendered on any transport or decode failure.
pub const ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Serialize)]
struct PredictRequest<'a> {
    symptoms: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Prediction {
    pub disease: Option<String>,
    pub treatment: Option<String>,
    pub severity: Option<String>,
    pub message: Option<String>,
}

/// Transport seam for the prediction service. The production impl talks
/// HTTP; tests substitute a stub.
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(&self, symptoms: &str) -> Result<Prediction>;
}

#[derive(Clone)]
pub struct PredictClient {
    client: Client,
    base_url: String,
}

impl PredictClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Predictor for PredictClient {
    async fn predict(&self, symptoms: &str) -> Result<Prediction> {
        let url = format!("{}/predict", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&PredictRequest { symptoms })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "prediction request failed with status: {}",
                response.status()
            ));
        }

        let prediction: Prediction = response.json().await?;
        Ok(prediction)
    }
}

/// Build the assistant's reply text from a prediction.
///
/// A critical severity redirects to the doctors section and suppresses
/// the medicines suggestion; the two closings are mutually exclusive.
pub fn format_reply(prediction: &Prediction) -> String {
    let Some(disease) = prediction.disease.as_deref() else {
        return prediction
            .message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(FALLBACK_REPLY)
            .to_string();
    };

    let mut reply = format!("Based on your symptoms, you might have **{}**.\n\n", disease);

    if let Some(treatment) = prediction.treatment.as_deref() {
        reply.push_str(&format!("**Recommended Treatment:**\n{}\n\n", treatment));
    }

    if prediction.severity.as_deref() == Some("critical") {
        reply.push_str(
            "⚠️ **Critical Condition Detected!**\nPlease consult a doctor immediately. \
             Check the \"Find Doctors\" section for specialists near you.",
        );
    } else {
        reply.push_str(
            "💊 You can also check the \"Medicines\" section for recommended medications.",
        );
    }

    reply
}
