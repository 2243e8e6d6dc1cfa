//! Google Cloud Vision `images:annotate` adapter.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{PermitImage, RecognizedText, TextRecognizer};
use crate::error::AcquisitionError;
use crate::models::config::AcquisitionConfig;

/// Cloud Vision text recognizer.
pub struct CloudVisionRecognizer {
    client: Client,
    endpoint: String,
    api_key: String,
    feature_type: String,
}

impl CloudVisionRecognizer {
    /// Create a recognizer; fails if no API key is configured or set in the environment.
    pub fn new(config: &AcquisitionConfig) -> Result<Self, AcquisitionError> {
        let api_key = config.resolve_api_key().ok_or(AcquisitionError::MissingApiKey)?;
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            feature_type: config.feature_type.clone(),
        })
    }

    /// Override the endpoint, e.g. to point at a proxy.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request_body(&self, image: &PermitImage) -> AnnotateRequest {
        AnnotateRequest {
            requests: vec![ImageRequest {
                image: ImageContent {
                    content: image.base64(),
                },
                features: vec![Feature {
                    kind: self.feature_type.clone(),
                }],
            }],
        }
    }
}

#[derive(Serialize)]
struct AnnotateRequest {
    requests: Vec<ImageRequest>,
}

#[derive(Serialize)]
struct ImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
    error: Option<Status>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    full_text_annotation: Option<TextAnnotation>,
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

impl From<Status> for AcquisitionError {
    fn from(status: Status) -> Self {
        AcquisitionError::Api {
            code: status.code,
            message: status.message,
        }
    }
}

/// Pull the detected text out of an annotate response.
fn parse_response(response: AnnotateResponse) -> Result<RecognizedText, AcquisitionError> {
    if let Some(status) = response.error {
        return Err(status.into());
    }

    let Some(first) = response.responses.into_iter().next() else {
        return Err(AcquisitionError::NoText);
    };
    if let Some(status) = first.error {
        return Err(status.into());
    }

    let text = first
        .full_text_annotation
        .map(|a| a.text)
        .unwrap_or_default();
    let recognized = RecognizedText::from_text(&text);

    if recognized.is_blank() {
        return Err(AcquisitionError::NoText);
    }
    Ok(recognized)
}

#[async_trait]
impl TextRecognizer for CloudVisionRecognizer {
    async fn recognize(&self, image: &PermitImage) -> Result<RecognizedText, AcquisitionError> {
        debug!(
            "Sending {} byte {} image to {}",
            image.bytes().len(),
            image.extension(),
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.request_body(image))
            .send()
            .await?;

        let status = response.status();
        let body: AnnotateResponse = match response.json().await {
            Ok(body) => body,
            Err(e) if !status.is_success() => {
                warn!("Vision API returned {} with unreadable body: {}", status, e);
                return Err(AcquisitionError::Api {
                    code: i32::from(status.as_u16()),
                    message: status.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let recognized = parse_response(body)?;
        debug!("Vision API returned {} fragments", recognized.fragments().len());
        Ok(recognized)
    }
}
