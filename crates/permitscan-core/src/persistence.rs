//! Client for the backend's save-permit endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::acquisition::PermitImage;
use crate::error::PersistenceError;
use crate::models::permit::ExtractedPermitInfo;

/// Body posted to the save-permit endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePermitRequest {
    #[serde(rename = "signup_id")]
    pub signup_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_id_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_tin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_permit_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_issued: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_address: Option<String>,
    /// Line of business chosen by the user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_line: Option<String>,
    /// Recognized text, archived server-side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permit_image_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permit_image_ext: Option<String>,
}

impl SavePermitRequest {
    pub fn new(signup_id: u64, info: &ExtractedPermitInfo) -> Self {
        Self {
            signup_id,
            business_id_no: info.business_id_no.clone(),
            business_tin: info.business_tin.clone(),
            business_permit_no: info.business_permit_no.clone(),
            date_issued: info.date_issued.clone(),
            valid_until: info.valid_until.clone(),
            owner_name: info.owner_name.clone(),
            business_name: info.business_name.clone(),
            business_address: info.address.clone(),
            business_line: None,
            ocr_text: None,
            permit_image_base64: None,
            permit_image_ext: None,
        }
    }

    pub fn with_raw_text(mut self, text: impl Into<String>) -> Self {
        self.ocr_text = Some(text.into());
        self
    }

    /// Attach the permit image for server-side archiving.
    pub fn with_image(mut self, image: &PermitImage) -> Self {
        self.permit_image_base64 = Some(image.base64());
        self.permit_image_ext = Some(image.extension().to_string());
        self
    }

    pub fn with_business_line(mut self, line: impl Into<String>) -> Self {
        self.business_line = Some(line.into());
        self
    }
}

/// Endpoint response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    /// `inserted` or `updated`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_path: Option<String>,
}

impl SaveResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Default::default()
        }
    }
}

/// Somewhere extracted permit data can be saved.
#[async_trait]
pub trait PermitStore: Send + Sync {
    async fn save(&self, request: &SavePermitRequest) -> Result<SaveResponse, PersistenceError>;
}

/// Parse an endpoint body; anything that is not the expected JSON is an error.
pub fn parse_save_response(body: &str) -> Result<SaveResponse, PersistenceError> {
    serde_json::from_str(body).map_err(|e| {
        let snippet: String = body.chars().take(200).collect();
        PersistenceError::InvalidResponse(format!("{} (body: {:?})", e, snippet))
    })
}

#[cfg(feature = "native")]
mod http {
    use reqwest::Client;
    use tracing::{debug, warn};

    use super::*;
    use crate::models::config::PersistenceConfig;

    /// [`PermitStore`] posting JSON over HTTP.
    pub struct HttpPermitStore {
        client: Client,
        url: String,
    }

    impl HttpPermitStore {
        pub fn new(config: &PersistenceConfig) -> Result<Self, PersistenceError> {
            let url = config.url().ok_or(PersistenceError::NotConfigured)?;
            let client = Client::builder().timeout(config.timeout()).build()?;
            Ok(Self { client, url })
        }

        pub fn url(&self) -> &str {
            &self.url
        }
    }

    #[async_trait]
    impl PermitStore for HttpPermitStore {
        async fn save(&self, request: &SavePermitRequest) -> Result<SaveResponse, PersistenceError> {
            if request.signup_id == 0 {
                return Err(PersistenceError::InvalidSignupId(request.signup_id));
            }

            debug!("Saving permit for signup {} to {}", request.signup_id, self.url);
            let response = self.client.post(&self.url).json(request).send().await?;
            let status = response.status();
            let body = response.text().await?;

            let parsed = parse_save_response(&body);
            if let Err(e) = &parsed {
                warn!("Save permit returned {} with unexpected body: {}", status, e);
            }
            parsed
        }
    }
}

#[cfg(feature = "native")]
pub use http::HttpPermitStore;
