use reqwest::{
    blocking::{Client, Response},
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
};
use url::Url;

use crate::{
    config::VisionConfig,
    error::{check_status, ServiceError},
    locate::LocatedImage,
    retry::RetryPolicy,
    statics::USER_AGENT,
    utils::join_url,
};

pub use analysis::*;

mod analysis;

const SERVICE: &str = "vision";

pub struct VisionClient {
    client: Client,
    analyze_url: Url,
    retry: RetryPolicy,
}

impl VisionClient {
    pub fn new(config: &VisionConfig, timeout_secs: u64, retry: RetryPolicy) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(&config.subscription_key)?;
        key.set_sensitive(true);
        headers.insert("Ocp-Apim-Subscription-Key", key);

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            analyze_url: Self::analyze_url(config)?,
            retry,
        })
    }

    fn analyze_url(config: &VisionConfig) -> anyhow::Result<Url> {
        let base = join_url(
            &config.endpoint,
            &format!("vision/{}/analyze", config.api_version),
        );
        let mut url = Url::parse(&base)?;
        url.query_pairs_mut()
            .append_pair("visualFeatures", &config.features.join(","));
        Ok(url)
    }

    fn post_image(&self, image: &LocatedImage) -> Result<Response, ServiceError> {
        let response = self
            .client
            .post(self.analyze_url.clone())
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(image.bytes.clone())
            .send()
            .map_err(|e| ServiceError::http(SERVICE, e))?;
        check_status(SERVICE, response)
    }

    pub fn analyze(&self, image: &LocatedImage) -> anyhow::Result<Analysis> {
        self.analyze_raw(image).map(|(analysis, _)| analysis)
    }

    /// Like [`Self::analyze`], also returning the response body exactly as received
    pub fn analyze_raw(&self, image: &LocatedImage) -> anyhow::Result<(Analysis, String)> {
        let response = self.retry.run("analyze image", || self.post_image(image))?;
        let text = response
            .text()
            .map_err(|e| ServiceError::http(SERVICE, e))?;
        tracing::debug!("analysis response: {text}");

        let analysis: Analysis = serde_json::from_str(&text)?;
        tracing::info!(
            "analysis {} objects: {:?}",
            analysis.request_id.as_deref().unwrap_or("-"),
            analysis.object_names()
        );
        Ok((analysis, text))
    }
}
