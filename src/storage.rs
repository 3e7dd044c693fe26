use chrono::{DateTime, Utc};
use reqwest::{blocking::Client, header::CONTENT_TYPE};
use url::Url;

use crate::{
    config::BlobConfig,
    error::{check_status, ServiceError},
    locate::LocatedImage,
    retry::RetryPolicy,
    statics::content_type,
    utils::http_client,
};

const SERVICE: &str = "blob";

/// Archives images into an Azure blob storage container, authorised by a SAS token.
pub struct BlobClient {
    client: Client,
    account_url: String,
    container: String,
    sas_token: String,
    retry: RetryPolicy,
}

impl BlobClient {
    pub fn new(config: &BlobConfig, timeout_secs: u64, retry: RetryPolicy) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            account_url: config.account_url.clone(),
            container: config.container.clone(),
            sas_token: config.sas_token.trim_start_matches('?').to_string(),
            retry,
        })
    }

    pub fn blob_name(image: &LocatedImage, now: DateTime<Utc>) -> String {
        format!("{}/{}", now.format("%Y/%m/%d"), image.file_name())
    }

    /// Url of the blob, without the SAS token
    fn blob_url(&self, blob_name: &str) -> anyhow::Result<Url> {
        let mut url = Url::parse(&self.account_url)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| anyhow::anyhow!("{} cannot be a base url", self.account_url))?;
            segments.pop_if_empty().push(&self.container);
            for part in blob_name.split('/') {
                segments.push(part);
            }
        }
        Ok(url)
    }

    pub fn upload(&self, image: &LocatedImage) -> anyhow::Result<String> {
        let name = Self::blob_name(image, Utc::now());
        let url = self.blob_url(&name)?;
        let mut signed = url.clone();
        signed.set_query(Some(&self.sas_token));

        let mime = content_type(&image.extension());
        self.retry.run("upload blob", || {
            let response = self
                .client
                .put(signed.clone())
                .header("x-ms-blob-type", "BlockBlob")
                .header(CONTENT_TYPE, mime)
                .body(image.bytes.clone())
                .send()
                .map_err(|e| ServiceError::http(SERVICE, e))?;
            check_status(SERVICE, response)
        })?;

        tracing::info!("Archived {:?} to {url}", image.path);
        Ok(url.to_string())
    }
}
