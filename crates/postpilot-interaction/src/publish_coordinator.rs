//! PublishCoordinator - the LinkedIn side of publishing.
//!
//! Image posts take three calls: register the asset, PUT the bytes to the
//! returned upload URL, then create the UGC post referencing the asset.
//! Text-only posts take the last call alone. Deciding what to do when the
//! upload fails is left to the caller.

use postpilot_core::http::HttpMethod;
use postpilot_core::{PostHandle, PostPilotError, PublishResult, Result};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::linkedin_proxy::{LinkedInProxy, ProxyBody, ProxyTarget};

const REGISTER_UPLOAD_PATH: &str = "/assets?action=registerUpload";
const UGC_POSTS_PATH: &str = "/ugcPosts";
const FEED_IMAGE_RECIPE: &str = "urn:li:digitalmediaRecipe:feedshare-image";
const UPLOAD_MECHANISM: &str = "com.linkedin.digitalmedia.uploading.MediaUploadHttpRequest";

/// Where the bytes go and which asset they become.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub upload_url: String,
    pub asset_urn: String,
}

/// Asset registration payload for a feed image owned by `author_urn`.
pub fn register_upload_payload(author_urn: &str) -> Value {
    json!({
        "registerUploadRequest": {
            "recipes": [FEED_IMAGE_RECIPE],
            "owner": author_urn,
            "serviceRelationships": [{
                "relationshipType": "OWNER",
                "identifier": "urn:li:userGeneratedContent"
            }]
        }
    })
}

/// UGC post payload. `media` is only present when an asset survived.
pub fn ugc_post_payload(author_urn: &str, text: &str, asset_urn: Option<&str>) -> Value {
    let category = if asset_urn.is_some() { "IMAGE" } else { "NONE" };
    let mut share_content = json!({
        "shareCommentary": { "text": text },
        "shareMediaCategory": category,
    });
    if let Some(asset) = asset_urn {
        share_content["media"] = json!([{ "status": "READY", "media": asset }]);
    }

    json!({
        "author": author_urn,
        "lifecycleState": "PUBLISHED",
        "specificContent": {
            "com.linkedin.ugc.ShareContent": share_content
        },
        "visibility": {
            "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"
        }
    })
}

fn parse_upload_target(body: &Value) -> Result<UploadTarget> {
    let value = &body["value"];
    let upload_url = value["uploadMechanism"][UPLOAD_MECHANISM]["uploadUrl"].as_str();
    let asset_urn = value["asset"].as_str();
    match (upload_url, asset_urn) {
        (Some(upload_url), Some(asset_urn)) => Ok(UploadTarget {
            upload_url: upload_url.to_string(),
            asset_urn: asset_urn.to_string(),
        }),
        _ => Err(PostPilotError::Serialization {
            format: "JSON".to_string(),
            message: "registerUpload response is missing value.asset or the upload URL"
                .to_string(),
        }),
    }
}

#[derive(Clone)]
pub struct PublishCoordinator {
    proxy: LinkedInProxy,
    author_urn: String,
}

impl PublishCoordinator {
    pub fn new(proxy: LinkedInProxy, author_urn: impl Into<String>) -> Self {
        Self {
            proxy,
            author_urn: author_urn.into(),
        }
    }

    pub fn author_urn(&self) -> &str {
        &self.author_urn
    }

    /// Declares the upload and returns where to PUT the bytes.
    pub async fn register_upload(&self) -> Result<UploadTarget> {
        let response = self
            .proxy
            .call(
                HttpMethod::Post,
                &ProxyTarget::api(REGISTER_UPLOAD_PATH),
                ProxyBody::Json(register_upload_payload(&self.author_urn)),
            )
            .await?;
        parse_upload_target(&response.json::<Value>()?)
    }

    /// PUTs the raw bytes to the external upload URL. An empty 200/201 is success.
    pub async fn upload_binary(&self, upload_url: &str, payload: &[u8]) -> Result<()> {
        self.proxy
            .call(
                HttpMethod::Put,
                &ProxyTarget::external(upload_url),
                ProxyBody::Binary(payload.to_vec()),
            )
            .await?;
        Ok(())
    }

    /// Registers and uploads the image, returning its asset URN.
    ///
    /// Every failure comes back as [`PostPilotError::UploadFailed`] so the
    /// caller can offer the text-only fallback.
    pub async fn upload_image(&self, payload: &[u8]) -> Result<String> {
        let uploaded = async {
            let target = self.register_upload().await?;
            self.upload_binary(&target.upload_url, payload).await?;
            Ok::<_, PostPilotError>(target.asset_urn)
        }
        .await;

        match uploaded {
            Ok(asset_urn) => {
                info!(%asset_urn, "image registered and uploaded");
                Ok(asset_urn)
            }
            Err(err) => {
                warn!(error = %err, "image upload failed");
                Err(PostPilotError::UploadFailed(err.to_string()))
            }
        }
    }

    /// Creates the post. A missing `Location` header is reported as
    /// [`PostHandle::Unavailable`], not as a failure.
    pub async fn create_post(&self, text: &str, asset_urn: Option<String>) -> Result<PublishResult> {
        let response = self
            .proxy
            .call(
                HttpMethod::Post,
                &ProxyTarget::api(UGC_POSTS_PATH),
                ProxyBody::Json(ugc_post_payload(
                    &self.author_urn,
                    text,
                    asset_urn.as_deref(),
                )),
            )
            .await?;

        let handle = PostHandle::from_header(response.header("location"));
        info!(post = %handle, with_image = asset_urn.is_some(), "post published");
        Ok(PublishResult::published(asset_urn, handle))
    }
}
