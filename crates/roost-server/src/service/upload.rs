//! Presigned image uploads
//!
//! Clients upload listing photos straight to S3. The server only checks the
//! content type, picks the object key and signs a short-lived PUT URL.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{Client as S3Client, config::Region, presigning::PresigningConfig};
use serde::Serialize;

use roost_common::{RoostError, sanitize_file_name};

use crate::model::Configuration;

pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Signs PUT URLs for an object store
#[async_trait]
pub trait UploadSigner: Send + Sync {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> anyhow::Result<String>;
}

pub struct S3UploadSigner {
    client: S3Client,
    bucket: String,
}

impl S3UploadSigner {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Credentials come from the default AWS provider chain
    pub async fn from_configuration(configuration: &Configuration) -> Self {
        let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let region = Region::new(configuration.s3_region());
        let config = aws_sdk_s3::config::Builder::from(&config)
            .region(region)
            .build();

        Self::new(S3Client::from_conf(config), configuration.s3_bucket())
    }
}

#[async_trait]
impl UploadSigner for S3UploadSigner {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> anyhow::Result<String> {
        let presigning = PresigningConfig::expires_in(expires_in)?;
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to presign upload: {}", e))?;

        Ok(request.uri().to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    pub upload_url: String,
    pub key: String,
    pub public_url: String,
}

/// `<prefix>/<user id>/<uuid>-<sanitized file name>`
pub fn object_key(prefix: &str, user_id: &str, file_name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let name = format!("{}-{}", uuid::Uuid::new_v4(), sanitize_file_name(file_name));

    if prefix.is_empty() {
        format!("{}/{}", user_id, name)
    } else {
        format!("{}/{}/{}", prefix, user_id, name)
    }
}

pub async fn presign_image_upload(
    signer: &dyn UploadSigner,
    configuration: &Configuration,
    user_id: &str,
    file_name: &str,
    file_type: &str,
) -> anyhow::Result<PresignedUpload> {
    let content_type = file_type.trim().to_lowercase();
    if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
        return Err(RoostError::bad_request(format!(
            "unsupported file type: {}",
            file_type
        ))
        .into());
    }

    let key = object_key(&configuration.s3_prefix(), user_id, file_name);
    let expires_in = Duration::from_secs(configuration.s3_expire_seconds());

    let upload_url = signer.presign_put(&key, &content_type, expires_in).await?;
    let public_url = format!(
        "{}/{}",
        configuration.s3_public_base_url().trim_end_matches('/'),
        key
    );

    tracing::debug!(user_id, key = %key, "Presigned upload issued");

    Ok(PresignedUpload {
        upload_url,
        key,
        public_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Config;

    struct FixedSigner;

    #[async_trait]
    impl UploadSigner for FixedSigner {
        async fn presign_put(
            &self,
            key: &str,
            _content_type: &str,
            expires_in: Duration,
        ) -> anyhow::Result<String> {
            Ok(format!("https://signed.test/{}?ttl={}", key, expires_in.as_secs()))
        }
    }

    fn configuration() -> Configuration {
        let config = Config::builder()
            .set_override("roost.s3.bucket", "photos")
            .unwrap()
            .set_override("roost.s3.publicBaseUrl", "https://cdn.test/")
            .unwrap()
            .build()
            .unwrap();
        Configuration::from_config(config)
    }

    #[test]
    fn test_object_key_layout() {
        let key = object_key("/uploads/", "u1", "My Photo.JPG");
        assert!(key.starts_with("uploads/u1/"));
        assert!(key.ends_with(&format!("-{}", sanitize_file_name("My Photo.JPG"))));

        assert!(object_key("", "u1", "a.png").starts_with("u1/"));
    }

    #[tokio::test]
    async fn test_presign_image_upload() {
        let upload = presign_image_upload(&FixedSigner, &configuration(), "u1", "a.png", "IMAGE/PNG")
            .await
            .unwrap();

        assert!(upload.key.starts_with("uploads/u1/"));
        assert_eq!(upload.public_url, format!("https://cdn.test/{}", upload.key));
        assert!(upload.upload_url.ends_with("?ttl=300"));
    }

    #[tokio::test]
    async fn test_rejects_non_image() {
        let err = presign_image_upload(&FixedSigner, &configuration(), "u1", "a.pdf", "application/pdf")
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<RoostError>().unwrap().status_code(), 400);
    }
}
