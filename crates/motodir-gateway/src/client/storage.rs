//! Blob uploads through the storage service.

use super::SupabaseGateway;
use crate::error::GatewayError;

impl SupabaseGateway {
    /// Public address of an object in a public bucket.
    #[must_use]
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        let segments = ["storage", "v1", "object", "public", bucket]
            .into_iter()
            .chain(path.split('/').filter(|s| !s.is_empty()));
        self.endpoint(segments).to_string()
    }

    pub(super) async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, GatewayError> {
        let segments = ["storage", "v1", "object", bucket]
            .into_iter()
            .chain(path.split('/').filter(|s| !s.is_empty()));
        let url = self.endpoint(segments);
        let size = bytes.len();

        let request = self
            .authorize(self.client.post(url))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        self.send_json(request, &format!("storage/{bucket}")).await?;

        tracing::debug!(bucket, path, size, "uploaded object");
        Ok(self.public_url(bucket, path))
    }
}
