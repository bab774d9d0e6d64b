use anyhow::Context;
use aws_sdk_s3::primitives::ByteStream;
use axum::body::Bytes;
use chrono::Utc;

/// Client for the image bucket. Keys are derived from the upload time and
/// the original filename; two uploads of the same filename within the same
/// millisecond may overwrite one another. That collision risk is accepted,
/// not mitigated.
#[derive(Clone, Debug)]
pub struct ImageStore {
    s3: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl ImageStore {
    pub fn new(
        s3: aws_sdk_s3::Client,
        bucket: String,
        public_base_url: String,
    ) -> Self {
        Self {
            s3,
            bucket,
            public_base_url,
        }
    }

    /// Writes the bytes to the bucket and returns the public URL.
    pub async fn upload(
        &self,
        file_name: &str,
        content_type: Option<&str>,
        bytes: Bytes,
    ) -> anyhow::Result<String> {
        let key = object_key(Utc::now().timestamp_millis(), file_name);

        let mut request = self
            .s3
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .cache_control("max-age=3600")
            .body(ByteStream::from(bytes));

        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }

        request.send().await.context("failed to put object")?;

        Ok(format!("{}/{}", self.public_base_url, key))
    }
}

pub(crate) fn object_key(unix_millis: i64, file_name: &str) -> String {
    format!("{}_{}", unix_millis, file_name)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_object_key_joins_time_and_filename() {
        // Act
        let key = object_key(1_725_000_000_000, "campus.jpg");

        // Assert
        assert_eq!(key, "1725000000000_campus.jpg");
    }
}
