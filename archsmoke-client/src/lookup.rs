//! Image lookup client

use archsmoke_core::domain::image::find_image;
use tracing::{debug, info};

use crate::error::{ClientError, Result};
use crate::process::{OutputSink, run_captured};
use crate::CommandSpec;

/// Resolves the image identifier for a release stream and architecture
#[derive(Debug, Clone)]
pub struct ImageLookupClient {
    command: CommandSpec,
}

impl ImageLookupClient {
    pub fn new(command: CommandSpec) -> Self {
        Self { command }
    }

    /// Runs the lookup and picks the line for `stream` and `architecture`
    ///
    /// The lookup output is forwarded to `sink`. A failed lookup command and a
    /// missing line are both errors.
    pub async fn resolve(
        &self,
        stream: &str,
        architecture: &str,
        sink: &mut dyn OutputSink,
    ) -> Result<String> {
        debug!("Looking up {} image for {}", stream, architecture);

        let result = run_captured(&self.command, &[], None, sink).await?;
        if !result.success() {
            return Err(ClientError::non_zero_exit(
                self.command.program.clone(),
                result.exit_code,
            ));
        }

        let image = find_image(&result.output, stream, architecture).ok_or_else(|| {
            ClientError::ImageNotFound {
                stream: stream.to_string(),
                architecture: architecture.to_string(),
            }
        })?;

        info!("Resolved {} image for {}: {}", stream, architecture, image);
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(script: &str) -> ImageLookupClient {
        ImageLookupClient::new(CommandSpec::new("sh").arg("-c").arg(script))
    }

    #[tokio::test]
    async fn test_resolve_image() {
        let client = lookup("echo 'rawhide, x86_64: img-x86'; echo 'rawhide, aarch64: img-arm'");
        let mut sink = Vec::new();
        let image = client.resolve("rawhide", "aarch64", &mut sink).await.unwrap();
        assert_eq!(image, "img-arm");
        assert!(!sink.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_missing_image() {
        let client = lookup("echo 'rawhide, x86_64: img-x86'");
        let mut sink = Vec::new();
        let err = client.resolve("rawhide", "s390x", &mut sink).await.unwrap_err();
        assert!(matches!(err, ClientError::ImageNotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_failed_command() {
        let client = lookup("echo 'rawhide, x86_64: img-x86'; exit 3");
        let mut sink = Vec::new();
        let err = client.resolve("rawhide", "x86_64", &mut sink).await.unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
