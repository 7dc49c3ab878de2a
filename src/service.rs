//! Access to the two operations of the optimization service.
//!
//! `OptimizeService` is the seam between the client logic and the wire: the
//! submission controller and catalog loader are generic over it, so tests
//! run against in-memory implementations while the binary uses
//! `HttpOptimizeService` on reqwest.

use reqwest::multipart;

use crate::config::{ServiceConfig, user_agent};
use crate::model::{ClientError, ContainerCatalog, OptimizeResponse};
use crate::snapshot::UploadSnapshot;

/// Guided remediation for the one recognized upload failure class: the
/// source file was rewritten while the request body was being sent.
pub const FILE_CHANGED_HINT: &str = "Upload failed because the file changed during upload. This is \
     often caused by a spreadsheet editor or file-sync client rewriting \
     the file. Fix: save the file under a NEW filename, close the editor, \
     then re-select and resubmit.";

/// Options of one optimization submission. Constructed fresh per submission.
///
/// # Fields
/// * `container_code` - Container type to pack into (ignored by the service
///   when `compare_all` is set, but always transmitted)
/// * `compare_all` - Evaluate every known container type and rank them
/// * `margin_mm` - Safety margin added around every item, in millimeters
#[derive(Clone, Debug)]
pub struct SubmitOptions {
    pub container_code: String,
    pub compare_all: bool,
    pub margin_mm: u32,
}

/// The two service operations the client consumes.
pub trait OptimizeService {
    /// Fetches the container catalog. Issued once at startup.
    async fn fetch_containers(&self) -> Result<ContainerCatalog, ClientError>;

    /// Submits the snapshot bytes for optimization and returns the parsed
    /// discriminated response.
    async fn optimize(
        &self,
        snapshot: &UploadSnapshot,
        options: &SubmitOptions,
    ) -> Result<OptimizeResponse, ClientError>;
}

/// HTTP implementation of `OptimizeService`.
pub struct HttpOptimizeService {
    http: reqwest::Client,
    config: ServiceConfig,
}

impl HttpOptimizeService {
    /// Builds the HTTP client with the configured timeout and user agent.
    pub fn new(config: ServiceConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(user_agent())
            .build()
            .map_err(|err| ClientError::ServiceUnreachable {
                service_url: config.base_url().to_string(),
                detail: err.to_string(),
            })?;
        Ok(Self { http, config })
    }

    fn unreachable(&self, detail: impl Into<String>) -> ClientError {
        ClientError::ServiceUnreachable {
            service_url: self.config.base_url().to_string(),
            detail: detail.into(),
        }
    }
}

impl OptimizeService for HttpOptimizeService {
    async fn fetch_containers(&self) -> Result<ContainerCatalog, ClientError> {
        let response = self
            .http
            .get(self.config.containers_endpoint())
            .send()
            .await
            .map_err(|err| self.unreachable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.unreachable(format!("HTTP {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|err| self.unreachable(err.to_string()))?;

        serde_json::from_str::<ContainerCatalog>(&body).map_err(|err| {
            ClientError::MalformedCatalog {
                service_url: self.config.base_url().to_string(),
                detail: err.to_string(),
            }
        })
    }

    async fn optimize(
        &self,
        snapshot: &UploadSnapshot,
        options: &SubmitOptions,
    ) -> Result<OptimizeResponse, ClientError> {
        // The snapshot, not the live file, is the source of truth for the
        // payload: bytes, original name, and declared media type.
        let part = multipart::Part::bytes(snapshot.bytes().to_vec())
            .file_name(snapshot.name().to_string())
            .mime_str(snapshot.media_type())
            .map_err(|err| ClientError::Service(err.to_string()))?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.config.optimize_endpoint())
            .query(&optimize_query(options))
            .multipart(form)
            .send()
            .await
            .map_err(map_upload_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail = if detail.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                detail
            };
            return Err(ClientError::Service(detail));
        }

        let body = response
            .text()
            .await
            .map_err(|err| ClientError::Service(err.to_string()))?;

        serde_json::from_str::<OptimizeResponse>(&body)
            .map_err(|err| ClientError::MalformedResponse(err.to_string()))
    }
}

fn optimize_query(options: &SubmitOptions) -> [(&'static str, String); 3] {
    [
        ("container_code", options.container_code.clone()),
        ("margin_mm", options.margin_mm.to_string()),
        ("compare_all", options.compare_all.to_string()),
    ]
}

/// Maps a transport error of the optimize exchange.
///
/// A request-body failure mid-send is the environment's signal for the
/// source file being rewritten during upload (the browser equivalent is
/// `ERR_UPLOAD_FILE_CHANGED`); it gets the guided remediation message. All
/// other transport errors surface verbatim.
fn map_upload_error(err: reqwest::Error) -> ClientError {
    if err.is_body() {
        ClientError::Service(FILE_CHANGED_HINT.to_string())
    } else {
        ClientError::Service(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimize_query_encodes_all_parameters() {
        let options = SubmitOptions {
            container_code: "40HC".to_string(),
            compare_all: true,
            margin_mm: 15,
        };
        let query = optimize_query(&options);
        assert_eq!(query[0], ("container_code", "40HC".to_string()));
        assert_eq!(query[1], ("margin_mm", "15".to_string()));
        assert_eq!(query[2], ("compare_all", "true".to_string()));
    }

    #[test]
    fn file_changed_hint_names_the_remediation() {
        assert!(FILE_CHANGED_HINT.contains("NEW filename"));
        assert!(FILE_CHANGED_HINT.contains("re-select"));
    }
}
