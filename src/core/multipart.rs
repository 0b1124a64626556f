// src/core/multipart.rs
//! multipart/form-data body encoder.
//!
//! Parts are framed exactly as
//!
//! ```text
//! --{boundary}\r\n
//! Content-Disposition: form-data; name="{name}"[; filename="{filename}"]\r\n
//! [Content-Type: {content_type}\r\n]
//! \r\n
//! {data}\r\n
//! ```
//!
//! followed by `--{boundary}--\r\n`, in insertion order.

use bytes::{BufMut, Bytes, BytesMut};
use std::path::PathBuf;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::fs_ops::{FsOps, SecurityScope};
use crate::error::ApiError;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Clone)]
pub enum PartData {
    Bytes(Bytes),
    /// Read at encode time, under scoped access.
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Part {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    data: PartData,
}

impl Part {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::bytes(name, Bytes::from(value.into()))
    }

    pub fn bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            content_type: None,
            data: PartData::Bytes(data.into()),
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            content_type: None,
            data: PartData::File(path.into()),
        }
    }

    /// A résumé file part as the backend expects it.
    pub fn resume_pdf(path: impl Into<PathBuf>) -> Self {
        Self::file("file", path)
            .file_name("resume.pdf")
            .content_type(PDF_CONTENT_TYPE)
    }

    pub fn file_name(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Encoded request body together with the boundary it was framed with.
#[derive(Debug, Clone)]
pub struct EncodedForm {
    pub body: Bytes,
    pub boundary: String,
}

impl EncodedForm {
    /// Value for the request's `Content-Type` header.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    parts: Vec<Part>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Encode with a fresh random boundary.
    pub async fn encode(&self, scope: &dyn SecurityScope) -> Result<EncodedForm, ApiError> {
        self.encode_with_boundary(scope, Uuid::new_v4().to_string())
            .await
    }

    pub(crate) async fn encode_with_boundary(
        &self,
        scope: &dyn SecurityScope,
        boundary: String,
    ) -> Result<EncodedForm, ApiError> {
        let mut body = BytesMut::new();

        for part in &self.parts {
            let data = match &part.data {
                PartData::Bytes(bytes) => bytes.clone(),
                PartData::File(path) => {
                    let content = FsOps::read_scoped(scope, path).await.map_err(|e| {
                        warn!("Failed to read {} for part '{}': {}", path.display(), part.name, e);
                        ApiError::encoding("Failed to read file", e)
                    })?;
                    Bytes::from(content)
                }
            };

            body.put_slice(format!("--{}\r\n", boundary).as_bytes());
            let mut disposition =
                format!("Content-Disposition: form-data; name=\"{}\"", escape(&part.name));
            if let Some(filename) = &part.filename {
                disposition.push_str(&format!("; filename=\"{}\"", escape(filename)));
            }
            disposition.push_str("\r\n");
            body.put_slice(disposition.as_bytes());
            if let Some(content_type) = &part.content_type {
                body.put_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
            }
            body.put_slice(b"\r\n");
            body.put_slice(&data);
            body.put_slice(b"\r\n");
        }

        body.put_slice(format!("--{}--\r\n", boundary).as_bytes());

        debug!(
            "Encoded {} multipart parts into {} bytes",
            self.parts.len(),
            body.len()
        );

        Ok(EncodedForm {
            body: body.freeze(),
            boundary,
        })
    }
}

/// Quote-safe header parameter value (HTML form-data escaping).
fn escape(value: &str) -> String {
    value
        .replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fs_ops::tests::CountingScope;
    use crate::core::fs_ops::UnrestrictedScope;

    #[derive(Debug, PartialEq)]
    struct ParsedPart {
        name: String,
        filename: Option<String>,
        content_type: Option<String>,
        data: Vec<u8>,
    }

    async fn parse_multipart(encoded: &EncodedForm) -> Vec<ParsedPart> {
        let body = encoded.body.clone();
        let stream = futures::stream::once(async move { Ok::<Bytes, std::io::Error>(body) });
        let mut multipart = multer::Multipart::new(stream, encoded.boundary.clone());

        let mut parts = Vec::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap().to_string();
            let filename = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(|mime| mime.to_string());
            let data = field.bytes().await.unwrap().to_vec();
            parts.push(ParsedPart {
                name,
                filename,
                content_type,
                data,
            });
        }
        parts
    }

    #[tokio::test]
    async fn test_exact_framing() {
        let form = MultipartForm::new()
            .part(Part::bytes("file", &b"PDF"[..]).file_name("resume.pdf").content_type("application/pdf"))
            .part(Part::text("job_description", "Rust dev"));
        let encoded = form
            .encode_with_boundary(&UnrestrictedScope, "XYZ".to_string())
            .await
            .unwrap();

        let expected = "--XYZ\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"resume.pdf\"\r\n\
            Content-Type: application/pdf\r\n\
            \r\n\
            PDF\r\n\
            --XYZ\r\n\
            Content-Disposition: form-data; name=\"job_description\"\r\n\
            \r\n\
            Rust dev\r\n\
            --XYZ--\r\n";
        assert_eq!(std::str::from_utf8(&encoded.body).unwrap(), expected);
        assert_eq!(encoded.content_type(), "multipart/form-data; boundary=XYZ");
    }

    #[tokio::test]
    async fn test_round_trip_preserves_parts_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let pdf_path = dir.path().join("cv.pdf");
        let pdf_bytes: Vec<u8> = (0u8..=255).chain(b"\r\n--not-a-boundary\r\n".iter().copied()).collect();
        std::fs::write(&pdf_path, &pdf_bytes).unwrap();

        let form = MultipartForm::new()
            .part(Part::resume_pdf(&pdf_path))
            .part(Part::text("job_description", "Line 1\r\nLine 2"))
            .part(Part::bytes("blob", vec![0u8, 1, 2]).content_type("application/octet-stream"));
        let encoded = form.encode(&UnrestrictedScope).await.unwrap();

        // boundary is a UUID string
        assert!(Uuid::parse_str(&encoded.boundary).is_ok());

        let parts = parse_multipart(&encoded).await;
        assert_eq!(
            parts,
            vec![
                ParsedPart {
                    name: "file".to_string(),
                    filename: Some("resume.pdf".to_string()),
                    content_type: Some("application/pdf".to_string()),
                    data: pdf_bytes,
                },
                ParsedPart {
                    name: "job_description".to_string(),
                    filename: None,
                    content_type: None,
                    data: b"Line 1\r\nLine 2".to_vec(),
                },
                ParsedPart {
                    name: "blob".to_string(),
                    filename: None,
                    content_type: Some("application/octet-stream".to_string()),
                    data: vec![0, 1, 2],
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_boundaries_differ_between_encodes() {
        let form = MultipartForm::new().part(Part::text("a", "b"));
        let first = form.encode(&UnrestrictedScope).await.unwrap();
        let second = form.encode(&UnrestrictedScope).await.unwrap();
        assert_ne!(first.boundary, second.boundary);
    }

    #[tokio::test]
    async fn test_unreadable_file_fails_instead_of_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let scope = CountingScope::granting();
        let form = MultipartForm::new()
            .part(Part::text("first", "ok"))
            .part(Part::resume_pdf(dir.path().join("gone.pdf")));

        let err = form.encode(&scope).await.unwrap_err();
        assert!(matches!(err, ApiError::Encoding { .. }));
        assert_eq!(err.to_string(), "Failed to read file");
        assert_eq!(scope.started(), 1);
        assert_eq!(scope.stopped(), 1);
    }

    #[tokio::test]
    async fn test_quoted_file_name_stays_inside_its_parameter() {
        let form = MultipartForm::new()
            .part(Part::bytes("file", &b"PDF"[..]).file_name("my \"best\"\r\ncv.pdf"))
            .part(Part::text("job_description", "x"));
        let encoded = form.encode(&UnrestrictedScope).await.unwrap();

        let parts = parse_multipart(&encoded).await;
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name, "file");
        assert_eq!(parts[0].filename.as_deref(), Some("my %22best%22%0D%0Acv.pdf"));
        assert_eq!(parts[0].data, b"PDF");
        assert_eq!(parts[1].name, "job_description");
    }

    #[test]
    fn test_escape_quotes_and_newlines() {
        assert_eq!(escape("my \"cv\".pdf"), "my %22cv%22.pdf");
        assert_eq!(escape("a\r\nb"), "a%0D%0Ab");
    }
}
