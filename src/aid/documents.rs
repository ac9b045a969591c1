//! Document intake for aid requests: attachment kinds, type filtering,
//! and blob storage through the storage operator.

use chrono::{DateTime, Utc};
use opendal::Operator;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    /// Single required identity document; a new upload replaces the old.
    IdProof,
    /// Photos of the affected areas; at least one required at submission.
    DamagePhotos,
    /// Supporting official reports; optional.
    OfficialReports,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IdProof => "id-proof",
            Self::DamagePhotos => "damage-photos",
            Self::OfficialReports => "official-reports",
        }
    }

    /// Whether a file of the given MIME type (with the file name as an
    /// extension fallback) is accepted for this attachment kind.
    pub fn accepts(&self, content_type: &str, file_name: &str) -> bool {
        let ext = extension(file_name);
        match self {
            Self::IdProof => {
                content_type.starts_with("image/")
                    || content_type == "application/pdf"
                    || (content_type.is_empty() && matches!(ext, Some("jpg" | "jpeg" | "png" | "webp" | "pdf")))
            }
            Self::DamagePhotos => {
                content_type.starts_with("image/")
                    || (content_type.is_empty() && matches!(ext, Some("jpg" | "jpeg" | "png" | "webp")))
            }
            Self::OfficialReports => {
                content_type.starts_with("image/")
                    || content_type == "application/pdf"
                    || content_type.contains("document")
                    || (content_type.is_empty()
                        && matches!(ext, Some("jpg" | "jpeg" | "png" | "webp" | "pdf" | "doc" | "docx")))
            }
        }
    }

    /// The user-visible message shown when a file is rejected.
    pub fn rejection_message(&self) -> &'static str {
        match self {
            Self::IdProof => "Please upload an image or PDF file for ID proof.",
            Self::DamagePhotos => "Please upload image files only for photos of affected areas.",
            Self::OfficialReports => "Please upload PDF, image, or document files for official reports.",
        }
    }
}

fn extension(file_name: &str) -> Option<&str> {
    file_name.rsplit_once('.').map(|(_, ext)| ext)
}

fn storage_extension(content_type: &str, file_name: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "application/pdf" => "pdf",
        _ => match extension(file_name) {
            Some("jpg") | Some("jpeg") => "jpg",
            Some("png") => "png",
            Some("webp") => "webp",
            Some("pdf") => "pdf",
            Some("doc") => "doc",
            Some("docx") => "docx",
            _ => "bin",
        },
    }
}

/// Reference to an accepted, stored attachment.
#[derive(Debug, Clone, Serialize)]
pub struct StoredDocument {
    pub id: String,
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
    pub key: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Writes accepted blobs under a per-draft prefix. Stands in for the
/// identity/file-storage collaborator: blobs are stored and referenced,
/// never verified.
pub struct DocumentStore {
    storage: Operator,
}

impl DocumentStore {
    pub fn new(storage: Operator) -> Self {
        Self { storage }
    }

    /// Filters the file by its attachment kind, stores the blob, and
    /// returns the stored reference. A rejected file is discarded with no
    /// state change.
    pub async fn put(
        &self,
        draft_id: &str,
        kind: DocumentKind,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredDocument, AppError> {
        if !kind.accepts(content_type, file_name) {
            return Err(AppError::UnsupportedFileType(kind.rejection_message()));
        }

        let id = Uuid::new_v4().to_string();
        let ext = storage_extension(content_type, file_name);
        let key = format!("aid-requests/{draft_id}/{}/{id}.{ext}", kind.as_str());
        let size = bytes.len() as u64;
        self.storage.write(&key, bytes).await?;

        Ok(StoredDocument {
            id,
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            size,
            key,
            uploaded_at: Utc::now(),
        })
    }

    /// Best-effort blob removal; a dangling blob is only wasted space.
    pub async fn discard(&self, document: &StoredDocument) {
        if let Err(err) = self.storage.delete(&document.key).await {
            tracing::warn!(key = %document.key, "failed to delete stored document: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opendal::services::Memory;

    fn store() -> DocumentStore {
        DocumentStore::new(Operator::new(Memory::default()).expect("memory operator").finish())
    }

    #[test]
    fn id_proof_accepts_images_and_pdf() {
        assert!(DocumentKind::IdProof.accepts("image/png", "id.png"));
        assert!(DocumentKind::IdProof.accepts("application/pdf", "id.pdf"));
        assert!(!DocumentKind::IdProof.accepts("video/mp4", "id.mp4"));
    }

    #[test]
    fn photos_accept_images_only() {
        assert!(DocumentKind::DamagePhotos.accepts("image/jpeg", "roof.jpg"));
        assert!(!DocumentKind::DamagePhotos.accepts("application/pdf", "roof.pdf"));
    }

    #[test]
    fn reports_accept_documents() {
        assert!(DocumentKind::OfficialReports.accepts("application/pdf", "report.pdf"));
        assert!(DocumentKind::OfficialReports
            .accepts("application/vnd.openxmlformats-officedocument.wordprocessingml.document", "report.docx"));
        assert!(DocumentKind::OfficialReports.accepts("image/png", "scan.png"));
        assert!(!DocumentKind::OfficialReports.accepts("audio/mpeg", "report.mp3"));
    }

    #[test]
    fn extension_fallback_when_type_missing() {
        assert!(DocumentKind::IdProof.accepts("", "passport.pdf"));
        assert!(!DocumentKind::IdProof.accepts("", "passport.exe"));
    }

    #[tokio::test]
    async fn put_stores_under_draft_prefix() {
        let store = store();
        let doc = store
            .put("draft-1", DocumentKind::DamagePhotos, "house.jpg", "image/jpeg", vec![1, 2, 3])
            .await
            .expect("accepted");
        assert!(doc.key.starts_with("aid-requests/draft-1/damage-photos/"));
        assert!(doc.key.ends_with(".jpg"));
        assert_eq!(doc.size, 3);
    }

    #[tokio::test]
    async fn put_rejects_wrong_type_without_storing() {
        let store = store();
        let err = store
            .put("draft-1", DocumentKind::DamagePhotos, "scan.pdf", "application/pdf", vec![0])
            .await
            .expect_err("rejected");
        assert!(matches!(err, AppError::UnsupportedFileType(_)));
    }
}
