use crate::errors::ServiceError;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Longest file extension carried over from an uploaded file name
const MAX_EXTENSION_LEN: usize = 16;

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Where an attachment ended up on disk and how clients reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAttachment {
    pub path: PathBuf,
    pub public_path: String,
}

/// Stores attachments in one directory, named after the form they belong to.
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
    public_prefix: String,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>, public_prefix: impl Into<String>) -> Self {
        let public_prefix = public_prefix.into();
        Self {
            root: root.into(),
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Extension of the client's file name including the dot, or empty.
    ///
    /// Only a plain alphanumeric suffix is kept so the stored name cannot
    /// escape the upload directory.
    pub fn extension_of(file_name: Option<&str>) -> String {
        let Some(name) = file_name else {
            return String::new();
        };
        let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
        match base.rsplit_once('.') {
            Some((stem, ext))
                if !stem.is_empty()
                    && !ext.is_empty()
                    && ext.len() <= MAX_EXTENSION_LEN
                    && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
            {
                format!(".{ext}")
            }
            _ => String::new(),
        }
    }

    /// Writes `attachment` as `<form_number><ext>` and returns its locations.
    pub async fn save(
        &self,
        form_number: &str,
        attachment: &Attachment,
    ) -> Result<StoredAttachment, ServiceError> {
        let file_name = format!(
            "{}{}",
            form_number,
            Self::extension_of(attachment.file_name.as_deref())
        );
        let path = self.root.join(&file_name);

        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            error!("Failed to create upload directory {:?}: {}", self.root, e);
            ServiceError::Io(e)
        })?;
        tokio::fs::write(&path, &attachment.bytes)
            .await
            .map_err(|e| {
                error!("Failed to write attachment {:?}: {}", path, e);
                ServiceError::Io(e)
            })?;

        info!(path = ?path, size = attachment.bytes.len(), "Attachment stored");
        Ok(StoredAttachment {
            public_path: format!("{}/{}", self.public_prefix, file_name),
            path,
        })
    }

    /// Best-effort removal of a file whose form was never committed.
    pub async fn discard(&self, stored: &StoredAttachment) {
        if let Err(e) = tokio::fs::remove_file(&stored.path).await {
            warn!("Failed to remove orphaned attachment {:?}: {}", stored.path, e);
        }
    }
}
