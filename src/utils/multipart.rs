use std::path::PathBuf;

use actix_multipart::{Field, Multipart};
use futures_util::StreamExt;
use tempfile::Builder;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::RelayError;
use crate::utils::upload_file::UploadedFile;

/// Form field the uploads arrive under.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub dir: PathBuf,
    pub max_file_size: usize,
}

/// Spools every `file` part of the body to disk, in the order received.
///
/// Other fields are drained and ignored. On error the files collected so far
/// are dropped, which deletes them.
pub async fn read_uploads(
    mut payload: Multipart,
    options: &UploadOptions,
) -> Result<Vec<UploadedFile>, RelayError> {
    let mut uploads = Vec::new();

    while let Some(field) = payload.next().await {
        let mut field = field?;

        if field.name() != Some(FILE_FIELD) {
            debug!(field = ?field.name(), "skipping non-file field");
            while let Some(chunk) = field.next().await {
                chunk?;
            }
            continue;
        }

        uploads.push(spool_field(&mut field, options).await?);
    }

    Ok(uploads)
}

async fn spool_field(
    field: &mut Field,
    options: &UploadOptions,
) -> Result<UploadedFile, RelayError> {
    let file_name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .map(str::to_string);
    let content_type = field.content_type().map(|mime| mime.essence_str().to_string());

    let file = Builder::new()
        .prefix("upload-")
        .tempfile_in(&options.dir)
        .map_err(RelayError::Spool)?;
    let mut writer = File::from_std(file.as_file().try_clone().map_err(RelayError::Spool)?);
    let mut size = 0;

    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        size += chunk.len();
        if size > options.max_file_size {
            return Err(RelayError::FileTooLarge {
                limit: options.max_file_size,
            });
        }
        writer.write_all(&chunk).await.map_err(RelayError::Spool)?;
    }
    // waits for the blocking pool to finish the last write
    writer.flush().await.map_err(RelayError::Spool)?;

    debug!(
        file_name = file_name.as_deref().unwrap_or(""),
        size,
        path = %file.path().display(),
        "spooled upload"
    );

    Ok(UploadedFile::new(file, file_name, content_type, size))
}
