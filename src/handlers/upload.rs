use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{error, info, instrument, warn};
use ulid::Ulid;

use crate::error::RelayError;
use crate::handlers::AppState;
use crate::models::Attachment;
use crate::services::discord;
use crate::utils::multipart::read_uploads;
use crate::utils::upload_file::UploadedFile;

/// `POST /api/send`: relays the `file` parts of a multipart form to the
/// webhook in one request, then deletes the spooled copies.
#[instrument(name = "forward_upload", skip_all, fields(request_id = %Ulid::new()))]
pub async fn forward_upload(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, RelayError> {
    let uploads = match read_uploads(payload, &state.uploads).await {
        Ok(uploads) => uploads,
        Err(err @ RelayError::FileTooLarge { .. }) => {
            warn!(error = %err, "rejected upload");
            return Err(err);
        }
        Err(err) => {
            error!(error = %err, "error during form parsing");
            return Err(err);
        }
    };

    if uploads.is_empty() {
        warn!("no files uploaded");
        return Err(RelayError::NoFiles);
    }
    info!(
        count = uploads.len(),
        bytes = uploads.iter().map(UploadedFile::size).sum::<usize>(),
        "received uploads"
    );

    let outcome = relay(&state.discord, &uploads).await;
    remove_uploads(uploads);

    match outcome {
        Ok(()) => {
            info!("forwarded uploads to webhook");
            Ok(HttpResponse::Ok().json(json!({ "success": true })))
        }
        Err(err) => {
            error!(error = %err, "webhook delivery failed");
            Err(err)
        }
    }
}

async fn relay(client: &discord::Client, uploads: &[UploadedFile]) -> Result<(), RelayError> {
    let mut attachments = Vec::with_capacity(uploads.len());
    for (index, upload) in uploads.iter().enumerate() {
        attachments.push(Attachment::from_upload(index, upload).await?);
    }

    client.send(attachments).await
}

fn remove_uploads(uploads: Vec<UploadedFile>) {
    for upload in uploads {
        let path = upload.path().to_path_buf();
        if let Err(err) = upload.remove() {
            warn!(path = %path.display(), error = %err, "failed to delete temporary file");
        }
    }
}
