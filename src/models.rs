use base64::{engine::general_purpose::STANDARD, Engine};
use mime_guess::from_path;
use serde::{Serialize, Serializer};

use crate::utils::upload_file::UploadedFile;

pub const WEBHOOK_CONTENT: &str = "AI診断画像 (3枚) を受け取りました。";

/// One uploaded file as it is handed to the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub name: String,
    #[serde(serialize_with = "as_base64")]
    pub data: Vec<u8>,
    pub description: String,
    #[serde(skip)]
    pub content_type: String,
}

impl Attachment {
    /// `index` is the zero-based position of the upload in the request.
    pub fn new(
        index: usize,
        file_name: Option<&str>,
        content_type: Option<&str>,
        data: Vec<u8>,
    ) -> Self {
        let position = index + 1;
        let name = match file_name.filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => format!("photo_{}.jpg", position),
        };
        let content_type = match content_type {
            Some(content_type) => content_type.to_string(),
            None => from_path(&name).first_or_octet_stream().to_string(),
        };

        Attachment {
            name,
            data,
            description: format!("診断画像 {}", position),
            content_type,
        }
    }

    pub async fn from_upload(index: usize, upload: &UploadedFile) -> std::io::Result<Self> {
        let data = upload.read().await?;
        Ok(Self::new(
            index,
            upload.original_filename(),
            upload.content_type(),
            data,
        ))
    }
}

fn as_base64<T, S>(data: T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: AsRef<[u8]>,
    S: Serializer,
{
    serializer.serialize_str(&STANDARD.encode(data.as_ref()))
}

/// Body of the JSON delivery mode.
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    pub content: &'a str,
    pub files: &'a [Attachment],
}

/// `payload_json` part of the multipart delivery mode.
#[derive(Debug, Serialize)]
pub struct MultipartPayload<'a> {
    pub content: &'a str,
    pub attachments: Vec<AttachmentMeta<'a>>,
}

#[derive(Debug, Serialize)]
pub struct AttachmentMeta<'a> {
    pub id: usize,
    pub filename: &'a str,
    pub description: &'a str,
}

impl<'a> MultipartPayload<'a> {
    pub fn new(content: &'a str, files: &'a [Attachment]) -> Self {
        let attachments = files
            .iter()
            .enumerate()
            .map(|(id, file)| AttachmentMeta {
                id,
                filename: &file.name,
                description: &file.description,
            })
            .collect();

        MultipartPayload {
            content,
            attachments,
        }
    }
}
