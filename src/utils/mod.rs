pub mod multipart;
pub mod upload_file;
