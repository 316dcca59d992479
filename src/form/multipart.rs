//! `multipart/form-data` bodies: text fields only.

use bytes::Bytes;
use futures_util::stream;
use multer::Multipart;

/// Collect the text fields of a multipart body in order. File parts are skipped.
pub async fn parse_multipart(content_type: &str, body: Bytes) -> Result<Vec<(String, String)>, String> {
    let boundary = multer::parse_boundary(content_type).map_err(|e| e.to_string())?;
    let mut multipart = Multipart::new(
        stream::once(async move { Ok::<_, std::io::Error>(body) }),
        boundary,
    );

    let mut pairs = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        if field.file_name().is_some() {
            continue;
        }
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.map_err(|e| e.to_string())?;
        pairs.push((name, value));
    }

    tracing::debug!(fields = pairs.len(), "parsed multipart form");
    Ok(pairs)
}
