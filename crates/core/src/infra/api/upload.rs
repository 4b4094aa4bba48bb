use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::domain::types::UploadedImage;

/// 拡張子から画像 MIME を決める。画像以外は None
pub fn image_mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

impl ApiClient {
    /// `POST /api/upload/image`（multipart `file`）
    ///
    /// 戻り値の url は絶対 URL に直してある。
    pub async fn upload_image(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage, ApiError> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| ApiError::Client(e.to_string()))?;
        let form = Form::new().part("file", part);

        let mut uploaded: UploadedImage = self
            .send_json(self.request(Method::POST, "/api/upload/image").multipart(form))
            .await?;
        uploaded.url = self.absolute_url(&uploaded.url);
        Ok(uploaded)
    }
}
