use anyhow::Context;
use async_trait::async_trait;

/// Narrow contract over whatever turns pixels into text. The model behind
/// it is out of scope here; the pipeline only needs a string back.
#[async_trait]
pub trait OcrProvider: Send + Sync {
    async fn read_text(&self, image: &[u8]) -> anyhow::Result<String>;
}

pub struct RemoteOcrProvider {
    url: String,
    client: reqwest::Client,
}

impl RemoteOcrProvider {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl OcrProvider for RemoteOcrProvider {
    async fn read_text(&self, image: &[u8]) -> anyhow::Result<String> {
        let resp = self
            .client
            .post(format!("{}/readtext", self.url))
            .header("content-type", "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await
            .context("failed to call OCR service")?;

        let status = resp.status();
        let data: serde_json::Value =
            resp.json().await.context("failed to parse OCR response")?;

        if !status.is_success() {
            anyhow::bail!("OCR service error ({}): {}", status, data);
        }

        let text = data["text"].as_str().unwrap_or_default().trim().to_string();

        if text.is_empty() {
            return Ok("No clear text found in image.".to_string());
        }

        Ok(text)
    }
}
