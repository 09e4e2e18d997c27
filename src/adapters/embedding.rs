use crate::domain::ports::Embedder;
use crate::utils::error::{MeetError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_HASH_DIMENSIONS: usize = 256;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Offline embedder: FNV-1a hashed bag of lowercase tokens, L2-normalised.
///
/// Deterministic across processes. Texts sharing words get a positive cosine similarity;
/// it has no notion of synonyms.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimensions];
        let normalized: String = text
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect();
        for token in normalized.split_whitespace() {
            let mut h = FNV_OFFSET;
            for b in token.as_bytes() {
                h ^= u64::from(*b);
                h = h.wrapping_mul(FNV_PRIME);
            }
            v[(h % self.dimensions as u64) as usize] += 1.0;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMENSIONS)
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
    normalize: bool,
}

/// text-embeddings-inference 相容的 HTTP 嵌入服務（POST /embed）
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpEmbedder {
    /// `base_url` 是服務根位址，請求送往 `{base_url}/embed`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/embed", base_url.trim_end_matches('/')),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut batch = self.embed_batch(&[text.to_string()]).await?;
        batch
            .pop()
            .ok_or_else(|| MeetError::upstream("embedding", "empty response"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        tracing::debug!(
            "Requesting {} embeddings from: {}",
            texts.len(),
            self.endpoint
        );
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&EmbedRequest {
                inputs: texts,
                normalize: true,
            })
            .send()
            .await
            .map_err(|e| MeetError::upstream("embedding", e.to_string()))?;

        if !response.status().is_success() {
            return Err(MeetError::upstream(
                "embedding",
                format!("HTTP {}", response.status()),
            ));
        }

        let embeddings: Vec<Vec<f32>> = response
            .json()
            .await
            .map_err(|e| MeetError::upstream("embedding", e.to_string()))?;
        if embeddings.len() != texts.len() {
            return Err(MeetError::upstream(
                "embedding",
                format!("expected {} embeddings, got {}", texts.len(), embeddings.len()),
            ));
        }
        Ok(embeddings)
    }
}

/// 依設定選擇嵌入後端
pub enum EmbeddingBackend {
    Http(HttpEmbedder),
    Hash(HashEmbedder),
}

#[async_trait]
impl Embedder for EmbeddingBackend {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        match self {
            EmbeddingBackend::Http(e) => e.embed(text).await,
            EmbeddingBackend::Hash(e) => e.embed(text).await,
        }
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match self {
            EmbeddingBackend::Http(e) => e.embed_batch(texts).await,
            EmbeddingBackend::Hash(e) => e.embed_batch(texts).await,
        }
    }
}
