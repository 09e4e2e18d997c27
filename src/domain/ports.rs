use crate::domain::model::{Coordinate, DurationMatrix, Event, Participant, Venue};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 地圖資料服務：中心點附近的候選場地。
/// 沒有結果時回傳空序列，不回傳錯誤。
#[async_trait]
pub trait VenueSource: Send + Sync {
    async fn fetch_candidate_venues(
        &self,
        center: Coordinate,
        radius_meters: u32,
        limit: usize,
    ) -> Vec<Venue>;
}

/// 行車時間矩陣服務，任何失敗都回傳 `None`
#[async_trait]
pub trait DurationMatrixSource: Send + Sync {
    async fn fetch_duration_matrix(
        &self,
        profile: &str,
        sources: &[Coordinate],
        destinations: &[Coordinate],
    ) -> Option<DurationMatrix>;
}

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// 批次嵌入，預設逐一呼叫 `embed`
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }
}

pub trait EventStore: Send + Sync {
    fn create(&self, title: &str) -> impl std::future::Future<Output = Result<Event>> + Send;
    fn get(&self, id: &str) -> impl std::future::Future<Output = Result<Event>> + Send;
    fn append(
        &self,
        id: &str,
        participant: Participant,
    ) -> impl std::future::Future<Output = Result<usize>> + Send;
    fn finalize(&self, id: &str) -> impl std::future::Future<Output = Result<Event>> + Send;
}
