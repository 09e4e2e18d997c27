use crate::domain::model::Venue;
use crate::domain::ports::Embedder;
use crate::utils::error::{MeetError, Result};

const COSINE_EPSILON: f64 = 1e-9;

/// Cosine similarity with an epsilon in the denominator, so a zero vector scores 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt() + COSINE_EPSILON)
}

fn is_zero_vector(v: &[f32]) -> bool {
    v.iter().all(|x| *x == 0.0)
}

/// 依語意相關度排序場地，決定最終順序
pub struct SemanticRanker<E: Embedder> {
    embedder: E,
}

#[derive(Debug, Clone)]
pub struct RankOutcome {
    pub venues: Vec<Venue>,
    pub applied: bool,
}

impl<E: Embedder> SemanticRanker<E> {
    pub fn new(embedder: E) -> Self {
        Self { embedder }
    }

    pub async fn rank(&self, query: &str, venues: Vec<Venue>) -> RankOutcome {
        if venues.is_empty() {
            return RankOutcome {
                venues,
                applied: false,
            };
        }

        match self.score(query, &venues).await {
            Ok(scores) => {
                let mut scored: Vec<Venue> = venues
                    .into_iter()
                    .zip(scores)
                    .map(|(mut venue, score)| {
                        venue.score = Some(score);
                        venue
                    })
                    .collect();
                // 穩定排序，分數相同時保留行車時間順序
                scored.sort_by(|a, b| {
                    let sa = a.score.unwrap_or(f64::NEG_INFINITY);
                    let sb = b.score.unwrap_or(f64::NEG_INFINITY);
                    sb.total_cmp(&sa)
                });
                RankOutcome {
                    venues: scored,
                    applied: true,
                }
            }
            Err(e) => {
                tracing::warn!("🧠 Semantic ranking skipped: {}", e);
                RankOutcome {
                    venues,
                    applied: false,
                }
            }
        }
    }

    async fn score(&self, query: &str, venues: &[Venue]) -> Result<Vec<f64>> {
        let mut texts = Vec::with_capacity(venues.len() + 1);
        texts.push(query.to_string());
        texts.extend(venues.iter().map(Venue::semantic_text));

        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != texts.len() {
            return Err(MeetError::upstream(
                "embedding",
                format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    embeddings.len()
                ),
            ));
        }

        let (query_embedding, venue_embeddings) = embeddings.split_at(1);
        let query_embedding = &query_embedding[0];
        if venue_embeddings
            .iter()
            .any(|e| e.len() != query_embedding.len())
        {
            return Err(MeetError::upstream(
                "embedding",
                "embeddings have inconsistent dimensions",
            ));
        }
        if is_zero_vector(query_embedding) {
            tracing::warn!("🧠 Query embedding is a zero vector, all scores will be 0");
        }
        for (venue, embedding) in venues.iter().zip(venue_embeddings) {
            if is_zero_vector(embedding) {
                tracing::warn!(
                    "🧠 Embedding for venue '{}' is a zero vector, it will score 0",
                    venue.name
                );
            }
        }

        Ok(venue_embeddings
            .iter()
            .map(|e| cosine_similarity(query_embedding, e))
            .collect())
    }
}
