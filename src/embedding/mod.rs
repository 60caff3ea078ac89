//! Text-to-vector embedding pipeline.
//!
//! Provides the [`EmbeddingProvider`] trait, the vector math shared by indexing and
//! search, and the concept-projection embedding in [`concept`]. Vectors are
//! [`EMBEDDING_DIM`] long and L2-normalized; the zero vector means "no signal".

pub mod concept;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::llm::LlmError;

/// Number of dimensions in every embedding vector.
pub const EMBEDDING_DIM: usize = 128;

/// Concept tokens considered per text.
const MAX_CONCEPT_TOKENS: usize = 10;

/// Phase step between dimensions in the sine projection.
const PROJECTION_STEP: f64 = 0.1;

#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("nothing to embed")]
    EmptyInput,
    #[error("concept extraction failed: {0}")]
    Llm(#[from] LlmError),
    #[error("model returned no concepts")]
    NoConcepts,
}

/// Trait for embedding text into vectors.
///
/// Implementations produce L2-normalized vectors of exactly [`EMBEDDING_DIM`] dimensions.
/// Errors mean "no embedding for this text"; callers skip rather than abort.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

/// Project a concept list onto a fixed-size vector.
///
/// The response is lower-cased and split on commas and whitespace; up to ten tokens
/// each add `sin((hash + i) * 0.1)` to dimension `i`, where `hash` is
/// [`stable_token_hash`]. The sum is L2-normalized. Identical concept strings always
/// give identical vectors, on every platform and across runs.
pub fn concepts_to_embedding(concepts: &str) -> Vec<f32> {
    let lowered = concepts.to_lowercase();
    let tokens = lowered
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .take(MAX_CONCEPT_TOKENS);

    let mut embedding = vec![0.0f32; EMBEDDING_DIM];
    for token in tokens {
        let hash = stable_token_hash(token) as f64;
        for (i, value) in embedding.iter_mut().enumerate() {
            *value += ((hash + i as f64) * PROJECTION_STEP).sin() as f32;
        }
    }

    l2_normalize(&embedding)
}

/// Concept tokens the projection would use, exposed so callers can reject empty replies.
pub fn concept_tokens(concepts: &str) -> usize {
    concepts
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .take(MAX_CONCEPT_TOKENS)
        .count()
}

/// First four bytes of the token's SHA-256, read as a little-endian `i32`.
pub fn stable_token_hash(token: &str) -> i32 {
    let digest = Sha256::digest(token.as_bytes());
    i32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
}

/// L2-normalize a vector. Returns a zero vector if the input norm is zero.
pub fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}

/// Cosine similarity in `[-1, 1]`; 0 when either vector has zero magnitude.
///
/// # Panics
///
/// Panics if the vectors differ in length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(
        a.len(),
        b.len(),
        "cosine similarity requires equal-length vectors"
    );

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
