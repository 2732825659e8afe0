use approx::assert_relative_eq;
use sentsim::{cosine_similarity, Embed, Result, SentenceEncoder};

const MODEL_REPO: &str = "sentence-transformers/all-MiniLM-L6-v2";

fn similarity(encoder: &SentenceEncoder, s1: &str, s2: &str) -> Result<f32> {
    let embeddings = encoder.embed(&[s1.to_string(), s2.to_string()])?;
    assert_eq!(embeddings.len(), 2);
    assert_eq!(embeddings[0].dim(), embeddings[1].dim());
    cosine_similarity(&embeddings[0], &embeddings[1])
}

#[test]
#[ignore = "downloads model weights from the Hugging Face Hub"]
fn test_similarity_sentence_transformers() -> Result<()> {
    let encoder = SentenceEncoder::builder()
        .with_model_repo(MODEL_REPO)?
        .build()?;

    let cat = "The cat sits on the mat";
    let paraphrase = "A cat is sitting on a mat";
    let unrelated = "Stock markets fell sharply today";

    assert_relative_eq!(similarity(&encoder, cat, cat)?, 1.0, epsilon = 1e-4);

    let high = similarity(&encoder, cat, paraphrase)?;
    let low = similarity(&encoder, cat, unrelated)?;
    assert!(high > 0.8, "paraphrase similarity too low: {high}");
    assert!(low < 0.3, "unrelated similarity too high: {low}");

    assert_relative_eq!(
        similarity(&encoder, paraphrase, cat)?,
        high,
        epsilon = 1e-5
    );

    Ok(())
}
