//! # Vector Index Tests
//!
//! Covers the brute-force similarity scan, ranking, and resilience to
//! missing or malformed embeddings.

use anyhow::Result;
use linkhint::storage::StorageProvider;
use linkhint::vector::VectorIndex;
use turso::params;

async fn setup() -> Result<(StorageProvider, VectorIndex)> {
    let provider = StorageProvider::new(":memory:").await?;
    provider.initialize_schema().await?;
    let index = VectorIndex::new(&provider.db);
    Ok((provider, index))
}

#[tokio::test]
async fn identical_embedding_ranks_first_with_similarity_one() -> Result<()> {
    let (_provider, index) = setup().await?;
    index
        .upsert_chunk("KB1", 0, "restart the ingest workers", Some(&[0.9, 0.1, 0.3]))
        .await?;
    index
        .upsert_chunk("KB2", 0, "rotate the portal certificate", Some(&[0.1, 0.8, 0.2]))
        .await?;

    let matches = index.search(&[0.1, 0.8, 0.2], 5).await?;
    assert_eq!(matches[0].item_id, "KB2");
    assert!((matches[0].similarity - 1.0).abs() < 1e-6);
    assert!(matches[0].similarity >= matches[1].similarity);
    Ok(())
}

#[tokio::test]
async fn search_respects_limit() -> Result<()> {
    let (_provider, index) = setup().await?;
    for i in 0..6 {
        index
            .upsert_chunk("KB1", i, &format!("chunk {i}"), Some(&[i as f32, 1.0]))
            .await?;
    }
    let matches = index.search(&[1.0, 1.0], 3).await?;
    assert_eq!(matches.len(), 3);
    Ok(())
}

#[tokio::test]
async fn chunks_without_embeddings_are_invisible() -> Result<()> {
    let (_provider, index) = setup().await?;
    index
        .upsert_chunk("KB1", 0, "awaiting async indexing", None)
        .await?;
    index
        .upsert_chunk("KB1", 1, "already indexed", Some(&[0.5, 0.5]))
        .await?;

    let matches = index.search(&[0.5, 0.5], 10).await?;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].chunk_index, 1);
    Ok(())
}

#[tokio::test]
async fn malformed_embeddings_are_skipped_not_fatal() -> Result<()> {
    let (provider, index) = setup().await?;
    index
        .upsert_chunk("KB1", 0, "good chunk", Some(&[0.2, 0.4]))
        .await?;

    // A blob whose length is not a multiple of four cannot decode as f32s.
    let conn = provider.db.connect()?;
    conn.execute(
        "INSERT INTO knowledge_chunks (item_id, chunk_index, content, embedding)
         VALUES (?, ?, ?, ?)",
        params!["KB9", 0, "corrupt chunk", vec![1u8, 2, 3]],
    )
    .await?;
    // A dimension mismatch is skipped the same way.
    index
        .upsert_chunk("KB8", 0, "wrong dims", Some(&[0.1, 0.2, 0.3, 0.4]))
        .await?;

    let matches = index.search(&[0.2, 0.4], 10).await?;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].item_id, "KB1");
    Ok(())
}

#[tokio::test]
async fn upsert_replaces_by_chunk_key_and_delete_clears_the_item() -> Result<()> {
    let (_provider, index) = setup().await?;
    index
        .upsert_chunk("KB1", 0, "first draft", Some(&[1.0, 0.0]))
        .await?;
    index
        .upsert_chunk("KB1", 0, "re-indexed text", Some(&[0.0, 1.0]))
        .await?;
    index
        .upsert_chunk("KB1", 1, "second chunk", Some(&[0.0, 1.0]))
        .await?;

    let matches = index.search(&[0.0, 1.0], 10).await?;
    assert_eq!(matches.len(), 2);
    assert!(matches.iter().any(|m| m.content == "re-indexed text"));
    assert!(!matches.iter().any(|m| m.content == "first draft"));

    assert_eq!(index.delete_item("KB1").await?, 2);
    assert!(index.search(&[0.0, 1.0], 10).await?.is_empty());
    Ok(())
}
