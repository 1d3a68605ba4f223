//! Lexical similarity between notes and backlink resolution.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::defaults::BACKLINK_THRESHOLD;
use crate::models::DocumentRef;
use crate::traits::DocumentStore;
use crate::Result;

fn word_set(text: &str) -> HashSet<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Jaccard similarity over whitespace-split, lowercased word sets.
///
/// Returns `0.0` when both texts are empty.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = word_set(a);
    let b = word_set(b);

    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(&b).count();
    intersection as f64 / union as f64
}

/// Documents in `store` whose similarity to `text` strictly exceeds
/// [`BACKLINK_THRESHOLD`], in store enumeration order.
pub async fn find_related_notes(
    text: &str,
    store: &dyn DocumentStore,
) -> Result<Vec<DocumentRef>> {
    let documents = store.list_documents().await?;
    let mut related = Vec::new();

    for doc in documents {
        let content = store.read_text(&doc.id).await?;
        let score = similarity(text, &content);
        trace!(document = %doc.id, score, "backlink candidate");
        if score > BACKLINK_THRESHOLD {
            related.push(doc);
        }
    }

    debug!(related = related.len(), "Resolved related notes");
    Ok(related)
}
