//! Toy "taste vectors" illustrating cosine similarity by hand.
//!
//! Three listeners rate rock, classical and pop music; the similarity of
//! their rating vectors says how alike their tastes are.

use crate::error::Result;
use crate::similarity::cosine_similarity;

/// A named listener and their (rock, classical, pop) ratings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TasteProfile {
    pub name: &'static str,
    pub ratings: [f32; 3],
}

/// The three listeners of the worked example.
pub const PROFILES: [TasteProfile; 3] = [
    TasteProfile {
        name: "Alice",
        ratings: [0.8, 0.2, 0.1],
    },
    TasteProfile {
        name: "Bob",
        ratings: [0.1, 0.9, 0.2],
    },
    TasteProfile {
        name: "Carol",
        ratings: [0.5, 0.3, 0.7],
    },
];

/// Similarity between two listeners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TastePair {
    pub first: &'static str,
    pub second: &'static str,
    pub similarity: f32,
}

/// Similarity of every unordered pair in `profiles`, in input order.
pub fn pairwise(profiles: &[TasteProfile]) -> Result<Vec<TastePair>> {
    let mut pairs = Vec::new();
    for (i, first) in profiles.iter().enumerate() {
        for second in &profiles[i + 1..] {
            pairs.push(TastePair {
                first: first.name,
                second: second.name,
                similarity: cosine_similarity(&first.ratings, &second.ratings)?,
            });
        }
    }
    Ok(pairs)
}
