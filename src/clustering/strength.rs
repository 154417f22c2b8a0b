//! Composite cluster strength.
//!
//! ```text
//! countScore     = min(100, memberCount / 10 * 100)
//! avgSimilarity  = mean(similarities)
//! diversityScore = min(100, distinctCategories / 3 * 100)
//! strength       = round(0.3 * countScore + 0.5 * avgSimilarity + 0.2 * diversityScore)
//! ```

use std::collections::HashSet;

use super::types::{Idea, IdeaCluster};

/// Member count at which the size component saturates
const FULL_COUNT: f64 = 10.0;

/// Distinct categories at which the diversity component saturates
const FULL_DIVERSITY: f64 = 3.0;

const COUNT_WEIGHT: f64 = 0.3;
const SIMILARITY_WEIGHT: f64 = 0.5;
const DIVERSITY_WEIGHT: f64 = 0.2;

/// Strength of a group of ideas with the given similarities
pub fn compute_strength(ideas: &[Idea], similarities: &[u8]) -> u8 {
    let count_score = (ideas.len() as f64 / FULL_COUNT * 100.0).min(100.0);

    let avg_similarity = if similarities.is_empty() {
        0.0
    } else {
        similarities.iter().map(|&s| s as f64).sum::<f64>() / similarities.len() as f64
    };

    let diversity_score = (category_count(ideas) as f64 / FULL_DIVERSITY * 100.0).min(100.0);

    let strength = count_score * COUNT_WEIGHT
        + avg_similarity * SIMILARITY_WEIGHT
        + diversity_score * DIVERSITY_WEIGHT;

    strength.round().clamp(0.0, 100.0) as u8
}

/// Distinct non-empty categories among `ideas`
pub fn category_count(ideas: &[Idea]) -> usize {
    ideas
        .iter()
        .filter_map(|idea| idea.category.as_deref())
        .filter(|category| !category.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

/// Recompute `cluster.strength` from its members
pub fn refresh_strength(cluster: &mut IdeaCluster) {
    cluster.strength = compute_strength(&cluster.ideas, &cluster.similarities);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ideas(categories: &[Option<&str>]) -> Vec<Idea> {
        categories
            .iter()
            .enumerate()
            .map(|(i, category)| {
                let idea = Idea::new(i as i64, format!("idea {}", i), "");
                match category {
                    Some(c) => idea.with_category(*c),
                    None => idea,
                }
            })
            .collect()
    }

    #[test]
    fn test_strength_formula() {
        // 3 members: count 30, similarity 90, 2 categories -> diversity 66.67
        let members = ideas(&[Some("health"), Some("energy"), Some("health")]);
        let strength = compute_strength(&members, &[90, 90, 90]);
        // 30*0.3 + 90*0.5 + 66.67*0.2 = 9 + 45 + 13.33 = 67.33
        assert_eq!(strength, 67);
    }

    #[test]
    fn test_strength_saturates() {
        let categories: Vec<Option<&str>> =
            ["a", "b", "c", "d", "a", "b", "c", "d", "a", "b", "c", "d"]
                .into_iter()
                .map(Some)
                .collect();
        let members = ideas(&categories);
        let similarities = vec![100; members.len()];
        assert_eq!(compute_strength(&members, &similarities), 100);
    }

    #[test]
    fn test_empty_and_missing_categories_are_ignored() {
        let members = ideas(&[None, Some(""), Some("x")]);
        assert_eq!(category_count(&members), 1);
    }

    #[test]
    fn test_strength_is_reproducible() {
        let members = ideas(&[Some("a"), None, Some("b"), None, Some("a")]);
        let similarities = [71, 64, 88, 93, 59];
        let first = compute_strength(&members, &similarities);
        let second = compute_strength(&members, &similarities);
        assert_eq!(first, second);
        // 50*0.3 + 75*0.5 + 66.67*0.2 = 15 + 37.5 + 13.33 = 65.83
        assert_eq!(first, 66);
    }

    #[test]
    fn test_zero_similarity_manual_members() {
        let members = ideas(&[None, None]);
        // 20*0.3 = 6
        assert_eq!(compute_strength(&members, &[0, 0]), 6);
    }
}
