//! Manual cluster operations: building a cluster from chosen ideas and
//! merging more ideas into an existing one.
//!
//! Manually placed ideas have no feature vector, so their similarity is 0 and
//! they count toward size and diversity only.

use std::collections::HashSet;

use super::error::ClusteringError;
use super::strength::refresh_strength;
use super::types::{Idea, IdeaCluster};

/// Similarity recorded for ideas placed by hand
pub const MANUAL_SIMILARITY: u8 = 0;

/// Resolve ids against `all_ideas` in the order given, skipping repeats.
/// Fails on the first id that does not exist.
fn resolve_ideas(idea_ids: &[i64], all_ideas: &[Idea]) -> Result<Vec<Idea>, ClusteringError> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(idea_ids.len());

    for &id in idea_ids {
        if !seen.insert(id) {
            continue;
        }
        let idea = all_ideas
            .iter()
            .find(|idea| idea.id == id)
            .ok_or(ClusteringError::UnknownIdea(id))?;
        resolved.push(idea.clone());
    }

    Ok(resolved)
}

/// Create a cluster from hand-picked ideas
pub fn create_manual_cluster(
    name: impl Into<String>,
    description: impl Into<String>,
    idea_ids: &[i64],
    all_ideas: &[Idea],
) -> Result<IdeaCluster, ClusteringError> {
    let ideas = resolve_ideas(idea_ids, all_ideas)?;

    let mut cluster = IdeaCluster {
        id: None,
        name: name.into(),
        name_en: String::new(),
        description: description.into(),
        description_en: String::new(),
        strength: 0,
        member_count: ideas.len(),
        similarities: vec![MANUAL_SIMILARITY; ideas.len()],
        ideas,
    };
    refresh_strength(&mut cluster);

    tracing::info!(
        "Created manual cluster {:?} with {} idea(s)",
        cluster.name,
        cluster.member_count
    );
    Ok(cluster)
}

/// Add ideas to an existing cluster. Ideas already in the cluster are skipped.
/// On an unknown id nothing is changed. Returns how many ideas were added.
pub fn merge_ideas_into_cluster(
    cluster: &mut IdeaCluster,
    idea_ids: &[i64],
    all_ideas: &[Idea],
) -> Result<usize, ClusteringError> {
    let incoming = resolve_ideas(idea_ids, all_ideas)?;

    let mut added = 0;
    for idea in incoming {
        if cluster.contains(idea.id) {
            continue;
        }
        cluster.ideas.push(idea);
        cluster.similarities.push(MANUAL_SIMILARITY);
        added += 1;
    }

    cluster.member_count = cluster.ideas.len();
    refresh_strength(cluster);

    tracing::info!("Merged {} idea(s) into cluster {:?}", added, cluster.name);
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool() -> Vec<Idea> {
        (1..=5)
            .map(|i| Idea::new(i, format!("idea {}", i), "").with_category(format!("c{}", i % 2)))
            .collect()
    }

    #[test]
    fn test_create_manual_cluster() {
        let all = pool();
        let cluster = create_manual_cluster("يدوي", "مجموعة يدوية", &[3, 1, 3], &all).unwrap();

        assert_eq!(cluster.member_count, 2);
        assert_eq!(cluster.ideas.iter().map(|i| i.id).collect::<Vec<_>>(), vec![3, 1]);
        assert_eq!(cluster.similarities, vec![0, 0]);
        // count 20*0.3 = 6, similarity 0, one category 33.3*0.2 = 6.7
        assert_eq!(cluster.strength, 13);
    }

    #[test]
    fn test_create_manual_cluster_unknown_id() {
        let all = pool();
        let result = create_manual_cluster("x", "y", &[1, 42], &all);
        assert!(matches!(result, Err(ClusteringError::UnknownIdea(42))));
    }

    #[test]
    fn test_merge_skips_existing_members() {
        let all = pool();
        let mut cluster = create_manual_cluster("x", "y", &[1, 2], &all).unwrap();

        let added = merge_ideas_into_cluster(&mut cluster, &[2, 4, 5], &all).unwrap();
        assert_eq!(added, 2);
        assert_eq!(cluster.member_count, 4);
        assert_eq!(cluster.similarities.len(), cluster.ideas.len());
    }

    #[test]
    fn test_merge_unknown_id_leaves_cluster_untouched() {
        let all = pool();
        let mut cluster = create_manual_cluster("x", "y", &[1], &all).unwrap();
        let before = cluster.clone();

        let result = merge_ideas_into_cluster(&mut cluster, &[2, 99], &all);
        assert!(matches!(result, Err(ClusteringError::UnknownIdea(99))));
        assert_eq!(cluster, before);
    }
}
