//! Lloyd's K-means over feature vectors.
//!
//! Initial centroids are `k` distinct input vectors sampled uniformly without
//! replacement. Each round assigns every vector to its nearest centroid (ties go
//! to the lowest index), then moves each centroid to the mean of its members;
//! a centroid with no members stays where it was. The loop stops when a round
//! changes no assignment or after `max_iterations` rounds. There are no
//! restarts, so the outcome depends on the sampled seeds.

use rand::Rng;

use super::types::{FeatureVector, DIMENSIONS, MAX_SCORE};

/// Result of partitioning
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// Centroid index for each input vector
    pub assignments: Vec<usize>,
    /// Final centroid positions
    pub centroids: Vec<FeatureVector>,
    /// Rounds executed
    pub iterations: usize,
}

impl Partition {
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Input indices assigned to `cluster`, in input order
    pub fn members(&self, cluster: usize) -> impl Iterator<Item = usize> + '_ {
        self.assignments
            .iter()
            .enumerate()
            .filter(move |&(_, &assigned)| assigned == cluster)
            .map(|(index, _)| index)
    }

    /// Similarity (0-100) of `vector` to the centroid of `cluster`
    pub fn similarity(&self, vector: &FeatureVector, cluster: usize) -> u8 {
        similarity_score(vector.euclidean_distance(&self.centroids[cluster]))
    }
}

/// Map a distance to a 0-100 similarity: `100 - d / max_distance * 100`, clamped and rounded
pub fn similarity_score(distance: f64) -> u8 {
    let similarity = MAX_SCORE - distance / FeatureVector::max_distance() * MAX_SCORE;
    similarity.clamp(0.0, MAX_SCORE).round() as u8
}

/// Index of the closest centroid; the first one wins ties
pub fn nearest_centroid(vector: &FeatureVector, centroids: &[FeatureVector]) -> usize {
    let mut closest = 0;
    let mut min_distance = f64::INFINITY;

    for (index, centroid) in centroids.iter().enumerate() {
        let distance = vector.euclidean_distance(centroid);
        if distance < min_distance {
            min_distance = distance;
            closest = index;
        }
    }

    closest
}

/// Mean of the members of each cluster. Empty clusters keep `previous`.
pub fn update_centroids(
    vectors: &[FeatureVector],
    assignments: &[usize],
    previous: &[FeatureVector],
) -> Vec<FeatureVector> {
    let k = previous.len();
    let mut sums = vec![[0.0f64; DIMENSIONS]; k];
    let mut counts = vec![0usize; k];

    for (vector, &cluster) in vectors.iter().zip(assignments) {
        counts[cluster] += 1;
        for (sum, value) in sums[cluster].iter_mut().zip(vector.as_slice()) {
            *sum += value;
        }
    }

    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((mut sum, count), previous)| {
            if count == 0 {
                return *previous;
            }
            for value in sum.iter_mut() {
                *value /= count as f64;
            }
            FeatureVector(sum)
        })
        .collect()
}

/// Sample `k` distinct vectors as starting centroids
pub fn initial_centroids<R: Rng + ?Sized>(
    vectors: &[FeatureVector],
    k: usize,
    rng: &mut R,
) -> Vec<FeatureVector> {
    rand::seq::index::sample(rng, vectors.len(), k)
        .into_iter()
        .map(|index| vectors[index])
        .collect()
}

/// Partition `vectors` into at most `k` groups.
///
/// `k` is clamped to `1..=vectors.len()`; `max_iterations` is at least one round.
pub fn partition<R: Rng + ?Sized>(
    vectors: &[FeatureVector],
    k: usize,
    max_iterations: usize,
    rng: &mut R,
) -> Partition {
    if vectors.is_empty() {
        return Partition {
            assignments: Vec::new(),
            centroids: Vec::new(),
            iterations: 0,
        };
    }

    let k = k.clamp(1, vectors.len());
    let centroids = initial_centroids(vectors, k, rng);
    refine(vectors, centroids, max_iterations)
}

/// Run Lloyd's iterations from the given starting centroids
pub fn refine(
    vectors: &[FeatureVector],
    mut centroids: Vec<FeatureVector>,
    max_iterations: usize,
) -> Partition {
    // Before the first round every vector counts as assigned to centroid 0
    let mut assignments = vec![0usize; vectors.len()];
    let mut iterations = 0;

    for _ in 0..max_iterations.max(1) {
        iterations += 1;

        let next: Vec<usize> = vectors
            .iter()
            .map(|vector| nearest_centroid(vector, &centroids))
            .collect();

        centroids = update_centroids(vectors, &next, &centroids);

        let converged = next == assignments;
        assignments = next;

        if converged {
            break;
        }
    }

    tracing::debug!(
        "K-means finished after {} iteration(s) with k={}",
        iterations,
        centroids.len()
    );

    Partition {
        assignments,
        centroids,
        iterations,
    }
}
