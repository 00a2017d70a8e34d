use serde::{Deserialize, Serialize};

pub const DEFAULT_BUCKETS: usize = 20;

/// One point of the score histogram: the bucket midpoint and how many
/// respondents fell into it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionPoint {
    pub score: f64,
    pub users: u64,
}

/// Histograms scores into equal-width buckets over [0, 100].
///
/// The result has `bucket_count + 2` points: a zero-count point at score 0,
/// the buckets labelled by their midpoints, and a zero-count point at score
/// 100. The outer two points only anchor a chart's axis.
pub fn build_distribution(scores: &[f64], bucket_count: usize) -> Vec<DistributionPoint> {
    let bucket_count = bucket_count.max(1);
    let width = 100.0 / bucket_count as f64;

    let mut buckets: Vec<DistributionPoint> = (0..bucket_count)
        .map(|i| DistributionPoint {
            score: (i as f64 + 0.5) * width,
            users: 0,
        })
        .collect();

    for score in scores {
        buckets[bucket_index(*score, bucket_count)].users += 1;
    }

    let mut points = Vec::with_capacity(bucket_count + 2);
    points.push(DistributionPoint { score: 0.0, users: 0 });
    points.extend(buckets);
    points.push(DistributionPoint { score: 100.0, users: 0 });
    points
}

/// Index into the real buckets (sentinels excluded) that a score falls into.
pub fn bucket_index(score: f64, bucket_count: usize) -> usize {
    let bucket_count = bucket_count.max(1);
    let width = 100.0 / bucket_count as f64;
    // A score of exactly 100 would index one past the end. Float-to-usize
    // casts saturate, so negative or NaN scores land on the first bucket.
    ((score / width).floor() as usize).min(bucket_count - 1)
}
