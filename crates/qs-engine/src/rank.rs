//! Ranking of evaluated samples by objective value.

/// Produce the permutation of sample indices ordered by score.
///
/// With `minimize` set, index 0 names the smallest score; otherwise the
/// sorted order is reversed so index 0 names the largest. The sort is
/// stable and keyed only on the score (`f64::total_cmp`), so ties keep
/// ascending input order when minimizing and the reversal flips that when
/// maximizing; NaN orders after positive infinity.
pub fn rank_samples(scores: &[f64], minimize: bool) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));
    if !minimize {
        order.reverse();
    }
    order
}
