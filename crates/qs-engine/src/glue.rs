//! Generalized likelihood uncertainty estimation (GLUE) over scored
//! collections.
//!
//! Treats each retained sample's score as a likelihood weight and reads
//! credible bounds off the likelihood-weighted empirical distribution of a
//! derived value (a parameter, a prediction, any scalar the caller pairs
//! with the weight).

/// One observation: a likelihood weight and the value it supports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LikelihoodValue {
    pub likelihood: f64,
    pub value: f64,
}

/// Values at the `lower` and `upper` cumulative-likelihood crossings.
///
/// Points are sorted by value, likelihoods normalized to sum to one, and
/// the bound is the first value whose cumulative weight exceeds each tail.
/// Returns `None` for an empty set or non-positive total likelihood.
pub fn credible_interval(
    points: &[LikelihoodValue],
    lower: f64,
    upper: f64,
) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let total: f64 = points.iter().map(|p| p.likelihood).sum();
    if total <= 0.0 {
        return None;
    }

    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.value.total_cmp(&b.value));

    let mut cumulative = 0.0;
    let mut low_bound = None;
    for point in &sorted {
        cumulative += point.likelihood / total;
        if low_bound.is_none() && cumulative > lower {
            low_bound = Some(point.value);
            continue;
        }
        if cumulative > upper {
            return Some((low_bound.unwrap_or(point.value), point.value));
        }
    }
    // Upper tail never crossed (e.g. rounding at the last point): close the
    // interval at the largest value.
    let last = sorted.last().map(|p| p.value)?;
    Some((low_bound.unwrap_or(last), last))
}

/// The conventional 90% band: 5th and 95th weighted percentiles.
pub fn interval_90(points: &[LikelihoodValue]) -> Option<(f64, f64)> {
    credible_interval(points, 0.05, 0.95)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_points(n: usize) -> Vec<LikelihoodValue> {
        (0..n)
            .map(|i| LikelihoodValue {
                likelihood: 1.0,
                value: i as f64,
            })
            .collect()
    }

    #[test]
    fn equal_weights_give_plain_percentiles() {
        let points = uniform_points(100);
        let (low, high) = interval_90(&points).unwrap();
        // Cumulative weight crosses 0.05 at the 6th point (value 5) and
        // 0.95 at the 96th (value 95).
        assert_eq!(low, 5.0);
        assert_eq!(high, 95.0);
    }

    #[test]
    fn heavy_weight_pulls_the_bounds() {
        let mut points = uniform_points(10);
        points[7].likelihood = 1000.0;
        // The dominant point crosses both tails at once; the lower bound
        // lands on it and the upper bound closes at the next value.
        let (low, high) = interval_90(&points).unwrap();
        assert_eq!(low, 7.0);
        assert_eq!(high, 8.0);
    }

    #[test]
    fn dominant_last_point_closes_the_interval() {
        let mut points = uniform_points(5);
        points[4].likelihood = 1000.0;
        let (low, high) = interval_90(&points).unwrap();
        assert_eq!(low, 4.0);
        assert_eq!(high, 4.0);
    }

    #[test]
    fn unsorted_input_is_sorted_by_value() {
        let points = vec![
            LikelihoodValue { likelihood: 1.0, value: 9.0 },
            LikelihoodValue { likelihood: 1.0, value: 1.0 },
            LikelihoodValue { likelihood: 1.0, value: 5.0 },
        ];
        let (low, high) = credible_interval(&points, 0.2, 0.8).unwrap();
        assert_eq!(low, 1.0);
        assert_eq!(high, 9.0);
    }

    #[test]
    fn degenerate_inputs_return_none() {
        assert!(interval_90(&[]).is_none());
        let zero = vec![LikelihoodValue { likelihood: 0.0, value: 1.0 }];
        assert!(interval_90(&zero).is_none());
    }
}
