//! Feature importance aggregation across trees.

/// A feature with its normalized importance and 1-based rank.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedFeature {
    /// Feature name.
    pub name: String,
    /// Mean decrease in impurity, normalized to sum to 1.0 across features.
    pub importance: f64,
    /// 1 = most important.
    pub rank: usize,
}

/// Average per-tree importances, renormalize, and rank descending.
///
/// A stable sort keeps ties in column order.
pub(crate) fn aggregate_importances(per_tree: &[Vec<f64>], names: &[String]) -> Vec<RankedFeature> {
    if per_tree.is_empty() || names.is_empty() {
        return Vec::new();
    }

    let mut totals = vec![0.0f64; names.len()];
    for tree in per_tree {
        for (acc, &v) in totals.iter_mut().zip(tree) {
            *acc += v;
        }
    }
    let sum: f64 = totals.iter().sum();
    if sum > 0.0 {
        totals.iter_mut().for_each(|v| *v /= sum);
    }

    let mut ranked: Vec<RankedFeature> = names
        .iter()
        .zip(totals)
        .map(|(name, importance)| RankedFeature {
            name: name.clone(),
            importance,
            rank: 0,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    for (i, feature) in ranked.iter_mut().enumerate() {
        feature.rank = i + 1;
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: &[&str]) -> Vec<String> {
        n.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ranks_descending() {
        let ranked = aggregate_importances(
            &[vec![0.2, 0.8, 0.0], vec![0.4, 0.6, 0.0]],
            &names(&["a", "b", "c"]),
        );
        let order: Vec<&str> = ranked.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(order, ["b", "a", "c"]);
        assert_eq!(ranked[0].rank, 1);
        assert!((ranked[0].importance - 0.7).abs() < 1e-12);
    }

    #[test]
    fn all_zero_stays_zero() {
        let ranked = aggregate_importances(&[vec![0.0, 0.0]], &names(&["a", "b"]));
        assert!(ranked.iter().all(|f| f.importance == 0.0));
        assert_eq!(ranked[0].name, "a");
    }

    #[test]
    fn empty_inputs() {
        assert!(aggregate_importances(&[], &names(&["a"])).is_empty());
    }
}
