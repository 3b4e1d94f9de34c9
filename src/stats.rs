use std::collections::BTreeMap;

/// Running sum and count of a group of values.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    n_vals: usize,
    sum: f64,
}

impl Accumulator {
    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;
        self.sum += val;
    }

    pub fn mean(&self) -> f64 {
        if self.n_vals == 0 {
            return f64::NAN;
        }
        self.sum / self.n_vals as f64
    }
}

/// Mean of the values sharing each key, ordered by key.
pub fn group_means<K, I>(items: I) -> BTreeMap<K, f64>
where
    K: Ord,
    I: IntoIterator<Item = (K, f64)>,
{
    let mut groups: BTreeMap<K, Accumulator> = BTreeMap::new();
    for (key, val) in items {
        groups.entry(key).or_default().add(val);
    }
    groups
        .into_iter()
        .map(|(key, acc)| (key, acc.mean()))
        .collect()
}

pub fn compute_mean(vals: &[f64]) -> f64 {
    if vals.is_empty() {
        return f64::NAN;
    }
    vals.iter().sum::<f64>() / vals.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_mean_is_nan_until_first_value() {
        let mut acc = Accumulator::default();
        assert!(acc.mean().is_nan());

        for val in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            acc.add(val);
        }

        assert_eq!(acc.mean(), 5.0);
    }

    #[test]
    fn group_means_orders_by_key() {
        let means = group_means([("b", 1.0), ("a", 2.0), ("b", 3.0)]);
        let pairs: Vec<_> = means.into_iter().collect();
        assert_eq!(pairs, vec![("a", 2.0), ("b", 2.0)]);
    }

    #[test]
    fn group_means_is_sum_over_count() {
        let vals = [0.1, 0.2, 0.7, 0.3, 0.9, 0.4, 0.6];

        let means = group_means(vals.iter().map(|&val| ("k", val)));

        assert_eq!(means["k"], vals.iter().sum::<f64>() / vals.len() as f64);
        assert_eq!(means["k"], compute_mean(&vals));
    }

    #[test]
    fn compute_mean_of_empty_slice_is_nan() {
        assert!(compute_mean(&[]).is_nan());
        assert_eq!(compute_mean(&[1.0, 2.0, 6.0]), 3.0);
    }
}
