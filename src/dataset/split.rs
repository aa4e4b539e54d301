use std::collections::BTreeMap;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use super::{DataError, Dataset, Result};

/// Splits a dataset into train and test partitions, preserving class proportions.
///
/// Each class is shuffled on its own and `round(count * test_size)` of its samples
/// go to the test partition.
///
/// # Arguments
/// * `dataset` - The full, imputed dataset.
/// * `test_size` - Fraction of each class held out, in `(0, 1)`.
/// * `seed` - Seed for the shuffling.
///
/// # Returns
/// `(train, test)` or `DataError::InvalidSplit` if either side ends up empty.
pub fn train_test_split(dataset: &Dataset, test_size: f64, seed: u64) -> Result<(Dataset, Dataset)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(DataError::InvalidSplit(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }

    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, &label) in dataset.y().iter().enumerate() {
        by_class.entry(label).or_default().push(idx);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(dataset.len());
    let mut test = Vec::new();

    for indices in by_class.values_mut() {
        indices.shuffle(&mut rng);
        let n_test = (indices.len() as f64 * test_size).round() as usize;
        let (held_out, kept) = indices.split_at(n_test);
        test.extend_from_slice(held_out);
        train.extend_from_slice(kept);
    }

    if train.is_empty() || test.is_empty() {
        return Err(DataError::InvalidSplit(format!(
            "{} samples can't be split with test_size {test_size}",
            dataset.len()
        )));
    }

    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    Ok((dataset.select(&train), dataset.select(&test)))
}

#[cfg(test)]
mod tests {
    use ndarray::{Array1, Array2};

    use super::*;

    fn dataset(n_pos: usize, n_neg: usize) -> Dataset {
        let n = n_pos + n_neg;
        let x = Array2::from_shape_fn((n, 2), |(r, c)| (r * 2 + c) as f64);
        let y = Array1::from_iter((0..n).map(|i| usize::from(i < n_pos)));
        Dataset::new(x, y).unwrap()
    }

    #[test]
    fn preserves_class_proportions() {
        let ds = dataset(70, 30);
        let (train, test) = train_test_split(&ds, 0.2, 42).unwrap();

        assert_eq!(train.len(), 80);
        assert_eq!(test.len(), 20);
        assert_eq!(test.class_counts(), vec![6, 14]);
        assert_eq!(train.class_counts(), vec![24, 56]);
    }

    #[test]
    fn partitions_are_disjoint() {
        let ds = dataset(10, 10);
        let (train, test) = train_test_split(&ds, 0.3, 7).unwrap();

        // first feature is unique per row
        let mut seen: Vec<f64> = train.x().column(0).iter().chain(test.x().column(0)).copied().collect();
        seen.sort_by(f64::total_cmp);
        seen.dedup();
        assert_eq!(seen.len(), 20);
    }

    #[test]
    fn same_seed_same_split() {
        let ds = dataset(40, 25);
        let (a, _) = train_test_split(&ds, 0.2, 42).unwrap();
        let (b, _) = train_test_split(&ds, 0.2, 42).unwrap();
        assert_eq!(a.x(), b.x());
        assert_eq!(a.y(), b.y());
    }

    #[test]
    fn rejects_degenerate_sizes() {
        let ds = dataset(3, 2);
        assert!(train_test_split(&ds, 0.0, 1).is_err());
        assert!(train_test_split(&ds, 1.0, 1).is_err());
        assert!(matches!(
            train_test_split(&ds, 0.05, 1),
            Err(DataError::InvalidSplit(_))
        ));
    }
}
