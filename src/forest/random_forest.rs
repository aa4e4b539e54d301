use log::debug;
use ndarray::{Array1, Array2};
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{
    tree::{DecisionTree, TreeParams},
    ForestError, Result,
};

/// Hyperparameters of a `RandomForest`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 60,
            max_depth: 8,
            min_samples_split: 2,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

impl ForestParams {
    fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(ForestError::InvalidParam("n_estimators must be at least 1".into()));
        }
        if self.min_samples_split < 2 {
            return Err(ForestError::InvalidParam("min_samples_split must be at least 2".into()));
        }
        if self.min_samples_leaf == 0 {
            return Err(ForestError::InvalidParam("min_samples_leaf must be at least 1".into()));
        }
        Ok(())
    }
}

/// A bagged ensemble of Gini decision trees with per-node feature sampling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    n_features: usize,
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fits a new forest.
    ///
    /// Per-tree seeds are drawn sequentially from `params.seed`, so the result is the
    /// same regardless of how rayon schedules the trees.
    ///
    /// # Arguments
    /// * `params` - The forest's hyperparameters.
    /// * `x` - Feature matrix, one row per sample.
    /// * `y` - Class index per sample.
    ///
    /// # Errors
    /// `ForestError` if the data is empty, the shapes disagree, or a parameter is out of range.
    pub fn fit(params: ForestParams, x: &Array2<f64>, y: &Array1<usize>) -> Result<Self> {
        params.validate()?;

        let n_samples = x.nrows();
        if n_samples == 0 {
            return Err(ForestError::EmptyDataset);
        }
        if y.len() != n_samples {
            return Err(ForestError::ShapeMismatch {
                what: "labels",
                got: y.len(),
                expected: n_samples,
            });
        }

        let n_features = x.ncols();
        let n_classes = y.iter().max().map_or(0, |&c| c + 1).max(2);
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            min_samples_leaf: params.min_samples_leaf,
            max_features: ((n_features as f64).sqrt().floor() as usize).max(1),
        };

        let mut master = StdRng::seed_from_u64(params.seed);
        let seeds: Vec<u64> = (0..params.n_estimators).map(|_| master.next_u64()).collect();

        let trees = seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let bootstrap = (0..n_samples).map(|_| rng.random_range(0..n_samples)).collect();
                DecisionTree::fit(x.view(), y.view(), n_classes, bootstrap, tree_params, &mut rng)
            })
            .collect::<Vec<_>>();

        debug!(
            "fitted {} trees, max depth {}",
            trees.len(),
            trees.iter().map(DecisionTree::depth).max().unwrap_or(0)
        );

        Ok(Self {
            params,
            n_features,
            n_classes,
            trees,
        })
    }

    /// Averages the class probabilities of every tree for one row.
    ///
    /// # Errors
    /// `ForestError::ShapeMismatch` if the row doesn't have `n_features` values.
    pub fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.n_features {
            return Err(ForestError::ShapeMismatch {
                what: "features",
                got: row.len(),
                expected: self.n_features,
            });
        }

        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.predict_proba(row)) {
                *acc += p;
            }
        }

        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }

    /// Most probable class for one row, ties going to the lower class.
    pub fn predict(&self, row: &[f64]) -> Result<usize> {
        self.classify(row).map(|(class, _)| class)
    }

    /// Returns both the predicted class and the probabilities it was picked from.
    pub fn classify(&self, row: &[f64]) -> Result<(usize, Vec<f64>)> {
        let proba = self.predict_proba(row)?;
        Ok((argmax(&proba), proba))
    }

    /// Predicts every row of a matrix.
    pub fn predict_batch(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        x.rows()
            .into_iter()
            .map(|row| self.predict(&row.to_vec()))
            .collect::<Result<Vec<_>>>()
            .map(Array1::from_vec)
    }

    /// Mean impurity-based importance of each feature across trees.
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut importances = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (acc, imp) in importances.iter_mut().zip(tree.feature_importances()) {
                *acc += imp;
            }
        }

        let n_trees = self.trees.len() as f64;
        importances.iter_mut().for_each(|imp| *imp /= n_trees);
        importances
    }

    /// Checks a forest read from disk can be queried without panicking.
    ///
    /// # Errors
    /// `ForestError::Corrupt` naming the first offending tree.
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(ForestError::Corrupt("no trees".into()));
        }
        if self.n_classes < 2 {
            return Err(ForestError::Corrupt(format!("{} classes", self.n_classes)));
        }

        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.n_classes)
                .map_err(|msg| ForestError::Corrupt(format!("tree {idx}: {msg}")))?;
        }
        Ok(())
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (idx, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = idx;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two well separated blobs; the label follows the first feature.
    fn blobs(n: usize) -> (Array2<f64>, Array1<usize>) {
        let x = Array2::from_shape_fn((n, 3), |(r, c)| match c {
            0 => if r % 2 == 0 { 1.0 + (r % 5) as f64 } else { 20.0 + (r % 7) as f64 },
            1 => (r % 3) as f64,
            _ => 360.0,
        });
        let y = Array1::from_iter((0..n).map(|r| r % 2));
        (x, y)
    }

    fn params(n_estimators: usize) -> ForestParams {
        ForestParams {
            n_estimators,
            ..ForestParams::default()
        }
    }

    #[test]
    fn learns_separable_data() {
        let (x, y) = blobs(60);
        let forest = RandomForest::fit(params(15), &x, &y).unwrap();

        assert_eq!(forest.n_trees(), 15);
        assert_eq!(forest.predict(&[2.0, 1.0, 360.0]).unwrap(), 0);
        assert_eq!(forest.predict(&[22.0, 1.0, 360.0]).unwrap(), 1);

        let predicted = forest.predict_batch(&x).unwrap();
        assert_eq!(predicted, y);
    }

    #[test]
    fn probabilities_sum_to_one() {
        let (x, y) = blobs(40);
        let forest = RandomForest::fit(params(10), &x, &y).unwrap();
        let proba = forest.predict_proba(&[10.0, 2.0, 360.0]).unwrap();
        assert_eq!(proba.len(), 2);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn same_seed_same_forest() {
        let (x, y) = blobs(50);
        let a = RandomForest::fit(params(8), &x, &y).unwrap();
        let b = RandomForest::fit(params(8), &x, &y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn importances_favor_informative_feature() {
        let (x, y) = blobs(60);
        let forest = RandomForest::fit(params(20), &x, &y).unwrap();
        let imp = forest.feature_importances();
        assert!(imp[0] > imp[1]);
        assert_eq!(imp[2], 0.0);
    }

    #[test]
    fn rejects_invalid_input() {
        let (x, y) = blobs(10);
        assert_eq!(
            RandomForest::fit(params(0), &x, &y).unwrap_err(),
            ForestError::InvalidParam("n_estimators must be at least 1".into())
        );

        let short = Array1::from_vec(vec![0, 1]);
        assert!(matches!(
            RandomForest::fit(params(3), &x, &short),
            Err(ForestError::ShapeMismatch { what: "labels", .. })
        ));

        let empty_x = Array2::<f64>::zeros((0, 3));
        let empty_y = Array1::<usize>::zeros(0);
        assert_eq!(
            RandomForest::fit(params(3), &empty_x, &empty_y).unwrap_err(),
            ForestError::EmptyDataset
        );

        let forest = RandomForest::fit(params(3), &x, &y).unwrap();
        assert!(forest.predict(&[1.0]).is_err());
    }

    #[test]
    fn fitted_forest_validates_and_empty_one_does_not() {
        let (x, y) = blobs(20);
        let mut forest = RandomForest::fit(params(4), &x, &y).unwrap();
        assert_eq!(forest.validate(), Ok(()));

        forest.n_features = 5;
        assert!(matches!(forest.validate(), Err(ForestError::Corrupt(msg)) if msg.starts_with("tree 0")));

        forest.trees.clear();
        assert_eq!(forest.validate(), Err(ForestError::Corrupt("no trees".into())));
    }

    #[test]
    fn argmax_prefers_lower_class_on_ties() {
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        assert_eq!(argmax(&[0.2, 0.8]), 1);
    }
}
