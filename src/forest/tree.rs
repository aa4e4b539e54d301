use ndarray::{ArrayView1, ArrayView2};
use rand::{rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

/// Growth limits of a single tree.
#[derive(Debug, Clone, Copy)]
pub(super) struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Non-constant features scanned at every node.
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        /// Class probabilities of the training samples that reached this leaf.
        proba: Vec<f64>,
        n_samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A CART classification tree grown with Gini impurity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Node,
    /// Impurity decrease per feature, normalized to sum to 1 (all zeros for a stump).
    importances: Vec<f64>,
}

struct Builder<'a> {
    x: ArrayView2<'a, f64>,
    y: ArrayView1<'a, usize>,
    n_classes: usize,
    params: TreeParams,
    importances: Vec<f64>,
}

impl DecisionTree {
    /// Grows a tree over the given sample indices.
    ///
    /// # Arguments
    /// * `x` - Feature matrix, one row per sample.
    /// * `y` - Class index per sample, all below `n_classes`.
    /// * `samples` - Rows to grow from; repeated rows act as weights (bootstrap).
    /// * `rng` - Drives the per-node feature sampling.
    pub(super) fn fit(
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, usize>,
        n_classes: usize,
        samples: Vec<usize>,
        params: TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let mut builder = Builder {
            x,
            y,
            n_classes,
            params,
            importances: vec![0.0; x.ncols()],
        };

        let root = builder.grow(samples, 0, rng);

        let mut importances = builder.importances;
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|imp| *imp /= total);
        }

        Self { root, importances }
    }

    /// Class probabilities of the leaf `row` falls into.
    pub fn predict_proba(&self, row: &[f64]) -> &[f64] {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { proba, .. } => return proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    /// Checks every node can be evaluated on rows of `n_features` values and
    /// yields `n_classes` probabilities.
    pub(super) fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.importances.len() != n_features {
            return Err(format!(
                "{} feature importances, expected {n_features}",
                self.importances.len()
            ));
        }

        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            match node {
                Node::Leaf { proba, .. } => {
                    if proba.len() != n_classes {
                        return Err(format!(
                            "leaf with {} class probabilities, expected {n_classes}",
                            proba.len()
                        ));
                    }
                }
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "split on feature {feature}, rows have {n_features}"
                        ));
                    }
                    stack.push(left);
                    stack.push(right);
                }
            }
        }

        Ok(())
    }

    pub fn depth(&self) -> usize {
        fn depth(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        depth(&self.root)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }
}

impl Builder<'_> {
    fn grow(&mut self, samples: Vec<usize>, depth: usize, rng: &mut StdRng) -> Node {
        let counts = self.class_counts(&samples);
        let n = samples.len();

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        if pure || depth >= self.params.max_depth || n < self.params.min_samples_split {
            return self.leaf(&counts, n);
        }

        let Some(split) = self.best_split(&samples, &counts, rng) else {
            return self.leaf(&counts, n);
        };

        self.importances[split.feature] += n as f64 * split.gain;

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| self.x[[i, split.feature]] <= split.threshold);

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.grow(left, depth + 1, rng)),
            right: Box::new(self.grow(right, depth + 1, rng)),
        }
    }

    fn leaf(&self, counts: &[usize], n: usize) -> Node {
        let proba = counts.iter().map(|&c| c as f64 / n as f64).collect();
        Node::Leaf {
            proba,
            n_samples: n,
        }
    }

    fn class_counts(&self, samples: &[usize]) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &i in samples {
            counts[self.y[i]] += 1;
        }
        counts
    }

    /// Scans a random subset of features for the threshold with the largest Gini decrease.
    ///
    /// Features are visited in random order until `max_features` non-constant ones
    /// have been scanned.
    fn best_split(&self, samples: &[usize], counts: &[usize], rng: &mut StdRng) -> Option<Split> {
        let n_features = self.x.ncols();
        let n = samples.len();
        let parent = gini(counts, n);
        let min_leaf = self.params.min_samples_leaf;

        let mut best: Option<Split> = None;
        let amount = self.params.max_features.clamp(1, n_features);

        // Features that are constant within the node don't count towards `amount`.
        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(rng);
        let mut visited = 0;

        for feature in features {
            if visited == amount {
                break;
            }

            let mut order = samples.to_vec();
            order.sort_by(|&a, &b| self.x[[a, feature]].total_cmp(&self.x[[b, feature]]));
            if self.x[[order[0], feature]] == self.x[[order[n - 1], feature]] {
                continue;
            }
            visited += 1;

            let mut left = vec![0; self.n_classes];
            let mut right = counts.to_vec();

            for pos in 1..n {
                let moved = self.y[order[pos - 1]];
                left[moved] += 1;
                right[moved] -= 1;

                let lo = self.x[[order[pos - 1], feature]];
                let hi = self.x[[order[pos], feature]];
                if lo == hi || pos < min_leaf || n - pos < min_leaf {
                    continue;
                }

                let weighted =
                    (pos as f64 * gini(&left, pos) + (n - pos) as f64 * gini(&right, n - pos))
                        / n as f64;
                let gain = parent - weighted;

                if gain > best.as_ref().map_or(0.0, |b| b.gain) {
                    best = Some(Split {
                        feature,
                        threshold: (lo + hi) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }
}

struct Split {
    feature: usize,
    threshold: f64,
    gain: f64,
}

fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
}

#[cfg(test)]
mod tests {
    use ndarray::{array, Array1, Array2};
    use rand::SeedableRng;

    use super::*;

    fn params(max_depth: usize) -> TreeParams {
        TreeParams {
            max_depth,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: 2,
        }
    }

    fn fit(x: &Array2<f64>, y: &Array1<usize>, max_depth: usize) -> DecisionTree {
        let mut rng = StdRng::seed_from_u64(0);
        let samples = (0..y.len()).collect();
        DecisionTree::fit(x.view(), y.view(), 2, samples, params(max_depth), &mut rng)
    }

    #[test]
    fn gini_of_pure_and_balanced_nodes() {
        assert_eq!(gini(&[4, 0], 4), 0.0);
        assert_eq!(gini(&[2, 2], 4), 0.5);
        assert_eq!(gini(&[0, 0], 0), 0.0);
    }

    #[test]
    fn separates_threshold_data() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [10.0, 0.0], [11.0, 0.0], [12.0, 0.0]];
        let y = array![0, 0, 0, 1, 1, 1];
        let tree = fit(&x, &y, 4);

        assert_eq!(tree.predict_proba(&[0.5, 0.0]), &[1.0, 0.0]);
        assert_eq!(tree.predict_proba(&[11.5, 0.0]), &[0.0, 1.0]);
        assert_eq!(tree.depth(), 1);
        match tree.root() {
            Node::Split { feature, threshold, .. } => {
                assert_eq!(*feature, 0);
                assert_eq!(*threshold, 6.5);
            }
            leaf => panic!("expected a split, got {leaf:?}"),
        }
        assert_eq!(tree.feature_importances(), &[1.0, 0.0]);
    }

    #[test]
    fn respects_max_depth() {
        // xor-like layout needs two levels
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0], [1.0, 1.0]];
        let y = array![0, 1, 1, 0, 0, 0];
        let stump = fit(&x, &y, 0);
        assert_eq!(stump.depth(), 0);
        assert_eq!(stump.predict_proba(&[0.0, 1.0]), &[4.0 / 6.0, 2.0 / 6.0]);

        let tree = fit(&x, &y, 1);
        assert!(tree.depth() <= 1);
    }

    #[test]
    fn constant_features_produce_a_leaf() {
        let x = array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]];
        let y = array![0, 1, 1];
        let tree = fit(&x, &y, 8);
        assert_eq!(tree.depth(), 0);
        assert!(tree.feature_importances().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn validate_checks_features_and_classes() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [10.0, 0.0], [11.0, 0.0]];
        let y = array![0, 0, 1, 1];
        let tree = fit(&x, &y, 4);
        assert_eq!(tree.validate(2, 2), Ok(()));
        assert!(tree.validate(2, 3).unwrap_err().contains("class probabilities"));
        assert!(tree.validate(1, 2).is_err());

        let mut bad = tree.clone();
        if let Node::Split { feature, .. } = &mut bad.root {
            *feature = 40;
        }
        assert_eq!(
            bad.validate(2, 2).unwrap_err(),
            "split on feature 40, rows have 2"
        );
    }
}
