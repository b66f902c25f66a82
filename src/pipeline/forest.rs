//! Random forest impurity importances
//!
//! Grows CART trees on bootstrap samples and accumulates the weighted impurity
//! decrease of every split per feature (mean decrease in impurity). Trees are
//! not kept: only the importances are needed.
//!
//! Classification trees split on Gini impurity, regression trees on variance.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Minimum impurity decrease for a split to count.
const MIN_GAIN: f64 = 1e-12;

/// Learning task, chosen from the target column kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    Classification,
    Regression,
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Task::Classification => write!(f, "classification"),
            Task::Regression => write!(f, "regression"),
        }
    }
}

/// Configuration for the random forest.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestConfig {
    /// Number of trees. Default: 100.
    pub n_trees: usize,
    /// Maximum tree depth. Default: 12.
    pub max_depth: usize,
    /// Minimum samples in a node before it may split. Default: 2.
    pub min_samples_split: usize,
    /// Features tried per split. `None` uses sqrt(n) for classification and
    /// all features for regression.
    pub max_features: Option<usize>,
    /// Seed for bootstrap sampling and feature subsets. Default: 42.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 12,
            min_samples_split: 2,
            max_features: None,
            seed: 42,
        }
    }
}

impl ForestConfig {
    /// Sets the number of trees.
    pub fn n_trees(mut self, n: usize) -> Self {
        self.n_trees = n;
        self
    }

    /// Sets the maximum depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the minimum node size for splitting.
    pub fn min_samples_split(mut self, n: usize) -> Self {
        self.min_samples_split = n;
        self
    }

    /// Sets the number of features tried per split.
    pub fn max_features(mut self, n: usize) -> Self {
        self.max_features = Some(n);
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn features_per_split(&self, task: Task, n_features: usize) -> usize {
        let m = match (self.max_features, task) {
            (Some(m), _) => m,
            (None, Task::Classification) => (n_features as f64).sqrt().round() as usize,
            (None, Task::Regression) => n_features,
        };
        m.clamp(1, n_features.max(1))
    }
}

/// Running statistics of the targets in one node.
#[derive(Debug, Clone)]
struct NodeStats {
    count: f64,
    class_counts: Vec<f64>,
    sum: f64,
    sum_sq: f64,
}

impl NodeStats {
    fn new(n_classes: usize) -> Self {
        Self {
            count: 0.0,
            class_counts: vec![0.0; n_classes],
            sum: 0.0,
            sum_sq: 0.0,
        }
    }

    fn add(&mut self, y: f64, task: Task) {
        self.count += 1.0;
        match task {
            Task::Classification => self.class_counts[y as usize] += 1.0,
            Task::Regression => {
                self.sum += y;
                self.sum_sq += y * y;
            }
        }
    }

    fn remove(&mut self, y: f64, task: Task) {
        self.count -= 1.0;
        match task {
            Task::Classification => self.class_counts[y as usize] -= 1.0,
            Task::Regression => {
                self.sum -= y;
                self.sum_sq -= y * y;
            }
        }
    }

    /// Gini impurity or variance of the node.
    fn impurity(&self, task: Task) -> f64 {
        if self.count == 0.0 {
            return 0.0;
        }
        match task {
            Task::Classification => {
                1.0 - self
                    .class_counts
                    .iter()
                    .map(|c| (c / self.count).powi(2))
                    .sum::<f64>()
            }
            Task::Regression => {
                let mean = self.sum / self.count;
                (self.sum_sq / self.count - mean * mean).max(0.0)
            }
        }
    }
}

struct TreeBuilder<'a> {
    features: &'a [Vec<f64>],
    targets: &'a [f64],
    task: Task,
    n_classes: usize,
    config: &'a ForestConfig,
    rng: StdRng,
    importances: Vec<f64>,
}

impl<'a> TreeBuilder<'a> {
    fn stats(&self, samples: &[usize]) -> NodeStats {
        let mut stats = NodeStats::new(self.n_classes);
        for &s in samples {
            stats.add(self.targets[s], self.task);
        }
        stats
    }

    fn grow(&mut self, samples: Vec<usize>, depth: usize) {
        if depth >= self.config.max_depth || samples.len() < self.config.min_samples_split {
            return;
        }

        let parent = self.stats(&samples);
        let parent_impurity = parent.impurity(self.task);
        if parent_impurity <= 0.0 {
            return;
        }

        let mut candidates: Vec<usize> = (0..self.features.len()).collect();
        candidates.shuffle(&mut self.rng);
        candidates.truncate(
            self.config
                .features_per_split(self.task, self.features.len()),
        );

        let mut best: Option<(usize, f64, f64)> = None; // (feature, threshold, gain)
        for feature in candidates {
            if let Some((threshold, gain)) =
                self.best_split(&samples, feature, &parent, parent_impurity)
            {
                if best.map_or(true, |(_, _, g)| gain > g) {
                    best = Some((feature, threshold, gain));
                }
            }
        }

        let Some((feature, threshold, gain)) = best else {
            return;
        };
        self.importances[feature] += gain;

        let values = &self.features[feature];
        let (left, right): (Vec<usize>, Vec<usize>) =
            samples.into_iter().partition(|&s| values[s] <= threshold);
        self.grow(left, depth + 1);
        self.grow(right, depth + 1);
    }

    /// Best threshold on one feature, as `(threshold, weighted impurity decrease)`.
    fn best_split(
        &self,
        samples: &[usize],
        feature: usize,
        parent: &NodeStats,
        parent_impurity: f64,
    ) -> Option<(f64, f64)> {
        let values = &self.features[feature];
        let mut order: Vec<usize> = samples.to_vec();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

        let mut left = NodeStats::new(self.n_classes);
        let mut right = parent.clone();
        let n = parent.count;
        let mut best: Option<(f64, f64)> = None;

        for i in 0..order.len() - 1 {
            let y = self.targets[order[i]];
            left.add(y, self.task);
            right.remove(y, self.task);

            let (current, next) = (values[order[i]], values[order[i + 1]]);
            // Never split between equal values
            if current == next {
                continue;
            }

            let gain = n * parent_impurity
                - left.count * left.impurity(self.task)
                - right.count * right.impurity(self.task);
            if gain > MIN_GAIN && best.map_or(true, |(_, g)| gain > g) {
                best = Some(((current + next) / 2.0, gain));
            }
        }

        best
    }
}

/// Mean decrease in impurity per feature.
///
/// `features` is column-major (one vector per feature, all of `targets.len()`
/// rows). For classification, targets are class indices `0..k`. Importances are
/// normalized per tree and averaged, so they sum to 1 unless no tree split.
pub fn forest_importances(
    features: &[Vec<f64>],
    targets: &[f64],
    task: Task,
    config: &ForestConfig,
) -> Vec<f64> {
    let n_rows = targets.len();
    let mut totals = vec![0.0; features.len()];
    if features.is_empty() || n_rows == 0 || config.n_trees == 0 {
        return totals;
    }

    let n_classes = match task {
        Task::Classification => targets.iter().fold(0usize, |m, &y| m.max(y as usize + 1)),
        Task::Regression => 0,
    };

    for tree in 0..config.n_trees {
        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(tree as u64));
        let bootstrap: Vec<usize> = (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect();

        let mut builder = TreeBuilder {
            features,
            targets,
            task,
            n_classes,
            config,
            rng,
            importances: vec![0.0; features.len()],
        };
        builder.grow(bootstrap, 0);

        let tree_total: f64 = builder.importances.iter().sum();
        if tree_total > 0.0 {
            for (total, imp) in totals.iter_mut().zip(&builder.importances) {
                *total += imp / tree_total;
            }
        }
    }

    for total in &mut totals {
        *total /= config.n_trees as f64;
    }
    totals
}
