//! CART decision tree

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2};
use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

/// Impurity criterion
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Criterion {
    /// Gini impurity (classification)
    Gini,
    /// Variance of the target (regression)
    Mse,
}

/// Sufficient statistics of a node for either criterion
#[derive(Debug, Clone)]
struct NodeStats {
    count: usize,
    sum: f64,
    sq_sum: f64,
    class_counts: Vec<usize>,
}

impl NodeStats {
    fn empty(n_classes: usize) -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sq_sum: 0.0,
            class_counts: vec![0; n_classes],
        }
    }

    fn add(&mut self, y: f64, class: Option<usize>) {
        self.count += 1;
        self.sum += y;
        self.sq_sum += y * y;
        if let Some(c) = class {
            self.class_counts[c] += 1;
        }
    }

    fn remove(&mut self, y: f64, class: Option<usize>) {
        self.count -= 1;
        self.sum -= y;
        self.sq_sum -= y * y;
        if let Some(c) = class {
            self.class_counts[c] -= 1;
        }
    }

    fn impurity(&self, criterion: Criterion) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let n = self.count as f64;
        match criterion {
            Criterion::Gini => {
                1.0 - self
                    .class_counts
                    .iter()
                    .map(|&c| (c as f64 / n).powi(2))
                    .sum::<f64>()
            }
            Criterion::Mse => (self.sq_sum / n - (self.sum / n).powi(2)).max(0.0),
        }
    }
}

/// Best split found for a node
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

/// Decision tree model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features drawn at random for every split; all when `None`
    pub max_features: Option<usize>,
    pub criterion: Criterion,
    pub random_state: Option<u64>,
    n_features: usize,
    feature_importances: Option<Array1<f64>>,
    /// Sorted distinct labels (classification)
    classes: Vec<f64>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new_regressor()
    }
}

impl DecisionTree {
    fn with_criterion_defaults(criterion: Criterion) -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            criterion,
            random_state: None,
            n_features: 0,
            feature_importances: None,
            classes: Vec::new(),
        }
    }

    /// Create a new classifier tree
    pub fn new_classifier() -> Self {
        Self::with_criterion_defaults(Criterion::Gini)
    }

    /// Create a new regressor tree
    pub fn new_regressor() -> Self {
        Self::with_criterion_defaults(Criterion::Mse)
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples: usize) -> Self {
        self.min_samples_leaf = min_samples.max(1);
        self
    }

    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    fn is_classification(&self) -> bool {
        self.criterion == Criterion::Gini
    }

    /// Fit the tree to training data
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 || n_features == 0 {
            return Err(PipelineError::TrainingError(
                "cannot fit a tree on an empty matrix".to_string(),
            ));
        }

        self.n_features = n_features;
        let class_of: Vec<Option<usize>> = if self.is_classification() {
            let mut classes: Vec<f64> = y.iter().copied().collect();
            classes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            classes.dedup();
            let class_of = y
                .iter()
                .map(|v| classes.iter().position(|c| c == v))
                .collect();
            self.classes = classes;
            class_of
        } else {
            vec![None; n_samples]
        };

        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state.unwrap_or(0));
        let mut importances = vec![0.0; n_features];
        let indices: Vec<usize> = (0..n_samples).collect();

        let ctx = FitContext { x, y, class_of: &class_of };
        let root = self.build_node(&ctx, indices, 0, &mut rng, &mut importances);
        self.root = Some(root);

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    fn stats_of(&self, ctx: &FitContext<'_>, indices: &[usize]) -> NodeStats {
        let mut stats = NodeStats::empty(self.classes.len());
        for &i in indices {
            stats.add(ctx.y[i], ctx.class_of[i]);
        }
        stats
    }

    fn leaf_value(&self, stats: &NodeStats) -> f64 {
        if self.is_classification() {
            // majority class, lowest label on ties
            let mut best = 0;
            for (idx, &count) in stats.class_counts.iter().enumerate() {
                if count > stats.class_counts[best] {
                    best = idx;
                }
            }
            self.classes.get(best).copied().unwrap_or(0.0)
        } else if stats.count == 0 {
            0.0
        } else {
            stats.sum / stats.count as f64
        }
    }

    fn build_node(
        &self,
        ctx: &FitContext<'_>,
        indices: Vec<usize>,
        depth: usize,
        rng: &mut ChaCha8Rng,
        importances: &mut [f64],
    ) -> TreeNode {
        let n_samples = indices.len();
        let stats = self.stats_of(ctx, &indices);
        let impurity = stats.impurity(self.criterion);

        let should_stop = n_samples < self.min_samples_split
            || n_samples < 2 * self.min_samples_leaf
            || self.max_depth.is_some_and(|d| depth >= d)
            || impurity <= 1e-12;

        if should_stop {
            return TreeNode::Leaf {
                value: self.leaf_value(&stats),
                n_samples,
            };
        }

        let Some(split) = self.find_best_split(ctx, &indices, &stats, rng) else {
            return TreeNode::Leaf {
                value: self.leaf_value(&stats),
                n_samples,
            };
        };

        importances[split.feature_idx] += n_samples as f64 * split.gain;

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| ctx.x[[i, split.feature_idx]] <= split.threshold);

        let left = Box::new(self.build_node(ctx, left_indices, depth + 1, rng, importances));
        let right = Box::new(self.build_node(ctx, right_indices, depth + 1, rng, importances));

        TreeNode::Split {
            feature_idx: split.feature_idx,
            threshold: split.threshold,
            left,
            right,
            n_samples,
        }
    }

    /// Sorted sweep over a random subset of features
    fn find_best_split(
        &self,
        ctx: &FitContext<'_>,
        indices: &[usize],
        parent: &NodeStats,
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n_features = ctx.x.ncols();
        let k = self.max_features.unwrap_or(n_features).clamp(1, n_features);
        let features: Vec<usize> = if k < n_features {
            index::sample(rng, n_features, k).into_vec()
        } else {
            (0..n_features).collect()
        };

        let n = indices.len() as f64;
        let parent_impurity = parent.impurity(self.criterion);
        let mut best: Option<SplitCandidate> = None;
        let mut sorted = indices.to_vec();

        for feature_idx in features {
            sorted.sort_by(|&a, &b| {
                ctx.x[[a, feature_idx]]
                    .partial_cmp(&ctx.x[[b, feature_idx]])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mut left = NodeStats::empty(self.classes.len());
            let mut right = parent.clone();

            for pos in 0..sorted.len() - 1 {
                let i = sorted[pos];
                left.add(ctx.y[i], ctx.class_of[i]);
                right.remove(ctx.y[i], ctx.class_of[i]);

                let current = ctx.x[[i, feature_idx]];
                let next = ctx.x[[sorted[pos + 1], feature_idx]];
                if next <= current {
                    continue;
                }
                if left.count < self.min_samples_leaf || right.count < self.min_samples_leaf {
                    continue;
                }

                let weighted = (left.count as f64 * left.impurity(self.criterion)
                    + right.count as f64 * right.impurity(self.criterion))
                    / n;
                let gain = parent_impurity - weighted;
                if gain > best.as_ref().map_or(1e-12, |b| b.gain) {
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold: (current + next) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }

    /// Make predictions
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(PipelineError::ModelNotFitted)?;
        if x.ncols() != self.n_features {
            return Err(PipelineError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        Ok(x.rows()
            .into_iter()
            .map(|row| {
                let mut node = root;
                loop {
                    match node {
                        TreeNode::Leaf { value, .. } => break *value,
                        TreeNode::Split {
                            feature_idx,
                            threshold,
                            left,
                            right,
                            ..
                        } => {
                            node = if row[*feature_idx] <= *threshold { left.as_ref() } else { right.as_ref() };
                        }
                    }
                }
            })
            .collect())
    }

    /// Normalized impurity decrease per feature
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    /// Depth of the fitted tree, a lone leaf counting as 1
    pub fn depth(&self) -> usize {
        fn node_depth(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + node_depth(left).max(node_depth(right)),
            }
        }
        self.root.as_ref().map_or(0, node_depth)
    }

    pub fn n_leaves(&self) -> usize {
        fn count(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => count(left) + count(right),
            }
        }
        self.root.as_ref().map_or(0, count)
    }
}

struct FitContext<'a> {
    x: &'a Array2<f64>,
    y: &'a Array1<f64>,
    class_of: &'a [Option<usize>],
}
