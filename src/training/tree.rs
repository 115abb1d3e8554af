//! Histogram-based regression tree grown best-first on gradients

use ndarray::ArrayView1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::binning::{BinMapper, MISSING_BIN};

/// Minimum gain for a split to be accepted
const MIN_GAIN: f64 = 1e-12;

/// Tree node stored in a flat arena; the root is node 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with its (already shrunk) contribution
    Leaf {
        value: f64,
        n_samples: usize,
    },
    /// Internal node: `value <= threshold` goes left, NaN follows `missing_go_left`
    Split {
        feature_idx: usize,
        threshold: f64,
        missing_go_left: bool,
        left: usize,
        right: usize,
        n_samples: usize,
        gain: f64,
    },
}

/// A fitted regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistTree {
    nodes: Vec<TreeNode>,
}

impl HistTree {
    /// Predict the contribution of this tree for one row
    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    missing_go_left,
                    left,
                    right,
                    ..
                } => {
                    let v = row[*feature_idx];
                    let go_left = if v.is_nan() { *missing_go_left } else { v <= *threshold };
                    idx = if go_left { *left } else { *right };
                }
            }
        }
    }

    /// Number of leaves
    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }

    /// Depth of the deepest leaf (a single leaf has depth 0)
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            match &nodes[idx] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, 0)
    }

    /// All nodes, root first
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }
}

/// Gradient/hessian/count accumulator for one histogram bin or one node
#[derive(Debug, Clone, Copy, Default)]
struct BinStats {
    grad: f64,
    hess: f64,
    count: usize,
}

impl BinStats {
    fn add(&mut self, other: &BinStats) {
        self.grad += other.grad;
        self.hess += other.hess;
        self.count += other.count;
    }

    fn minus(&self, other: &BinStats) -> BinStats {
        BinStats {
            grad: self.grad - other.grad,
            hess: self.hess - other.hess,
            count: self.count - other.count,
        }
    }

    fn score(&self, l2: f64) -> f64 {
        let denom = self.hess + l2;
        if denom <= 0.0 {
            0.0
        } else {
            self.grad * self.grad / denom
        }
    }
}

#[derive(Debug, Clone)]
struct SplitInfo {
    feature_idx: usize,
    bin_threshold: u8,
    missing_go_left: bool,
    gain: f64,
}

struct OpenLeaf {
    node_idx: usize,
    indices: Vec<usize>,
    depth: usize,
    stats: BinStats,
    split: Option<SplitInfo>,
}

/// Growth limits for a single tree
#[derive(Debug, Clone)]
pub struct GrowerParams {
    pub max_depth: Option<usize>,
    pub max_leaf_nodes: usize,
    pub min_samples_leaf: usize,
    pub l2_regularization: f64,
    pub shrinkage: f64,
}

/// Grows one tree from binned features and per-sample gradients
pub struct TreeGrower<'a> {
    binned: &'a [Vec<u8>],
    mapper: &'a BinMapper,
    gradients: &'a [f64],
    hessians: &'a [f64],
    params: &'a GrowerParams,
}

impl<'a> TreeGrower<'a> {
    pub fn new(
        binned: &'a [Vec<u8>],
        mapper: &'a BinMapper,
        gradients: &'a [f64],
        hessians: &'a [f64],
        params: &'a GrowerParams,
    ) -> Self {
        Self {
            binned,
            mapper,
            gradients,
            hessians,
            params,
        }
    }

    /// Grow a tree, always splitting the open leaf with the largest gain first
    pub fn grow(&self) -> HistTree {
        let n_samples = self.gradients.len();
        let root_indices: Vec<usize> = (0..n_samples).collect();

        let mut nodes = vec![TreeNode::Leaf { value: 0.0, n_samples }];
        let mut open = vec![self.open_leaf(0, root_indices, 0)];
        let mut n_leaves = 1;

        while n_leaves < self.params.max_leaf_nodes {
            let best = open
                .iter()
                .enumerate()
                .filter_map(|(pos, leaf)| leaf.split.as_ref().map(|s| (pos, s.gain)))
                .fold(None, |acc: Option<(usize, f64)>, (pos, gain)| match acc {
                    Some((_, best_gain)) if best_gain >= gain => acc,
                    _ => Some((pos, gain)),
                });

            let Some((pos, _)) = best else { break };
            let leaf = open.remove(pos);
            let Some(split) = leaf.split else { break };

            let column = &self.binned[split.feature_idx];
            let (left_indices, right_indices): (Vec<usize>, Vec<usize>) =
                leaf.indices.iter().copied().partition(|&i| {
                    let bin = column[i];
                    if bin == MISSING_BIN {
                        split.missing_go_left
                    } else {
                        bin <= split.bin_threshold
                    }
                });

            let left_idx = nodes.len();
            let right_idx = left_idx + 1;
            nodes.push(TreeNode::Leaf { value: 0.0, n_samples: left_indices.len() });
            nodes.push(TreeNode::Leaf { value: 0.0, n_samples: right_indices.len() });
            nodes[leaf.node_idx] = TreeNode::Split {
                feature_idx: split.feature_idx,
                threshold: self.mapper.threshold(split.feature_idx, split.bin_threshold),
                missing_go_left: split.missing_go_left,
                left: left_idx,
                right: right_idx,
                n_samples: leaf.indices.len(),
                gain: split.gain,
            };
            n_leaves += 1;

            open.push(self.open_leaf(left_idx, left_indices, leaf.depth + 1));
            open.push(self.open_leaf(right_idx, right_indices, leaf.depth + 1));
        }

        for leaf in open {
            let value = -leaf.stats.grad / (leaf.stats.hess + self.params.l2_regularization)
                * self.params.shrinkage;
            nodes[leaf.node_idx] = TreeNode::Leaf {
                value,
                n_samples: leaf.indices.len(),
            };
        }

        HistTree { nodes }
    }

    fn open_leaf(&self, node_idx: usize, indices: Vec<usize>, depth: usize) -> OpenLeaf {
        let mut stats = BinStats::default();
        for &i in &indices {
            stats.add(&BinStats {
                grad: self.gradients[i],
                hess: self.hessians[i],
                count: 1,
            });
        }

        let depth_ok = self.params.max_depth.map_or(true, |d| depth < d);
        let size_ok = indices.len() >= 2 * self.params.min_samples_leaf;
        let split = if depth_ok && size_ok {
            self.find_best_split(&indices, &stats)
        } else {
            None
        };

        OpenLeaf {
            node_idx,
            indices,
            depth,
            stats,
            split,
        }
    }

    fn find_best_split(&self, indices: &[usize], total: &BinStats) -> Option<SplitInfo> {
        let parent_score = total.score(self.params.l2_regularization);

        // Each feature builds its histogram and scans it independently
        let per_feature: Vec<Option<SplitInfo>> = (0..self.binned.len())
            .into_par_iter()
            .map(|feature_idx| {
                let histogram = self.build_histogram(feature_idx, indices);
                self.best_split_for_feature(feature_idx, &histogram, total, parent_score)
            })
            .collect();

        // Sequential reduction keeps ties resolved towards the lowest feature index
        per_feature.into_iter().flatten().fold(None, |best, candidate| match best {
            Some(b) if b.gain >= candidate.gain => Some(b),
            _ => Some(candidate),
        })
    }

    fn build_histogram(&self, feature_idx: usize, indices: &[usize]) -> Vec<BinStats> {
        let column = &self.binned[feature_idx];
        let mut histogram = vec![BinStats::default(); MISSING_BIN as usize + 1];
        for &i in indices {
            let bin = &mut histogram[column[i] as usize];
            bin.grad += self.gradients[i];
            bin.hess += self.hessians[i];
            bin.count += 1;
        }
        histogram
    }

    fn best_split_for_feature(
        &self,
        feature_idx: usize,
        histogram: &[BinStats],
        total: &BinStats,
        parent_score: f64,
    ) -> Option<SplitInfo> {
        let l2 = self.params.l2_regularization;
        let min_leaf = self.params.min_samples_leaf;
        let missing = histogram[MISSING_BIN as usize];
        let n_bins = self.mapper.n_bins(feature_idx);

        let mut best: Option<SplitInfo> = None;
        let mut left = BinStats::default();

        for bin in 0..n_bins.saturating_sub(1) {
            left.add(&histogram[bin]);

            let directions: &[bool] = if missing.count > 0 { &[false, true] } else { &[false] };
            for &missing_left in directions {
                let mut l = left;
                if missing_left {
                    l.add(&missing);
                }
                let r = total.minus(&l);
                if l.count < min_leaf || r.count < min_leaf {
                    continue;
                }

                let gain = l.score(l2) + r.score(l2) - parent_score;
                if gain <= MIN_GAIN {
                    continue;
                }
                if best.as_ref().map_or(true, |b| gain > b.gain) {
                    // Without missing values at fit time, NaN follows the larger child
                    let missing_go_left = if missing.count > 0 {
                        missing_left
                    } else {
                        l.count >= r.count
                    };
                    best = Some(SplitInfo {
                        feature_idx,
                        bin_threshold: bin as u8,
                        missing_go_left,
                        gain,
                    });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn params() -> GrowerParams {
        GrowerParams {
            max_depth: Some(3),
            max_leaf_nodes: 8,
            min_samples_leaf: 1,
            l2_regularization: 0.0,
            shrinkage: 1.0,
        }
    }

    fn grow(x: &Array2<f64>, y: &[f64], params: &GrowerParams) -> HistTree {
        let mapper = BinMapper::fit(x, 255, 0).unwrap();
        let binned = mapper.transform(x).unwrap();
        let gradients: Vec<f64> = y.iter().map(|v| -v).collect();
        let hessians = vec![1.0; y.len()];
        TreeGrower::new(&binned, &mapper, &gradients, &hessians, params).grow()
    }

    #[test]
    fn test_step_function_is_learned_exactly() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = [0.0, 0.0, 0.0, 5.0, 5.0, 5.0];
        let tree = grow(&x, &y, &params());

        assert_eq!(tree.n_leaves(), 2);
        assert!((tree.predict_row(array![2.5].view()) - 0.0).abs() < 1e-12);
        assert!((tree.predict_row(array![11.5].view()) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_limits_are_respected() {
        let x = Array2::from_shape_vec((64, 1), (0..64).map(|i| i as f64).collect()).unwrap();
        let y: Vec<f64> = (0..64).map(|i| (i * i) as f64).collect();

        let limited = GrowerParams {
            max_leaf_nodes: 4,
            max_depth: None,
            ..params()
        };
        assert!(grow(&x, &y, &limited).n_leaves() <= 4);

        let shallow = GrowerParams {
            max_depth: Some(2),
            max_leaf_nodes: 64,
            ..params()
        };
        assert!(grow(&x, &y, &shallow).depth() <= 2);

        let big_leaves = GrowerParams {
            min_samples_leaf: 20,
            ..params()
        };
        let tree = grow(&x, &y, &big_leaves);
        for node in tree.nodes() {
            if let TreeNode::Leaf { n_samples, .. } = node {
                assert!(*n_samples >= 20);
            }
        }
    }

    #[test]
    fn test_missing_values_learn_a_direction() {
        let x = array![[1.0], [2.0], [f64::NAN], [f64::NAN], [10.0], [11.0]];
        let y = [0.0, 0.0, 5.0, 5.0, 5.0, 5.0];
        let tree = grow(&x, &y, &params());

        assert!((tree.predict_row(array![f64::NAN].view()) - 5.0).abs() < 1e-12);
        assert!((tree.predict_row(array![1.5].view()) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_target_yields_single_leaf() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = [2.0, 2.0, 2.0, 2.0];
        let tree = grow(&x, &y, &params());

        assert_eq!(tree.n_leaves(), 1);
        assert!((tree.predict_row(array![9.0].view()) - 2.0).abs() < 1e-12);
    }
}
