use std::fmt;

/// Zero-based feature column index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based feature column index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// Position of a node inside a tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node in a decision tree arena.
///
/// Children are referenced by [`NodeIndex`], never by pointer, so a tree is a
/// flat `Vec<Node>` with the root at index 0.
#[derive(Debug, Clone)]
pub enum Node {
    /// Interior node: samples with `x[feature] <= threshold` go left.
    Split {
        /// Feature tested at this node.
        feature: FeatureIndex,
        /// Split threshold (midpoint between adjacent sorted values).
        threshold: f64,
        /// Left child.
        left: NodeIndex,
        /// Right child.
        right: NodeIndex,
        /// Training samples that reached this node.
        n_samples: usize,
        /// Sample-weighted impurity decrease produced by the split.
        impurity_decrease: f64,
    },
    /// Terminal node.
    Leaf {
        /// Majority class (lowest index wins ties).
        prediction: usize,
        /// Class frequencies normalized to sum to 1.0.
        distribution: Vec<f64>,
        /// Training samples that reached this leaf.
        n_samples: usize,
    },
}

impl Node {
    /// Return the number of training samples that reached this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Split { n_samples, .. } | Node::Leaf { n_samples, .. } => *n_samples,
        }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}
