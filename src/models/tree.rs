//! Binary classification tree grown with Gini impurity

use crate::feature_extractor::{FeatureVector, FEATURE_COUNT};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Growth limits shared by every tree of a forest
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    /// Maximum depth (unbounded when `None`)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Candidate features examined per split
    pub max_features: usize,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        probability: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A fitted classification tree
#[derive(Debug, Clone)]
pub struct DecisionTree {
    root: Node,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// Training data borrowed for the duration of a fit
struct TrainingSet<'a> {
    features: &'a [FeatureVector],
    labels: &'a [bool],
}

impl DecisionTree {
    /// Grow a tree over `samples`, a list of row indices (repeats allowed).
    pub fn fit(
        features: &[FeatureVector],
        labels: &[bool],
        samples: Vec<usize>,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let data = TrainingSet { features, labels };
        let root = grow(&data, samples, 0, params, rng);
        Self { root }
    }

    /// Probability of the positive class for one input
    pub fn predict_proba(&self, x: &FeatureVector) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { probability } => return *probability,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn depth_of(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        depth_of(&self.root)
    }

    pub fn leaf_count(&self) -> usize {
        fn leaves(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => leaves(left) + leaves(right),
            }
        }
        leaves(&self.root)
    }
}

fn grow(
    data: &TrainingSet<'_>,
    samples: Vec<usize>,
    depth: usize,
    params: &TreeParams,
    rng: &mut StdRng,
) -> Node {
    let total = samples.len();
    let positives = samples.iter().filter(|&&i| data.labels[i]).count();
    let probability = if total == 0 {
        0.0
    } else {
        positives as f64 / total as f64
    };

    let pure = positives == 0 || positives == total;
    let depth_reached = params.max_depth.is_some_and(|max| depth >= max);
    if pure || depth_reached || total < params.min_samples_split {
        return Node::Leaf { probability };
    }

    let Some(split) = best_split(data, &samples, params.max_features, rng) else {
        return Node::Leaf { probability };
    };

    let (left, right): (Vec<usize>, Vec<usize>) = samples
        .into_iter()
        .partition(|&i| data.features[i][split.feature] <= split.threshold);

    Node::Split {
        feature: split.feature,
        threshold: split.threshold,
        left: Box::new(grow(data, left, depth + 1, params, rng)),
        right: Box::new(grow(data, right, depth + 1, params, rng)),
    }
}

/// Examine up to `max_features` non-constant features in random order and
/// return the lowest-impurity split among them.
fn best_split(
    data: &TrainingSet<'_>,
    samples: &[usize],
    max_features: usize,
    rng: &mut StdRng,
) -> Option<SplitCandidate> {
    let mut order: Vec<usize> = (0..FEATURE_COUNT).collect();
    order.shuffle(rng);

    let mut best: Option<SplitCandidate> = None;
    let mut examined = 0;

    for feature in order {
        if examined >= max_features {
            break;
        }
        let Some(candidate) = best_split_on(data, samples, feature) else {
            // constant features do not count towards the budget
            continue;
        };
        examined += 1;

        if best.as_ref().map_or(true, |b| candidate.impurity < b.impurity) {
            best = Some(candidate);
        }
    }

    best
}

fn best_split_on(data: &TrainingSet<'_>, samples: &[usize], feature: usize) -> Option<SplitCandidate> {
    let mut sorted: Vec<(f64, bool)> = samples
        .iter()
        .map(|&i| (data.features[i][feature], data.labels[i]))
        .collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let total = sorted.len();
    if total < 2 {
        return None;
    }
    let total_positive = sorted.iter().filter(|(_, label)| *label).count();

    let mut best: Option<SplitCandidate> = None;
    let mut left_positive = 0;

    for i in 0..total - 1 {
        if sorted[i].1 {
            left_positive += 1;
        }
        let (current, next) = (sorted[i].0, sorted[i + 1].0);
        if current >= next {
            continue;
        }

        let left_count = i + 1;
        let right_count = total - left_count;
        let impurity = (left_count as f64 * gini(left_count, left_positive)
            + right_count as f64 * gini(right_count, total_positive - left_positive))
            / total as f64;

        if best.as_ref().map_or(true, |b| impurity < b.impurity) {
            let mut threshold = current + (next - current) / 2.0;
            if threshold >= next {
                threshold = current;
            }
            best = Some(SplitCandidate {
                feature,
                threshold,
                impurity,
            });
        }
    }

    best
}

fn gini(count: usize, positives: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let p = positives as f64 / count as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}
