//! Gradient-boosted tree backend.
//!
//! The multiclass model is one binary log-likelihood booster per category
//! (one-versus-rest). Scores are the per-category probabilities, not
//! normalized across categories.

use std::fmt;

use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::features::{FeatureSchema, LabeledSample};
use crate::model::{BlockCategory, CATEGORY_COUNT};

use super::{Learner, MulticlassModel, Scores};

/// Value fed to the trees in place of NaN features.
pub const MISSING_FEATURE_VALUE: f32 = f32::MIN;

/// Hyperparameters of the boosted model.
///
/// Categorical-split and regularization settings are carried for the
/// record; the tree backend has no equivalent and ignores them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoosterOptions {
    /// Boosting iterations (trees per category)
    pub iterations: usize,
    /// Shrinkage applied to each tree
    pub learning_rate: f32,
    /// Maximum leaves per tree
    pub leaves: u32,
    /// Minimum samples in a leaf
    pub min_examples_per_leaf: usize,
    /// Minimum samples per categorical group
    pub min_examples_per_group: usize,
    pub categorical_split: bool,
    pub max_categorical_split_points: u32,
    pub categorical_smoothing: f32,
    pub l2_categorical_regularization: f32,
    pub l1_regularization: f32,
    pub l2_regularization: f32,
    /// Normalize scores across categories
    pub use_softmax: bool,
}

impl Default for BoosterOptions {
    fn default() -> Self {
        Self {
            iterations: 150,
            learning_rate: 0.115_873_7,
            leaves: 39,
            min_examples_per_leaf: 50,
            min_examples_per_group: 50,
            categorical_split: true,
            max_categorical_split_points: 32,
            categorical_smoothing: 10.0,
            l2_categorical_regularization: 1.0,
            l1_regularization: 0.0,
            l2_regularization: 0.0,
            use_softmax: false,
        }
    }
}

impl BoosterOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of boosting iterations.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the learning rate.
    pub fn with_learning_rate(mut self, rate: f32) -> Self {
        self.learning_rate = rate;
        self
    }

    /// Set the maximum number of leaves per tree.
    pub fn with_leaves(mut self, leaves: u32) -> Self {
        self.leaves = leaves;
        self
    }

    /// Set the minimum number of samples per leaf.
    pub fn with_min_examples_per_leaf(mut self, count: usize) -> Self {
        self.min_examples_per_leaf = count;
        self
    }

    /// Normalize scores across categories.
    pub fn with_softmax(mut self, enabled: bool) -> Self {
        self.use_softmax = enabled;
        self
    }

    /// Tree depth that allows `leaves` leaves.
    pub fn max_depth(&self) -> u32 {
        let mut depth = 0;
        while (1u64 << depth) < u64::from(self.leaves.max(2)) {
            depth += 1;
        }
        depth
    }

    fn config(&self, feature_count: usize) -> Config {
        let mut cfg = Config::new();
        cfg.set_feature_size(feature_count);
        cfg.set_max_depth(self.max_depth());
        cfg.set_iterations(self.iterations);
        cfg.set_shrinkage(self.learning_rate);
        cfg.set_min_leaf_size(self.min_examples_per_leaf);
        cfg.set_loss("LogLikelyhood");
        cfg.set_data_sample_ratio(1.0);
        cfg.set_feature_sample_ratio(1.0);
        cfg.set_training_optimization_level(2);
        cfg.set_debug(false);
        cfg
    }
}

fn tree_input(values: &[f32]) -> Vec<f32> {
    values
        .iter()
        .map(|v| if v.is_nan() { MISSING_FEATURE_VALUE } else { *v })
        .collect()
}

/// Model of a single category.
#[derive(Serialize, Deserialize)]
enum ClassBooster {
    /// The category was absent from (or was all of) the training set
    Constant(f32),
    Trees(GBDT),
}

/// A trained one-versus-rest boosted model.
#[derive(Serialize, Deserialize)]
pub struct GbdtModel {
    schema: FeatureSchema,
    use_softmax: bool,
    boosters: Vec<ClassBooster>,
}

impl fmt::Debug for GbdtModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let trained = self
            .boosters
            .iter()
            .filter(|b| matches!(b, ClassBooster::Trees(_)))
            .count();
        f.debug_struct("GbdtModel")
            .field("schema", &self.schema)
            .field("use_softmax", &self.use_softmax)
            .field("trained_boosters", &trained)
            .finish()
    }
}

impl MulticlassModel for GbdtModel {
    fn schema(&self) -> FeatureSchema {
        self.schema
    }

    fn predict_scores(&self, rows: &[&[f32]]) -> Vec<Scores> {
        if rows.is_empty() {
            return Vec::new();
        }
        let data: DataVec = rows
            .iter()
            .map(|r| Data::new_test_data(tree_input(r), None))
            .collect();

        let mut scores = vec![[0.0f32; CATEGORY_COUNT]; rows.len()];
        for (class, booster) in self.boosters.iter().enumerate() {
            match booster {
                ClassBooster::Constant(p) => {
                    for s in scores.iter_mut() {
                        s[class] = *p;
                    }
                }
                ClassBooster::Trees(trees) => {
                    for (s, p) in scores.iter_mut().zip(trees.predict(&data)) {
                        s[class] = p;
                    }
                }
            }
        }

        if self.use_softmax {
            for s in scores.iter_mut() {
                let sum: f32 = s.iter().sum();
                if sum > 0.0 {
                    s.iter_mut().for_each(|v| *v /= sum);
                }
            }
        }
        scores
    }
}

/// Fits [`GbdtModel`]s.
#[derive(Debug, Clone, Default)]
pub struct GbdtLearner {
    options: BoosterOptions,
}

impl GbdtLearner {
    /// Create a learner with the given hyperparameters.
    pub fn new(options: BoosterOptions) -> Self {
        Self { options }
    }

    /// Hyperparameters in use.
    pub fn options(&self) -> &BoosterOptions {
        &self.options
    }
}

impl Learner for GbdtLearner {
    type Model = GbdtModel;

    fn fit(&self, schema: FeatureSchema, samples: &[LabeledSample]) -> Result<GbdtModel> {
        if samples.is_empty() {
            return Err(Error::EmptyDataset("no training samples".to_string()));
        }
        for sample in samples {
            sample.features.ensure_schema(schema)?;
        }

        log::debug!(
            "Fitting {} boosters on {} samples (depth {}, {} iterations)",
            CATEGORY_COUNT,
            samples.len(),
            self.options.max_depth(),
            self.options.iterations
        );

        let config = self.options.config(schema.feature_count());
        let inputs: Vec<Vec<f32>> = samples
            .iter()
            .map(|s| tree_input(s.features.values()))
            .collect();

        let mut boosters = Vec::with_capacity(CATEGORY_COUNT);
        for category in BlockCategory::ALL {
            let positives = samples.iter().filter(|s| s.category == category).count();
            let booster = if positives == 0 {
                ClassBooster::Constant(0.0)
            } else if positives == samples.len() {
                ClassBooster::Constant(1.0)
            } else {
                let mut data: DataVec = inputs
                    .iter()
                    .zip(samples)
                    .map(|(input, s)| {
                        let label = if s.category == category { 1.0 } else { -1.0 };
                        Data::new_training_data(input.clone(), 1.0, label, None)
                    })
                    .collect();
                let mut trees = GBDT::new(&config);
                trees.fit(&mut data);
                ClassBooster::Trees(trees)
            };
            boosters.push(booster);
        }

        Ok(GbdtModel {
            schema,
            use_softmax: self.options.use_softmax,
            boosters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;

    #[test]
    fn test_default_hyperparameters() {
        let options = BoosterOptions::default();
        assert_eq!(options.iterations, 150);
        assert_eq!(options.leaves, 39);
        assert_eq!(options.min_examples_per_leaf, 50);
        assert!(!options.use_softmax);
        assert_eq!(options.max_depth(), 6);
    }

    #[test]
    fn test_max_depth() {
        assert_eq!(BoosterOptions::new().with_leaves(2).max_depth(), 1);
        assert_eq!(BoosterOptions::new().with_leaves(8).max_depth(), 3);
        assert_eq!(BoosterOptions::new().with_leaves(9).max_depth(), 4);
    }

    #[test]
    fn test_tree_input_replaces_nan() {
        assert_eq!(tree_input(&[1.0, f32::NAN]), vec![1.0, MISSING_FEATURE_VALUE]);
    }

    #[test]
    fn test_fit_rejects_empty_and_mixed() {
        let learner = GbdtLearner::default();
        assert!(matches!(
            learner.fit(FeatureSchema::V1, &[]),
            Err(Error::EmptyDataset(_))
        ));

        let v2 = LabeledSample::new(
            FeatureVector::new(FeatureSchema::V2, vec![0.0; 17]).unwrap(),
            BlockCategory::Text,
        );
        assert!(matches!(
            learner.fit(FeatureSchema::V1, &[v2]),
            Err(Error::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_single_class_is_constant() {
        let samples: Vec<LabeledSample> = (0..3)
            .map(|i| {
                LabeledSample::new(
                    FeatureVector::new(FeatureSchema::V1, vec![i as f32; 13]).unwrap(),
                    BlockCategory::Table,
                )
            })
            .collect();
        let model = GbdtLearner::default()
            .fit(FeatureSchema::V1, &samples)
            .unwrap();
        let row = [0.5f32; 13];
        let scores = model.predict_scores(&[&row]);
        assert_eq!(scores[0][BlockCategory::Table.id()], 1.0);
        assert_eq!(scores[0][BlockCategory::Text.id()], 0.0);
    }
}
