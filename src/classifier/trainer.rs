//! Training, cross-validation and evaluation.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::dataset::FeatureTable;
use crate::error::{Error, Result};
use crate::features::LabeledSample;
use crate::model::{BlockCategory, CATEGORY_COUNT};

use super::booster::{BoosterOptions, GbdtLearner};
use super::metrics::{argmax, MulticlassMetrics, Summary};
use super::{Learner, MulticlassModel};

/// Options for training and evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainOptions {
    /// Number of cross-validation folds
    pub folds: usize,
    /// Seed for fold assignment and permutations
    pub seed: u64,
    /// Shuffles per column for permutation importance
    pub permutations: usize,
    /// Boosted model hyperparameters
    pub booster: BoosterOptions,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            folds: 5,
            seed: 1,
            permutations: 30,
            booster: BoosterOptions::default(),
        }
    }
}

impl TrainOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of folds.
    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of permutations per column.
    pub fn with_permutations(mut self, permutations: usize) -> Self {
        self.permutations = permutations;
        self
    }

    /// Set the booster hyperparameters.
    pub fn with_booster(mut self, booster: BoosterOptions) -> Self {
        self.booster = booster;
        self
    }
}

/// Metrics of one cross-validation fold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldResult {
    pub fold: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub metrics: MulticlassMetrics,
}

/// Per-fold metrics and their summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationReport {
    pub folds: Vec<FoldResult>,
    pub micro_accuracy: Summary,
    pub macro_accuracy: Summary,
    pub log_loss: Summary,
    pub log_loss_reduction: Summary,
    pub per_class_log_loss: [Summary; CATEGORY_COUNT],
    pub per_class_f1: [Summary; CATEGORY_COUNT],
}

impl CrossValidationReport {
    fn from_folds(folds: Vec<FoldResult>) -> Self {
        Self {
            micro_accuracy: summarize(&folds, |m| m.micro_accuracy),
            macro_accuracy: summarize(&folds, |m| m.macro_accuracy),
            log_loss: summarize(&folds, |m| m.log_loss),
            log_loss_reduction: summarize(&folds, |m| m.log_loss_reduction),
            per_class_log_loss: BlockCategory::ALL
                .map(|c| summarize(&folds, |m| m.per_class_log_loss[c.id()])),
            per_class_f1: BlockCategory::ALL.map(|c| summarize(&folds, |m| class_f1(m, c))),
            folds,
        }
    }
}

/// F1 of a class, undefined when the class has no test samples.
fn class_f1(metrics: &MulticlassMetrics, category: BlockCategory) -> f64 {
    if metrics.confusion.support(category) == 0 {
        f64::NAN
    } else {
        metrics.confusion.f1(category)
    }
}

fn summarize<F>(folds: &[FoldResult], metric: F) -> Summary
where
    F: Fn(&MulticlassMetrics) -> f64,
{
    let values: Vec<f64> = folds.iter().map(|r| metric(&r.metrics)).collect();
    Summary::of(&values)
}

/// Sensitivity of accuracy to shuffling one feature column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub column: String,
    /// Mean change in micro-accuracy (permuted minus baseline)
    pub mean_delta: f64,
    /// Standard error of the mean change
    pub std_error: f64,
    /// Half-width of the 95% band (1.96 standard errors)
    pub ci95: f64,
}

/// Split `0..n` into `k` shuffled, nearly equal folds.
pub fn fold_indices(n: usize, k: usize, seed: u64) -> Result<Vec<Vec<usize>>> {
    if k < 2 {
        return Err(Error::Training(format!("need at least 2 folds, got {}", k)));
    }
    if n < k {
        return Err(Error::EmptyDataset(format!(
            "{} samples cannot fill {} folds",
            n, k
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));

    let base = n / k;
    let extra = n % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for i in 0..k {
        let size = base + usize::from(i < extra);
        folds.push(order[start..start + size].to_vec());
        start += size;
    }
    Ok(folds)
}

/// Score every sample of `table` with `model`.
fn predict_all<M: MulticlassModel>(model: &M, rows: &[Vec<f32>]) -> Vec<super::Scores> {
    let refs: Vec<&[f32]> = rows.iter().map(Vec::as_slice).collect();
    model.predict_scores(&refs)
}

fn accuracy(labels: &[BlockCategory], scores: &[super::Scores]) -> f64 {
    let correct = labels
        .iter()
        .zip(scores)
        .filter(|(l, s)| argmax(s) == **l)
        .count();
    correct as f64 / labels.len() as f64
}

/// Evaluate `model` on a labeled table.
pub fn evaluate<M: MulticlassModel>(model: &M, table: &FeatureTable) -> Result<MulticlassMetrics> {
    table.ensure_schema(model.schema())?;
    let rows: Vec<Vec<f32>> = table
        .samples
        .iter()
        .map(|s| s.features.values().to_vec())
        .collect();
    let labels: Vec<BlockCategory> = table.samples.iter().map(|s| s.category).collect();
    MulticlassMetrics::compute(&labels, &predict_all(model, &rows))
}

/// Permutation feature importance, ranked by the magnitude of the mean delta.
pub fn permutation_importance<M: MulticlassModel>(
    model: &M,
    table: &FeatureTable,
    permutations: usize,
    seed: u64,
) -> Result<Vec<FeatureImportance>> {
    table.ensure_schema(model.schema())?;
    if table.is_empty() {
        return Err(Error::EmptyDataset("no samples to permute".to_string()));
    }
    if permutations == 0 {
        return Err(Error::Other("permutation count must be positive".to_string()));
    }

    let rows: Vec<Vec<f32>> = table
        .samples
        .iter()
        .map(|s| s.features.values().to_vec())
        .collect();
    let labels: Vec<BlockCategory> = table.samples.iter().map(|s| s.category).collect();
    let baseline = accuracy(&labels, &predict_all(model, &rows));
    log::debug!("Permutation importance baseline accuracy {:.4}", baseline);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut ranking = Vec::with_capacity(table.schema.feature_count());

    for (column, name) in table.schema.columns().iter().enumerate() {
        let mut deltas = Vec::with_capacity(permutations);
        let mut permuted = rows.clone();
        let mut values: Vec<f32> = rows.iter().map(|r| r[column]).collect();

        for _ in 0..permutations {
            values.shuffle(&mut rng);
            for (row, v) in permuted.iter_mut().zip(&values) {
                row[column] = *v;
            }
            deltas.push(accuracy(&labels, &predict_all(model, &permuted)) - baseline);
        }

        let summary = Summary::of(&deltas);
        let std_error = summary.std_dev / (deltas.len() as f64).sqrt();
        ranking.push(FeatureImportance {
            column: (*name).to_string(),
            mean_delta: summary.mean,
            std_error,
            ci95: 1.96 * std_error,
        });
    }

    ranking.sort_by(|a, b| b.mean_delta.abs().total_cmp(&a.mean_delta.abs()));
    Ok(ranking)
}

/// Fits and cross-validates models with a [`Learner`].
#[derive(Debug, Clone)]
pub struct Trainer<L: Learner> {
    learner: L,
    options: TrainOptions,
}

impl Trainer<GbdtLearner> {
    /// Trainer using the boosted-tree backend with `options.booster`.
    pub fn gbdt(options: TrainOptions) -> Self {
        let learner = GbdtLearner::new(options.booster.clone());
        Self { learner, options }
    }
}

impl<L: Learner> Trainer<L> {
    /// Trainer with a custom learner.
    pub fn new(learner: L, options: TrainOptions) -> Self {
        Self { learner, options }
    }

    /// Options in use.
    pub fn options(&self) -> &TrainOptions {
        &self.options
    }

    /// Fit a model on the whole table.
    pub fn fit(&self, table: &FeatureTable) -> Result<L::Model> {
        log::info!("Training on {} {} samples", table.len(), table.schema);
        self.learner.fit(table.schema, &table.samples)
    }

    /// K-fold cross-validation over the table.
    pub fn cross_validate(&self, table: &FeatureTable) -> Result<CrossValidationReport> {
        let folds = fold_indices(table.len(), self.options.folds, self.options.seed)?;
        let mut results = Vec::with_capacity(folds.len());

        for (fold, test_indices) in folds.iter().enumerate() {
            let mut in_test = vec![false; table.len()];
            for &i in test_indices {
                in_test[i] = true;
            }
            let mut train: Vec<LabeledSample> = Vec::new();
            let mut test: Vec<LabeledSample> = Vec::new();
            for (sample, held_out) in table.samples.iter().zip(&in_test) {
                if *held_out {
                    test.push(sample.clone());
                } else {
                    train.push(sample.clone());
                }
            }

            let model = self.learner.fit(table.schema, &train)?;
            let test_table = FeatureTable {
                schema: table.schema,
                samples: test,
            };
            let metrics = evaluate(&model, &test_table)?;
            log::debug!(
                "Fold {}: micro {:.4}, macro {:.4}, log-loss {:.4}",
                fold + 1,
                metrics.micro_accuracy,
                metrics.macro_accuracy,
                metrics.log_loss
            );

            results.push(FoldResult {
                fold: fold + 1,
                train_size: train.len(),
                test_size: test_table.len(),
                metrics,
            });
        }

        let report = CrossValidationReport::from_folds(results);
        log::info!(
            "Cross-validation micro-accuracy {}",
            report.micro_accuracy
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Scores;
    use crate::features::{FeatureSchema, FeatureVector};

    /// Predicts Title when the first column is positive, Text otherwise.
    struct SignModel;

    impl MulticlassModel for SignModel {
        fn schema(&self) -> FeatureSchema {
            FeatureSchema::V1
        }

        fn predict_scores(&self, rows: &[&[f32]]) -> Vec<Scores> {
            rows.iter()
                .map(|r| {
                    let mut s = [0.05; CATEGORY_COUNT];
                    let winner = if r[0] > 0.0 {
                        BlockCategory::Title
                    } else {
                        BlockCategory::Text
                    };
                    s[winner.id()] = 0.8;
                    s
                })
                .collect()
        }
    }

    /// Learner that always fits a [`SignModel`].
    #[derive(Debug, Clone)]
    struct SignLearner;

    impl Learner for SignLearner {
        type Model = SignModel;

        fn fit(&self, _schema: FeatureSchema, samples: &[LabeledSample]) -> Result<SignModel> {
            if samples.is_empty() {
                return Err(Error::EmptyDataset("no training samples".to_string()));
            }
            Ok(SignModel)
        }
    }

    fn table(n: usize) -> FeatureTable {
        let samples = (0..n)
            .map(|i| {
                let positive = i % 2 == 0;
                let mut values = vec![0.0; 13];
                values[0] = if positive { 1.0 } else { -1.0 };
                values[1] = i as f32;
                let category = if positive {
                    BlockCategory::Title
                } else {
                    BlockCategory::Text
                };
                LabeledSample::new(FeatureVector::new(FeatureSchema::V1, values).unwrap(), category)
            })
            .collect();
        FeatureTable::new(FeatureSchema::V1, samples).unwrap()
    }

    #[test]
    fn test_fold_indices_partition() {
        let folds = fold_indices(12, 5, 1).unwrap();
        assert_eq!(folds.len(), 5);
        let sizes: Vec<usize> = folds.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2, 2]);

        let mut all: Vec<usize> = folds.concat();
        all.sort_unstable();
        assert_eq!(all, (0..12).collect::<Vec<_>>());

        assert_eq!(folds, fold_indices(12, 5, 1).unwrap());
    }

    #[test]
    fn test_fold_indices_errors() {
        assert!(fold_indices(10, 1, 1).is_err());
        assert!(matches!(fold_indices(3, 5, 1), Err(Error::EmptyDataset(_))));
    }

    #[test]
    fn test_evaluate_perfect_model() {
        let metrics = evaluate(&SignModel, &table(10)).unwrap();
        assert_eq!(metrics.micro_accuracy, 1.0);
        assert_eq!(metrics.confusion.total(), 10);
    }

    #[test]
    fn test_evaluate_schema_mismatch() {
        let v2 = FeatureTable::new(FeatureSchema::V2, Vec::new()).unwrap();
        assert!(matches!(
            evaluate(&SignModel, &v2),
            Err(Error::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_cross_validate() {
        let trainer = Trainer::new(SignLearner, TrainOptions::new().with_folds(4));
        let report = trainer.cross_validate(&table(20)).unwrap();
        assert_eq!(report.folds.len(), 4);
        assert_eq!(report.folds.iter().map(|f| f.test_size).sum::<usize>(), 20);
        assert!(report.folds.iter().all(|f| f.train_size + f.test_size == 20));
        assert_eq!(report.micro_accuracy.mean, 1.0);
        assert_eq!(report.micro_accuracy.std_dev, 0.0);
        assert_eq!(report.micro_accuracy.count, 4);
    }

    #[test]
    fn test_cross_validate_f1_skips_absent_classes() {
        let mut rows = table(20);
        let mut values = vec![0.0; 13];
        values[0] = -1.0;
        rows.samples.push(LabeledSample::new(
            FeatureVector::new(FeatureSchema::V1, values).unwrap(),
            BlockCategory::List,
        ));

        let trainer = Trainer::new(SignLearner, TrainOptions::new().with_folds(4));
        let report = trainer.cross_validate(&rows).unwrap();

        let list = &report.per_class_f1[BlockCategory::List.id()];
        assert_eq!(list.count, 1);
        assert_eq!(list.mean, 0.0);
        assert_eq!(report.per_class_f1[BlockCategory::Title.id()].mean, 1.0);
        assert!(report.per_class_f1[BlockCategory::Image.id()].mean.is_nan());
    }

    #[test]
    fn test_permutation_importance_ranks_decisive_column() {
        let ranking = permutation_importance(&SignModel, &table(40), 10, 7).unwrap();
        assert_eq!(ranking.len(), 13);
        assert_eq!(ranking[0].column, "charsCount");
        assert!(ranking[0].mean_delta < 0.0);
        assert!((ranking[0].ci95 - 1.96 * ranking[0].std_error).abs() < 1e-12);
        assert!(ranking[1..].iter().all(|r| r.mean_delta == 0.0));
    }

    #[test]
    fn test_permutation_importance_requires_rows() {
        let empty = FeatureTable::new(FeatureSchema::V1, Vec::new()).unwrap();
        assert!(permutation_importance(&SignModel, &empty, 5, 1).is_err());
        assert!(permutation_importance(&SignModel, &table(4), 0, 1).is_err());
    }
}
