//! Multiclass evaluation metrics.

use std::fmt::{self, Write};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{BlockCategory, CATEGORY_COUNT};

use super::Scores;

/// Lower bound on probabilities fed to the logarithm.
const MIN_PROBABILITY: f64 = 1e-15;

/// Counts of (actual, predicted) category pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    counts: [[usize; CATEGORY_COUNT]; CATEGORY_COUNT],
}

impl ConfusionMatrix {
    /// Create an empty matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one prediction.
    pub fn record(&mut self, actual: BlockCategory, predicted: BlockCategory) {
        self.counts[actual.id()][predicted.id()] += 1;
    }

    /// Number of samples of `actual` predicted as `predicted`.
    pub fn count(&self, actual: BlockCategory, predicted: BlockCategory) -> usize {
        self.counts[actual.id()][predicted.id()]
    }

    /// Total number of recorded samples.
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Number of correct predictions.
    pub fn correct(&self) -> usize {
        (0..CATEGORY_COUNT).map(|i| self.counts[i][i]).sum()
    }

    /// Number of samples whose actual category is `category`.
    pub fn support(&self, category: BlockCategory) -> usize {
        self.counts[category.id()].iter().sum()
    }

    /// Number of samples predicted as `category`.
    pub fn predicted(&self, category: BlockCategory) -> usize {
        self.counts.iter().map(|row| row[category.id()]).sum()
    }

    /// Share of predictions of `category` that are right; 0 if never predicted.
    pub fn precision(&self, category: BlockCategory) -> f64 {
        ratio(self.count(category, category), self.predicted(category))
    }

    /// Share of `category` samples found; 0 if the category is absent.
    pub fn recall(&self, category: BlockCategory) -> f64 {
        ratio(self.count(category, category), self.support(category))
    }

    /// Harmonic mean of precision and recall; 0 when both are 0.
    pub fn f1(&self, category: BlockCategory) -> f64 {
        let p = self.precision(category);
        let r = self.recall(category);
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// Render as a text table with recall per row and precision per column.
    pub fn to_table(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "{:>10} ||", "actual");
        for category in BlockCategory::ALL {
            let _ = write!(out, "{:>8}", category.name());
        }
        let _ = writeln!(out, " || {:>7}", "recall");
        let width = 13 + 8 * CATEGORY_COUNT + 11;
        let _ = writeln!(out, "{}", "=".repeat(width));

        for actual in BlockCategory::ALL {
            let _ = write!(out, "{:>10} ||", actual.name());
            for predicted in BlockCategory::ALL {
                let _ = write!(out, "{:>8}", self.count(actual, predicted));
            }
            let _ = writeln!(out, " || {:>7.4}", self.recall(actual));
        }

        let _ = writeln!(out, "{}", "=".repeat(width));
        let _ = write!(out, "{:>10} ||", "precision");
        for category in BlockCategory::ALL {
            let _ = write!(out, "{:>8.4}", self.precision(category));
        }
        out.push('\n');
        out
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_table())
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Metrics of one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub category: BlockCategory,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Mean log-loss over samples of this category, NaN if there are none
    pub log_loss: f64,
    pub support: usize,
}

/// Evaluation of a multiclass model on a labeled set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MulticlassMetrics {
    /// Share of samples predicted correctly
    pub micro_accuracy: f64,
    /// Mean per-class recall over the categories present in the labels
    pub macro_accuracy: f64,
    /// Mean negative log-likelihood of the true category
    pub log_loss: f64,
    /// Relative improvement of log-loss over the label prior
    pub log_loss_reduction: f64,
    /// Log-loss per category, NaN for categories without samples
    pub per_class_log_loss: [f64; CATEGORY_COUNT],
    pub confusion: ConfusionMatrix,
}

/// Category with the highest score; ties go to the lowest id.
pub fn argmax(scores: &Scores) -> BlockCategory {
    let mut best = 0;
    for (i, s) in scores.iter().enumerate() {
        if *s > scores[best] {
            best = i;
        }
    }
    BlockCategory::ALL[best]
}

fn true_class_probability(scores: &Scores, actual: BlockCategory) -> f64 {
    let sum: f64 = scores.iter().map(|s| f64::from(s.max(0.0))).sum();
    let p = if sum > 0.0 {
        f64::from(scores[actual.id()].max(0.0)) / sum
    } else {
        1.0 / CATEGORY_COUNT as f64
    };
    p.clamp(MIN_PROBABILITY, 1.0)
}

impl MulticlassMetrics {
    /// Compute metrics from true labels and predicted scores.
    ///
    /// Scores need not sum to one; they are normalized for the log-loss.
    pub fn compute(labels: &[BlockCategory], scores: &[Scores]) -> Result<Self> {
        if labels.len() != scores.len() {
            return Err(Error::Other(format!(
                "{} labels but {} predictions",
                labels.len(),
                scores.len()
            )));
        }
        if labels.is_empty() {
            return Err(Error::EmptyDataset("no samples to evaluate".to_string()));
        }

        let n = labels.len() as f64;
        let mut confusion = ConfusionMatrix::new();
        let mut loss_sum = 0.0;
        let mut class_loss = [0.0f64; CATEGORY_COUNT];

        for (&actual, s) in labels.iter().zip(scores) {
            confusion.record(actual, argmax(s));
            let loss = -true_class_probability(s, actual).ln();
            loss_sum += loss;
            class_loss[actual.id()] += loss;
        }

        let log_loss = loss_sum / n;

        let mut per_class_log_loss = [f64::NAN; CATEGORY_COUNT];
        let mut prior_log_loss = 0.0;
        let mut recall_sum = 0.0;
        let mut present = 0usize;
        for category in BlockCategory::ALL {
            let support = confusion.support(category);
            if support == 0 {
                continue;
            }
            per_class_log_loss[category.id()] = class_loss[category.id()] / support as f64;
            let prior = support as f64 / n;
            prior_log_loss -= prior * prior.ln();
            recall_sum += confusion.recall(category);
            present += 1;
        }

        let log_loss_reduction = if prior_log_loss > 0.0 {
            1.0 - log_loss / prior_log_loss
        } else {
            0.0
        };

        Ok(Self {
            micro_accuracy: confusion.correct() as f64 / n,
            macro_accuracy: recall_sum / present as f64,
            log_loss,
            log_loss_reduction,
            per_class_log_loss,
            confusion,
        })
    }

    /// Precision, recall, F1 and log-loss per category.
    pub fn per_class(&self) -> Vec<ClassMetrics> {
        BlockCategory::ALL
            .iter()
            .map(|&category| ClassMetrics {
                category,
                precision: self.confusion.precision(category),
                recall: self.confusion.recall(category),
                f1: self.confusion.f1(category),
                log_loss: self.per_class_log_loss[category.id()],
                support: self.confusion.support(category),
            })
            .collect()
    }
}

/// Mean, sample standard deviation and 95% confidence half-width.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub mean: f64,
    pub std_dev: f64,
    pub ci95: f64,
    /// Number of values summarized
    pub count: usize,
}

impl Summary {
    /// Summarize `values`, ignoring NaN entries.
    ///
    /// With fewer than two values the deviation and interval are 0.
    pub fn of(values: &[f64]) -> Self {
        let values: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        let count = values.len();
        if count == 0 {
            return Self {
                mean: f64::NAN,
                ..Self::default()
            };
        }

        let mean = values.iter().sum::<f64>() / count as f64;
        if count < 2 {
            return Self {
                mean,
                count,
                ..Self::default()
            };
        }

        let variance =
            values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        let std_dev = variance.sqrt();
        Self {
            mean,
            std_dev,
            ci95: 1.96 * std_dev / ((count - 1) as f64).sqrt(),
            count,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.4} (std {:.4}, 95% ci {:.4})",
            self.mean, self.std_dev, self.ci95
        )
    }
}
