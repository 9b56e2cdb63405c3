//! Block classification, training and evaluation.
//!
//! The tree model is reached through two narrow traits: a [`Learner`] fits a
//! [`MulticlassModel`] on labeled samples, and a model scores raw feature
//! rows. [`BlockClassifier`] wraps a model and checks that every vector it
//! sees belongs to the model's schema.

mod artifact;
mod booster;
mod metrics;
mod trainer;

pub use artifact::{ModelArtifact, ARTIFACT_FORMAT_VERSION};
pub use booster::{BoosterOptions, GbdtLearner, GbdtModel, MISSING_FEATURE_VALUE};
pub use metrics::{argmax, ClassMetrics, ConfusionMatrix, MulticlassMetrics, Summary};
pub use trainer::{
    evaluate, fold_indices, permutation_importance, CrossValidationReport, FeatureImportance,
    FoldResult, TrainOptions, Trainer,
};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::{
    FeatureExtractor, FeatureSchema, FeatureVector, LabeledSample, PageContext,
};
use crate::model::{BlockCategory, BookmarkNode, Page, TextBlock, CATEGORY_COUNT};

/// Confidence per category, indexed by category id.
pub type Scores = [f32; CATEGORY_COUNT];

/// A trained multiclass model.
pub trait MulticlassModel: Send + Sync {
    /// Schema of the vectors the model was trained on.
    fn schema(&self) -> FeatureSchema;

    /// Score raw feature rows. Rows must have the schema's width.
    fn predict_scores(&self, rows: &[&[f32]]) -> Vec<Scores>;
}

/// Fits a [`MulticlassModel`] from labeled samples.
pub trait Learner {
    type Model: MulticlassModel;

    fn fit(&self, schema: FeatureSchema, samples: &[LabeledSample]) -> Result<Self::Model>;
}

/// Predicted category of one block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: BlockCategory,
    /// Maximum of `scores`
    pub score: f32,
    pub scores: Scores,
}

impl ClassificationResult {
    /// Build a result from a confidence vector.
    pub fn from_scores(scores: Scores) -> Self {
        let category = argmax(&scores);
        Self {
            category,
            score: scores[category.id()],
            scores,
        }
    }
}

/// Classifies feature vectors with a trained model.
///
/// Classification does not mutate the model, so one instance can be shared
/// across threads.
#[derive(Debug, Clone)]
pub struct BlockClassifier<M> {
    model: M,
}

impl<M: MulticlassModel> BlockClassifier<M> {
    /// Wrap a trained model.
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Schema the model expects.
    pub fn schema(&self) -> FeatureSchema {
        self.model.schema()
    }

    /// The wrapped model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Classify one vector. Vectors of another schema are rejected.
    pub fn classify(&self, features: &FeatureVector) -> Result<ClassificationResult> {
        features.ensure_schema(self.schema())?;
        let scores = self
            .model
            .predict_scores(&[features.values()])
            .into_iter()
            .next()
            .unwrap_or([0.0; CATEGORY_COUNT]);
        Ok(ClassificationResult::from_scores(scores))
    }

    /// Classify every pre-segmented block of `page`.
    pub fn classify_page<'p>(
        &self,
        page: &'p Page,
        bookmarks: Vec<&BookmarkNode>,
    ) -> Result<Vec<(&'p TextBlock, ClassificationResult)>> {
        let extractor = FeatureExtractor::new(self.schema());
        let ctx = PageContext::new(page, bookmarks);

        let vectors = page
            .blocks
            .iter()
            .map(|block| extractor.extract_block(&ctx, block))
            .collect::<Result<Vec<_>>>()?;
        if vectors.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<&[f32]> = vectors.iter().map(FeatureVector::values).collect();
        let results = self
            .model
            .predict_scores(&rows)
            .into_iter()
            .map(ClassificationResult::from_scores);
        Ok(page.blocks.iter().zip(results).collect())
    }
}
