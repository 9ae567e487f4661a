// 🌸 Prediction glue - pre-trained classifier + label encoder
//
// The model is trained elsewhere. Here it is an opaque artifact:
// four measurements in, class index out. The label encoder maps
// that index back to a species name.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

pub const N_FEATURES: usize = 4;
pub const FEATURE_NAMES: [&str; N_FEATURES] =
    ["sepal_length", "sepal_width", "petal_length", "petal_width"];

pub type Features = [f64; N_FEATURES];

const BUNDLED_MODEL: &str = include_str!("../../models/iris_classifier.json");
const BUNDLED_LABELS: &str = include_str!("../../models/iris_labels.json");

// ============================================================================
// MEASUREMENTS
// ============================================================================

/// The four inputs of a prediction, in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub sepal_length: f64,
    pub sepal_width: f64,
    pub petal_length: f64,
    pub petal_width: f64,
}

impl Measurements {
    pub fn features(&self) -> Features {
        [
            self.sepal_length,
            self.sepal_width,
            self.petal_length,
            self.petal_width,
        ]
    }
}

/// Parse one form value. Lengths must be finite and non-negative.
pub fn parse_measurement(name: &str, raw: &str) -> std::result::Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{} must be a number", name))?;

    if !value.is_finite() || value < 0.0 {
        return Err(format!("{} must be a non-negative number", name));
    }
    Ok(value)
}

// ============================================================================
// CLASSIFIER
// ============================================================================

pub trait Classifier: Send + Sync {
    /// Number of classes the model can return.
    fn n_classes(&self) -> usize;

    /// Index of the predicted class, in `0..n_classes()`.
    fn predict(&self, features: &Features) -> Result<usize>;
}

/// Multinomial linear model: one weight row and intercept per class, the
/// class with the highest score wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearClassifier {
    /// Free-form description of how the artifact was produced
    #[serde(default)]
    pub model: Option<String>,

    /// Feature order the weights were trained with
    #[serde(default)]
    pub features: Vec<String>,

    coefficients: Vec<Features>,
    intercepts: Vec<f64>,
}

impl LinearClassifier {
    pub fn new(coefficients: Vec<Features>, intercepts: Vec<f64>) -> Result<Self> {
        let model = LinearClassifier {
            model: None,
            features: Vec::new(),
            coefficients,
            intercepts,
        };
        model.check()?;
        Ok(model)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let model: LinearClassifier =
            serde_json::from_str(json).context("Failed to parse classifier artifact")?;
        model.check()?;
        Ok(model)
    }

    fn check(&self) -> Result<()> {
        if self.coefficients.len() < 2 {
            bail!("Classifier needs at least 2 classes, got {}", self.coefficients.len());
        }
        if self.coefficients.len() != self.intercepts.len() {
            bail!(
                "Classifier has {} coefficient rows but {} intercepts",
                self.coefficients.len(),
                self.intercepts.len()
            );
        }
        let all_finite = self
            .coefficients
            .iter()
            .flatten()
            .chain(self.intercepts.iter())
            .all(|w| w.is_finite());
        if !all_finite {
            bail!("Classifier weights must be finite numbers");
        }
        if !self.features.is_empty() && self.features != FEATURE_NAMES {
            bail!(
                "Classifier was trained on features {:?}, expected {:?}",
                self.features,
                FEATURE_NAMES
            );
        }
        Ok(())
    }

    /// Raw per-class scores.
    pub fn decision_function(&self, features: &Features) -> Vec<f64> {
        self.coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(weights, intercept)| {
                weights
                    .iter()
                    .zip(features)
                    .map(|(w, x)| w * x)
                    .sum::<f64>()
                    + intercept
            })
            .collect()
    }
}

impl Classifier for LinearClassifier {
    fn n_classes(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, features: &Features) -> Result<usize> {
        if features.iter().any(|x| !x.is_finite()) {
            bail!("Features must be finite numbers, got {:?}", features);
        }

        // Ties go to the lowest index
        let scores = self.decision_function(features);
        let mut best = 0;
        for (idx, score) in scores.iter().enumerate().skip(1) {
            if *score > scores[best] {
                best = idx;
            }
        }
        Ok(best)
    }
}

// ============================================================================
// LABEL ENCODER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Result<Self> {
        if classes.is_empty() {
            bail!("Label encoder has no classes");
        }
        Ok(LabelEncoder { classes })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let encoder: LabelEncoder =
            serde_json::from_str(json).context("Failed to parse label encoder")?;
        Self::new(encoder.classes)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn transform(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }

    pub fn inverse_transform(&self, index: usize) -> Result<&str> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("Class index {} has no label ({} known)", index, self.classes.len()))
    }
}

// ============================================================================
// PREDICTOR
// ============================================================================

/// A classifier paired with the encoder that names its classes.
pub struct Predictor {
    classifier: Box<dyn Classifier>,
    encoder: LabelEncoder,
    model_digest: String,
}

impl Predictor {
    pub fn new(
        classifier: Box<dyn Classifier>,
        encoder: LabelEncoder,
        model_digest: String,
    ) -> Result<Self> {
        if classifier.n_classes() != encoder.classes().len() {
            bail!(
                "Classifier predicts {} classes but the label encoder knows {}",
                classifier.n_classes(),
                encoder.classes().len()
            );
        }

        Ok(Predictor {
            classifier,
            encoder,
            model_digest,
        })
    }

    pub fn from_json(model_json: &str, encoder_json: &str) -> Result<Self> {
        let classifier = LinearClassifier::from_json(model_json)?;
        let encoder = LabelEncoder::from_json(encoder_json)?;
        let digest = sha256_hex(model_json.as_bytes());

        let predictor = Self::new(Box::new(classifier), encoder, digest)?;
        tracing::info!(
            model_sha256 = %predictor.model_digest,
            classes = ?predictor.encoder.classes(),
            "classifier loaded"
        );
        Ok(predictor)
    }

    pub fn from_files(model_path: &Path, encoder_path: &Path) -> Result<Self> {
        let model_json = fs::read_to_string(model_path)
            .with_context(|| format!("Failed to read classifier {}", model_path.display()))?;
        let encoder_json = fs::read_to_string(encoder_path)
            .with_context(|| format!("Failed to read label encoder {}", encoder_path.display()))?;
        Self::from_json(&model_json, &encoder_json)
    }

    /// The artifacts compiled into the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_MODEL, BUNDLED_LABELS)
    }

    pub fn predict(&self, measurements: &Measurements) -> Result<String> {
        let index = self.classifier.predict(&measurements.features())?;
        let species = self.encoder.inverse_transform(index)?;
        Ok(species.to_string())
    }

    pub fn model_digest(&self) -> &str {
        &self.model_digest
    }

    pub fn species(&self) -> &[String] {
        self.encoder.classes()
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iris::models::load_iris_csv;

    fn form_data() -> Measurements {
        // 7.0,3.2,4.7,1.4,versicolor
        Measurements {
            sepal_length: 7.0,
            sepal_width: 3.2,
            petal_length: 4.7,
            petal_width: 1.4,
        }
    }

    /// Always answers with the same index.
    struct FixedClassifier(usize, usize);

    impl Classifier for FixedClassifier {
        fn n_classes(&self) -> usize {
            self.1
        }

        fn predict(&self, _features: &Features) -> Result<usize> {
            Ok(self.0)
        }
    }

    fn labels() -> LabelEncoder {
        LabelEncoder::new(vec!["setosa".into(), "versicolor".into(), "virginica".into()]).unwrap()
    }

    #[test]
    fn test_bundled_predicts_versicolor() {
        let predictor = Predictor::bundled().unwrap();

        assert_eq!(predictor.predict(&form_data()).unwrap(), "versicolor");
        assert_eq!(predictor.species().len(), 3);
        assert_eq!(predictor.model_digest().len(), 64);
    }

    #[test]
    fn test_bundled_agrees_with_sample_data() {
        let predictor = Predictor::bundled().unwrap();
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/iris_sample.csv");
        let rows = load_iris_csv(&path).unwrap();
        assert!(!rows.is_empty());

        for row in rows {
            let m = Measurements {
                sepal_length: row.sepal_length,
                sepal_width: row.sepal_width,
                petal_length: row.petal_length,
                petal_width: row.petal_width,
            };
            assert_eq!(predictor.predict(&m).unwrap(), row.species, "row {}", row);
        }
    }

    #[test]
    fn test_linear_classifier_argmax() {
        let model = LinearClassifier::new(
            vec![[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0]],
            vec![0.0, 0.5],
        )
        .unwrap();

        assert_eq!(model.decision_function(&[2.0, 1.0, 0.0, 0.0]), vec![2.0, 1.5]);
        assert_eq!(model.predict(&[2.0, 1.0, 0.0, 0.0]).unwrap(), 0);
        assert_eq!(model.predict(&[1.0, 1.0, 0.0, 0.0]).unwrap(), 1);
        assert!(model.predict(&[f64::NAN, 1.0, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_linear_classifier_rejects_bad_artifacts() {
        assert!(LinearClassifier::new(vec![[0.0; 4]], vec![0.0]).is_err());
        assert!(LinearClassifier::new(vec![[0.0; 4], [0.0; 4]], vec![0.0]).is_err());
        assert!(LinearClassifier::new(vec![[f64::INFINITY; 4], [0.0; 4]], vec![0.0, 0.0]).is_err());
        assert!(LinearClassifier::from_json("{\"coefficients\": []}").is_err());
        assert!(LinearClassifier::from_json(
            r#"{"features": ["a", "b", "c", "d"],
                "coefficients": [[0,0,0,0],[0,0,0,0]],
                "intercepts": [0, 0]}"#
        )
        .is_err());
    }

    #[test]
    fn test_label_encoder() {
        let encoder = labels();

        assert_eq!(encoder.inverse_transform(1).unwrap(), "versicolor");
        assert_eq!(encoder.transform("virginica"), Some(2));
        assert_eq!(encoder.transform("rose"), None);
        assert!(encoder.inverse_transform(3).is_err());
        assert!(LabelEncoder::new(vec![]).is_err());
    }

    #[test]
    fn test_predictor_rejects_mismatched_encoder() {
        let result = Predictor::new(Box::new(FixedClassifier(0, 2)), labels(), String::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_predictor_uses_any_classifier() {
        let predictor =
            Predictor::new(Box::new(FixedClassifier(2, 3)), labels(), String::new()).unwrap();
        assert_eq!(predictor.predict(&form_data()).unwrap(), "virginica");
    }

    #[test]
    fn test_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        let labels_path = dir.path().join("labels.json");
        fs::write(&model_path, BUNDLED_MODEL).unwrap();
        fs::write(&labels_path, r#"{"classes": ["a", "b", "c"]}"#).unwrap();

        let predictor = Predictor::from_files(&model_path, &labels_path).unwrap();
        assert_eq!(predictor.predict(&form_data()).unwrap(), "b");
        assert_eq!(predictor.model_digest(), Predictor::bundled().unwrap().model_digest());

        assert!(Predictor::from_files(&dir.path().join("missing.json"), &labels_path).is_err());
    }

    #[test]
    fn test_parse_measurement() {
        assert_eq!(parse_measurement("sepal_length", " 5.1 ").unwrap(), 5.1);
        assert!(parse_measurement("sepal_length", "abc").is_err());
        assert!(parse_measurement("sepal_length", "").is_err());
        assert!(parse_measurement("sepal_length", "-1").is_err());
        assert!(parse_measurement("sepal_length", "NaN").is_err());
        assert_eq!(
            parse_measurement("petal_width", "x").unwrap_err(),
            "petal_width must be a number"
        );
    }
}
