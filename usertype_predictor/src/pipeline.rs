//! Feature record → probability → label.

use std::sync::Arc;

use crate::error::{PredictorError, Result};
use crate::model::Classifier;
use crate::schema::{self, FeatureSource};
use crate::types::{PredictionResult, TripFeatureRecord, UserType};

pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Index of `Customer` in the classifier's two-class output.
const POSITIVE_CLASS: usize = 1;

/// Customer iff `probability > threshold`; a tie is a Subscriber.
pub fn classify(probability: f64, threshold: f64) -> UserType {
    if probability > threshold {
        UserType::Customer
    } else {
        UserType::Subscriber
    }
}

/// Round to two decimals, ties to even.
pub fn round2(p: f64) -> f64 {
    (p * 100.0).round_ties_even() / 100.0
}

/// Score one record with the named feature mapping.
pub fn predict(
    features: &TripFeatureRecord,
    classifier: &dyn Classifier,
    threshold: f64,
) -> Result<PredictionResult> {
    predict_with_source(features, classifier, threshold, FeatureSource::Named)
}

pub fn predict_with_source(
    features: &TripFeatureRecord,
    classifier: &dyn Classifier,
    threshold: f64,
    source: FeatureSource,
) -> Result<PredictionResult> {
    let x = schema::to_vector(features, source);
    let out = classifier.predict_proba(&[x])?;
    let dist = out
        .first()
        .ok_or_else(|| PredictorError::Inference("classifier returned no rows".into()))?;
    if dist.len() != 2 {
        return Err(PredictorError::Inference(format!(
            "expected a 2-class distribution, got {} classes",
            dist.len()
        )));
    }
    let p = dist[POSITIVE_CLASS];
    if !p.is_finite() || !(0.0..=1.0).contains(&p) {
        return Err(PredictorError::Inference(format!(
            "positive-class probability {p} outside [0, 1]"
        )));
    }
    let probability = round2(p);
    Ok(PredictionResult {
        probability,
        label: classify(probability, threshold),
    })
}

/// Long-lived prediction state: the shared classifier plus decision policy.
#[derive(Clone)]
pub struct Pipeline {
    classifier: Arc<dyn Classifier>,
    threshold: f64,
    source: FeatureSource,
}

impl Pipeline {
    /// Fails if the classifier was trained on a different feature order.
    pub fn new(
        classifier: Arc<dyn Classifier>,
        threshold: f64,
        source: FeatureSource,
    ) -> Result<Self> {
        schema::verify(classifier.feature_names())?;
        Ok(Self {
            classifier,
            threshold,
            source,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn feature_source(&self) -> FeatureSource {
        self.source
    }

    pub fn predict(&self, features: &TripFeatureRecord) -> Result<PredictionResult> {
        predict_with_source(features, self.classifier.as_ref(), self.threshold, self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FeatureVector, FEATURE_NAMES};
    use crate::types::Gender;
    use std::sync::Mutex;

    /// Returns a fixed positive-class probability and records what it was fed.
    struct Fixed {
        p: f64,
        names: Vec<String>,
        seen: Mutex<Vec<FeatureVector>>,
    }

    impl Fixed {
        fn new(p: f64) -> Self {
            Self {
                p,
                names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Classifier for Fixed {
        fn feature_names(&self) -> &[String] {
            &self.names
        }
        fn n_classes(&self) -> usize {
            2
        }
        fn predict_proba(&self, rows: &[FeatureVector]) -> Result<Vec<Vec<f64>>> {
            self.seen.lock().unwrap().extend_from_slice(rows);
            Ok(rows.iter().map(|_| vec![1.0 - self.p, self.p]).collect())
        }
    }

    fn trip() -> TripFeatureRecord {
        TripFeatureRecord {
            trip_duration: 600,
            start_station_id: 3100,
            end_station_id: 3200,
            age: 30,
            gender: Gender::Male,
            start_hour: 8,
            start_day_of_week: 1,
            distance: 1200,
        }
    }

    #[test]
    fn low_probability_is_subscriber() {
        let r = predict(&trip(), &Fixed::new(0.05), DEFAULT_THRESHOLD).unwrap();
        assert_eq!(r.probability, 0.05);
        assert_eq!(r.label, UserType::Subscriber);
    }

    #[test]
    fn high_probability_is_customer() {
        let r = predict(&trip(), &Fixed::new(0.42), DEFAULT_THRESHOLD).unwrap();
        assert_eq!(r.probability, 0.42);
        assert_eq!(r.label, UserType::Customer);
    }

    #[test]
    fn probability_equal_to_threshold_is_subscriber() {
        let r = predict(&trip(), &Fixed::new(0.1), 0.1).unwrap();
        assert_eq!(r.label, UserType::Subscriber);
    }

    #[test]
    fn rounding_happens_before_thresholding() {
        // 0.104 rounds to 0.10, which is not above 0.1.
        let r = predict(&trip(), &Fixed::new(0.104), 0.1).unwrap();
        assert_eq!(r.probability, 0.1);
        assert_eq!(r.label, UserType::Subscriber);

        let r = predict(&trip(), &Fixed::new(0.106), 0.1).unwrap();
        assert_eq!(r.probability, 0.11);
        assert_eq!(r.label, UserType::Customer);
    }

    #[test]
    fn round2_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(1.0), 1.0);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn classify_uses_strict_greater_than() {
        for i in 0..=100 {
            let p = i as f64 / 100.0;
            let label = classify(p, 0.5);
            assert_eq!(label == UserType::Customer, p > 0.5, "p = {p}");
        }
    }

    #[test]
    fn classifier_sees_named_vector() {
        let clf = Fixed::new(0.3);
        predict(&trip(), &clf, DEFAULT_THRESHOLD).unwrap();
        let seen = clf.seen.lock().unwrap();
        assert_eq!(seen[0], [600.0, 3100.0, 3200.0, 30.0, 0.0, 8.0, 1.0, 1200.0]);
    }

    #[test]
    fn pipeline_applies_configured_source_and_threshold() {
        let clf = Arc::new(Fixed::new(0.3));
        let pipeline = Pipeline::new(clf.clone(), 0.5, FeatureSource::HourSubstituted).unwrap();
        let r = pipeline.predict(&trip()).unwrap();
        assert_eq!(r.label, UserType::Subscriber);
        assert_eq!(clf.seen.lock().unwrap()[0][6..], [8.0, 8.0]);
    }

    #[test]
    fn pipeline_rejects_classifier_with_other_feature_order() {
        let mut clf = Fixed::new(0.3);
        clf.names.swap(6, 7);
        let err = Pipeline::new(Arc::new(clf), 0.1, FeatureSource::Named).err().unwrap();
        assert!(matches!(err, PredictorError::SchemaMismatch { .. }));

        let mut clf = Fixed::new(0.3);
        clf.names.clear();
        assert!(Pipeline::new(Arc::new(clf), 0.1, FeatureSource::Named).is_err());
    }

    #[test]
    fn out_of_range_probability_is_an_error() {
        let err = predict(&trip(), &Fixed::new(1.5), DEFAULT_THRESHOLD).unwrap_err();
        assert!(matches!(err, PredictorError::Inference(_)));
    }

    #[test]
    fn non_binary_output_is_an_error() {
        struct ThreeWay(Vec<String>);
        impl Classifier for ThreeWay {
            fn feature_names(&self) -> &[String] {
                &self.0
            }
            fn n_classes(&self) -> usize {
                3
            }
            fn predict_proba(&self, rows: &[FeatureVector]) -> Result<Vec<Vec<f64>>> {
                Ok(rows.iter().map(|_| vec![0.2, 0.3, 0.5]).collect())
            }
        }
        let err = predict(&trip(), &ThreeWay(Vec::new()), DEFAULT_THRESHOLD).unwrap_err();
        assert!(matches!(err, PredictorError::Inference(_)));
    }
}
