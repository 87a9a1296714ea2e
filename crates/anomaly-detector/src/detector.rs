//! Two-stage anomaly detector

use crate::{AnomalyLabel, Assessment, DetectorConfig, DetectorError};
use data_validator::{FeatureCodec, FeatureScaler, SensorVector, ValidationError, FEATURE_NAMES};
use feature_engine::{ClassificationFeatureBuilder, CompositeFeatures};
use inference_engine::{BinaryClassifier, SequenceModel};
use ring_buffer::{Reading, RingBuffer};
use tracing::{debug, info, warn};
use vehicle_sim::{FaultKind, TelemetryGenerator};

/// Hybrid detector: a sequence predictor forecasts the next reading, and a
/// classifier labels the composite of raw values, prediction errors, rule
/// indicators, and rolling statistics.
///
/// Lifecycle is untrained until [`train_initial_model`](Self::train_initial_model)
/// succeeds; every detection call before that fails with
/// [`DetectorError::NotTrained`].
#[derive(Debug)]
pub struct AnomalyDetector {
    config: DetectorConfig,
    /// Private stream used only to synthesise the training corpus
    generator: TelemetryGenerator,
    features: ClassificationFeatureBuilder,
    predictor: Box<dyn SequenceModel>,
    classifier: Box<dyn BinaryClassifier>,
    /// Present once training has succeeded
    scaler: Option<FeatureScaler>,
    history: RingBuffer,
}

impl AnomalyDetector {
    pub(crate) fn from_parts(
        config: DetectorConfig,
        predictor: Box<dyn SequenceModel>,
        classifier: Box<dyn BinaryClassifier>,
    ) -> Result<Self, DetectorError> {
        config.validate()?;
        Ok(Self {
            features: ClassificationFeatureBuilder::new(
                config.thresholds.clone(),
                config.rolling_window,
            ),
            history: RingBuffer::new(config.history_capacity),
            generator: TelemetryGenerator::default(),
            predictor,
            classifier,
            scaler: None,
            config,
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn sequence_length(&self) -> usize {
        self.config.sequence_length
    }

    pub fn is_trained(&self) -> bool {
        self.scaler.is_some()
    }

    /// Detection history, oldest first
    pub fn history(&self) -> &RingBuffer {
        &self.history
    }

    /// Train both stages on a freshly synthesised corpus.
    ///
    /// Generates `n_samples` normal readings, fits the scaler and predictor
    /// on them, then adds labelled samples for every fault mode and fits the
    /// classifier. Requires `n_samples > sequence_length`.
    ///
    /// Each normal reading past the first window yields two rows: one with the
    /// predictor's forecast and one self-predicted over a short history, the
    /// regime inference falls back to before the history fills. Each fault
    /// mode yields `fault_samples_for(n_samples)` rows against the last normal
    /// window plus as many self-predicted rows over fault-only histories.
    pub fn train_initial_model(&mut self, n_samples: usize) -> Result<(), DetectorError> {
        let seq_len = self.config.sequence_length;
        if n_samples <= seq_len {
            return Err(DetectorError::InsufficientData(format!(
                "need more than {seq_len} normal samples, got {n_samples}"
            )));
        }

        self.scaler = None;
        info!("Training anomaly detector on {} normal samples", n_samples);

        self.generator.clear_fault();
        let normal: Vec<SensorVector> = (0..n_samples)
            .map(|_| FeatureCodec::encode(&self.generator.generate_reading()))
            .collect();
        let scaler = FeatureScaler::fit(&normal)?;
        let scaled = scaler.transform_all(&normal);

        self.predictor.fit(&scaled, seq_len)?;

        let capacity = self.config.history_capacity;
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in seq_len..n_samples {
            let predicted = self.predictor.predict(&scaled[i - seq_len..i])?;
            let history = &normal[i.saturating_sub(capacity)..i];
            rows.push(
                self.features
                    .build(&normal[i], &scaled[i], &predicted, history)
                    .values,
            );
            labels.push(false);

            // Same reading as seen before the history holds a full window
            let short = &normal[i - (i - seq_len) % seq_len..i];
            rows.push(
                self.features
                    .build(&normal[i], &scaled[i], &scaled[i], short)
                    .values,
            );
            labels.push(false);
        }
        let normal_rows = rows.len();

        // Fault samples share the last normal window as predictor context
        let context_prediction = self.predictor.predict(&scaled[n_samples - seq_len..])?;
        let trailing = &normal[n_samples.saturating_sub(self.config.rolling_window)..];
        let per_fault = self.config.fault_samples_for(n_samples);

        for fault in FaultKind::ALL {
            self.generator.inject_fault(Some(fault));
            let mut history = trailing.to_vec();
            for _ in 0..per_fault {
                let raw = FeatureCodec::encode(&self.generator.generate_reading());
                let actual = scaler.transform(&raw);
                rows.push(
                    self.features
                        .build(&raw, &actual, &context_prediction, &history)
                        .values,
                );
                labels.push(true);

                history.push(raw);
                if history.len() > capacity {
                    history.remove(0);
                }
            }

            // Self-predicted rows: a fault from the first reading, and one the
            // predictor has already tracked, both leave the error near zero
            let mut fault_history: Vec<SensorVector> = Vec::with_capacity(capacity);
            for j in 0..per_fault {
                let raw = FeatureCodec::encode(&self.generator.generate_reading());
                let actual = scaler.transform(&raw);
                let depth = fault_history.len().min(j % (2 * seq_len));
                let context = &fault_history[fault_history.len() - depth..];
                rows.push(self.features.build(&raw, &actual, &actual, context).values);
                labels.push(true);

                fault_history.push(raw);
                if fault_history.len() > capacity {
                    fault_history.remove(0);
                }
            }
        }
        self.generator.clear_fault();

        let report = self.classifier.fit(&rows, &labels)?;

        self.scaler = Some(scaler);
        info!(
            "Anomaly detector trained: {} normal + {} fault samples, classifier loss {:.5}",
            normal_rows,
            rows.len() - normal_rows,
            report.loss
        );
        Ok(())
    }

    /// Label a reading and record it in the history
    pub fn detect_anomaly(&mut self, reading: &Reading) -> Result<AnomalyLabel, DetectorError> {
        self.assess(reading).map(|a| a.label)
    }

    /// Score a reading (negated anomaly probability, lower is more anomalous)
    /// and record it unless it is already the newest history entry
    pub fn get_anomaly_score(&mut self, reading: &Reading) -> Result<f64, DetectorError> {
        self.assess(reading).map(|a| a.score)
    }

    /// Label and score in one pass, appending the reading at most once.
    ///
    /// When the reading is already the newest history entry it is left out
    /// of its own context, so repeated calls see the same context.
    pub fn assess(&mut self, reading: &Reading) -> Result<Assessment, DetectorError> {
        let features = self.composite_features(reading)?;
        let classification = self.classifier.classify(&features.values)?;
        self.history.push_unique(reading);

        let label = AnomalyLabel::from(classification.is_anomaly);
        metrics::counter!("detector_readings_total").increment(1);
        if label.is_anomalous() {
            metrics::counter!("detector_anomalies_total").increment(1);
        }
        debug!(
            "Reading {} -> {} (p={:.4}, history={})",
            reading.id(),
            label,
            classification.probability,
            self.history.len()
        );

        Ok(Assessment {
            label,
            probability: classification.probability,
            score: -classification.probability,
        })
    }

    /// Composite vector for a reading against the current history, without
    /// recording it
    pub fn composite_features(&self, reading: &Reading) -> Result<CompositeFeatures, DetectorError> {
        let scaler = self.scaler.as_ref().ok_or(DetectorError::NotTrained)?;

        let raw = FeatureCodec::encode(reading);
        if let Some(pos) = raw.iter().position(|v| !v.is_finite()) {
            return Err(ValidationError::InvalidFormat(format!(
                "{} is not a finite number",
                FEATURE_NAMES[pos]
            ))
            .into());
        }
        let actual = scaler.transform(&raw);

        let context = self.context_for(reading);
        let seq_len = self.config.sequence_length;
        let predicted = if context.len() >= seq_len {
            let window = scaler.transform_all(&context[context.len() - seq_len..]);
            self.predictor.predict(&window)?
        } else {
            warn!(
                "History holds {} of {} readings, using the reading as its own prediction",
                context.len(),
                seq_len
            );
            actual
        };

        Ok(self.features.build(&raw, &actual, &predicted, &context))
    }

    /// Replace the history with the last `history_capacity` readings
    pub fn sync_history(&mut self, readings: &[Reading]) {
        self.history.replace(readings);
        debug!(
            "History synced: {} readings supplied, {} kept",
            readings.len(),
            self.history.len()
        );
    }

    /// Raw vectors of the history preceding `reading`, oldest first
    fn context_for(&self, reading: &Reading) -> Vec<SensorVector> {
        let len = self.history.len() - usize::from(self.history.ends_with(reading));
        let needed = self.config.sequence_length.max(self.config.rolling_window);
        let start = len.saturating_sub(needed);
        self.history
            .iter()
            .take(len)
            .skip(start)
            .map(FeatureCodec::encode)
            .collect()
    }
}
