//! Clause classifier trait and shared helpers.
//!
//! The `ClauseClassifier` trait abstracts over multi-label clause typing.
//! Implementations:
//! - `OnnxClassifier`: fine-tuned sequence classifier exported to ONNX (requires `onnx`)
//! - test doubles in downstream crates

use clauselens_core::Result;
use ndarray::Array2;

/// Multi-label clause classifier over a fixed label set.
pub trait ClauseClassifier: Send + Sync {
    /// Label names, indexed like the probability vectors.
    fn labels(&self) -> &[String];

    /// Independent per-label probabilities in [0, 1] for each clause, in
    /// input order. No thresholding.
    fn classify(&self, clauses: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Logistic sigmoid.
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Apply sigmoid element-wise to a `[batch, labels]` logit matrix and split
/// it into per-row probability vectors.
pub fn sigmoid_rows(logits: Array2<f32>) -> Vec<Vec<f32>> {
    logits
        .mapv(sigmoid)
        .outer_iter()
        .map(|row| row.to_vec())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_sigmoid_bounds() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(20.0) > 0.999);
        assert!(sigmoid(-20.0) < 0.001);
        for x in [-100.0, -3.5, 0.1, 7.0, 100.0] {
            let p = sigmoid(x);
            assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn test_sigmoid_rows_shape() {
        let logits = array![[0.0, 10.0, -10.0], [1.0, -1.0, 0.0]];
        let rows = sigmoid_rows(logits);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 3);
        assert!((rows[0][0] - 0.5).abs() < 1e-6);
        assert!(rows[0][1] > 0.99);
        assert!(rows[1][1] < 0.5);
    }
}
