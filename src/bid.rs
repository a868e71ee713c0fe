//! Bid-generation entry point consumed by the auction host.
//!
//! The host hands over an interest group whose first ad carries the scoring
//! inputs in its metadata bag: either a pre-computed bid, or an input vector
//! with raw model weights. This module's only obligation is to populate the
//! numeric bid field of the returned record; everything else is echoed back
//! opaquely.

use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::errors::BidError;
use crate::model::DenseModel;
use crate::tensor::{Matrix, Vector};

/// Metadata bag of one ad: the fields the bid kernel understands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Vector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nn_model_weights: Option<Vec<Matrix>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid: Option<f64>,
}

/// One ad of an interest group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ad {
    pub render_url: String,
    #[serde(default)]
    pub metadata: AdMetadata,
}

/// The interest-group record the auction host passes in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestGroup {
    pub ads: Vec<Ad>,
}

/// The structured result the auction host expects back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidResult {
    pub ad: String,
    pub bid: f64,
    pub render: String,
}

/// Fire-and-forget reporting seam. Implementations must not block the
/// caller; the default sink only logs.
pub trait ReportSink {
    fn send_report(&self, url: &str);
}

/// Default sink: records the report URL in the log and returns immediately.
pub struct LogReportSink;

impl ReportSink for LogReportSink {
    fn send_report(&self, url: &str) {
        log::debug!("sendReportTo: {}", url);
    }
}

/// Computes a bid for the interest group's first ad.
///
/// A pre-computed `metadata.bid` wins; otherwise the metadata must carry an
/// input vector and raw weight matrices, which are evaluated as an all-ReLU
/// dense stack. Non-finite scores are clamped to 0.0 so the host can always
/// order bids.
pub fn generate_bid(interest_group: &InterestGroup) -> Result<BidResult, BidError> {
    let ad = interest_group.ads.first().ok_or(BidError::NoAdsProvided)?;

    let bid = if let Some(bid) = ad.metadata.bid {
        bid
    } else {
        match (&ad.metadata.input, &ad.metadata.nn_model_weights) {
            (Some(input), Some(weights)) => {
                let model =
                    DenseModel::with_uniform_activation(weights.clone(), Activation::Relu)?;
                model.evaluate_scalar(input)?
            }
            _ => return Err(BidError::MissingBidInputs),
        }
    };

    let bid = if bid.is_finite() { bid } else { 0.0 };

    Ok(BidResult {
        ad: "example".to_string(),
        bid,
        render: ad.render_url.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_with_metadata(metadata: AdMetadata) -> InterestGroup {
        InterestGroup {
            ads: vec![Ad {
                render_url: "https://0.0.0.0/renderUrl123".to_string(),
                metadata,
            }],
        }
    }

    #[test]
    fn test_precomputed_bid_passthrough() {
        let group = group_with_metadata(AdMetadata {
            bid: Some(10.0),
            ..Default::default()
        });
        let result = generate_bid(&group).unwrap();
        assert_eq!(result.bid, 10.0);
        assert_eq!(result.render, "https://0.0.0.0/renderUrl123");
    }

    #[test]
    fn test_bid_computed_from_metadata_tensors() {
        let group = group_with_metadata(AdMetadata {
            input: Some(vec![1.0, 2.0]),
            nn_model_weights: Some(vec![
                vec![vec![1.0, 1.0], vec![2.0, 0.0]], // 2x2
                vec![vec![1.0, 1.0]],                 // 1x2
            ]),
            ..Default::default()
        });
        // Layer 1: [3, 2] -> relu unchanged; layer 2: 5.
        let result = generate_bid(&group).unwrap();
        assert!((result.bid - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_inputs_rejected() {
        let group = group_with_metadata(AdMetadata::default());
        assert!(matches!(
            generate_bid(&group),
            Err(BidError::MissingBidInputs)
        ));
    }

    #[test]
    fn test_no_ads_rejected() {
        let group = InterestGroup { ads: vec![] };
        assert!(matches!(generate_bid(&group), Err(BidError::NoAdsProvided)));
    }

    #[test]
    fn test_interest_group_deserializes_host_shape() {
        let json = r#"{
            "ads": [{
                "renderUrl": "https://0.0.0.0/renderUrl123",
                "metadata": { "input": [0.5, -0.5], "bid": 2.5 }
            }]
        }"#;
        let group: InterestGroup = serde_json::from_str(json).unwrap();
        assert_eq!(group.ads[0].render_url, "https://0.0.0.0/renderUrl123");
        assert_eq!(generate_bid(&group).unwrap().bid, 2.5);
    }
}
