use std::sync::Arc;

use stockwise_inventory::{ItemMaster, SalesTransaction};

use crate::error::AiError;
use crate::features::build_features;
use crate::predictor::DemandPredictor;
use crate::reorder::{Recommendation, ReorderPolicy};

/// A self-contained inference unit.
///
/// Jobs hold everything they read; running one has no side effects and
/// leaves no state behind.
pub trait AiJob: Send + Sync {
    type Input: Send + Sync;
    type Output;

    /// The input snapshot the job will run inference on.
    fn input(&self) -> &Self::Input;

    /// Execute inference.
    fn run(&self) -> Result<Self::Output, AiError>;
}

/// The two loaded input tables of one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisInput {
    pub master: ItemMaster,
    pub sales: Vec<SalesTransaction>,
}

/// Feature building, demand prediction and reorder classification over one input.
///
/// Recommendations come back in item master order.
pub struct InventoryAnalysisJob {
    input: AnalysisInput,
    predictor: Arc<dyn DemandPredictor>,
    policy: ReorderPolicy,
}

impl InventoryAnalysisJob {
    pub fn new(input: AnalysisInput, predictor: Arc<dyn DemandPredictor>) -> Self {
        Self {
            input,
            predictor,
            policy: ReorderPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ReorderPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl AiJob for InventoryAnalysisJob {
    type Input = AnalysisInput;
    type Output = Vec<Recommendation>;

    fn input(&self) -> &Self::Input {
        &self.input
    }

    fn run(&self) -> Result<Self::Output, AiError> {
        let features = build_features(&self.input.master, &self.input.sales);
        let predictions = self.predictor.predict(&features)?;

        if predictions.len() != features.len() {
            return Err(AiError::InferenceFailed(format!(
                "predictor returned {} value(s) for {} item(s)",
                predictions.len(),
                features.len()
            )));
        }

        let recommendations = features
            .rows()
            .iter()
            .zip(&predictions)
            .map(|(row, &raw)| {
                if !raw.is_finite() {
                    return Err(AiError::InferenceFailed(format!(
                        "non-finite demand prediction for item {}",
                        row.inventory_id
                    )));
                }
                Ok(self.policy.recommend(row, raw))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            items = recommendations.len(),
            transactions = self.input.sales.len(),
            "inventory analysis completed"
        );
        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureTable;
    use crate::reorder::StockStatus;
    use stockwise_inventory::InventoryItem;

    /// Returns a fixed prediction per row.
    struct FixedPredictor {
        columns: Vec<String>,
        values: Vec<f64>,
    }

    impl FixedPredictor {
        fn new(values: Vec<f64>) -> Arc<Self> {
            Arc::new(Self {
                columns: vec!["AvgSalesQuantity".to_string()],
                values,
            })
        }
    }

    impl DemandPredictor for FixedPredictor {
        fn feature_columns(&self) -> &[String] {
            &self.columns
        }

        fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>, AiError> {
            Ok(self.values.iter().copied().take(features.len()).collect())
        }
    }

    fn input() -> AnalysisInput {
        let master = ItemMaster::from_items(vec![
            InventoryItem::new("A1".parse().unwrap(), "Premium Vodka")
                .with_on_hand(50.0)
                .with_prices(20.0, 12.0)
                .with_lead_time(5.0),
            InventoryItem::new("B2".parse().unwrap(), "Scotch Whisky")
                .with_on_hand(5.0)
                .with_prices(40.0, 30.0)
                .with_lead_time(3.0),
            InventoryItem::new("C3".parse().unwrap(), "Bitters")
                .with_on_hand(0.0)
                .with_prices(8.0, 4.0)
                .with_lead_time(7.0),
        ])
        .unwrap();
        let sales = [8.0, 10.0, 12.0]
            .iter()
            .map(|q| SalesTransaction::new("A1".parse().unwrap(), *q, 20.0))
            .collect();
        AnalysisInput { master, sales }
    }

    #[test]
    fn recommends_per_item_in_master_order() {
        let job = InventoryAnalysisJob::new(input(), FixedPredictor::new(vec![9.6, 2.0, 0.0]));
        let recs = job.run().unwrap();

        let ids: Vec<_> = recs.iter().map(|r| r.inventory_id.as_str()).collect();
        assert_eq!(ids, ["A1", "B2", "C3"]);

        assert_eq!(recs[0].status, StockStatus::Reorder);
        assert_eq!(recs[0].reorder_point, 54);
        assert_eq!(recs[0].action, "Plan to order 4 units");

        assert_eq!(recs[1].status, StockStatus::Reorder);
        assert_eq!((recs[1].safety_stock, recs[1].reorder_point), (1, 7));

        assert_eq!(recs[2].status, StockStatus::Ok);
        assert_eq!(recs[2].action, "No action needed");
    }

    #[test]
    fn custom_safety_factor_is_applied() {
        let job = InventoryAnalysisJob::new(input(), FixedPredictor::new(vec![10.0, 0.0, 0.0]))
            .with_policy(ReorderPolicy::new().with_safety_factor(0.5));
        let recs = job.run().unwrap();
        assert_eq!(recs[0].safety_stock, 25);
        assert_eq!(recs[0].reorder_point, 75);
    }

    #[test]
    fn short_prediction_vector_is_rejected() {
        let job = InventoryAnalysisJob::new(input(), FixedPredictor::new(vec![1.0]));
        assert!(matches!(job.run(), Err(AiError::InferenceFailed(_))));
    }

    #[test]
    fn non_finite_prediction_is_rejected() {
        let job = InventoryAnalysisJob::new(input(), FixedPredictor::new(vec![1.0, f64::NAN, 1.0]));
        let err = job.run().unwrap_err();
        assert!(matches!(err, AiError::InferenceFailed(msg) if msg.contains("B2")));
    }

    #[test]
    fn job_exposes_its_input() {
        let job = InventoryAnalysisJob::new(input(), FixedPredictor::new(vec![0.0; 3]));
        assert_eq!(job.input().master.len(), 3);
        assert_eq!(job.input().sales.len(), 3);
    }
}
