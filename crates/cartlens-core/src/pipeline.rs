// Two-stage analysis pipeline: turns a photo submission into an accepted
// item, or rejects the whole thing.
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analyzer::ImageAnalyzer;
use crate::image;
use crate::models::{ImageField, Item};
use crate::{Error, Result};

/// Where a pipeline run currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Analyzing,
    Accepted,
    Rejected,
}

/// A not-yet-accepted submission: user-entered price and quantity as they
/// came off the form, plus whatever photos were captured
#[derive(Debug, Clone)]
pub struct Candidate {
    pub price: String,
    pub quantity: String,
    pub product_image: ImageField,
    pub nutrition_image: ImageField,
}

impl Candidate {
    /// Price must be a non-negative number, quantity a positive integer.
    /// Checked before any analysis is attempted - a bad form never costs
    /// a service call.
    fn validate(&self) -> Result<(f64, u32)> {
        let price: f64 = self.price.trim().parse().map_err(|_| {
            Error::Validation(format!("price '{}' is not a number", self.price))
        })?;
        if !price.is_finite() || price < 0.0 {
            return Err(Error::Validation(format!(
                "price '{}' must be a non-negative number",
                self.price
            )));
        }

        let quantity: u32 = self.quantity.trim().parse().map_err(|_| {
            Error::Validation(format!(
                "quantity '{}' is not a positive integer",
                self.quantity
            ))
        })?;
        if quantity == 0 {
            return Err(Error::Validation("quantity must be at least 1".to_string()));
        }

        Ok((price, quantity))
    }
}

/// One submission at a time flows through here: Idle -> Analyzing ->
/// Accepted or Rejected. Re-submitting after a rejection is a fresh run;
/// nothing is cached between submissions.
pub struct ItemPipeline {
    analyzer: Arc<dyn ImageAnalyzer>,
    state: PipelineState,
}

impl ItemPipeline {
    pub fn new(analyzer: Arc<dyn ImageAnalyzer>) -> Self {
        Self {
            analyzer,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Run one submission through analysis and acceptance.
    ///
    /// The stages are sequenced, not concurrent: a failed product
    /// identification short-circuits the nutrition call. Any failure
    /// rejects the whole run - no partial item ever comes out of here,
    /// even when the product stage already succeeded.
    pub async fn submit(&mut self, candidate: Candidate) -> Result<Item> {
        let (price, quantity) = candidate.validate()?;

        self.state = PipelineState::Analyzing;

        match self.run(candidate, price, quantity).await {
            Ok(item) => {
                self.state = PipelineState::Accepted;
                info!("Accepted item '{}'", item.name);
                Ok(item)
            }
            Err(err) => {
                self.state = PipelineState::Rejected;
                warn!("Submission rejected: {}", err);
                Err(err)
            }
        }
    }

    async fn run(&self, candidate: Candidate, price: f64, quantity: u32) -> Result<Item> {
        let mut name = String::new();
        let mut description = None;

        if let Some(encoded) = image::encoded_form(&candidate.product_image)? {
            debug!("Analyzing product photo");
            let facts = match self.analyzer.analyze_product(&encoded).await {
                Ok(facts) => facts,
                Err(err) => {
                    return Err(Error::Analysis(format!("product analysis failed: {err}")))
                }
            };
            name = facts.name;
            description = Some(facts.description).filter(|d| !d.is_empty());
        }

        let mut nutrition = None;
        if let Some(encoded) = image::encoded_form(&candidate.nutrition_image)? {
            debug!("Analyzing nutrition label");
            match self.analyzer.analyze_nutrition(&encoded).await {
                Ok(info) => nutrition = Some(info),
                Err(err) => {
                    return Err(Error::Analysis(format!("nutrition analysis failed: {err}")))
                }
            }
        }

        // Acceptance: no identified product, no item. A price-and-quantity
        // submission without a product photo always lands here.
        if name.trim().is_empty() {
            return Err(Error::Validation("no identifiable product".to_string()));
        }

        Ok(Item {
            id: Uuid::new_v4(),
            name,
            description,
            price,
            quantity,
            product_image: candidate.product_image,
            nutrition_image: candidate.nutrition_image,
            nutrition_info: nutrition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::MockImageAnalyzer;
    use crate::models::{ImageBlob, NutritionInfo, ProductFacts};

    const PRODUCT_IMAGE: &str = "data:image/jpeg;base64,cHJvZHVjdA==";
    const LABEL_IMAGE: &str = "data:image/jpeg;base64,bGFiZWw=";

    fn candidate(price: &str, quantity: &str) -> Candidate {
        Candidate {
            price: price.to_string(),
            quantity: quantity.to_string(),
            product_image: ImageField::Absent,
            nutrition_image: ImageField::Absent,
        }
    }

    fn pipeline(mock: MockImageAnalyzer) -> ItemPipeline {
        ItemPipeline::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_product_only_submission_is_accepted() {
        let mut mock = MockImageAnalyzer::new();
        mock.expect_analyze_product().times(1).returning(|_| {
            Ok(ProductFacts {
                name: "Milk".to_string(),
                description: "1 gal".to_string(),
            })
        });
        mock.expect_analyze_nutrition().times(0);

        let mut pipeline = pipeline(mock);
        let mut submission = candidate("10", "2");
        submission.product_image = ImageField::Encoded(PRODUCT_IMAGE.to_string());

        let item = pipeline.submit(submission).await.unwrap();
        assert_eq!(item.name, "Milk");
        assert_eq!(item.description.as_deref(), Some("1 gal"));
        assert_eq!(item.price, 10.0);
        assert_eq!(item.quantity, 2);
        assert_eq!(item.nutrition_info, None);
        assert_eq!(pipeline.state(), PipelineState::Accepted);
    }

    #[tokio::test]
    async fn test_accepted_items_get_fresh_ids() {
        let mut mock = MockImageAnalyzer::new();
        mock.expect_analyze_product().returning(|_| {
            Ok(ProductFacts {
                name: "Milk".to_string(),
                description: String::new(),
            })
        });

        let mut pipeline = pipeline(mock);
        let mut first = candidate("1", "1");
        first.product_image = ImageField::Encoded(PRODUCT_IMAGE.to_string());
        let second = first.clone();

        let a = pipeline.submit(first).await.unwrap();
        let b = pipeline.submit(second).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_product_failure_short_circuits_nutrition() {
        let mut mock = MockImageAnalyzer::new();
        mock.expect_analyze_product()
            .times(1)
            .returning(|_| Err(Error::Analysis("service melted".to_string())));
        mock.expect_analyze_nutrition().times(0);

        let mut pipeline = pipeline(mock);
        let mut submission = candidate("5", "1");
        submission.product_image = ImageField::Encoded(PRODUCT_IMAGE.to_string());
        submission.nutrition_image = ImageField::Encoded(LABEL_IMAGE.to_string());

        let err = pipeline.submit(submission).await.unwrap_err();
        assert!(err.to_string().contains("product analysis failed"));
        assert_eq!(pipeline.state(), PipelineState::Rejected);
    }

    #[tokio::test]
    async fn test_nutrition_failure_discards_product_result() {
        let mut mock = MockImageAnalyzer::new();
        mock.expect_analyze_product().times(1).returning(|_| {
            Ok(ProductFacts {
                name: "Granola".to_string(),
                description: "Crunchy".to_string(),
            })
        });
        mock.expect_analyze_nutrition()
            .times(1)
            .returning(|_| Err(Error::Analysis("label unreadable".to_string())));

        let mut pipeline = pipeline(mock);
        let mut submission = candidate("4.25", "3");
        submission.product_image = ImageField::Encoded(PRODUCT_IMAGE.to_string());
        submission.nutrition_image = ImageField::Encoded(LABEL_IMAGE.to_string());

        let err = pipeline.submit(submission).await.unwrap_err();
        assert!(err.to_string().contains("nutrition analysis failed"));
        assert_eq!(pipeline.state(), PipelineState::Rejected);
    }

    #[tokio::test]
    async fn test_no_product_image_is_rejected_even_with_good_nutrition() {
        let mut mock = MockImageAnalyzer::new();
        mock.expect_analyze_product().times(0);
        mock.expect_analyze_nutrition().times(1).returning(|_| {
            Ok(NutritionInfo {
                calories: Some(100.0),
                ..Default::default()
            })
        });

        let mut pipeline = pipeline(mock);
        let mut submission = candidate("2", "1");
        submission.nutrition_image = ImageField::Encoded(LABEL_IMAGE.to_string());

        let err = pipeline.submit(submission).await.unwrap_err();
        assert!(err.to_string().contains("no identifiable product"));
        assert_eq!(pipeline.state(), PipelineState::Rejected);
    }

    #[tokio::test]
    async fn test_price_and_quantity_only_is_rejected() {
        let mut mock = MockImageAnalyzer::new();
        mock.expect_analyze_product().times(0);
        mock.expect_analyze_nutrition().times(0);

        let mut pipeline = pipeline(mock);
        let err = pipeline.submit(candidate("2", "1")).await.unwrap_err();
        assert!(err.to_string().contains("no identifiable product"));
    }

    #[tokio::test]
    async fn test_invalid_price_never_reaches_analysis() {
        let mut mock = MockImageAnalyzer::new();
        mock.expect_analyze_product().times(0);
        mock.expect_analyze_nutrition().times(0);

        let mut pipeline = pipeline(mock);
        let mut submission = candidate("ten dollars", "2");
        submission.product_image = ImageField::Encoded(PRODUCT_IMAGE.to_string());

        let err = pipeline.submit(submission).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(pipeline.state(), PipelineState::Idle);
    }

    #[tokio::test]
    async fn test_negative_price_and_zero_quantity_are_rejected() {
        let mock = MockImageAnalyzer::new();
        let mut pipeline = pipeline(mock);

        let err = pipeline.submit(candidate("-1", "1")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = pipeline.submit(candidate("1", "0")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_unreadable_capture_aborts_before_any_service_call() {
        let mut mock = MockImageAnalyzer::new();
        mock.expect_analyze_product().times(0);
        mock.expect_analyze_nutrition().times(0);

        let mut pipeline = pipeline(mock);
        let mut submission = candidate("3", "1");
        submission.product_image =
            ImageField::Live(ImageBlob::from_path("/definitely/not/here.png"));

        let err = pipeline.submit(submission).await.unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
        assert_eq!(pipeline.state(), PipelineState::Rejected);
    }
}
