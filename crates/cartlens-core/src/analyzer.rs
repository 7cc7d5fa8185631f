use async_trait::async_trait;

use crate::models::{NutritionInfo, ProductFacts};
use crate::Result;

/// Trait for image analyzers - makes testing easier and keeps things flexible
///
/// The pipeline only ever talks to this. The real implementation wraps
/// the vision service client; tests substitute a mock, the same way the
/// UI layer stubs the service out in its own tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    /// Identify the product in an encoded photo
    async fn analyze_product(&self, encoded_image: &str) -> Result<ProductFacts>;

    /// Read the facts off an encoded nutrition-label photo
    async fn analyze_nutrition(&self, encoded_image: &str) -> Result<NutritionInfo>;
}
