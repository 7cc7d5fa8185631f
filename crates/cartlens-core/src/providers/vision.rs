// Vision provider - bridges the service client with the ImageAnalyzer trait
use async_trait::async_trait;
use cartlens_vision::{NutritionFacts, VisionClient};

use crate::analyzer::ImageAnalyzer;
use crate::models::{NutritionInfo, ProductFacts};
use crate::{Error, Result};

/// Wrapper around VisionClient that implements ImageAnalyzer
pub struct VisionAnalyzer {
    client: VisionClient,
}

impl VisionAnalyzer {
    pub fn new(client: VisionClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageAnalyzer for VisionAnalyzer {
    async fn analyze_product(&self, encoded_image: &str) -> Result<ProductFacts> {
        let analysis = self
            .client
            .analyze_product(encoded_image)
            .await
            .map_err(|e| Error::Analysis(e.to_string()))?;

        Ok(ProductFacts {
            name: analysis.name,
            description: analysis.description,
        })
    }

    async fn analyze_nutrition(&self, encoded_image: &str) -> Result<NutritionInfo> {
        let facts = self
            .client
            .analyze_nutrition(encoded_image)
            .await
            .map_err(|e| Error::Analysis(e.to_string()))?;

        Ok(facts_to_info(facts))
    }
}

/// Convert the wire-level facts to the internal nutrition model
fn facts_to_info(facts: NutritionFacts) -> NutritionInfo {
    NutritionInfo {
        serving_size: facts.serving_size,
        calories: facts.calories,
        protein: facts.protein,
        carbohydrates: facts.carbohydrates,
        sugar: facts.sugar,
        fat: facts.fat,
    }
}
