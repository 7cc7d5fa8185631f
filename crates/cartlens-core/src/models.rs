use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// One shopping-list entry - the star of the show
///
/// Serialized with the camelCase field names the stored lists use, so a
/// saved list reads as `{"productImage": "data:...", "nutritionInfo": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub product_image: ImageField,
    #[serde(default)]
    pub nutrition_image: ImageField,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_info: Option<NutritionInfo>,
}

/// What product analysis yields: a display name and a short description
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFacts {
    pub name: String,
    pub description: String,
}

/// Structured nutrition facts for one item. Absent fields stay absent -
/// a label that omitted fat does not become "0g fat".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbohydrates: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
}

/// A captured-but-not-yet-persisted image. The path is the live handle;
/// reading it can fail, which is where encoding errors originate.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlob {
    path: PathBuf,
    media_type: String,
}

impl ImageBlob {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let media_type = media_type_for(&path);
        Self { path, media_type }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }
}

fn media_type_for(path: &Path) -> String {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
    .to_string()
}

/// An item's photo in exactly one of its two representations, or absent.
///
/// The sum type means call sites always know which form they hold. `Live`
/// never reaches storage (ListStore normalizes on save, and serializing
/// one directly is an error); loading only ever produces `Encoded`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ImageField {
    /// Transient capture handle, scoped to the session
    Live(ImageBlob),
    /// Self-contained data-URI text, safe to store and display
    Encoded(String),
    #[default]
    Absent,
}

impl ImageField {
    pub fn is_absent(&self) -> bool {
        matches!(self, ImageField::Absent)
    }

    pub fn is_present(&self) -> bool {
        !self.is_absent()
    }
}

impl Serialize for ImageField {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ImageField::Encoded(data) => serializer.serialize_some(data),
            ImageField::Absent => serializer.serialize_none(),
            ImageField::Live(_) => Err(serde::ser::Error::custom(
                "live image handle must be encoded before serialization",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for ImageField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(match Option::<String>::deserialize(deserializer)? {
            Some(data) => ImageField::Encoded(data),
            None => ImageField::Absent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> Item {
        Item {
            id: Uuid::new_v4(),
            name: "Milk".to_string(),
            description: Some("1 gal".to_string()),
            price: 3.99,
            quantity: 2,
            product_image: ImageField::Encoded("data:image/png;base64,AAAA".to_string()),
            nutrition_image: ImageField::Absent,
            nutrition_info: None,
        }
    }

    #[test]
    fn test_item_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(sample_item()).unwrap();
        assert_eq!(json["productImage"], "data:image/png;base64,AAAA");
        assert_eq!(json["nutritionImage"], serde_json::Value::Null);
        assert!(json.get("nutritionInfo").is_none());
    }

    #[test]
    fn test_item_round_trips() {
        let item = sample_item();
        let json = serde_json::to_string(&item).unwrap();
        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_live_image_refuses_to_serialize() {
        let mut item = sample_item();
        item.product_image = ImageField::Live(ImageBlob::from_path("/tmp/capture.png"));
        let err = serde_json::to_string(&item).unwrap_err();
        assert!(err.to_string().contains("live image handle"));
    }

    #[test]
    fn test_missing_image_fields_deserialize_as_absent() {
        let json = r#"{"id":"67e55044-10b1-426f-9247-bb680e5fe0c8","name":"Eggs","price":4.5,"quantity":1}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert!(item.product_image.is_absent());
        assert!(item.nutrition_image.is_absent());
        assert_eq!(item.nutrition_info, None);
    }

    #[test]
    fn test_media_type_from_extension() {
        assert_eq!(ImageBlob::from_path("a.JPG").media_type(), "image/jpeg");
        assert_eq!(ImageBlob::from_path("a.png").media_type(), "image/png");
        assert_eq!(ImageBlob::from_path("a.webp").media_type(), "image/webp");
        assert_eq!(
            ImageBlob::from_path("mystery").media_type(),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_nutrition_info_omits_absent_fields() {
        let info = NutritionInfo {
            calories: Some(200.0),
            ..Default::default()
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["calories"], 200.0);
        assert!(json.get("fat").is_none());
        assert!(json.get("servingSize").is_none());
    }
}
