// Pure aggregation over an item collection - the numbers the summary
// views show. No I/O, no state.
use crate::models::Item;

/// Per-field nutrition sums across a collection. A field one item's label
/// omitted counts as zero for that item without zeroing anyone else's
/// contribution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NutritionTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbohydrates: f64,
    pub sugar: f64,
    pub fat: f64,
}

/// Total spend: sum of price x quantity, rounded to cents for display.
///
/// Invalid numbers are rejected long before items land in a collection;
/// if a non-finite product shows up anyway it contributes nothing rather
/// than poisoning the total.
pub fn total_spend(items: &[Item]) -> f64 {
    let total: f64 = items
        .iter()
        .map(|item| {
            let line = item.price * f64::from(item.quantity);
            if line.is_finite() {
                line
            } else {
                0.0
            }
        })
        .sum();
    (total * 100.0).round() / 100.0
}

/// Per-field nutrition totals, each weighted by item quantity
pub fn nutrition_totals(items: &[Item]) -> NutritionTotals {
    let mut totals = NutritionTotals::default();
    for item in items {
        let Some(info) = &item.nutrition_info else {
            continue;
        };
        let quantity = f64::from(item.quantity);
        totals.calories += info.calories.unwrap_or(0.0) * quantity;
        totals.protein += info.protein.unwrap_or(0.0) * quantity;
        totals.carbohydrates += info.carbohydrates.unwrap_or(0.0) * quantity;
        totals.sugar += info.sugar.unwrap_or(0.0) * quantity;
        totals.fat += info.fat.unwrap_or(0.0) * quantity;
    }
    totals
}
