//! Variation resolution and option display for product pages.
//!
//! A product's variations each carry an attribute map (`color`, `size`,
//! `material`, ...). When the shopper changes one option, [`resolve_variation`]
//! finds the variation matching the new combination, falling back to any
//! variation carrying the changed value.

use sofahub_core::{AttributeValue, Attributes, Price, VariationId};

use crate::api::{Product, ProductVariation};

/// Attribute keys never offered as selectable options.
const HIDDEN_KEYS: [&str; 2] = ["sku", "modifier"];

fn is_hidden(key: &str) -> bool {
    HIDDEN_KEYS.iter().any(|hidden| key.eq_ignore_ascii_case(hidden))
}

/// Resolve the variation selected after setting `key` to `value`.
///
/// Tries, in list order:
/// 1. a variation matching every attribute of the current selection with
///    `key` replaced by `value`;
/// 2. the first variation whose `key` matches `value`.
///
/// Returns `None` when neither exists, meaning the selection is unchanged.
/// Stock is not considered.
#[must_use]
pub fn resolve_variation<'a>(
    variations: &'a [ProductVariation],
    selected: Option<&ProductVariation>,
    key: &str,
    value: &AttributeValue,
) -> Option<&'a ProductVariation> {
    let target = selected.map_or_else(Attributes::new, |v| v.attributes.clone())
        .with(key, value.clone());

    variations
        .iter()
        .find(|v| v.attributes.contains_all(&target))
        .or_else(|| variations.iter().find(|v| v.attributes.has(key, value)))
}

/// The variation shown when a product page first opens.
#[must_use]
pub fn default_variation(product: &Product) -> Option<&ProductVariation> {
    product.variations.first()
}

// =============================================================================
// Option Groups
// =============================================================================

/// One selectable value of an attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeOption {
    /// Normalized value.
    pub value: String,
    /// Value formatted for display.
    pub display: String,
    /// The first variation carrying this value has stock.
    pub available: bool,
    pub selected: bool,
    /// Price of the first variation carrying this value, when it differs
    /// from the selected variation's price or nothing is selected.
    pub price: Option<Price>,
    pub variation_id: VariationId,
}

/// All values offered for one attribute key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeGroup {
    pub key: String,
    pub label: String,
    pub options: Vec<AttributeOption>,
}

/// Group the variations' attributes into selectable options.
///
/// Groups follow key order; values within a group keep first-seen order.
/// `sku` and `modifier` keys are skipped.
#[must_use]
pub fn attribute_groups(
    variations: &[ProductVariation],
    selected: Option<&ProductVariation>,
) -> Vec<AttributeGroup> {
    let mut groups: Vec<AttributeGroup> = Vec::new();

    for variation in variations {
        for (key, value) in variation.attributes.iter() {
            if is_hidden(key) {
                continue;
            }

            let index = if let Some(index) = groups.iter().position(|g| g.key == key) {
                index
            } else {
                groups.push(AttributeGroup {
                    key: key.to_string(),
                    label: attribute_label(key),
                    options: Vec::new(),
                });
                groups.len() - 1
            };

            let Some(group) = groups.get_mut(index) else {
                continue;
            };

            let normalized = value.normalized();
            if group.options.iter().any(|o| o.value == normalized) {
                continue;
            }

            let display = attribute_display_value(key, &normalized);
            group.options.push(AttributeOption {
                value: normalized.into_owned(),
                display,
                available: variation.in_stock(),
                selected: selected.is_some_and(|s| s.attributes.has(key, value)),
                price: selected
                    .is_none_or(|s| s.price != variation.price)
                    .then_some(variation.price),
                variation_id: variation.id,
            });
        }
    }

    groups.sort_by(|a, b| a.key.cmp(&b.key));
    groups
}

// =============================================================================
// Formatting
// =============================================================================

/// Display label for an attribute key.
#[must_use]
pub fn attribute_label(key: &str) -> String {
    match key.to_ascii_lowercase().as_str() {
        "color" => "Color".to_string(),
        "material" => "Material".to_string(),
        "size" => "Size".to_string(),
        "sku" => "SKU".to_string(),
        "finish" => "Finish".to_string(),
        "style" => "Style".to_string(),
        "dimensions" => "Dimensions".to_string(),
        _ => capitalize(key),
    }
}

/// Display form of an attribute value. SKUs are shown verbatim.
#[must_use]
pub fn attribute_display_value(key: &str, value: &str) -> String {
    if key.eq_ignore_ascii_case("sku") {
        value.to_string()
    } else {
        capitalize(value)
    }
}

/// One-line description of a variation, e.g. `Color: Red • Size: M`.
#[must_use]
pub fn selection_summary(variation: &ProductVariation) -> String {
    selection_summary_of(&variation.attributes)
}

/// [`selection_summary`] for a bare attribute map, such as an order line's.
#[must_use]
pub fn selection_summary_of(attributes: &Attributes) -> String {
    attributes
        .iter()
        .filter(|(key, _)| !is_hidden(key))
        .map(|(key, value)| {
            format!(
                "{}: {}",
                attribute_label(key),
                attribute_display_value(key, &value.normalized())
            )
        })
        .collect::<Vec<_>>()
        .join(" • ")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
