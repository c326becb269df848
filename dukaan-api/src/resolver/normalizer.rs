//! Product metadata normalization
//!
//! Pure transformation from a raw provider record into the canonical shape
//! stored in `master_products`, plus a completeness-based confidence score.
//! Deterministic: the same raw input always produces the same output.

use serde::{Deserialize, Serialize};

use super::provider::RawProviderRecord;

/// Canonical product fields produced by normalization (barcode and
/// timestamps are attached by the resolver/persistence layer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedProduct {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub quantity: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub source: Option<String>,
    pub confidence: f64,
}

/// Normalize a raw product record from an external provider.
///
/// Name, brand and category are trimmed and title-cased; quantity, image and
/// source are trimmed only. Empty strings become absent. The confidence score
/// is computed from the sanitized (pre-title-case) values.
pub fn normalize(raw: &RawProviderRecord) -> NormalizedProduct {
    let name = sanitize(raw.name.as_deref());
    let brand = sanitize(raw.brand.as_deref());
    let quantity = sanitize(raw.quantity.as_deref());
    let category = sanitize(raw.category.as_deref());
    let image = sanitize(raw.image.as_deref());
    let source = sanitize(raw.source.as_deref());

    let confidence = compute_confidence(name.is_some(), brand.is_some(), quantity.is_some());

    NormalizedProduct {
        name: name.map(|v| title_case(&v)),
        brand: brand.map(|v| title_case(&v)),
        quantity,
        category: category.map(|v| title_case(&v)),
        image,
        source,
        confidence,
    }
}

/// Trim whitespace; an empty result is treated as absent
fn sanitize(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Lowercase the string, then uppercase the first letter of each
/// space-separated token
fn title_case(value: &str) -> String {
    value
        .to_lowercase()
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Confidence from field completeness, checked in strict priority order:
///   name + brand + quantity -> 0.9
///   name + brand            -> 0.75
///   name only               -> 0.6
///   no name                 -> 0.3
fn compute_confidence(name: bool, brand: bool, quantity: bool) -> f64 {
    if name && brand && quantity {
        0.9
    } else if name && brand {
        0.75
    } else if name {
        0.6
    } else {
        0.3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(
        name: Option<&str>,
        brand: Option<&str>,
        quantity: Option<&str>,
    ) -> RawProviderRecord {
        RawProviderRecord {
            name: name.map(String::from),
            brand: brand.map(String::from),
            quantity: quantity.map(String::from),
            category: None,
            image: None,
            source: Some("openfoodfacts".to_string()),
        }
    }

    #[test]
    fn test_title_case_basic() {
        assert_eq!(title_case("coca cola"), "Coca Cola");
        assert_eq!(title_case("COCA COLA"), "Coca Cola");
        assert_eq!(title_case("mAiZe fLaKeS"), "Maize Flakes");
    }

    #[test]
    fn test_title_case_hyphen_is_not_a_boundary() {
        assert_eq!(title_case("the coca-cola co"), "The Coca-cola Co");
    }

    #[test]
    fn test_title_case_single_word() {
        assert_eq!(title_case("parle"), "Parle");
    }

    #[test]
    fn test_sanitize_trims_and_drops_empty() {
        assert_eq!(sanitize(Some("  500 g  ")), Some("500 g".to_string()));
        assert_eq!(sanitize(Some("   ")), None);
        assert_eq!(sanitize(Some("")), None);
        assert_eq!(sanitize(None), None);
    }

    #[test]
    fn test_confidence_all_present() {
        let out = normalize(&raw(Some("Maggi Noodles"), Some("Nestle"), Some("70 g")));
        assert_eq!(out.confidence, 0.9);
    }

    #[test]
    fn test_confidence_name_and_brand() {
        let out = normalize(&raw(Some("Maggi Noodles"), Some("Nestle"), None));
        assert_eq!(out.confidence, 0.75);
    }

    #[test]
    fn test_confidence_name_only() {
        let out = normalize(&raw(Some("Maggi Noodles"), None, None));
        assert_eq!(out.confidence, 0.6);
    }

    #[test]
    fn test_confidence_no_name_regardless_of_rest() {
        assert_eq!(normalize(&raw(None, None, None)).confidence, 0.3);
        assert_eq!(normalize(&raw(None, Some("Nestle"), None)).confidence, 0.3);
        assert_eq!(normalize(&raw(None, Some("Nestle"), Some("70 g"))).confidence, 0.3);
        assert_eq!(normalize(&raw(None, None, Some("70 g"))).confidence, 0.3);
    }

    #[test]
    fn test_whitespace_only_fields_count_as_absent_for_confidence() {
        let out = normalize(&raw(Some("Maggi"), Some("   "), Some("70 g")));
        assert_eq!(out.brand, None);
        assert_eq!(out.confidence, 0.6);
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let input = RawProviderRecord {
            name: Some("  coca cola  ".to_string()),
            brand: Some("the coca-cola co".to_string()),
            quantity: Some("500ml".to_string()),
            category: Some("beverages".to_string()),
            image: Some(" https://img.example/cc.jpg ".to_string()),
            source: Some("openfoodfacts".to_string()),
        };

        let first = normalize(&input);
        assert_eq!(first.name, Some("Coca Cola".to_string()));
        assert_eq!(first.brand, Some("The Coca-cola Co".to_string()));
        assert_eq!(first.quantity, Some("500ml".to_string()));
        assert_eq!(first.category, Some("Beverages".to_string()));
        assert_eq!(first.image, Some("https://img.example/cc.jpg".to_string()));
        assert_eq!(first.confidence, 0.9);

        for _ in 0..10 {
            assert_eq!(normalize(&input), first);
        }
    }

    #[test]
    fn test_quantity_keeps_original_case() {
        let out = normalize(&raw(Some("Rice"), Some("Daawat"), Some("5 Kg PACK")));
        assert_eq!(out.quantity, Some("5 Kg PACK".to_string()));
    }
}
