//! Catalog filter and sort selections, and their translation into
//! `GET /products/` query parameters.

use sofahub_core::Price;

/// Tag slug that also switches on the `on_sale` filter.
pub const ON_SALE_TAG: &str = "on-sale";

// =============================================================================
// Sorting
// =============================================================================

/// Product listing sort order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Alphabetical by name.
    #[default]
    Name,
    PriceLow,
    PriceHigh,
    Newest,
}

impl SortKey {
    /// All sort keys in menu order.
    pub const ALL: [Self; 4] = [Self::Name, Self::PriceLow, Self::PriceHigh, Self::Newest];

    /// Parse a sort key as it appears in listing URLs.
    ///
    /// Unrecognized keys sort newest first.
    #[must_use]
    pub fn from_param(param: &str) -> Self {
        match param.trim() {
            "name" => Self::Name,
            "price-low" => Self::PriceLow,
            "price-high" => Self::PriceHigh,
            _ => Self::Newest,
        }
    }

    /// The key as it appears in listing URLs.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Newest => "newest",
        }
    }

    /// The API's `ordering` value.
    #[must_use]
    pub const fn ordering(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::PriceLow => "base_price",
            Self::PriceHigh => "-base_price",
            Self::Newest => "-created_at",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name (A-Z)",
            Self::PriceLow => "Price: Low to High",
            Self::PriceHigh => "Price: High to Low",
            Self::Newest => "Newest First",
        }
    }
}

// =============================================================================
// Price Presets
// =============================================================================

/// A fixed price bracket offered by the listing filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricePreset {
    pub label: &'static str,
    /// Lower bound in shillings.
    pub min: i64,
    /// Upper bound in shillings; `None` is unbounded.
    pub max: Option<i64>,
}

impl PricePreset {
    #[must_use]
    pub fn min_price(&self) -> Price {
        Price::from_shillings(self.min)
    }

    #[must_use]
    pub fn max_price(&self) -> Option<Price> {
        self.max.map(Price::from_shillings)
    }
}

pub const PRICE_PRESETS: [PricePreset; 5] = [
    PricePreset {
        label: "Under KSh 10,000",
        min: 0,
        max: Some(10_000),
    },
    PricePreset {
        label: "KSh 10,000 - 25,000",
        min: 10_000,
        max: Some(25_000),
    },
    PricePreset {
        label: "KSh 25,000 - 50,000",
        min: 25_000,
        max: Some(50_000),
    },
    PricePreset {
        label: "KSh 50,000 - 100,000",
        min: 50_000,
        max: Some(100_000),
    },
    PricePreset {
        label: "Over KSh 100,000",
        min: 100_000,
        max: None,
    },
];

// =============================================================================
// CatalogQuery
// =============================================================================

/// The shopper's current listing selections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Room category slug.
    pub room: Option<String>,
    pub search: Option<String>,
    /// Selected tag slugs.
    pub tags: Vec<String>,
    /// Product type slug.
    pub product_type: Option<String>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub sort: SortKey,
    /// Carried for display only; the listing endpoint is not paginated.
    pub page: Option<u32>,
}

impl CatalogQuery {
    #[must_use]
    pub fn room(mut self, slug: impl Into<String>) -> Self {
        self.room = Some(slug.into());
        self
    }

    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    #[must_use]
    pub fn tag(mut self, slug: impl Into<String>) -> Self {
        self.tags.push(slug.into());
        self
    }

    /// Add every tag from a comma-separated list.
    #[must_use]
    pub fn tags_csv(mut self, csv: &str) -> Self {
        self.tags.extend(parse_tag_list(csv));
        self
    }

    #[must_use]
    pub fn product_type(mut self, slug: impl Into<String>) -> Self {
        self.product_type = Some(slug.into());
        self
    }

    #[must_use]
    pub const fn price_range(mut self, min: Option<Price>, max: Option<Price>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    #[must_use]
    pub fn preset(self, preset: &PricePreset) -> Self {
        self.price_range(Some(preset.min_price()), preset.max_price())
    }

    #[must_use]
    pub const fn sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// The free-text search term, if any.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        non_blank(self.search.as_deref())
    }

    /// Whether the `on-sale` tag is selected.
    #[must_use]
    pub fn on_sale(&self) -> bool {
        self.tags.iter().any(|t| t == ON_SALE_TAG)
    }

    /// Query parameters for `GET /products/`, in a stable order.
    ///
    /// Empty selections and a zero minimum price are left out. `ordering` is
    /// always present.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(room) = non_blank(self.room.as_deref()) {
            pairs.push(("room", room.to_string()));
        }
        if let Some(search) = self.search_term() {
            pairs.push(("search", search.to_string()));
        }

        let tags: Vec<&str> = self
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect();
        if !tags.is_empty() {
            pairs.push(("tags", tags.join(",")));
        }

        if let Some(product_type) = non_blank(self.product_type.as_deref()) {
            pairs.push(("product_type", product_type.to_string()));
        }
        if let Some(min) = self.min_price.filter(|p| *p > Price::ZERO) {
            pairs.push(("min_price", min.amount().normalize().to_string()));
        }
        if let Some(max) = self.max_price.filter(|p| *p > Price::ZERO) {
            pairs.push(("max_price", max.amount().normalize().to_string()));
        }
        if self.on_sale() {
            pairs.push(("on_sale", "true".to_string()));
        }

        pairs.push(("ordering", self.sort.ordering().to_string()));
        pairs
    }

    /// The encoded query string, without the leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_query_pairs())
            .finish()
    }
}

/// Split a comma-separated tag list, dropping blanks.
#[must_use]
pub fn parse_tag_list(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn keys(query: &CatalogQuery) -> Vec<&'static str> {
        query.to_query_pairs().into_iter().map(|(k, _)| k).collect()
    }

    // =========================================================================
    // Sort Tests
    // =========================================================================

    #[test]
    fn test_sort_mapping() {
        assert_eq!(SortKey::from_param("price-low").ordering(), "base_price");
        assert_eq!(SortKey::from_param("price-high").ordering(), "-base_price");
        assert_eq!(SortKey::from_param("name").ordering(), "name");
        assert_eq!(SortKey::from_param("newest").ordering(), "-created_at");
    }

    #[test]
    fn test_unrecognized_sort_is_newest() {
        assert_eq!(SortKey::from_param("popularity").ordering(), "-created_at");
        assert_eq!(SortKey::from_param("").ordering(), "-created_at");
    }

    #[test]
    fn test_sort_param_roundtrip() {
        for key in SortKey::ALL {
            assert_eq!(SortKey::from_param(key.as_param()), key);
        }
    }

    // =========================================================================
    // Query Tests
    // =========================================================================

    #[test]
    fn test_default_query_only_orders_by_name() {
        let pairs = CatalogQuery::default().to_query_pairs();
        assert_eq!(pairs, vec![("ordering", "name".to_string())]);
    }

    #[test]
    fn test_full_query() {
        let query = CatalogQuery::default()
            .room("living-room")
            .search("corner sofa")
            .tag("velvet")
            .tag("on-sale")
            .product_type("sofa")
            .price_range(Some(Price::from_shillings(10_000)), Some(Price::from_shillings(25_000)))
            .sort(SortKey::PriceHigh);

        let pairs = query.to_query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("room", "living-room".to_string()),
                ("search", "corner sofa".to_string()),
                ("tags", "velvet,on-sale".to_string()),
                ("product_type", "sofa".to_string()),
                ("min_price", "10000".to_string()),
                ("max_price", "25000".to_string()),
                ("on_sale", "true".to_string()),
                ("ordering", "-base_price".to_string()),
            ]
        );
    }

    #[test]
    fn test_blank_selections_are_omitted() {
        let query = CatalogQuery::default()
            .room("")
            .search("   ")
            .product_type("")
            .tag(" ");
        assert_eq!(keys(&query), vec!["ordering"]);
    }

    #[test]
    fn test_zero_minimum_is_omitted() {
        let query = CatalogQuery::default().preset(&PRICE_PRESETS[0]);
        assert_eq!(keys(&query), vec!["max_price", "ordering"]);
    }

    #[test]
    fn test_unbounded_maximum_is_omitted() {
        let query = CatalogQuery::default().preset(&PRICE_PRESETS[4]);
        let pairs = query.to_query_pairs();
        assert_eq!(pairs[0], ("min_price", "100000".to_string()));
        assert_eq!(keys(&query), vec!["min_price", "ordering"]);
    }

    #[test]
    fn test_page_is_not_sent() {
        let query = CatalogQuery::default().page(3);
        assert_eq!(keys(&query), vec!["ordering"]);
        assert_eq!(query.page, Some(3));
    }

    #[test]
    fn test_query_string_is_encoded() {
        let query = CatalogQuery::default().search("3 seater & chaise");
        assert_eq!(
            query.to_query_string(),
            "search=3+seater+%26+chaise&ordering=name"
        );
    }

    #[test]
    fn test_parse_tag_list() {
        assert_eq!(parse_tag_list("velvet, on-sale,,  leather "), vec!["velvet", "on-sale", "leather"]);
        assert!(parse_tag_list("").is_empty());
    }

    #[test]
    fn test_tags_csv_enables_on_sale() {
        let query = CatalogQuery::default().tags_csv("on-sale,new");
        assert!(query.on_sale());
    }

    #[test]
    fn test_presets_are_contiguous() {
        for pair in PRICE_PRESETS.windows(2) {
            assert_eq!(pair[0].max, Some(pair[1].min));
        }
    }
}
