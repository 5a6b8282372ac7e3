//! Cache Key Module
//!
//! Derives deterministic cache keys from a query namespace and its parameters.
//!
//! Required parameters are appended as-is. Optional parameters are appended
//! only when present and always carry a label, so `bd2` and `ba2` stay
//! distinct even though both hold the value 2.

use std::fmt::Display;

/// Separator placed between key segments.
pub const KEY_SEPARATOR: char = '_';

// == Key Builder ==
/// Incrementally assembles a cache key.
///
/// ```
/// use tiered_cache::keys::KeyBuilder;
///
/// let key = KeyBuilder::new("rent")
///     .part("90210")
///     .opt("bd", Some(2))
///     .opt("ba", None::<f64>)
///     .build();
/// assert_eq!(key, "rent_90210_bd2");
/// ```
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    key: String,
}

impl KeyBuilder {
    /// Starts a key with the given namespace tag.
    pub fn new(namespace: &str) -> Self {
        Self {
            key: namespace.to_string(),
        }
    }

    /// Appends a required parameter.
    pub fn part(mut self, value: impl Display) -> Self {
        self.push(format_args!("{}", value));
        self
    }

    /// Appends an optional parameter prefixed by `label`, or nothing if absent.
    pub fn opt<T: Display>(mut self, label: &str, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.push(format_args!("{}{}", label, value));
        }
        self
    }

    /// Appends an optional parameter followed by `suffix`, or nothing if absent.
    pub fn opt_suffixed<T: Display>(mut self, value: Option<T>, suffix: &str) -> Self {
        if let Some(value) = value {
            self.push(format_args!("{}{}", value, suffix));
        }
        self
    }

    /// Finishes the key.
    pub fn build(self) -> String {
        self.key
    }

    fn push(&mut self, segment: std::fmt::Arguments<'_>) {
        use std::fmt::Write;
        self.key.push(KEY_SEPARATOR);
        // Writing into a String cannot fail.
        let _ = self.key.write_fmt(segment);
    }
}

// == Query Shapes ==

/// Key for a marketplace listing search.
pub fn marketplace_listing_key(
    zip_code: &str,
    bedrooms: Option<u32>,
    bathrooms: Option<f64>,
    property_type: Option<&str>,
    max_price: Option<u32>,
) -> String {
    KeyBuilder::new("listings")
        .part(zip_code)
        .opt("bd", bedrooms)
        .opt("ba", bathrooms)
        .opt("type", property_type)
        .opt("max", max_price)
        .build()
}

/// Key for a rent estimate lookup.
pub fn rent_estimate_key(
    zip_code: &str,
    bedrooms: Option<u32>,
    bathrooms: Option<f64>,
    square_feet: Option<u32>,
) -> String {
    KeyBuilder::new("rent")
        .part(zip_code)
        .opt("bd", bedrooms)
        .opt("ba", bathrooms)
        .opt("sqft", square_feet)
        .build()
}

/// Key for market trend history over the last `months` months.
pub fn market_trends_key(zip_code: &str, months: Option<u32>) -> String {
    KeyBuilder::new("trends")
        .part(zip_code)
        .opt_suffixed(months, "mo")
        .build()
}
