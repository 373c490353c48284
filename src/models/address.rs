//! Address record
//!
//! Pickup/drop location as offered by address type-ahead.

use serde::{Deserialize, Serialize};

/// A customer location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address {
    /// Store-assigned identifier, None until persisted
    pub id: Option<i64>,
    /// Site label such as "Dock 4" or "Main Warehouse"
    pub location_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl Address {
    pub fn new(
        location_name: impl Into<String>,
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            location_name: location_name.into(),
            street: street.into(),
            city: city.into(),
            state: state.into(),
            zip: zip.into(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Case-insensitive substring match over the searchable fields.
    ///
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        [
            &self.location_name,
            &self.street,
            &self.city,
            &self.state,
            &self.zip,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }

    /// Single-line form shown in suggestion lists.
    pub fn display_line(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(4);
        for part in [&self.location_name, &self.street, &self.city] {
            if !part.is_empty() {
                parts.push(part);
            }
        }
        let mut line = parts.join(", ");
        let region = format!("{} {}", self.state, self.zip);
        let region = region.trim();
        if !region.is_empty() {
            if !line.is_empty() {
                line.push_str(", ");
            }
            line.push_str(region);
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Address {
        Address::new("Main Warehouse", "100 Main St", "Springfield", "IL", "62701")
    }

    #[test]
    fn test_matches_any_field() {
        let address = sample();
        assert!(address.matches("main"));
        assert!(address.matches("springf"));
        assert!(address.matches("627"));
        assert!(!address.matches("chicago"));
    }

    #[test]
    fn test_display_line() {
        assert_eq!(
            sample().display_line(),
            "Main Warehouse, 100 Main St, Springfield, IL 62701"
        );

        let bare = Address::new("", "9 Elm St", "", "", "");
        assert_eq!(bare.display_line(), "9 Elm St");
    }

    #[test]
    fn test_with_id() {
        assert_eq!(sample().with_id(7).id, Some(7));
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(sample().with_id(3)).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["city"], "Springfield");

        let back: Address = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample().with_id(3));
    }
}
