use serde::{Deserialize, Serialize};

use crate::models::Event;

/// Category value meaning "do not filter by category".
pub const ALL_CATEGORIES: &str = "All Categories";

pub const CATEGORIES: [&str; 10] = [
    "Music",
    "Tech",
    "Sports",
    "Arts",
    "Food & Drink",
    "Business",
    "Health & Wellness",
    "Education",
    "Community",
    "Entertainment",
];

/// The three independent list filters, ANDed together.
///
/// Blank `search` and `location` values and the [`ALL_CATEGORIES`] sentinel
/// each disable their filter. Search and location compare case-insensitively
/// after trimming surrounding whitespace; category compares exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventFilter {
    pub search: String,
    pub category: String,
    pub location: String,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL_CATEGORIES.to_string(),
            location: String::new(),
        }
    }
}

impl EventFilter {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn has_active_filters(&self) -> bool {
        search_term(&self.search).is_some()
            || self.category_filter().is_some()
            || search_term(&self.location).is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn category_filter(&self) -> Option<&str> {
        if self.category.is_empty() || self.category == ALL_CATEGORIES {
            None
        } else {
            Some(&self.category)
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        if let Some(term) = search_term(&self.search) {
            let hit = [
                &event.title,
                &event.description,
                &event.location,
                &event.category,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }

        if let Some(category) = self.category_filter() {
            if event.category != category {
                return false;
            }
        }

        if let Some(term) = search_term(&self.location) {
            if !event.location.to_lowercase().contains(&term) {
                return false;
            }
        }

        true
    }

    /// Keeps matching events in their original order.
    pub fn apply<T: AsRef<Event>>(&self, events: Vec<T>) -> Vec<T> {
        events
            .into_iter()
            .filter(|event| self.matches(event.as_ref()))
            .collect()
    }
}

fn search_term(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn event(title: &str, category: &str, location: &str) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: format!("{} description", title),
            category: category.to_string(),
            location: location.to_string(),
            date: Utc::now(),
            created_by: Uuid::new_v4(),
            cover_image: None,
            created_at: Utc::now(),
        }
    }

    fn titles(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.title.as_str()).collect()
    }

    fn sample() -> Vec<Event> {
        vec![
            event("Jazz Night", "Music", "Austin"),
            event("Rust Meetup", "Tech", "Boston"),
            event("Blues Jam", "Music", "Boston"),
            event("Marathon", "Sports", "South Austin"),
        ]
    }

    #[test]
    fn test_category_only() {
        let events = vec![event("one", "Music", "Austin"), event("two", "Tech", "Boston")];
        let first = events[0].id;
        let filtered = EventFilter::default().category("Music").apply(events);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, first);
    }

    #[test]
    fn test_default_filter_keeps_everything_in_order() {
        let filter = EventFilter::default();
        assert!(!filter.has_active_filters());
        assert_eq!(
            titles(&filter.apply(sample())),
            vec!["Jazz Night", "Rust Meetup", "Blues Jam", "Marathon"]
        );
    }

    #[test]
    fn test_search_matches_any_field_case_insensitively() {
        let by_title = EventFilter::default().search("JAZZ");
        assert_eq!(titles(&by_title.apply(sample())), vec!["Jazz Night"]);

        let by_category = EventFilter::default().search("tech");
        assert_eq!(titles(&by_category.apply(sample())), vec!["Rust Meetup"]);

        let by_location = EventFilter::default().search("austin");
        assert_eq!(titles(&by_location.apply(sample())), vec!["Jazz Night", "Marathon"]);

        let by_description = EventFilter::default().search("jam description");
        assert_eq!(titles(&by_description.apply(sample())), vec!["Blues Jam"]);
    }

    #[test]
    fn test_category_is_exact() {
        let filter = EventFilter::default().category("music");
        assert!(filter.apply(sample()).is_empty());
    }

    #[test]
    fn test_location_is_substring() {
        let filter = EventFilter::default().location("bos");
        assert_eq!(titles(&filter.apply(sample())), vec!["Rust Meetup", "Blues Jam"]);
    }

    #[test]
    fn test_blank_values_disable_filters() {
        let filter = EventFilter::default().search("   ").location("");
        assert!(!filter.has_active_filters());
        assert_eq!(filter.apply(sample()).len(), 4);
    }

    #[test]
    fn test_filters_are_anded() {
        let filter = EventFilter::default()
            .search("b")
            .category("Music")
            .location("boston");
        assert!(filter.has_active_filters());
        assert_eq!(titles(&filter.apply(sample())), vec!["Blues Jam"]);
    }

    #[test]
    fn test_category_and_location_commute() {
        for category in ["Music", "Tech", "Sports", ALL_CATEGORIES] {
            for location in ["austin", "boston", "", "nowhere"] {
                let by_category = EventFilter::default().category(category);
                let by_location = EventFilter::default().location(location);

                let one = by_location.apply(by_category.apply(sample()));
                let two = by_category.apply(by_location.apply(sample()));
                assert_eq!(one, two, "category={} location={}", category, location);
            }
        }
    }

    #[test]
    fn test_clear_resets_to_sentinel() {
        let mut filter = EventFilter::default().search("x").category("Tech").location("y");
        filter.clear();
        assert_eq!(filter, EventFilter::default());
        assert_eq!(filter.category, ALL_CATEGORIES);
    }

    #[test]
    fn test_deserializes_partial_query() {
        let filter: EventFilter = serde_json::from_str(r#"{"location":"Austin"}"#).unwrap();
        assert_eq!(filter.category, ALL_CATEGORIES);
        assert_eq!(filter.search, "");
        assert_eq!(filter.location, "Austin");
    }
}
