use serde_json::{json, Value};

use crate::analytics::record::Parameters;

/// A sample event the inspector can fire by hand.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogueEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub parameters: Option<Parameters>,
}

impl CatalogueEntry {
    fn new(id: &'static str, name: &'static str, category: &'static str, parameters: Option<Value>) -> Self {
        Self {
            id,
            name,
            category,
            parameters: parameters.and_then(|p| match p {
                Value::Object(map) => Some(map),
                _ => None,
            }),
        }
    }
}

pub fn catalogue() -> Vec<CatalogueEntry> {
    vec![
        CatalogueEntry::new("page_view", "Page View", "Navigation", None),
        CatalogueEntry::new(
            "form_submit",
            "Form Submit",
            "Conversion",
            Some(json!({
                "form_name": "contact_form",
                "form_action": "/api/contact",
            })),
        ),
        CatalogueEntry::new(
            "cta_click",
            "CTA Click",
            "Conversion",
            Some(json!({
                "cta_type": "hero_cta",
                "cta_text": "Start Free Trial",
                "cta_href": "/signup",
            })),
        ),
        CatalogueEntry::new(
            "scroll_depth",
            "Scroll Depth",
            "Engagement",
            Some(json!({ "scroll_percentage": 50 })),
        ),
        CatalogueEntry::new(
            "purchase",
            "Purchase",
            "E-commerce",
            Some(json!({
                "value": 99.99,
                "currency": "USD",
                "items": [{ "id": "premium_plan", "name": "Premium Plan", "price": 99.99 }],
            })),
        ),
        CatalogueEntry::new(
            "sign_up",
            "Sign Up",
            "Conversion",
            Some(json!({
                "method": "email",
                "plan": "free_trial",
            })),
        ),
        CatalogueEntry::new(
            "video_play",
            "Video Play",
            "Engagement",
            Some(json!({
                "video_title": "Product Demo",
                "video_duration": 120,
            })),
        ),
    ]
}

/// Distinct categories in order of first appearance.
pub fn categories(entries: &[CatalogueEntry]) -> Vec<&'static str> {
    let mut seen: Vec<&'static str> = Vec::new();
    for entry in entries {
        if !seen.contains(&entry.category) {
            seen.push(entry.category);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let entries = catalogue();
        let mut ids: Vec<&str> = entries.iter().map(|e| e.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), entries.len());
    }

    #[test]
    fn categories_keep_first_appearance_order() {
        assert_eq!(
            categories(&catalogue()),
            vec!["Navigation", "Conversion", "Engagement", "E-commerce"]
        );
    }

    #[test]
    fn page_view_has_no_default_parameters() {
        let entries = catalogue();
        let page_view = entries.iter().find(|e| e.id == "page_view").unwrap();
        assert!(page_view.parameters.is_none());

        let purchase = entries.iter().find(|e| e.id == "purchase").unwrap();
        let params = purchase.parameters.as_ref().unwrap();
        assert_eq!(params["currency"], "USD");
        assert!(params["items"].is_array());
    }
}
