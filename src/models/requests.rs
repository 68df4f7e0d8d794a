use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};
use crate::models::domain::{FilterSelection, GroupRecord, VisitorQuery};

/// Request to search for groups near the visitor
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    #[serde(alias = "whatsapp")]
    pub contact: String,
    #[validate(length(min = 1))]
    pub address: String,
    /// Omitted selections mean every value observed in the roster
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub days: Option<Vec<String>>,
    #[serde(default)]
    pub modes: Option<Vec<String>>,
}

impl SearchRequest {
    /// Visitor query against `groups`; omitted selections select everything
    pub fn into_query(self, groups: &[GroupRecord]) -> VisitorQuery {
        VisitorQuery {
            selection: FilterSelection::from_choices(groups, self.categories, self.days, self.modes),
            name: self.name,
            contact: self.contact,
            address: self.address,
        }
    }
}

/// Request to notify a group leader about a visitor
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NotifyRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "visitorName", rename = "visitor_name")]
    pub visitor_name: String,
    #[validate(length(min = 1))]
    #[serde(alias = "visitorContact", rename = "visitor_contact")]
    pub visitor_contact: String,
    /// Row of the chosen card; names are not unique across the roster
    #[serde(alias = "groupRow", rename = "group_row")]
    pub group_row: usize,
    #[validate(length(min = 1))]
    #[serde(alias = "groupName", rename = "group_name")]
    pub group_name: String,
}

/// Sorted names of the fields that failed validation
pub fn invalid_fields(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|field| field.to_string())
        .collect();
    fields.sort();
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_missing_fields() {
        let req = SearchRequest {
            name: String::new(),
            contact: "11 98765-4321".to_string(),
            address: String::new(),
            categories: None,
            days: None,
            modes: None,
        };

        let errors = req.validate().unwrap_err();
        assert_eq!(invalid_fields(&errors), vec!["address", "name"]);
    }

    #[test]
    fn test_search_request_accepts_whatsapp_alias() {
        let req: SearchRequest = serde_json::from_str(
            r#"{"name":"Ana","whatsapp":"11987654321","address":"Rua Augusta"}"#,
        )
        .unwrap();

        assert_eq!(req.contact, "11987654321");
        assert!(req.categories.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_into_query_defaults_to_all() {
        let groups = vec![GroupRecord {
            row: 0,
            name: "Life A".to_string(),
            address: None,
            neighborhood: "Centro".to_string(),
            category: "Jovens".to_string(),
            day: "Quarta".to_string(),
            mode: "Online".to_string(),
            start_time: "20:00".to_string(),
            leader_name: "Ana".to_string(),
            leader_contact: None,
            latitude: None,
            longitude: None,
        }];
        let req: SearchRequest = serde_json::from_str(
            r#"{"name":"Ana","contact":"11987654321","address":"Rua Augusta","days":["Sexta"]}"#,
        )
        .unwrap();

        let query = req.into_query(&groups);
        assert_eq!(query.address, "Rua Augusta");
        assert!(query.selection.categories.contains("Jovens"));
        assert!(query.selection.days.contains("Sexta"));
        assert!(!query.selection.days.contains("Quarta"));
    }
}
