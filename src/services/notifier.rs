use crate::core::contact::normalize_contact;
use crate::models::{GroupRecord, NotificationPayload};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Default deep-link host for the messaging app
pub const DEFAULT_MESSAGING_BASE_URL: &str = "https://wa.me";

/// Default prefilled message; `{visitor}` and `{group}` are substituted
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "Olá, sou {visitor}. Tenho interesse no LifeGroup {group}.";

/// Errors that can occur when notifying a leader
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Notification webhook is not configured")]
    NotConfigured,

    #[error("Invalid notifier configuration: {0}")]
    InvalidConfig(String),

    #[error("Group has no leader contact")]
    NoLeaderContact,

    #[error("Webhook returned status {0}")]
    ApiError(u16),

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Notification settings, fixed at construction
#[derive(Debug, Clone)]
pub struct NotifierSettings {
    pub webhook_url: Option<String>,
    /// Redirect every leader contact to `test_contact`
    pub test_mode: bool,
    pub test_contact: Option<String>,
    pub messaging_base_url: String,
    pub message_template: String,
    pub request_timeout: Duration,
}

impl Default for NotifierSettings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            test_mode: false,
            test_contact: None,
            messaging_base_url: DEFAULT_MESSAGING_BASE_URL.to_string(),
            message_template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Visitor identity attached to a notification
#[derive(Debug, Clone)]
pub struct Visitor {
    pub name: String,
    pub contact: String,
}

/// Acknowledged delivery
#[derive(Debug, Clone)]
pub struct DispatchReceipt {
    pub payload: NotificationPayload,
    pub status: u16,
}

/// Leader notification dispatcher
///
/// Delivers match notifications to the webhook sink and builds the
/// messaging-app deep link offered next to every notify action.
pub struct Notifier {
    settings: NotifierSettings,
    client: Client,
}

impl Notifier {
    /// Create a new notifier
    ///
    /// Test mode needs a non-empty `test_contact` to redirect to.
    pub fn new(settings: NotifierSettings) -> Result<Self, DispatchError> {
        let test_contact_missing = settings
            .test_contact
            .as_deref()
            .map_or(true, |contact| contact.trim().is_empty());
        if settings.test_mode && test_contact_missing {
            return Err(DispatchError::InvalidConfig(
                "test mode requires a test contact".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()?;

        if settings.test_mode {
            tracing::warn!(
                "Notifier in test mode: all leader contacts redirected to {:?}",
                settings.test_contact
            );
        }

        Ok(Self { settings, client })
    }

    pub fn test_mode(&self) -> bool {
        self.settings.test_mode
    }

    /// Contact used to reach the group's leader
    ///
    /// In test mode this is always the configured test contact.
    pub fn leader_contact(&self, group: &GroupRecord) -> Option<String> {
        if self.settings.test_mode {
            self.settings.test_contact.clone()
        } else {
            normalize_contact(group.leader_contact.as_deref())
        }
    }

    /// Deep link opening a chat with `contact`, prefilled with the template
    pub fn messaging_link(&self, contact: &str, visitor_name: &str, group_name: &str) -> String {
        let message = self
            .settings
            .message_template
            .replace("{visitor}", visitor_name)
            .replace("{group}", group_name);

        format!(
            "{}/{}?text={}",
            self.settings.messaging_base_url.trim_end_matches('/'),
            contact,
            urlencoding::encode(&message)
        )
    }

    /// Deep link to the group's leader, if the leader can be reached
    pub fn leader_link(&self, group: &GroupRecord, visitor_name: &str) -> Option<String> {
        self.leader_contact(group)
            .map(|contact| self.messaging_link(&contact, visitor_name, &group.name))
    }

    /// Build the payload announcing `visitor` to the group's leader
    pub fn payload(&self, visitor: &Visitor, group: &GroupRecord) -> Result<NotificationPayload, DispatchError> {
        let mut missing = Vec::new();
        if visitor.name.is_empty() {
            missing.push("visitor_name");
        }
        if visitor.contact.is_empty() {
            missing.push("visitor_contact");
        }
        if !missing.is_empty() {
            return Err(DispatchError::MissingFields(missing));
        }

        let leader_contact = self.leader_contact(group).ok_or(DispatchError::NoLeaderContact)?;

        Ok(NotificationPayload {
            visitor_name: visitor.name.clone(),
            visitor_contact: visitor.contact.clone(),
            group_name: group.name.clone(),
            leader_name: group.leader_name.clone(),
            leader_contact,
            mode: group.mode.clone(),
            timestamp: chrono::Utc::now(),
        })
    }

    /// Notify the group's leader about `visitor`
    ///
    /// Only a 200 response counts as delivered. Nothing is sent when the
    /// visitor's name or contact is empty. No retries.
    pub async fn dispatch(&self, visitor: &Visitor, group: &GroupRecord) -> Result<DispatchReceipt, DispatchError> {
        let payload = self.payload(visitor, group)?;
        let url = self
            .settings
            .webhook_url
            .as_deref()
            .ok_or(DispatchError::NotConfigured)?;

        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&payload)?)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::error!("Webhook rejected notification for {:?}: {}", group.name, status);
            return Err(DispatchError::ApiError(status.as_u16()));
        }

        tracing::info!("Notified leader of {:?} about visitor {:?}", group.name, visitor.name);

        Ok(DispatchReceipt {
            payload,
            status: status.as_u16(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn create_group(contact: Option<&str>) -> GroupRecord {
        GroupRecord {
            row: 0,
            name: "Life Augusta".to_string(),
            address: Some("Rua Augusta 1500".to_string()),
            neighborhood: "Consolação".to_string(),
            category: "Jovens".to_string(),
            day: "Quarta".to_string(),
            mode: "Presencial".to_string(),
            start_time: "20:00".to_string(),
            leader_name: "Ana".to_string(),
            leader_contact: contact.map(str::to_string),
            latitude: Some(-23.5558),
            longitude: Some(-46.6622),
        }
    }

    fn visitor(name: &str, contact: &str) -> Visitor {
        Visitor {
            name: name.to_string(),
            contact: contact.to_string(),
        }
    }

    fn notifier(webhook_url: Option<String>) -> Notifier {
        Notifier::new(NotifierSettings {
            webhook_url,
            ..NotifierSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn test_messaging_link() {
        let notifier = notifier(None);
        let link = notifier.messaging_link("5511987654321", "João", "Life Augusta");

        assert_eq!(
            link,
            "https://wa.me/5511987654321?text=Ol%C3%A1%2C%20sou%20Jo%C3%A3o.%20Tenho%20interesse%20no%20LifeGroup%20Life%20Augusta."
        );
    }

    #[test]
    fn test_leader_contact_normalized() {
        let notifier = notifier(None);
        let group = create_group(Some("(11) 98765-4321"));

        assert_eq!(notifier.leader_contact(&group).as_deref(), Some("5511987654321"));
        assert_eq!(notifier.leader_contact(&create_group(Some("ask in person"))), None);
        assert_eq!(notifier.leader_link(&create_group(None), "João"), None);
    }

    #[test]
    fn test_test_mode_overrides_contact() {
        let notifier = Notifier::new(NotifierSettings {
            test_mode: true,
            test_contact: Some("5519992071423".to_string()),
            ..NotifierSettings::default()
        })
        .unwrap();

        // Even a group with no contact is routed to the test contact
        for group in [create_group(Some("(11) 98765-4321")), create_group(None)] {
            assert_eq!(notifier.leader_contact(&group).as_deref(), Some("5519992071423"));
            let link = notifier.leader_link(&group, "João").unwrap();
            assert!(link.starts_with("https://wa.me/5519992071423?text="));
            let payload = notifier.payload(&visitor("João", "11 90000-0000"), &group).unwrap();
            assert_eq!(payload.leader_contact, "5519992071423");
        }
    }

    #[test]
    fn test_test_mode_requires_contact() {
        for test_contact in [None, Some("  ".to_string())] {
            let result = Notifier::new(NotifierSettings {
                test_mode: true,
                test_contact,
                ..NotifierSettings::default()
            });
            assert!(matches!(result, Err(DispatchError::InvalidConfig(_))));
        }

        // Outside test mode the contact is optional
        assert!(Notifier::new(NotifierSettings::default()).is_ok());
    }

    #[test]
    fn test_payload_wire_keys() {
        let notifier = notifier(None);
        let payload = notifier
            .payload(&visitor("João", "11 90000-0000"), &create_group(Some("11987654321")))
            .unwrap();

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["visitante_nome"], "João");
        assert_eq!(value["visitante_zap"], "11 90000-0000");
        assert_eq!(value["life_nome"], "Life Augusta");
        assert_eq!(value["lider_nome"], "Ana");
        assert_eq!(value["lider_zap"], "5511987654321");
        assert_eq!(value["modo"], "Presencial");
        assert!(value["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(json!({
                "visitante_nome": "João",
                "life_nome": "Life Augusta",
                "lider_zap": "5511987654321"
            })))
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let notifier = notifier(Some(format!("{}/hook", server.url())));
        let receipt = notifier
            .dispatch(&visitor("João", "11 90000-0000"), &create_group(Some("(11) 98765-4321")))
            .await
            .unwrap();

        assert_eq!(receipt.status, 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_dispatch_non_200_is_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/hook")
            .with_status(201)
            .create_async()
            .await;

        let notifier = notifier(Some(format!("{}/hook", server.url())));
        let result = notifier
            .dispatch(&visitor("João", "11 90000-0000"), &create_group(Some("11987654321")))
            .await;

        assert!(matches!(result, Err(DispatchError::ApiError(201))));
    }

    #[tokio::test]
    async fn test_dispatch_refused_without_visitor_name() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .with_status(200)
            .expect(0)
            .create_async()
            .await;

        let notifier = notifier(Some(format!("{}/hook", server.url())));
        let result = notifier
            .dispatch(&visitor("", "11 90000-0000"), &create_group(Some("11987654321")))
            .await;

        match result {
            Err(DispatchError::MissingFields(fields)) => assert_eq!(fields, vec!["visitor_name"]),
            other => panic!("expected missing fields, got {:?}", other),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_dispatch_without_webhook() {
        let notifier = notifier(None);
        let result = notifier
            .dispatch(&visitor("João", "11 90000-0000"), &create_group(Some("11987654321")))
            .await;

        assert!(matches!(result, Err(DispatchError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_dispatch_transport_error() {
        // Nothing listens on the discard port
        let notifier = notifier(Some("http://127.0.0.1:9/hook".to_string()));
        let result = notifier
            .dispatch(&visitor("João", "11 90000-0000"), &create_group(Some("11987654321")))
            .await;

        assert!(matches!(result, Err(DispatchError::RequestError(_))));
    }
}
