//! Billing provider webhook payloads

use serde::{Deserialize, Serialize};

use crate::user::UserId;

/// The only event that changes state
pub const UPGRADED_EVENT: &str = "user.upgraded";

/// A webhook delivery: `{"event": "...", "data": {"user_id": n}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub data: WebhookData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookData {
    pub user_id: UserId,
}

impl WebhookEvent {
    pub fn upgraded(user_id: UserId) -> Self {
        Self {
            event: UPGRADED_EVENT.to_string(),
            data: WebhookData { user_id },
        }
    }

    pub fn is_upgrade(&self) -> bool {
        self.event == UPGRADED_EVENT
    }
}
