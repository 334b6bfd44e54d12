use crate::domain::models::access::NotificationChannel;
use crate::domain::models::notification::Notification;
use crate::domain::ports::DeliveryService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::error;

/// Pushes notifications to the external delivery gateway, which owns the
/// actual push/email/SMS transports.
pub struct HttpDeliveryService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpDeliveryService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeliveryPayload<'a> {
    channel: &'static str,
    user_id: &'a str,
    title: &'a str,
    body: Option<&'a str>,
    priority: &'a str,
    ticket_id: Option<&'a str>,
    project_id: Option<&'a str>,
}

#[async_trait]
impl DeliveryService for HttpDeliveryService {
    async fn deliver(
        &self,
        channel: NotificationChannel,
        notification: &Notification,
    ) -> Result<(), AppError> {
        let payload = DeliveryPayload {
            channel: channel.as_str(),
            user_id: &notification.user_id,
            title: &notification.title,
            body: notification.body.as_deref(),
            priority: &notification.priority,
            ticket_id: notification.ticket_id.as_deref(),
            project_id: notification.project_id.as_deref(),
        };

        let res = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Delivery gateway connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Delivery gateway failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        Ok(())
    }
}
