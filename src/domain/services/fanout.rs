use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::models::access::ProjectAccess;
use crate::domain::models::notification::{NewNotificationParams, Notification};
use crate::domain::models::ticket::Ticket;
use crate::error::AppError;
use crate::domain::ports::{AccessRepository, DeliveryService, NotificationRepository};

/// Ticket lifecycle events that produce notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketEvent {
    Created,
    Assigned,
    StatusChanged,
    CommentAdded,
    Escalated,
    SlaWarning,
}

impl TicketEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            TicketEvent::Created => "ticket:created",
            TicketEvent::Assigned => "ticket:assigned",
            TicketEvent::StatusChanged => "ticket:status_changed",
            TicketEvent::CommentAdded => "comment:added",
            TicketEvent::Escalated => "ticket:escalated",
            TicketEvent::SlaWarning => "sla:warning",
        }
    }

    /// Escalations and SLA warnings additionally go to project-level admins.
    pub fn notifies_project_admins(&self) -> bool {
        matches!(self, TicketEvent::Escalated | TicketEvent::SlaWarning)
    }

    pub fn title(&self) -> &'static str {
        match self {
            TicketEvent::Created => "Neues Ticket erstellt",
            TicketEvent::Assigned => "Ticket zugewiesen",
            TicketEvent::StatusChanged => "Ticket-Status geändert",
            TicketEvent::CommentAdded => "Neuer Kommentar",
            TicketEvent::Escalated => "Ticket eskaliert",
            TicketEvent::SlaWarning => "SLA-Warnung",
        }
    }

    pub fn body(&self, ticket: &Ticket) -> String {
        match self {
            TicketEvent::Created => {
                format!("Ticket {}: {}", ticket.ticket_number, ticket.title)
            }
            TicketEvent::Assigned => {
                format!("Ticket {} wurde Ihnen zugewiesen", ticket.ticket_number)
            }
            TicketEvent::StatusChanged => {
                format!("Status von Ticket {} wurde geändert", ticket.ticket_number)
            }
            TicketEvent::CommentAdded => {
                format!("Neuer Kommentar zu Ticket {}", ticket.ticket_number)
            }
            TicketEvent::Escalated => {
                format!("Ticket {} wurde eskaliert", ticket.ticket_number)
            }
            TicketEvent::SlaWarning => {
                format!("Ticket {} nähert sich der SLA-Grenze", ticket.ticket_number)
            }
        }
    }

    pub fn priority(&self) -> &'static str {
        match self {
            TicketEvent::Escalated => "urgent",
            TicketEvent::SlaWarning => "high",
            _ => "normal",
        }
    }
}

/// Resolves who cares about a ticket event and notifies them.
///
/// The persisted notification row is the source of truth; per-channel
/// delivery is best effort and a failed channel never fails the request.
pub struct NotificationFanout {
    access_repo: Arc<dyn AccessRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
    delivery: Arc<dyn DeliveryService>,
}

impl NotificationFanout {
    pub fn new(
        access_repo: Arc<dyn AccessRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
        delivery: Arc<dyn DeliveryService>,
    ) -> Self {
        Self {
            access_repo,
            notification_repo,
            delivery,
        }
    }

    /// Fans the event out to the resolved recipients. Returns the persisted
    /// notifications so callers can report how many users were reached.
    pub async fn notify(
        &self,
        ticket: &Ticket,
        event: TicketEvent,
    ) -> Result<Vec<Notification>, AppError> {
        let recipients = self.resolve_recipients(ticket, event).await?;

        let mut sent = Vec::with_capacity(recipients.len());
        for grant in recipients {
            let notification = Notification::new(NewNotificationParams {
                user_id: grant.user_id.clone(),
                project_id: Some(ticket.project_id.clone()),
                ticket_id: Some(ticket.id.clone()),
                event_type: event.event_type().to_string(),
                title: event.title().to_string(),
                body: Some(event.body(ticket)),
                channels: Some(grant.notification_channels.0.clone()),
                priority: Some(event.priority().to_string()),
            });

            let stored = self.notification_repo.create(&notification).await?;

            for channel in stored.channels.0.iter() {
                if let Err(err) = self.delivery.deliver(*channel, &stored).await {
                    warn!(
                        user_id = %stored.user_id,
                        channel = channel.as_str(),
                        error = %err,
                        "notification delivery failed"
                    );
                }
            }

            sent.push(stored);
        }

        info!(
            ticket_id = %ticket.id,
            event = event.event_type(),
            recipients = sent.len(),
            "notification fan-out complete"
        );
        Ok(sent)
    }

    /// Recipient order: assignee, watchers, project admins (escalation-class
    /// events only), cc contacts. Only grants with notifications enabled
    /// qualify, and each user is notified at most once.
    async fn resolve_recipients(
        &self,
        ticket: &Ticket,
        event: TicketEvent,
    ) -> Result<Vec<ProjectAccess>, AppError> {
        let mut candidates = Vec::new();

        if let Some(assignee_id) = &ticket.assigned_to_id {
            if let Some(grant) = self.access_repo.find(assignee_id, &ticket.project_id).await? {
                candidates.push(grant);
            }
        }

        for watcher_id in ticket.watcher_ids.0.iter() {
            if let Some(grant) = self.access_repo.find(watcher_id, &ticket.project_id).await? {
                candidates.push(grant);
            }
        }

        if event.notifies_project_admins() {
            candidates.extend(self.access_repo.list_project_admins(&ticket.project_id).await?);
        }

        for cc_id in ticket.cc_ids.0.iter() {
            if let Some(grant) = self.access_repo.find(cc_id, &ticket.project_id).await? {
                candidates.push(grant);
            }
        }

        let mut seen = HashSet::new();
        let recipients = candidates
            .into_iter()
            .filter(|grant| grant.receive_notifications)
            .filter(|grant| seen.insert(grant.user_id.clone()))
            .collect();
        Ok(recipients)
    }
}
