//! `DashMap`-backed approval ticket store. Built on the same lock-free
//! `DashMap` state used elsewhere in this workspace for concurrent
//! per-entry mutation, with approve/deny/expire implemented as a strict
//! first-transition-wins state machine.

use crate::error::ApprovalError;
use crate::types::{ApprovalTicket, TicketStatus};
use dashmap::DashMap;
use sentryqc_core::{ids, Detection};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Thread-safe, clone-cheap approval ticket store.
#[derive(Clone, Default)]
pub struct ApprovalStore {
    tickets: Arc<DashMap<String, ApprovalTicket>>,
}

impl ApprovalStore {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { tickets: Arc::new(DashMap::new()) }
    }

    /// Create a new pending ticket for `detection` against `tool_call_snapshot`,
    /// expiring after `ttl`.
    pub fn create(&self, detection: Detection, tool_call_snapshot: Value, ttl: Duration) -> ApprovalTicket {
        let now = ids::now_ms();
        let ticket = ApprovalTicket {
            id: ids::new_ticket_id(),
            created_at: now,
            expires_at: now + ttl.as_millis() as u64,
            detection,
            tool_call_snapshot,
            status: TicketStatus::Pending,
            approved_by: None,
            approved_at: None,
        };
        self.tickets.insert(ticket.id.clone(), ticket.clone());
        ticket
    }

    /// Fetch a ticket by id, lazily promoting `pending` to `expired` when
    /// the wall clock has passed `expiresAt`. Returns `None` if no ticket
    /// with that id exists.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<ApprovalTicket> {
        let mut entry = self.tickets.get_mut(id)?;
        self.lazily_expire(&mut entry);
        Some(entry.clone())
    }

    fn lazily_expire(&self, ticket: &mut ApprovalTicket) {
        if ticket.status == TicketStatus::Pending && ids::now_ms() > ticket.expires_at {
            ticket.status = TicketStatus::Expired;
        }
    }

    /// Resolve a pending ticket as approved. The first transition wins:
    /// concurrent callers racing on the same id observe exactly one success
    /// and the rest observe [`ApprovalError::WrongStatus`].
    pub fn approve(&self, id: &str, by: Option<&str>) -> Result<ApprovalTicket, ApprovalError> {
        self.resolve(id, TicketStatus::Approved, by)
    }

    /// Resolve a pending ticket as denied. Same race-free semantics as
    /// [`Self::approve`].
    pub fn deny(&self, id: &str) -> Result<ApprovalTicket, ApprovalError> {
        self.resolve(id, TicketStatus::Denied, None)
    }

    fn resolve(
        &self,
        id: &str,
        target: TicketStatus,
        by: Option<&str>,
    ) -> Result<ApprovalTicket, ApprovalError> {
        let mut entry = self.tickets.get_mut(id).ok_or_else(|| ApprovalError::NotFound(id.to_string()))?;
        self.lazily_expire(&mut entry);

        match entry.status {
            TicketStatus::Pending => {
                entry.status = target;
                entry.approved_by = by.map(str::to_string);
                entry.approved_at = Some(ids::now_ms());
                Ok(entry.clone())
            }
            TicketStatus::Expired => Err(ApprovalError::Expired(id.to_string())),
            other => Err(ApprovalError::WrongStatus { id: id.to_string(), status: status_name(other) }),
        }
    }

    /// Run one sweep pass: lazily expire every pending-but-past-expiry
    /// ticket, and drop every ticket already in a terminal status. Returns
    /// the number of tickets removed.
    pub fn sweep_once(&self) -> usize {
        let now = ids::now_ms();
        for mut entry in self.tickets.iter_mut() {
            if entry.status == TicketStatus::Pending && now > entry.expires_at {
                entry.status = TicketStatus::Expired;
            }
        }
        let to_remove: Vec<String> = self
            .tickets
            .iter()
            .filter(|e| e.status.is_terminal())
            .map(|e| e.key().clone())
            .collect();
        for id in &to_remove {
            self.tickets.remove(id);
        }
        to_remove.len()
    }

    /// Number of tickets currently stored (any status).
    #[must_use]
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    /// Whether the store currently holds no tickets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}

fn status_name(status: TicketStatus) -> &'static str {
    match status {
        TicketStatus::Pending => "pending",
        TicketStatus::Approved => "approved",
        TicketStatus::Denied => "denied",
        TicketStatus::Expired => "expired",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentryqc_core::{Severity, ThreatCategory};
    use serde_json::json;

    fn sample_detection() -> Detection {
        Detection::new(ThreatCategory::Destructive, Severity::High, 0.8, "test detection")
    }

    #[test]
    fn approve_then_approve_again_fails() {
        let store = ApprovalStore::new();
        let ticket = store.create(sample_detection(), json!({}), Duration::from_secs(60));
        assert!(store.approve(&ticket.id, Some("agent")).is_ok());
        let err = store.approve(&ticket.id, Some("agent")).unwrap_err();
        assert_eq!(err, ApprovalError::WrongStatus { id: ticket.id.clone(), status: "approved" });
    }

    #[test]
    fn deny_after_approve_fails() {
        let store = ApprovalStore::new();
        let ticket = store.create(sample_detection(), json!({}), Duration::from_secs(60));
        store.approve(&ticket.id, None).unwrap();
        assert!(store.deny(&ticket.id).is_err());
    }

    #[test]
    fn get_lazily_expires_past_deadline() {
        let store = ApprovalStore::new();
        let ticket = store.create(sample_detection(), json!({}), Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));
        let fetched = store.get(&ticket.id).unwrap();
        assert_eq!(fetched.status, TicketStatus::Expired);
    }

    #[test]
    fn approve_on_expired_ticket_fails() {
        let store = ApprovalStore::new();
        let ticket = store.create(sample_detection(), json!({}), Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(5));
        let err = store.approve(&ticket.id, None).unwrap_err();
        assert_eq!(err, ApprovalError::Expired(ticket.id));
    }

    #[test]
    fn unknown_id_not_found() {
        let store = ApprovalStore::new();
        assert_eq!(store.approve("nonexistent", None).unwrap_err(), ApprovalError::NotFound("nonexistent".to_string()));
    }

    #[test]
    fn sweep_removes_terminal_tickets() {
        let store = ApprovalStore::new();
        let ticket = store.create(sample_detection(), json!({}), Duration::from_secs(60));
        store.approve(&ticket.id, None).unwrap();
        let removed = store.sweep_once();
        assert_eq!(removed, 1);
        assert!(store.is_empty());
    }
}
