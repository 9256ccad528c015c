use actix_web::HttpRequest;
use uuid::Uuid;

use crate::database::models::CreateAuditLogInput;
use crate::database::repositories::AuditRepository;

/// Audit sink for mutating operations. Recording is best-effort: a failed
/// write is logged and never fails the primary operation.
#[derive(Clone)]
pub struct AuditLogger {
    repository: AuditRepository,
}

impl AuditLogger {
    pub fn new(repository: AuditRepository) -> Self {
        Self { repository }
    }

    /// Extract client info from the HTTP request
    fn extract_client_info(req: &HttpRequest) -> (Option<String>, Option<String>) {
        let ip_address = req.connection_info().peer_addr().map(|addr| {
            // Remove port if present
            if addr.contains(':') {
                addr.split(':').next().unwrap_or(addr).to_string()
            } else {
                addr.to_string()
            }
        });

        let user_agent = req
            .headers()
            .get("user-agent")
            .and_then(|h| h.to_str().ok())
            .map(|s| s.to_string());

        (ip_address, user_agent)
    }

    pub async fn record(
        &self,
        actor_id: Option<Uuid>,
        action: &str,
        subject_type: &str,
        subject_id: Uuid,
        details: Option<serde_json::Value>,
        req: &HttpRequest,
    ) {
        let (ip_address, user_agent) = Self::extract_client_info(req);

        let input = CreateAuditLogInput {
            actor_id,
            action: action.to_string(),
            subject_type: subject_type.to_string(),
            subject_id,
            details,
            ip_address,
            user_agent,
        };

        if let Err(err) = self.repository.insert(input).await {
            log::warn!(
                "audit write failed for {} {} {}: {}",
                action,
                subject_type,
                subject_id,
                err
            );
        }
    }
}
