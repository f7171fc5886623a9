use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::client_ip;
use crate::email::templates::ContactMail;
use crate::error::AppError;
use crate::rate_limit::{CONTACT_LIMIT, CONTACT_WINDOW_SECS};
use crate::state::SharedState;

const MAX_MESSAGE_LEN: usize = 5000;

#[derive(Debug, Deserialize)]
pub struct MailRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub talent: Vec<String>,
    pub website: Option<String>,
    #[serde(default)]
    pub doing: String,
    pub refer: Option<String>,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MailResponse {
    pub success: bool,
}

fn validate(req: &MailRequest) -> Result<(), AppError> {
    for (field, value) in [
        ("first_name", &req.first_name),
        ("last_name", &req.last_name),
        ("subject", &req.subject),
        ("message", &req.message),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!("{field} is required")));
        }
    }

    let email = req.email.trim();
    let valid_email = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid_email {
        return Err(AppError::BadRequest("A valid email is required".to_string()));
    }

    if req.message.len() > MAX_MESSAGE_LEN {
        return Err(AppError::BadRequest(format!(
            "Message must be at most {MAX_MESSAGE_LEN} characters"
        )));
    }
    Ok(())
}

pub async fn send(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<MailRequest>,
) -> Result<Json<MailResponse>, AppError> {
    validate(&req)?;

    // Only well-formed messages count against the sender's limit.
    let ip = client_ip::resolve(&headers, addr.ip(), &state.config.trusted_proxies);
    if let Err(retry_after) = state
        .contact_limiter
        .check(ip, CONTACT_LIMIT, CONTACT_WINDOW_SECS)
    {
        return Err(AppError::RateLimited(format!(
            "Too many messages. Try again in {retry_after} seconds."
        )));
    }

    let Some(mailer) = &state.system_mailer else {
        tracing::warn!(%ip, subject = %req.subject, "Contact message dropped, SMTP is not configured");
        return Ok(Json(MailResponse { success: false }));
    };

    let mail = ContactMail {
        first_name: req.first_name.trim(),
        last_name: req.last_name.trim(),
        email: req.email.trim(),
        phone: req.phone.as_deref(),
        company: &req.company,
        talent: &req.talent,
        website: req.website.as_deref(),
        doing: &req.doing,
        refer: req.refer.as_deref(),
        subject: req.subject.trim(),
        message: &req.message,
    };

    match mailer.send_contact(&mail).await {
        Ok(()) => {
            tracing::info!(%ip, "Contact message forwarded");
            Ok(Json(MailResponse { success: true }))
        }
        Err(e) => {
            tracing::error!(%ip, "Contact message failed: {e}");
            Ok(Json(MailResponse { success: false }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> MailRequest {
        MailRequest {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: "grace@navy.test".to_string(),
            phone: None,
            company: "Navy".to_string(),
            talent: vec!["Backend".to_string()],
            website: None,
            doing: "Hiring".to_string(),
            refer: None,
            subject: "Hello".to_string(),
            message: "We would like to talk.".to_string(),
        }
    }

    #[test]
    fn accepts_complete_message() {
        assert!(validate(&request()).is_ok());
    }

    #[test]
    fn rejects_missing_fields_and_bad_email() {
        let mut req = request();
        req.subject = "  ".to_string();
        assert!(validate(&req).is_err());

        let mut req = request();
        req.email = "grace".to_string();
        assert!(validate(&req).is_err());

        let mut req = request();
        req.email = "@navy.test".to_string();
        assert!(validate(&req).is_err());
    }

    #[test]
    fn rejects_oversized_message() {
        let mut req = request();
        req.message = "x".repeat(MAX_MESSAGE_LEN + 1);
        assert!(validate(&req).is_err());
    }
}
