pub mod templates;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::SmtpConfig;
use crate::email::templates::ContactMail;

pub struct SystemMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    to: String,
}

impl SystemMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("System SMTP error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
            to: config.to.clone(),
        })
    }

    /// Forward a contact form message to the site inbox, replying to the sender.
    pub async fn send_contact(&self, mail: &ContactMail<'_>) -> Result<(), String> {
        let reply_to: Mailbox = mail
            .email
            .parse()
            .map_err(|e| format!("Invalid sender address: {e}"))?;
        let html = mail
            .render_html()
            .map_err(|e| format!("Failed to render contact mail: {e}"))?;
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| format!("Invalid from address: {e}"))?,
            )
            .to(self
                .to
                .parse()
                .map_err(|e| format!("Invalid to address: {e}"))?)
            .reply_to(reply_to)
            .subject(format!("[Contact] {}", mail.subject))
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| format!("Failed to build email: {e}"))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| format!("Failed to send email: {e}"))?;

        Ok(())
    }
}
