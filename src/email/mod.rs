pub mod templates;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde_json::Value;

use crate::config::SmtpConfig;

pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    notify_to: String,
}

impl Mailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, String> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("SMTP error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            transport,
            from: config.from.clone(),
            notify_to: config.notify_to.clone(),
        })
    }

    /// Send the submitter their copy of the record; the fixed HR
    /// recipient is always on the recipient list as well.
    pub async fn send_submission_copy(
        &self,
        submitter_email: &str,
        form_data: &Value,
    ) -> Result<(), String> {
        let html = templates::render_submission_copy(form_data);
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| format!("Invalid from address: {e}"))?,
            )
            .to(self
                .notify_to
                .parse()
                .map_err(|e| format!("Invalid notify address: {e}"))?)
            .to(submitter_email
                .parse()
                .map_err(|e| format!("Invalid to address: {e}"))?)
            .subject("Copia de tu formulario de exceso de jornada")
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
