// src/services/notification_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::{
    config::SmtpConfig,
    models::{
        account_request::{AccountRequest, AccountRequestStatus},
        auth::User,
    },
};

/// Um e-mail pronto para envio (texto puro).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Quem de fato entrega a mensagem (SMTP, log, ou um dublê nos testes).
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, mail: &OutgoingMail) -> anyhow::Result<()>;
}

pub struct SmtpMailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailTransport {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?.port(config.port);

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            mailer: builder.build(),
            from: config.from.parse()?,
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn deliver(&self, mail: &OutgoingMail) -> anyhow::Result<()> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(mail.subject.as_str())
            .header(ContentType::TEXT_PLAIN);

        for to in &mail.to {
            builder = builder.to(to.parse()?);
        }

        let message = builder.body(mail.body.clone())?;
        self.mailer.send(message).await?;
        Ok(())
    }
}

/// Sem SMTP configurado: só registra no log.
pub struct LogTransport;

#[async_trait]
impl MailTransport for LogTransport {
    async fn deliver(&self, mail: &OutgoingMail) -> anyhow::Result<()> {
        tracing::info!("📧 [log] Para {:?}: {}", mail.to, mail.subject);
        Ok(())
    }
}

#[derive(Clone)]
pub struct NotificationService {
    transport: Arc<dyn MailTransport>,
}

impl NotificationService {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self { transport }
    }

    // Falha de e-mail nunca derruba a operação de negócio.
    async fn send(&self, mail: OutgoingMail) {
        if mail.to.is_empty() {
            tracing::info!("📭 Sem destinatários para '{}', e-mail não enviado.", mail.subject);
            return;
        }

        if let Err(e) = self.transport.deliver(&mail).await {
            tracing::warn!("⚠️ Falha ao enviar e-mail '{}': {}", mail.subject, e);
        }
    }

    // Um e-mail por admin: nenhum admin vê o endereço dos outros.
    async fn send_to_each(&self, admins: &[User], subject: String, body: String) {
        if admins.is_empty() {
            tracing::info!("📭 Sem admins para '{}', e-mail não enviado.", subject);
            return;
        }

        for admin in admins {
            self.send(OutgoingMail {
                to: vec![admin.email.clone()],
                subject: subject.clone(),
                body: body.clone(),
            })
            .await;
        }
    }

    /// Avisa cada admin sobre um novo cadastro pendente.
    pub async fn new_user_signup(&self, admins: &[User], new_user: &User) {
        let body = format!(
            "A new user is waiting for approval.\n\nName: {}\nEmail: {}\nRole: {}\n\nReview pending users in the admin panel.",
            new_user.name, new_user.email, new_user.role
        );

        self.send_to_each(
            admins,
            format!("New account pending approval: {}", new_user.name),
            body,
        )
        .await;
    }

    pub async fn account_approved(&self, user: &User) {
        let body = format!(
            "Hello {},\n\nYour account has been approved with the role {}. You can now sign in.",
            user.name, user.role
        );

        self.send(OutgoingMail {
            to: vec![user.email.clone()],
            subject: "Your account has been approved".to_string(),
            body,
        })
        .await;
    }

    pub async fn account_request_received(&self, admins: &[User], request: &AccountRequest) {
        let body = format!(
            "New account request\n\nName: {}\nEmail: {}\nType: {:?}\nDepartment: {}\nRequested role: {}\n\nReason: {}\nIntended use: {}",
            request.full_name(),
            request.email,
            request.user_type,
            request.department,
            request.requested_role,
            request.reason_for_access,
            request.intended_use
        );

        self.send_to_each(admins, format!("New account request: {}", request.full_name()), body)
            .await;
    }

    pub async fn account_request_confirmation(&self, request: &AccountRequest) {
        let body = format!(
            "Hello {},\n\nWe received your account request (reference {}). An administrator will review it soon.",
            request.first_name, request.id
        );

        self.send(OutgoingMail {
            to: vec![request.email.clone()],
            subject: "Account request received".to_string(),
            body,
        })
        .await;
    }

    pub async fn account_request_reviewed(&self, request: &AccountRequest) {
        let outcome = match request.status {
            AccountRequestStatus::Approved => "has been approved. You can now sign in",
            AccountRequestStatus::Rejected => "has been rejected",
            _ => "needs more information",
        };
        let comment = request
            .review_comment
            .as_deref()
            .map(|c| format!("\n\nComment from the reviewer: {}", c))
            .unwrap_or_default();

        self.send(OutgoingMail {
            to: vec![request.email.clone()],
            subject: "Update on your account request".to_string(),
            body: format!("Hello {},\n\nYour account request {}.{}", request.first_name, outcome, comment),
        })
        .await;
    }
}
