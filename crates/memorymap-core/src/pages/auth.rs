use serde_json::{Map, Value};

use crate::analytics::AnalyticsEvent;
use crate::api::{ApiOutcome, CANCELLED_MESSAGE};
use crate::model::{Ack, Credentials, Registration, TokenResponse};
use crate::pages::{PageContext, SubmitOutcome};
use crate::routes::Route;

/// Login, registration and logout.
pub struct AuthFlow {
    ctx: PageContext,
    pub submitting: bool,
    pub error: Option<String>,
    /// Success message after registering, shown on the login screen.
    pub notice: Option<String>,
}

impl AuthFlow {
    pub fn new(ctx: PageContext) -> Self {
        Self {
            ctx,
            submitting: false,
            error: None,
            notice: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.ctx.api.is_authenticated()
    }

    pub async fn login(&mut self, creds: &Credentials) -> SubmitOutcome {
        self.submitting = true;
        self.error = None;
        let outcome = self.ctx.api.login(creds).await;
        self.finish_login(creds.email.trim(), outcome)
    }

    pub fn finish_login(&mut self, email: &str, outcome: ApiOutcome<TokenResponse>) -> SubmitOutcome {
        self.submitting = false;
        match outcome {
            ApiOutcome::Success { .. } => {
                let mut props = Map::new();
                props.insert("email".into(), Value::String(email.to_string()));
                self.ctx.analytics.set_user(email, props);
                self.ctx.analytics.log(AnalyticsEvent::Login {
                    method: "email".into(),
                });
                self.notice = None;
                SubmitOutcome::Navigate(Route::Dashboard)
            }
            ApiOutcome::Failure { error } => self.fail(error),
            ApiOutcome::Cancelled => self.fail(CANCELLED_MESSAGE.to_string()),
        }
    }

    pub async fn register(&mut self, reg: &Registration) -> SubmitOutcome {
        self.submitting = true;
        self.error = None;
        let outcome = self.ctx.api.register(reg).await;
        self.finish_register(outcome)
    }

    pub fn finish_register(&mut self, outcome: ApiOutcome<Ack>) -> SubmitOutcome {
        self.submitting = false;
        match outcome {
            ApiOutcome::Success { data } => {
                self.ctx.analytics.log(AnalyticsEvent::SignUp {
                    method: "email".into(),
                });
                self.notice = Some(if data.message.trim().is_empty() {
                    "Registration successful. Please sign in.".to_string()
                } else {
                    data.message
                });
                SubmitOutcome::Navigate(Route::Login)
            }
            ApiOutcome::Failure { error } => self.fail(error),
            ApiOutcome::Cancelled => self.fail(CANCELLED_MESSAGE.to_string()),
        }
    }

    /// Forget the stored token locally and detach the analytics user.
    pub fn logout(&mut self) -> SubmitOutcome {
        match self.ctx.api.logout() {
            ApiOutcome::Success { .. } => {
                self.ctx.analytics.log(AnalyticsEvent::Logout);
                self.ctx.analytics.clear_user();
                SubmitOutcome::Navigate(Route::Login)
            }
            ApiOutcome::Failure { error } => self.fail(error),
            ApiOutcome::Cancelled => self.fail(CANCELLED_MESSAGE.to_string()),
        }
    }

    fn fail(&mut self, error: String) -> SubmitOutcome {
        self.error = Some(error.clone());
        SubmitOutcome::Failed(error)
    }
}
