use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::api::{ApiClient, AssessmentApi, HttpAssessmentApi};
use crate::auth::{AuthService, AuthSession, UnauthorizedHook};
use crate::config::ApiConfig;
use crate::error::AppServicesError;
use crate::quiz::QuizService;

/// Assembles app-facing services around one auth session.
#[derive(Clone)]
pub struct AppServices {
    auth: AuthService,
    quiz: QuizService,
}

impl AppServices {
    /// Build services backed by `SQLite` token storage and the REST backend.
    ///
    /// A token saved by a previous run is restored before returning.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization, token restore,
    /// or HTTP client construction fails.
    pub async fn new_sqlite(
        db_url: &str,
        config: ApiConfig,
        clock: Clock,
        on_unauthorized: UnauthorizedHook,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(&storage, config, clock, on_unauthorized).await
    }

    /// # Errors
    ///
    /// Same as [`AppServices::new_sqlite`], minus storage initialization.
    pub async fn from_storage(
        storage: &Storage,
        config: ApiConfig,
        clock: Clock,
        on_unauthorized: UnauthorizedHook,
    ) -> Result<Self, AppServicesError> {
        let session = Arc::new(AuthSession::new(
            clock,
            Arc::clone(&storage.tokens),
            on_unauthorized,
        ));
        let signed_in = session.restore().await?;
        tracing::info!(base_url = %config.base_url, signed_in, "app services ready");

        let client = ApiClient::new(config, Arc::clone(&session))?;
        let api: Arc<dyn AssessmentApi> = Arc::new(HttpAssessmentApi::new(client.clone()));

        Ok(Self {
            auth: AuthService::new(client, session),
            quiz: QuizService::new(api, clock),
        })
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    #[must_use]
    pub fn quiz(&self) -> &QuizService {
        &self.quiz
    }
}
