#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod auth;
pub mod config;
pub mod error;
pub mod quiz;

pub use quiz_core::Clock;
pub use reqwest::StatusCode;

pub use api::{ApiClient, AssessmentApi, HttpAssessmentApi, InMemoryAssessmentApi, SubmitReply};
pub use app_services::AppServices;
pub use auth::{AuthService, AuthSession, UnauthorizedHook};
pub use config::ApiConfig;
pub use error::{ApiError, AppServicesError, AuthError, QuizError};
pub use quiz::{
    AlwaysConfirm, FailureStage, QuizFailure, QuizPhase, QuizService, QuizSession, QuizSnapshot,
    SubmissionReceipt, SubmitConfirmation, SubmitOutcome,
};
