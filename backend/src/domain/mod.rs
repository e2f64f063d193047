//! Domain primitives, services and ports.
//!
//! Purpose: define the strongly typed entities shared by the HTTP adapter
//! and the outbound adapters, plus the services orchestrating them. No
//! framework types leak in here.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - User, UserId, UserToken: Speckle identity and its stored token.
//! - Project, Model, ProjectPage: read-only Speckle metadata.
//! - Ruleset, Rule, Condition: persisted validation rules.
//! - AuthBridge, RulesetService: use-case services over the ports.

pub mod auth;
pub mod auth_bridge;
pub mod error;
pub mod ports;
pub mod project;
pub mod ruleset;
pub mod ruleset_export;
pub mod ruleset_service;
pub mod trace_id;
pub mod user;

pub use self::auth::{
    AccessCode, AppCredentials, AuthorizationRequest, BearerToken, CHALLENGE_BYTES, ChallengeId,
    TokenGrant,
};
pub use self::auth_bridge::{AuthBridge, AuthError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::project::{Model, ModelCollection, Project, ProjectPage, Version, VersionCollection};
pub use self::ruleset::{
    Condition, ConditionValue, DraftValidationError, InvalidDirection, Listing, ReorderDirection,
    Rule, RuleDraft, Ruleset, RulesetDraft, clean_conditions,
};
pub use self::ruleset_export::{ExportError, TSV_HEADER, export_filename, render_tsv, ruleset_hash};
pub use self::ruleset_service::RulesetService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{User, UserId, UserToken, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use model_checker::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<String> {
///     Err(Error::not_found("no such ruleset"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
