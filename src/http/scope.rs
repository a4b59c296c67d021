//! Request-scoped logger and correlation id.
//!
//! The correlation middleware publishes a [`RequestScope`] two ways:
//! - in the request extensions, read by the [`RequestLogger`] and
//!   [`CorrelationId`] extractors
//! - in a tokio task-local, read by [`current_logger`] from code that has
//!   no access to the request
//!
//! A missing scope is not an error. Callers get a fresh default logger
//! with its own correlation id. Within one request both extractors fall
//! back to the same generated id.

use std::convert::Infallible;
use std::future::Future;
use std::ops::{Deref, DerefMut};

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::Extensions;

use crate::logging::{correlation, Logger, LoggerFactory};

/// Values the middleware publishes for one request.
#[derive(Debug, Clone)]
pub struct RequestScope {
    pub correlation_id: String,
    pub logger: Logger,
}

tokio::task_local! {
    static REQUEST_SCOPE: RequestScope;
}

/// Run `fut` with `scope` available through [`current_scope`].
pub async fn with_scope<F>(scope: RequestScope, fut: F) -> F::Output
where
    F: Future,
{
    REQUEST_SCOPE.scope(scope, fut).await
}

/// Scope of the request handled by the current task, if any.
pub fn current_scope() -> Option<RequestScope> {
    REQUEST_SCOPE.try_with(RequestScope::clone).ok()
}

/// Correlation id of the current task's request, if any.
pub fn current_correlation_id() -> Option<String> {
    REQUEST_SCOPE
        .try_with(|scope| scope.correlation_id.clone())
        .ok()
}

/// Logger of the current task's request, or a fresh default logger.
pub fn current_logger(factory: &LoggerFactory) -> Logger {
    current_scope()
        .map(|scope| scope.logger)
        .unwrap_or_else(|| factory.logger())
}

/// Correlation id generated for a request that has no [`RequestScope`].
#[derive(Debug, Clone)]
struct FallbackId(String);

/// The request's fallback id, generated and stored on first use.
fn fallback_id(extensions: &mut Extensions) -> String {
    if let Some(FallbackId(id)) = extensions.get::<FallbackId>() {
        return id.clone();
    }
    let id = correlation::generate_id();
    extensions.insert(FallbackId(id.clone()));
    id
}

/// Logger stored in `extensions`, or a default logger bound to the
/// request's fallback id.
pub fn logger_from_extensions(extensions: &mut Extensions, factory: &LoggerFactory) -> Logger {
    match extensions.get::<RequestScope>() {
        Some(scope) => scope.logger.clone(),
        None => factory.logger_for(fallback_id(extensions)),
    }
}

/// Correlation id stored in `extensions`.
pub fn correlation_id_from_extensions(extensions: &Extensions) -> Option<&str> {
    extensions
        .get::<RequestScope>()
        .map(|scope| scope.correlation_id.as_str())
}

/// Extractor for the request's logger.
#[derive(Debug, Clone)]
pub struct RequestLogger(pub Logger);

impl Deref for RequestLogger {
    type Target = Logger;

    fn deref(&self) -> &Logger {
        &self.0
    }
}

impl DerefMut for RequestLogger {
    fn deref_mut(&mut self) -> &mut Logger {
        &mut self.0
    }
}

impl<S> FromRequestParts<S> for RequestLogger
where
    S: Send + Sync,
    LoggerFactory: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let factory = LoggerFactory::from_ref(state);
        Ok(RequestLogger(logger_from_extensions(&mut parts.extensions, &factory)))
    }
}

/// Extractor for the request's correlation id. Outside the middleware a
/// fresh id is generated, shared with [`RequestLogger`] for that request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = match correlation_id_from_extensions(&parts.extensions) {
            Some(id) => id.to_string(),
            None => fallback_id(&mut parts.extensions),
        };
        Ok(CorrelationId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{Channel, LoggerConfig};
    use crate::logging::MemorySink;
    use std::sync::Arc;

    fn factory() -> LoggerFactory {
        LoggerFactory::new(
            LoggerConfig {
                channel: Channel::Production,
                app_name: "scoped".into(),
                tag_name: "t1".into(),
            },
            Arc::new(MemorySink::new()),
        )
    }

    #[test]
    fn test_extensions_miss_falls_back_to_default() {
        let factory = factory();
        let mut extensions = Extensions::new();

        let logger = logger_from_extensions(&mut extensions, &factory);
        assert_eq!(logger.app_name(), "scoped");
        assert_eq!(logger.channel(), "production");
        assert!(!logger.correlation_id().is_empty());
        assert_eq!(correlation_id_from_extensions(&extensions), None);

        let again = logger_from_extensions(&mut extensions, &factory);
        assert_eq!(again.correlation_id(), logger.correlation_id());
        assert_eq!(fallback_id(&mut extensions), logger.correlation_id());

        let other = logger_from_extensions(&mut Extensions::new(), &factory);
        assert_ne!(other.correlation_id(), logger.correlation_id());
    }

    #[test]
    fn test_extensions_hit_returns_scoped_logger() {
        let factory = factory();
        let mut extensions = Extensions::new();
        extensions.insert(RequestScope {
            correlation_id: "abc".into(),
            logger: factory.logger_for("abc"),
        });

        assert_eq!(logger_from_extensions(&mut extensions, &factory).correlation_id(), "abc");
        assert_eq!(correlation_id_from_extensions(&extensions), Some("abc"));
    }

    #[tokio::test]
    async fn test_task_local_scope() {
        let factory = factory();
        assert!(current_correlation_id().is_none());

        let scope = RequestScope {
            correlation_id: "task-1".into(),
            logger: factory.logger_for("task-1"),
        };
        let seen = with_scope(scope, async {
            (current_correlation_id(), current_logger(&factory).correlation_id().to_string())
        })
        .await;

        assert_eq!(seen.0.as_deref(), Some("task-1"));
        assert_eq!(seen.1, "task-1");

        let outside = current_logger(&factory);
        assert_ne!(outside.correlation_id(), "task-1");
    }

    #[tokio::test]
    async fn test_concurrent_scopes_are_isolated() {
        let factory = factory();
        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let factory = factory.clone();
                tokio::spawn(async move {
                    let id = format!("req-{i}");
                    let scope = RequestScope {
                        correlation_id: id.clone(),
                        logger: factory.logger_for(id.clone()),
                    };
                    with_scope(scope, async move {
                        tokio::task::yield_now().await;
                        assert_eq!(current_correlation_id().as_deref(), Some(id.as_str()));
                        assert_eq!(current_logger(&factory).correlation_id(), id);
                    })
                    .await;
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }
    }
}
