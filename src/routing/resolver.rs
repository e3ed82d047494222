//! Resolution of `Class:method` references.
//!
//! The router never calls a reference itself. It hands the reference and the
//! assembled invocation to a `Resolver` supplied by the host.
//! `ControllerRegistry` is a resolver backed by controller factories: each call
//! builds a fresh controller and invokes the named method on it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::routing::action::{ActionRef, HandlerError, Invocation, Reply};

/// Locates and invokes reference handlers.
pub trait Resolver: Send + Sync {
    fn resolve(&self, action: &ActionRef, invocation: Invocation) -> Result<Reply, HandlerError>;
}

/// A class-like handler exposing named methods.
pub trait Controller {
    /// Invoke `method`. Unknown methods return `None`.
    fn call(&self, method: &str, invocation: Invocation) -> Option<Result<Reply, HandlerError>>;
}

type ControllerFactory = dyn Fn() -> Box<dyn Controller> + Send + Sync;

/// Resolver mapping qualified class names to controller factories.
#[derive(Default)]
pub struct ControllerRegistry {
    factories: HashMap<String, Arc<ControllerFactory>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under a qualified class name such as
    /// `app::controllers::Greeter`.
    pub fn register<F>(&mut self, qualified_class: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Controller> + Send + Sync + 'static,
    {
        self.factories.insert(qualified_class.into(), Arc::new(factory));
        self
    }
}

impl Resolver for ControllerRegistry {
    fn resolve(&self, action: &ActionRef, invocation: Invocation) -> Result<Reply, HandlerError> {
        let class = action.qualified_class();
        let factory = self
            .factories
            .get(&class)
            .ok_or_else(|| HandlerError::UnresolvedAction(format!("class {class} is not registered")))?;

        tracing::debug!(action = %action, "Resolving reference handler");
        factory()
            .call(&action.method, invocation)
            .unwrap_or_else(|| {
                Err(HandlerError::UnresolvedAction(format!(
                    "{class} has no method {}",
                    action.method
                )))
            })
    }
}
