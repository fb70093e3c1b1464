//! Type interceptors.
//!
//! Interceptors see mutable [`TypeDefinition`]s only, after binding and
//! inference and before finalization. They run in registration order; each
//! interceptor visits every type before the next interceptor starts, so later
//! interceptors observe the mutations of earlier ones.

use crate::arena::TypeArena;
use crate::context::BuildContext;
use crate::definition::{DefinitionError, TypeDefinition};
use crate::error::SchemaError;
use crate::services::ServiceScope;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Error reported by an interceptor; it aborts the build at once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterceptorError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("{0}")]
    Rejected(String),
}

/// A plugin that mutates or validates in-progress type definitions.
pub trait TypeInterceptor: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Runs once before this interceptor visits any type.
    fn on_before_intercept(&self, _ctx: &BuildContext) -> Result<(), InterceptorError> {
        Ok(())
    }

    /// Visits one type definition.
    fn intercept(
        &self,
        ctx: &BuildContext,
        definition: &mut TypeDefinition,
    ) -> Result<(), InterceptorError>;
}

type InterceptorFactory =
    Box<dyn Fn(&ServiceScope) -> Result<Arc<dyn TypeInterceptor>, String>>;

/// How an interceptor was registered.
pub enum InterceptorRegistration {
    /// A ready instance, shared across builds.
    Instance(Arc<dyn TypeInterceptor>),
    /// Created once per build from the build's services.
    Factory {
        name: String,
        create: InterceptorFactory,
    },
}

impl InterceptorRegistration {
    /// Registers a type that is created from its `Default` impl once per build.
    pub fn of_type<I: TypeInterceptor + Default + 'static>() -> Self {
        Self::Factory {
            name: std::any::type_name::<I>().to_string(),
            create: Box::new(|_| Ok(Arc::new(I::default()))),
        }
    }

    pub(crate) fn instantiate(
        &self,
        services: &ServiceScope,
    ) -> Result<Arc<dyn TypeInterceptor>, SchemaError> {
        match self {
            Self::Instance(instance) => Ok(Arc::clone(instance)),
            Self::Factory { name, create } => {
                create(services).map_err(|reason| SchemaError::InterceptorInstantiation {
                    interceptor: name.clone(),
                    reason,
                })
            }
        }
    }
}

impl fmt::Debug for InterceptorRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(instance) => f
                .debug_tuple("Instance")
                .field(&instance.name())
                .finish(),
            Self::Factory { name, .. } => f.debug_struct("Factory").field("name", name).finish(),
        }
    }
}

/// Runs every interceptor over every definition in the arena.
pub(crate) fn run_pipeline(
    interceptors: &[Arc<dyn TypeInterceptor>],
    arena: &mut TypeArena,
    ctx: &BuildContext,
) -> Result<(), SchemaError> {
    for interceptor in interceptors {
        debug!(interceptor = interceptor.name(), "running type interceptor");
        interceptor
            .on_before_intercept(ctx)
            .map_err(|e| SchemaError::Interceptor {
                interceptor: interceptor.name().to_string(),
                type_name: String::new(),
                reason: e.to_string(),
            })?;

        let ids: Vec<_> = arena.ids().collect();
        for id in ids {
            let before = arena.get(id).name.to_string();
            let fail = |reason: String| SchemaError::Interceptor {
                interceptor: interceptor.name().to_string(),
                type_name: before.clone(),
                reason,
            };

            interceptor
                .intercept(ctx, arena.get_mut(id))
                .map_err(|e| fail(e.to_string()))?;

            let after = arena.get(id).name.to_string();
            if after != before {
                if arena.contains(&after) {
                    return Err(fail(format!("renamed to `{after}`, which already exists")));
                }
                arena.reindex(id, &before);
            }
        }
    }
    Ok(())
}
