//! State shared by the later assembly phases.

use crate::convention::ConventionRegistry;
use crate::options::SchemaOptions;
use crate::services::ServiceScope;
use indexmap::IndexMap;
use serde_json::Value;

/// Options, conventions, services and context data of one build.
///
/// Pre-create hooks receive it mutably; interceptors read it.
#[derive(Debug)]
pub struct BuildContext {
    pub(crate) options: SchemaOptions,
    pub(crate) services: ServiceScope,
    pub(crate) conventions: ConventionRegistry,
    pub(crate) context_data: IndexMap<String, Value>,
}

impl BuildContext {
    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    pub fn services(&self) -> &ServiceScope {
        &self.services
    }

    pub fn conventions(&self) -> &ConventionRegistry {
        &self.conventions
    }

    pub fn context_data(&self) -> &IndexMap<String, Value> {
        &self.context_data
    }

    pub fn context_data_mut(&mut self) -> &mut IndexMap<String, Value> {
        &mut self.context_data
    }
}
