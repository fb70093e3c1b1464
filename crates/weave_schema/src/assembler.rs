//! The four assembly phases: collection, binding and inference,
//! interception, finalization and validation.

use crate::arena::{DefId, TypeArena};
use crate::binding::BindingResolver;
use crate::context::BuildContext;
use crate::definition::TypeKind;
use crate::convention::{BindingDefaults, ConventionRegistry};
use crate::directive::{builtin_directives, DirectiveType};
use crate::error::SchemaError;
use crate::graph::{NamedType, SchemaGraph};
use crate::interceptor::run_pipeline;
use crate::registry::{Declaration, DeclarationRegistry, RootKind, RootRegistration};
use crate::resolver::ResolverMap;
use crate::validate::GraphValidator;
use crate::values::builtin_scalars;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};
use weave_core::diagnostics::codes;
use weave_core::{Diagnostic, DiagnosticBag, SchemaCoordinate};

pub(crate) fn assemble(mut registry: DeclarationRegistry) -> Result<SchemaGraph, SchemaError> {
    info!(
        declarations = registry.declarations.len(),
        "creating schema"
    );

    let mut conventions = ConventionRegistry::with_defaults(BindingDefaults {
        behavior: registry.options.default_binding_behavior,
    });
    for convention in &registry.conventions {
        debug!(kind = convention.kind(), "applying convention");
        convention.apply(&registry.services, &mut conventions);
    }
    let mut ctx = BuildContext {
        options: registry.options.clone(),
        services: registry.services.clone(),
        conventions,
        context_data: registry.build_context_data(),
    };
    for hook in registry.before_create.drain(..) {
        hook(&mut ctx);
    }

    let interceptors = registry
        .interceptors
        .iter()
        .map(|registration| registration.instantiate(&ctx.services))
        .collect::<Result<Vec<_>, _>>()?;

    let mut bag = DiagnosticBag::new();

    // Collection
    let mut arena = TypeArena::new();
    for scalar in builtin_scalars()? {
        arena.insert(scalar);
    }
    let mut directives = IndexMap::new();
    for directive in builtin_directives()? {
        add_directive(&mut directives, directive, &mut bag);
    }

    let mut extensions = Vec::new();
    for declaration in std::mem::take(&mut registry.declarations) {
        match declaration {
            Declaration::Type(definition) => {
                arena.insert(definition);
            }
            Declaration::Extension(extension) => extensions.push(extension),
            Declaration::Directive(directive) => add_directive(&mut directives, directive, &mut bag),
            Declaration::Document(loader) => {
                let document = loader(&ctx.services).map_err(|reason| SchemaError::Document { reason })?;
                debug!(types = document.types.len(), "loaded schema document");
                for definition in document.types {
                    arena.insert(definition);
                }
                extensions.extend(document.extensions);
                for directive in document.directives {
                    add_directive(&mut directives, directive, &mut bag);
                }
            }
        }
    }

    let schema = registry
        .schema
        .as_ref()
        .map(|source| source.resolve())
        .unwrap_or_default();

    let mut roots: [Option<String>; 3] = Default::default();
    for kind in RootKind::ALL {
        roots[kind.index()] = match registry.roots[kind.index()].take() {
            Some(RootRegistration::Definition(definition)) => {
                let name = definition.name.to_string();
                arena.insert(definition);
                Some(name)
            }
            Some(RootRegistration::Name(name)) => Some(name),
            None => schema.root(kind).map(str::to_string).or_else(|| {
                let name = kind.default_name(&ctx.options);
                arena.contains(name).then(|| name.to_string())
            }),
        };
    }

    for extension in extensions {
        let target_name = extension.name.to_string();
        match arena.by_name_mut(&target_name) {
            Some(target) => {
                if let Err(error) = extension.apply(target) {
                    bag.add(
                        Diagnostic::error(codes::DUPLICATE_FIELD, "conflicting type extension")
                            .with_message(error.to_string())
                            .at(SchemaCoordinate::ty(target_name)),
                    );
                }
            }
            None => bag.add(
                Diagnostic::error(codes::UNDEFINED_EXTENSION_TARGET, "undefined extension target")
                    .with_message(format!("extension targets undefined type `{target_name}`"))
                    .at(SchemaCoordinate::ty(target_name)),
            ),
        }
    }
    debug!(types = arena.len(), directives = directives.len(), "collection finished");

    // Binding & inference
    let mut bindings = BindingResolver::new();
    for binding in std::mem::take(&mut registry.bindings) {
        bindings.add(binding);
    }
    bindings.check(&arena, &mut bag);
    bindings.infer_fields(&mut arena, &ctx.conventions, &mut bag);
    debug!("binding and inference finished");

    // Interception
    let root_ids: [Option<DefId>; 3] =
        std::array::from_fn(|i| roots[i].as_deref().and_then(|name| arena.id_of(name)));
    run_pipeline(&interceptors, &mut arena, &ctx)?;
    for (root, id) in roots.iter_mut().zip(root_ids) {
        if let Some(id) = id {
            *root = Some(arena.get(id).name.to_string());
        }
    }
    debug!(interceptors = interceptors.len(), "interception finished");

    // Finalization & validation
    GraphValidator::new(&arena, &directives, &mut bag).validate(&roots, &schema, &registry.resolvers);
    if bag.has_errors() {
        info!(violations = bag.error_count(), "schema build failed");
        return Err(SchemaError::Build(bag));
    }

    let sort_fields = ctx.options.sort_fields_by_name;
    let mut types: IndexMap<String, Arc<NamedType>> = IndexMap::new();
    let definitions: Vec<_> = arena.canonical().cloned().collect();
    for definition in definitions {
        let named = NamedType::finalize(definition, sort_fields);
        types.insert(named.name().to_string(), Arc::new(named));
    }

    if ctx.options.remove_unreachable_types {
        let before = types.len();
        remove_unreachable(&mut types, &roots, &directives);
        debug!(removed = before - types.len(), "removed unreachable types");
    }

    let resolvers = ResolverMap::build(
        registry
            .resolvers
            .into_iter()
            .map(|r| (r.type_name, r.field_name, r.resolver))
            .collect(),
        &registry.middleware,
    );

    info!(types = types.len(), "schema created");
    Ok(SchemaGraph {
        description: schema.description,
        schema_directives: schema.directives,
        types,
        directive_types: directives,
        roots,
        resolvers,
        type_fallback: registry.type_fallback,
        context_data: Arc::new(ctx.context_data),
        services: ctx.services,
    })
}

fn add_directive(
    directives: &mut IndexMap<String, DirectiveType>,
    directive: DirectiveType,
    bag: &mut DiagnosticBag,
) {
    let name = directive.name.to_string();
    if directives.contains_key(&name) {
        bag.add(
            Diagnostic::error(codes::DUPLICATE_DIRECTIVE_TYPE, "duplicate directive type")
                .with_message(format!("`@{name}` is defined more than once"))
                .at(SchemaCoordinate::directive(name)),
        );
        return;
    }
    directives.insert(name, directive);
}

/// Keeps types reachable from the roots, interface implementations of
/// reachable interfaces, and types used by directive arguments.
fn remove_unreachable(
    types: &mut IndexMap<String, Arc<NamedType>>,
    roots: &[Option<String>; 3],
    directives: &IndexMap<String, DirectiveType>,
) {
    let mut reachable: FxHashSet<String> = FxHashSet::default();
    let mut queue: VecDeque<String> = roots.iter().flatten().cloned().collect();
    queue.extend(
        directives
            .values()
            .flat_map(|d| d.arguments.values().map(|a| a.ty.named_type().to_string())),
    );

    while let Some(name) = queue.pop_front() {
        if !reachable.insert(name.clone()) {
            continue;
        }
        let Some(ty) = types.get(&name) else {
            continue;
        };
        queue.extend(ty.referenced_types().map(str::to_string));
        if ty.kind() == TypeKind::Interface {
            queue.extend(
                types
                    .values()
                    .filter(|t| t.interfaces().iter().any(|i| *i == name))
                    .map(|t| t.name().to_string()),
            );
        }
    }

    types.retain(|name, _| reachable.contains(name));
}
