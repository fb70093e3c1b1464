//! Finalization checks over the assembled definitions.
//!
//! Every check appends to the same [`DiagnosticBag`]; the assembler aborts if
//! any error was recorded.

use crate::arena::TypeArena;
use crate::definition::{DirectiveInstance, TypeDefinition, TypeKind};
use crate::directive::{DirectiveLocation, DirectiveType};
use crate::registry::{ResolverRegistration, RootKind, SchemaDefinition};
use crate::values::conforms;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use weave_core::diagnostics::codes;
use weave_core::{Diagnostic, DiagnosticBag, SchemaCoordinate};

pub(crate) struct GraphValidator<'a> {
    arena: &'a TypeArena,
    directives: &'a IndexMap<String, DirectiveType>,
    bag: &'a mut DiagnosticBag,
}

impl<'a> GraphValidator<'a> {
    pub(crate) fn new(
        arena: &'a TypeArena,
        directives: &'a IndexMap<String, DirectiveType>,
        bag: &'a mut DiagnosticBag,
    ) -> Self {
        Self {
            arena,
            directives,
            bag,
        }
    }

    pub(crate) fn validate(
        &mut self,
        roots: &[Option<String>; 3],
        schema: &SchemaDefinition,
        resolvers: &[ResolverRegistration],
    ) {
        let arena = self.arena;
        let directives = self.directives;
        self.check_duplicates();
        self.check_roots(roots);
        for definition in arena.canonical() {
            self.check_type(definition);
        }
        for directive in directives.values() {
            self.check_directive_type(directive);
        }
        self.check_directives(&schema.directives, DirectiveLocation::Schema, None);
        self.check_resolvers(resolvers);
    }

    fn error(&mut self, code: &'static str, title: &str, coordinate: Option<SchemaCoordinate>, message: String) {
        let diagnostic = Diagnostic::error(code, title).with_message(message);
        self.bag.add(match coordinate {
            Some(coordinate) => diagnostic.at(coordinate),
            None => diagnostic,
        });
    }

    fn check_duplicates(&mut self) {
        let arena = self.arena;
        for name in arena.duplicates() {
            self.error(
                codes::DUPLICATE_TYPE,
                "duplicate type",
                Some(SchemaCoordinate::ty(name)),
                format!("`{name}` is defined more than once"),
            );
        }
    }

    fn check_roots(&mut self, roots: &[Option<String>; 3]) {
        let arena = self.arena;
        if roots[RootKind::Query.index()].is_none() {
            self.error(
                codes::MISSING_QUERY_ROOT,
                "missing query root type",
                None,
                "no query root type was registered or found by name".to_string(),
            );
        }
        for kind in RootKind::ALL {
            let Some(name) = &roots[kind.index()] else {
                continue;
            };
            match arena.by_name(name) {
                None => self.error(
                    codes::INVALID_ROOT_TYPE,
                    "invalid root type",
                    Some(SchemaCoordinate::ty(name.as_str())),
                    format!("{kind} root type `{name}` is not defined"),
                ),
                Some(definition) if definition.kind != TypeKind::Object => self.error(
                    codes::INVALID_ROOT_TYPE,
                    "invalid root type",
                    Some(SchemaCoordinate::ty(name.as_str())),
                    format!("{kind} root type `{name}` must be an object type"),
                ),
                Some(_) => {}
            }
        }
    }

    fn check_type(&mut self, definition: &TypeDefinition) {
        let arena = self.arena;
        let type_name = definition.name.as_str();
        let type_coordinate = SchemaCoordinate::ty(type_name);

        let type_location = match definition.kind {
            TypeKind::Object => DirectiveLocation::Object,
            TypeKind::Interface => DirectiveLocation::Interface,
            TypeKind::Union => DirectiveLocation::Union,
            TypeKind::Enum => DirectiveLocation::Enum,
            TypeKind::InputObject => DirectiveLocation::InputObject,
            TypeKind::Scalar => DirectiveLocation::Scalar,
        };
        self.check_directives(&definition.directives, type_location, Some(&type_coordinate));

        match definition.kind {
            TypeKind::Object | TypeKind::Interface | TypeKind::InputObject => {
                if definition.fields.is_empty() {
                    self.error(
                        codes::EMPTY_FIELDS,
                        "type has no fields",
                        Some(type_coordinate.clone()),
                        format!("`{type_name}` must define at least one field"),
                    );
                }
            }
            TypeKind::Union => {
                if definition.members.is_empty() {
                    self.error(
                        codes::EMPTY_FIELDS,
                        "union has no members",
                        Some(type_coordinate.clone()),
                        format!("`{type_name}` must include at least one object type"),
                    );
                }
                for member in &definition.members {
                    match arena.by_name(member) {
                        None => self.error(
                            codes::UNDEFINED_TYPE,
                            "undefined type",
                            Some(type_coordinate.clone()),
                            format!("union member `{member}` is not defined"),
                        ),
                        Some(d) if d.kind != TypeKind::Object => self.error(
                            codes::INVALID_UNION_MEMBER,
                            "invalid union member",
                            Some(type_coordinate.clone()),
                            format!("union member `{member}` must be an object type"),
                        ),
                        Some(_) => {}
                    }
                }
            }
            TypeKind::Enum => {
                if definition.values.is_empty() {
                    self.error(
                        codes::EMPTY_FIELDS,
                        "enum has no values",
                        Some(type_coordinate.clone()),
                        format!("`{type_name}` must define at least one value"),
                    );
                }
                for value in definition.values.values() {
                    let coordinate = SchemaCoordinate::member(type_name, value.name.as_str());
                    self.check_directives(&value.directives, DirectiveLocation::EnumValue, Some(&coordinate));
                }
            }
            TypeKind::Scalar => {}
        }

        self.check_interfaces(definition);

        let input = definition.kind == TypeKind::InputObject;
        for field in definition.fields.values() {
            let coordinate = SchemaCoordinate::member(type_name, field.name.as_str());
            self.check_type_ref(field.ty.named_type(), input, &coordinate);
            let location = if input {
                DirectiveLocation::InputFieldDefinition
            } else {
                DirectiveLocation::FieldDefinition
            };
            self.check_directives(&field.directives, location, Some(&coordinate));

            for argument in field.arguments.values() {
                let coordinate =
                    SchemaCoordinate::argument(type_name, field.name.as_str(), argument.name.as_str());
                self.check_type_ref(argument.ty.named_type(), true, &coordinate);
                self.check_directives(
                    &argument.directives,
                    DirectiveLocation::ArgumentDefinition,
                    Some(&coordinate),
                );
            }
        }
    }

    fn check_interfaces(&mut self, definition: &TypeDefinition) {
        let arena = self.arena;
        let type_name = definition.name.as_str();
        for interface_name in &definition.interfaces {
            match arena.by_name(interface_name) {
                None => self.error(
                    codes::UNDEFINED_TYPE,
                    "undefined type",
                    Some(SchemaCoordinate::ty(type_name)),
                    format!("interface `{interface_name}` is not defined"),
                ),
                Some(interface) if interface.kind != TypeKind::Interface => self.error(
                    codes::INVALID_INTERFACE,
                    "invalid interface",
                    Some(SchemaCoordinate::ty(type_name)),
                    format!("`{interface_name}` is not an interface"),
                ),
                Some(interface) => {
                    for field in interface.fields.keys() {
                        if !definition.fields.contains_key(field) {
                            self.error(
                                codes::MISSING_INTERFACE_FIELD,
                                "missing interface field",
                                Some(SchemaCoordinate::member(type_name, field.as_str())),
                                format!("`{type_name}` implements `{interface_name}` but lacks `{field}`"),
                            );
                        }
                    }
                }
            }
        }
    }

    fn check_type_ref(&mut self, named: &str, input: bool, coordinate: &SchemaCoordinate) {
        let arena = self.arena;
        match arena.by_name(named) {
            None => self.error(
                codes::UNDEFINED_TYPE,
                "undefined type",
                Some(coordinate.clone()),
                format!("type `{named}` is not defined"),
            ),
            Some(target) => {
                let allowed = if input {
                    target.kind.is_input()
                } else {
                    target.kind.is_output()
                };
                if !allowed {
                    let position = if input { "input" } else { "output" };
                    self.error(
                        codes::INVALID_FIELD_TYPE,
                        "invalid field type",
                        Some(coordinate.clone()),
                        format!("`{named}` cannot be used in an {position} position"),
                    );
                }
            }
        }
    }

    fn check_directive_type(&mut self, directive: &DirectiveType) {
        for argument in directive.arguments.values() {
            let coordinate =
                SchemaCoordinate::directive_argument(directive.name.as_str(), argument.name.as_str());
            self.check_type_ref(argument.ty.named_type(), true, &coordinate);
        }
    }

    /// Checks directive instances against their directive types.
    fn check_directives(
        &mut self,
        instances: &[DirectiveInstance],
        location: DirectiveLocation,
        coordinate: Option<&SchemaCoordinate>,
    ) {
        let arena = self.arena;
        let directives = self.directives;
        let mut seen: FxHashMap<&str, usize> = FxHashMap::default();
        for instance in instances {
            let name = instance.name.as_str();
            let Some(directive) = directives.get(name) else {
                self.error(
                    codes::UNDEFINED_DIRECTIVE,
                    "undefined directive",
                    coordinate.cloned(),
                    format!("directive `@{name}` is not defined"),
                );
                continue;
            };

            if !directive.allows(location) {
                self.error(
                    codes::DIRECTIVE_LOCATION,
                    "directive not allowed here",
                    coordinate.cloned(),
                    format!("`@{name}` cannot be applied at {location}"),
                );
            }

            let count = seen.entry(name).or_default();
            *count += 1;
            if *count == 2 && !directive.repeatable {
                self.error(
                    codes::DIRECTIVE_NOT_REPEATABLE,
                    "directive is not repeatable",
                    coordinate.cloned(),
                    format!("`@{name}` may be applied only once"),
                );
            }

            for (argument_name, value) in &instance.arguments {
                match directive.arguments.get(argument_name) {
                    None => self.error(
                        codes::UNKNOWN_DIRECTIVE_ARGUMENT,
                        "unknown directive argument",
                        coordinate.cloned(),
                        format!("`@{name}` has no argument `{argument_name}`"),
                    ),
                    Some(argument) if !conforms(value, &argument.ty, arena) => self.error(
                        codes::DIRECTIVE_ARGUMENT_MISMATCH,
                        "directive argument mismatch",
                        coordinate.cloned(),
                        format!(
                            "`@{name}({argument_name}:)` expects `{}`, got `{value}`",
                            argument.ty
                        ),
                    ),
                    Some(_) => {}
                }
            }

            for argument in directive.arguments.values() {
                if argument.is_required() && !instance.arguments.contains_key(argument.name.as_str()) {
                    self.error(
                        codes::MISSING_DIRECTIVE_ARGUMENT,
                        "missing directive argument",
                        coordinate.cloned(),
                        format!("`@{name}` requires argument `{}`", argument.name),
                    );
                }
            }
        }
    }

    fn check_resolvers(&mut self, resolvers: &[ResolverRegistration]) {
        let arena = self.arena;
        let mut seen: FxHashMap<(&str, &str), usize> = FxHashMap::default();
        for registration in resolvers {
            let type_name = registration.type_name.as_str();
            let field_name = registration.field_name.as_str();
            let coordinate = SchemaCoordinate::member(type_name, field_name);

            let count = seen.entry((type_name, field_name)).or_default();
            *count += 1;
            if *count == 2 {
                self.error(
                    codes::DUPLICATE_RESOLVER,
                    "duplicate resolver",
                    Some(coordinate.clone()),
                    format!("more than one resolver is registered for `{coordinate}`"),
                );
            }

            match arena.by_name(type_name) {
                None => self.error(
                    codes::UNDEFINED_TYPE,
                    "undefined type",
                    Some(coordinate),
                    format!("resolver targets undefined type `{type_name}`"),
                ),
                Some(definition) if !definition.fields.contains_key(field_name) => self.error(
                    codes::UNDEFINED_FIELD,
                    "undefined field",
                    Some(coordinate),
                    format!("`{type_name}` has no field `{field_name}`"),
                ),
                Some(_) => {}
            }
        }
    }
}
