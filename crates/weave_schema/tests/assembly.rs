//! End-to-end schema assembly tests.

use serde_json::{json, Value};
use std::sync::Arc;
use weave_core::diagnostics::codes;
use weave_core::{MemberKind, Name, ScalarKind, ShapeDescriptor};
use weave_schema::{
    BuildContext, DefinitionError, DirectiveInstance, DirectiveLocation, DirectiveType,
    FieldDefinition, FieldMiddleware, InterceptorError, NamingConvention, Resolver, ResolverArgs,
    ResolverContext, ResolverFuture, ResolverInfo, RootKind, SchemaBuilder, SchemaDocument,
    SchemaError, SchemaGraph, SchemaOptions, ServiceScope, TypeDefinition, TypeExtension,
    TypeInterceptor, TypeKind,
};

fn person_shape() -> ShapeDescriptor {
    ShapeDescriptor::new("Person")
        .scalar("name", ScalarKind::String)
        .optional("age", MemberKind::Scalar(ScalarKind::Int))
}

fn query() -> TypeDefinition {
    TypeDefinition::object("Query")
        .unwrap()
        .field("person", "Person")
        .unwrap()
}

fn field_names(schema: &SchemaGraph, type_name: &str) -> Vec<String> {
    schema
        .get_type(type_name)
        .unwrap()
        .fields()
        .keys()
        .cloned()
        .collect()
}

fn violations(result: Result<SchemaGraph, SchemaError>) -> Vec<&'static str> {
    match result {
        Err(SchemaError::Build(bag)) => bag.iter().map(|d| d.code).collect(),
        Err(other) => panic!("expected build violations, got {other}"),
        Ok(_) => panic!("expected build violations, got a schema"),
    }
}

#[test]
fn test_implicit_binding_infers_all_members() {
    let mut builder = SchemaBuilder::new();
    builder
        .add_type(query())
        .add_type(TypeDefinition::object("Person").unwrap())
        .bind_external_type(person_shape(), "Person")
        .unwrap();

    let schema = builder.create().unwrap();
    assert_eq!(field_names(&schema, "Person"), ["name", "age"]);
}

#[test]
fn test_explicit_binding_infers_nothing() {
    let mut builder = SchemaBuilder::new();
    builder
        .add_type(query())
        .add_type(
            TypeDefinition::object("Person")
                .unwrap()
                .bind_fields_explicitly()
                .field("name", "String!")
                .unwrap(),
        )
        .bind_external_type(person_shape(), "Person")
        .unwrap();

    let schema = builder.create().unwrap();
    assert_eq!(field_names(&schema, "Person"), ["name"]);
}

#[test]
fn test_explicit_default_behavior_from_options() {
    let mut builder = SchemaBuilder::new();
    builder
        .modify_options(|o| o.default_binding_behavior = weave_core::BindingBehavior::Explicit)
        .unwrap()
        .add_type(query())
        .add_type(
            TypeDefinition::object("Person")
                .unwrap()
                .field("name", "String!")
                .unwrap(),
        )
        .bind_external_type(person_shape(), "Person")
        .unwrap();

    let schema = builder.create().unwrap();
    assert_eq!(field_names(&schema, "Person"), ["name"]);
}

#[test]
fn test_root_type_last_registration_wins() {
    let first = || TypeDefinition::object("First").unwrap().field("a", "Int").unwrap();
    let second = || TypeDefinition::object("Second").unwrap().field("b", "Int").unwrap();

    let mut builder = SchemaBuilder::new();
    builder
        .add_root_type(first(), RootKind::Query)
        .add_root_type(second(), RootKind::Query);
    let schema = builder.create().unwrap();
    assert_eq!(schema.query_type().unwrap().name(), "Second");
    assert!(schema.get_type("First").is_none());

    let mut builder = SchemaBuilder::new();
    builder
        .add_root_type(second(), RootKind::Query)
        .add_root_type(first(), RootKind::Query);
    let schema = builder.create().unwrap();
    assert_eq!(schema.query_type().unwrap().name(), "First");
    assert!(schema.get_type("Second").is_none());
}

#[test]
fn test_root_types_fall_back_to_option_names() {
    let mut builder = SchemaBuilder::new();
    builder
        .set_options(SchemaOptions::default().with_query_type_name("Root"))
        .unwrap()
        .add_type(TypeDefinition::object("Root").unwrap().field("ok", "Boolean").unwrap())
        .add_type(TypeDefinition::object("Mutation").unwrap().field("ok", "Boolean").unwrap());

    let schema = builder.create().unwrap();
    assert_eq!(schema.query_type().unwrap().name(), "Root");
    assert_eq!(schema.mutation_type().unwrap().name(), "Mutation");
    assert!(schema.subscription_type().is_none());
}

#[test]
fn test_missing_query_root_is_a_violation() {
    let mut builder = SchemaBuilder::new();
    builder.add_type(TypeDefinition::object("Person").unwrap().field("name", "String").unwrap());
    assert!(violations(builder.create()).contains(&codes::MISSING_QUERY_ROOT));
}

#[test]
fn test_create_is_deterministic() {
    let build = || {
        let mut builder = SchemaBuilder::new();
        builder
            .add_type(query())
            .add_type(TypeDefinition::object("Person").unwrap())
            .bind_external_type(person_shape(), "Person")
            .unwrap()
            .set_context_data("tenant", json!("acme"))
            .unwrap();
        builder.create().unwrap()
    };

    let (a, b) = (build(), build());
    assert_eq!(a, b);
    assert_eq!(a.to_sdl(), b.to_sdl());
}

#[test]
fn test_violations_are_collected() {
    let mut builder = SchemaBuilder::new();
    builder
        .add_type(
            TypeDefinition::object("Query")
                .unwrap()
                .field("missing", "Missing")
                .unwrap(),
        )
        .add_type(TypeDefinition::object("Person").unwrap().field("name", "String").unwrap())
        .add_type(TypeDefinition::object("Person").unwrap().field("name", "String").unwrap())
        .add_type(
            TypeDefinition::object("Pet")
                .unwrap()
                .field("name", "String")
                .unwrap()
                .directive(DirectiveInstance::new("deprecated").unwrap()),
        );

    let codes_found = violations(builder.create());
    assert!(codes_found.contains(&codes::UNDEFINED_TYPE));
    assert!(codes_found.contains(&codes::DUPLICATE_TYPE));
    assert!(codes_found.contains(&codes::DIRECTIVE_LOCATION));
}

#[test]
fn test_root_type_must_be_an_object() {
    let mut builder = SchemaBuilder::new();
    builder
        .add_type(TypeDefinition::input_object("Query").unwrap().field("a", "Int").unwrap());
    assert!(violations(builder.create()).contains(&codes::INVALID_ROOT_TYPE));
}

#[test]
fn test_directive_arguments_are_validated() {
    let auth = DirectiveType::new("auth", &[DirectiveLocation::FieldDefinition])
        .unwrap()
        .argument(weave_schema::ArgumentDefinition::new("role", "String!").unwrap())
        .unwrap();

    let mut builder = SchemaBuilder::new();
    builder.add_directive_type(auth).add_type(
        TypeDefinition::object("Query")
            .unwrap()
            .with_field(
                FieldDefinition::new("a", "Int")
                    .unwrap()
                    .directive(DirectiveInstance::new("auth").unwrap()),
            )
            .unwrap()
            .with_field(
                FieldDefinition::new("b", "Int")
                    .unwrap()
                    .directive(DirectiveInstance::new("auth").unwrap().argument("role", json!(1)).unwrap()),
            )
            .unwrap()
            .with_field(
                FieldDefinition::new("c", "Int")
                    .unwrap()
                    .directive(DirectiveInstance::new("auth").unwrap().argument("scope", json!("x")).unwrap())
                    .directive(DirectiveInstance::new("cache").unwrap()),
            )
            .unwrap(),
    );

    let codes_found = violations(builder.create());
    assert!(codes_found.contains(&codes::MISSING_DIRECTIVE_ARGUMENT));
    assert!(codes_found.contains(&codes::DIRECTIVE_ARGUMENT_MISMATCH));
    assert!(codes_found.contains(&codes::UNKNOWN_DIRECTIVE_ARGUMENT));
    assert!(codes_found.contains(&codes::UNDEFINED_DIRECTIVE));
}

#[test]
fn test_int_directive_argument_outside_32_bits_is_a_mismatch() {
    let limit = DirectiveType::new("limit", &[DirectiveLocation::FieldDefinition])
        .unwrap()
        .argument(weave_schema::ArgumentDefinition::new("n", "Int!").unwrap())
        .unwrap();
    let query_with = |n: Value| {
        TypeDefinition::object("Query")
            .unwrap()
            .with_field(
                FieldDefinition::new("items", "Int")
                    .unwrap()
                    .directive(DirectiveInstance::new("limit").unwrap().argument("n", n).unwrap()),
            )
            .unwrap()
    };

    let mut builder = SchemaBuilder::new();
    builder
        .add_directive_type(limit.clone())
        .add_type(query_with(json!(9_999_999_999_i64)));
    assert_eq!(violations(builder.create()), [codes::DIRECTIVE_ARGUMENT_MISMATCH]);

    let mut builder = SchemaBuilder::new();
    builder
        .add_directive_type(limit)
        .add_type(query_with(json!(i32::MAX)));
    assert!(builder.create().is_ok());
}

#[test]
fn test_deprecated_field_is_valid() {
    let mut builder = SchemaBuilder::new();
    builder.add_type(
        TypeDefinition::object("Query")
            .unwrap()
            .with_field(FieldDefinition::new("old", "Int").unwrap().deprecated("use new").unwrap())
            .unwrap()
            .field("new", "Int")
            .unwrap(),
    );
    let schema = builder.create().unwrap();
    let old = schema.query_type().unwrap().field("old").unwrap();
    assert_eq!(old.directives[0].arguments["reason"], json!("use new"));
}

struct AddTimestamp;

impl TypeInterceptor for AddTimestamp {
    fn name(&self) -> &str {
        "add-timestamp"
    }

    fn intercept(
        &self,
        _ctx: &BuildContext,
        definition: &mut TypeDefinition,
    ) -> Result<(), InterceptorError> {
        if definition.kind == TypeKind::Object {
            definition.add_field(
                FieldDefinition::new("createdAt", "String").map_err(DefinitionError::from)?,
            )?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct RequireTimestamp;

impl TypeInterceptor for RequireTimestamp {
    fn name(&self) -> &str {
        "require-timestamp"
    }

    fn intercept(
        &self,
        _ctx: &BuildContext,
        definition: &mut TypeDefinition,
    ) -> Result<(), InterceptorError> {
        if definition.kind == TypeKind::Object && !definition.fields.contains_key("createdAt") {
            return Err(InterceptorError::Rejected("missing createdAt".into()));
        }
        Ok(())
    }
}

#[test]
fn test_interceptors_run_in_registration_order() {
    let mut builder = SchemaBuilder::new();
    builder
        .add_type(query())
        .add_type(TypeDefinition::object("Person").unwrap())
        .bind_external_type(person_shape(), "Person")
        .unwrap()
        .add_type_interceptor(AddTimestamp)
        .add_type_interceptor_type::<RequireTimestamp>();

    let schema = builder.create().unwrap();
    assert_eq!(field_names(&schema, "Person"), ["name", "age", "createdAt"]);

    let mut builder = SchemaBuilder::new();
    builder
        .add_type(query())
        .add_type(TypeDefinition::object("Person").unwrap().field("name", "String").unwrap())
        .add_type_interceptor_type::<RequireTimestamp>()
        .add_type_interceptor(AddTimestamp);
    let err = builder.create().unwrap_err();
    assert!(matches!(err, SchemaError::Interceptor { ref interceptor, .. } if interceptor == "require-timestamp"));
}

struct PrefixRoot;

impl TypeInterceptor for PrefixRoot {
    fn name(&self) -> &str {
        "prefix-root"
    }

    fn intercept(
        &self,
        _ctx: &BuildContext,
        definition: &mut TypeDefinition,
    ) -> Result<(), InterceptorError> {
        if definition.name.as_str() == "Query" {
            definition.name = Name::new("RootQuery").map_err(DefinitionError::from)?;
        }
        Ok(())
    }
}

#[test]
fn test_renamed_root_type_stays_the_root() {
    let mut builder = SchemaBuilder::new();
    builder
        .add_type(query())
        .add_type(TypeDefinition::object("Person").unwrap().field("name", "String").unwrap())
        .add_type_interceptor(PrefixRoot);

    let schema = builder.create().unwrap();
    assert_eq!(schema.query_type().unwrap().name(), "RootQuery");
    assert!(schema.get_type("Query").is_none());

    let mut builder = SchemaBuilder::new();
    builder
        .add_root_type(query(), RootKind::Query)
        .add_type(TypeDefinition::object("Person").unwrap().field("name", "String").unwrap())
        .add_type_interceptor(PrefixRoot);
    let schema = builder.create().unwrap();
    assert_eq!(schema.root_type(RootKind::Query).unwrap().name(), "RootQuery");
}

#[test]
fn test_invalid_interceptor_mutation_fails_fast() {
    let mut builder = SchemaBuilder::new();
    builder
        .add_type(query())
        .add_type(TypeDefinition::object("Person").unwrap().field("name", "String").unwrap())
        // A dangling type reference that would otherwise be collected.
        .add_type(TypeDefinition::object("Pet").unwrap().field("owner", "Missing").unwrap())
        .add_type_interceptor(AddTimestamp)
        .add_type_interceptor(AddTimestamp);

    let err = builder.create().unwrap_err();
    let SchemaError::Interceptor { type_name, reason, .. } = err else {
        panic!("expected an interceptor error");
    };
    assert_eq!(type_name, "Query");
    assert!(reason.contains("createdAt"));
}

#[test]
fn test_interceptor_factory_failure_is_a_build_error() {
    let mut builder = SchemaBuilder::new();
    builder
        .add_type(query())
        .add_type_interceptor_factory("needs-clock", |services| {
            services
                .get::<u64>()
                .map(|_| Arc::new(AddTimestamp) as Arc<dyn TypeInterceptor>)
                .ok_or_else(|| "no clock service".to_string())
        })
        .unwrap();

    let err = builder.create().unwrap_err();
    assert!(matches!(err, SchemaError::InterceptorInstantiation { .. }));
}

#[test]
fn test_context_data_last_write_wins() {
    let mut builder = SchemaBuilder::new();
    builder
        .add_type(query())
        .add_type(TypeDefinition::object("Person").unwrap().field("name", "String").unwrap())
        .set_context_data("limit", json!(1))
        .unwrap()
        .set_context_data("limit", json!(2))
        .unwrap()
        .update_context_data("limit", |v| json!(v.and_then(Value::as_i64).unwrap_or(0) * 10))
        .unwrap()
        .on_before_create(|ctx| {
            ctx.context_data_mut().insert("hook".into(), json!(true));
        });

    let schema = builder.create().unwrap();
    assert_eq!(schema.context_data()["limit"], json!(20));
    assert_eq!(schema.context_data()["hook"], json!(true));
}

#[test]
fn test_empty_context_key_is_a_configuration_error() {
    let mut builder = SchemaBuilder::new();
    assert!(builder.set_context_data("", json!(1)).is_err());
}

struct Shouting;

impl NamingConvention for Shouting {
    fn field_name(&self, member: &str) -> String {
        member.to_uppercase()
    }
}

#[test]
fn test_conventions_replace_defaults() {
    let mut builder = SchemaBuilder::new();
    builder
        .add_type(query())
        .add_type(TypeDefinition::object("Person").unwrap())
        .bind_external_type(person_shape(), "Person")
        .unwrap()
        .add_convention::<dyn NamingConvention, _>(|_| Arc::new(Shouting));

    let schema = builder.create().unwrap();
    assert_eq!(field_names(&schema, "Person"), ["NAME", "AGE"]);
}

#[test]
fn test_documents_are_loaded_with_services() {
    let mut services = ServiceScope::new();
    services.insert(String::from("Pet"));

    let mut builder = SchemaBuilder::new();
    builder
        .add_services(&services)
        .add_type(query())
        .add_type(TypeDefinition::object("Person").unwrap().field("name", "String").unwrap())
        .add_document(|services| {
            let name = services.get::<String>().ok_or("missing name")?;
            let pet = TypeDefinition::object(&name)
                .and_then(|t| t.field("name", "String"))
                .map_err(|e| e.to_string())?;
            Ok(SchemaDocument {
                types: vec![pet],
                ..SchemaDocument::default()
            })
        });

    let schema = builder.create().unwrap();
    assert!(schema.get_type("Pet").is_some());

    let mut builder = SchemaBuilder::new();
    builder
        .add_type(query())
        .add_document(|_| Err("unreadable".into()));
    assert!(matches!(builder.create(), Err(SchemaError::Document { .. })));
}

#[test]
fn test_type_extensions_merge() {
    let mut builder = SchemaBuilder::new();
    builder
        .add_type_extension(TypeExtension::new("Person").unwrap().field("email", "String").unwrap())
        .add_type(query())
        .add_type(TypeDefinition::object("Person").unwrap().field("name", "String").unwrap());
    let schema = builder.create().unwrap();
    assert_eq!(field_names(&schema, "Person"), ["name", "email"]);

    let mut builder = SchemaBuilder::new();
    builder
        .add_type(query())
        .add_type(TypeDefinition::object("Person").unwrap().field("name", "String").unwrap())
        .add_type_extension(TypeExtension::new("Ghost").unwrap().field("boo", "String").unwrap());
    assert!(violations(builder.create()).contains(&codes::UNDEFINED_EXTENSION_TARGET));
}

#[test]
fn test_resolver_registrations_are_checked() {
    let mut builder = SchemaBuilder::new();
    builder
        .add_type(query())
        .add_type(TypeDefinition::object("Person").unwrap().field("name", "String").unwrap())
        .add_resolver_fn("Query", "person", |_, _, _, _| Ok(Value::Null))
        .unwrap()
        .add_resolver_fn("Query", "person", |_, _, _, _| Ok(Value::Null))
        .unwrap()
        .add_resolver_fn("Query", "nobody", |_, _, _, _| Ok(Value::Null))
        .unwrap();

    let codes_found = violations(builder.create());
    assert!(codes_found.contains(&codes::DUPLICATE_RESOLVER));
    assert!(codes_found.contains(&codes::UNDEFINED_FIELD));
}

struct Exclaim;

impl FieldMiddleware for Exclaim {
    fn call<'a>(
        &'a self,
        next: &'a dyn Resolver,
        parent: &'a Value,
        args: &'a ResolverArgs,
        ctx: &'a ResolverContext,
        info: &'a ResolverInfo,
    ) -> ResolverFuture<'a> {
        Box::pin(async move {
            let value = next.resolve(parent, args, ctx, info).await?;
            Ok(json!(format!("{}!", value.as_str().unwrap_or_default())))
        })
    }
}

#[tokio::test]
async fn test_middleware_wraps_registered_and_default_resolvers() {
    let mut builder = SchemaBuilder::new();
    builder
        .add_type(
            TypeDefinition::object("Query")
                .unwrap()
                .field("hello", "String")
                .unwrap()
                .field("name", "String")
                .unwrap(),
        )
        .add_resolver_fn("Query", "hello", |_, _, _, _| Ok(json!("hi")))
        .unwrap()
        .use_field_middleware(Exclaim);
    let schema = builder.create().unwrap();

    let ctx = schema.resolver_context();
    let args = ResolverArgs::new();
    let parent = json!({ "name": "weave" });

    let hello = schema
        .resolver("Query", "hello")
        .resolve(&parent, &args, &ctx, &ResolverInfo::new("hello", "Query"))
        .await
        .unwrap();
    let name = schema
        .resolver("Query", "name")
        .resolve(&parent, &args, &ctx, &ResolverInfo::new("name", "Query"))
        .await
        .unwrap();

    assert_eq!(hello, json!("hi!"));
    assert_eq!(name, json!("weave!"));
}

fn search_schema(builder: &mut SchemaBuilder) {
    builder
        .add_type(TypeDefinition::object("Query").unwrap().field("search", "[Result!]").unwrap())
        .add_type(TypeDefinition::union("Result").unwrap().member("Person").unwrap().member("Pet").unwrap())
        .add_type(TypeDefinition::object("Person").unwrap().field("name", "String").unwrap())
        .add_type(TypeDefinition::object("Pet").unwrap().field("species", "String").unwrap());
}

#[test]
fn test_abstract_types_resolve_by_typename() {
    let mut builder = SchemaBuilder::new();
    search_schema(&mut builder);
    let schema = builder.create().unwrap();

    let value = json!({ "__typename": "Pet", "species": "cat" });
    assert_eq!(schema.resolve_abstract_type("Result", &value).unwrap().name(), "Pet");
    assert_eq!(schema.possible_types("Result").len(), 2);
}

#[test]
fn test_abstract_types_resolve_by_fallback() {
    let mut builder = SchemaBuilder::new();
    search_schema(&mut builder);
    builder.set_type_resolver_fallback(|object, value| match object {
        "Pet" => value.get("species").is_some(),
        "Person" => value.get("name").is_some(),
        _ => false,
    });
    let schema = builder.create().unwrap();

    let value = json!({ "name": "Alice" });
    assert_eq!(schema.resolve_abstract_type("Result", &value).unwrap().name(), "Person");
}

#[test]
fn test_union_members_must_be_objects() {
    let mut builder = SchemaBuilder::new();
    builder
        .add_type(TypeDefinition::object("Query").unwrap().field("r", "Result").unwrap())
        .add_type(TypeDefinition::union("Result").unwrap().member("Color").unwrap())
        .add_type(TypeDefinition::enumeration("Color").unwrap().value("RED").unwrap());
    assert!(violations(builder.create()).contains(&codes::INVALID_UNION_MEMBER));
}

#[test]
fn test_interface_fields_must_be_implemented() {
    let mut builder = SchemaBuilder::new();
    builder
        .add_type(TypeDefinition::object("Query").unwrap().field("node", "Node").unwrap())
        .add_type(TypeDefinition::interface("Node").unwrap().field("id", "ID!").unwrap())
        .add_type(
            TypeDefinition::object("Person")
                .unwrap()
                .implements("Node")
                .unwrap()
                .field("name", "String")
                .unwrap(),
        );
    assert!(violations(builder.create()).contains(&codes::MISSING_INTERFACE_FIELD));
}

#[test]
fn test_unreachable_types_are_removed_on_request() {
    let mut builder = SchemaBuilder::new();
    builder
        .modify_options(|o| o.remove_unreachable_types = true)
        .unwrap()
        .add_type(query())
        .add_type(TypeDefinition::object("Person").unwrap().field("name", "String").unwrap())
        .add_type(TypeDefinition::object("Orphan").unwrap().field("id", "ID").unwrap());

    let schema = builder.create().unwrap();
    assert!(schema.get_type("Person").is_some());
    assert!(schema.get_type("Orphan").is_none());
    assert!(schema.get_type("ID").is_none());
    assert!(schema.get_type("String").is_some());
}

#[test]
fn test_fields_are_sorted_on_request() {
    let mut builder = SchemaBuilder::new();
    builder
        .modify_options(|o| o.sort_fields_by_name = true)
        .unwrap()
        .add_type(
            TypeDefinition::object("Query")
                .unwrap()
                .field("zeta", "Int")
                .unwrap()
                .field("alpha", "Int")
                .unwrap(),
        );
    let schema = builder.create().unwrap();
    assert_eq!(field_names(&schema, "Query"), ["alpha", "zeta"]);
}

#[test]
fn test_schema_graph_is_shareable_across_threads() {
    let mut builder = SchemaBuilder::new();
    builder.add_type(query()).add_type(
        TypeDefinition::object("Person").unwrap().field("name", "String").unwrap(),
    );
    let schema = Arc::new(builder.create().unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let schema = Arc::clone(&schema);
            std::thread::spawn(move || schema.get_type("Person").map(|t| t.fields().len()))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some(1));
    }
}

#[test]
fn test_sdl_output() {
    let mut builder = SchemaBuilder::new();
    builder
        .add_directive_type(
            DirectiveType::new("key", &[DirectiveLocation::Object])
                .unwrap()
                .argument(weave_schema::ArgumentDefinition::new("fields", "String!").unwrap())
                .unwrap(),
        )
        .add_type(query())
        .add_type(
            TypeDefinition::object("Person")
                .unwrap()
                .with_description("A person.")
                .directive(DirectiveInstance::new("key").unwrap().argument("fields", json!("name")).unwrap())
                .field("nickname", "String")
                .unwrap(),
        )
        .add_type(TypeDefinition::enumeration("Color").unwrap().value("RED").unwrap().value("GREEN").unwrap())
        .bind_external_type(person_shape(), "Person")
        .unwrap();

    let schema = builder.create().unwrap();
    insta::assert_snapshot!(schema.to_sdl(), @r#"
    directive @key(fields: String!) on OBJECT

    type Query {
      person: Person
    }

    """
    A person.
    """
    type Person @key(fields: "name") {
      nickname: String
      name: String!
      age: Int
    }

    enum Color {
      RED
      GREEN
    }
    "#);
}
