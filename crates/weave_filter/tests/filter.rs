//! End-to-end filter compilation and application tests.

use serde_json::{json, Value};
use weave_core::{
    BindingBehavior, CancellationSignal, CancellationSource, DataShape, Member, MemberAccess,
    MemberKind, ScalarKind, ShapeDescriptor,
};
use weave_filter::{
    ops, CompilationError, CompiledFilter, FilterError, FilterInputBuilder, FilterTypeSet,
    RuntimeFilterError,
};
use weave_schema::{ArgumentDefinition, FieldDefinition, SchemaBuilder, TypeDefinition};

#[derive(Debug, Clone, PartialEq)]
struct Person {
    name: String,
    age: i64,
    city: String,
}

impl Person {
    fn new(name: &str, age: i64, city: &str) -> Self {
        Self {
            name: name.to_string(),
            age,
            city: city.to_string(),
        }
    }
}

impl MemberAccess for Person {
    fn member_value(&self, path: &str) -> Option<Value> {
        match path {
            "name" => Some(json!(self.name)),
            "age" => Some(json!(self.age)),
            "address.city" => Some(json!(self.city)),
            _ => None,
        }
    }
}

impl DataShape for Person {
    fn shape() -> ShapeDescriptor {
        ShapeDescriptor::new("Person")
            .scalar("name", ScalarKind::String)
            .scalar("age", ScalarKind::Int)
            .member("address", MemberKind::Shape("Address".into()))
    }
}

const NAME: Member<Person> = Member::new("name");
const AGE: Member<Person> = Member::new("age");
const CITY: Member<Person> = Member::typed("address.city", ScalarKind::String);

fn people() -> Vec<Person> {
    vec![
        Person::new("Alice", 30, "Oslo"),
        Person::new("Bob", 17, "Bergen"),
        Person::new("Carol", 45, "Oslo"),
    ]
}

fn names<'a>(people: impl IntoIterator<Item = &'a Person>) -> Vec<&'a str> {
    people.into_iter().map(|p| p.name.as_str()).collect()
}

fn ignoring_age() -> CompiledFilter<Person> {
    let mut builder = FilterInputBuilder::<Person>::new();
    builder.bind_fields_implicitly().ignore_member(AGE);
    builder.compile().unwrap()
}

#[test]
fn test_ignored_member_is_not_accepted() {
    let filter = ignoring_age();

    assert_eq!(filter.field_names().collect::<Vec<_>>(), ["name"]);
    assert!(filter.accepts("name"));
    assert!(!filter.accepts("age"));

    let err = filter.bind(&json!({"age": {"gt": 18}})).unwrap_err();
    assert!(err.is_compilation());
    assert!(matches!(
        err,
        FilterError::Compilation(CompilationError::UnknownField { ref name, .. }) if name == "age"
    ));

    let data = people();
    let matched = filter
        .apply(&data, &json!({"name": {"eq": "Bob"}}), &CancellationSignal::never())
        .unwrap();
    assert_eq!(names(matched), ["Bob"]);
}

#[test]
fn test_ignore_is_applied_after_explicit_declaration() {
    let mut builder = FilterInputBuilder::<Person>::new();
    builder.field_of(AGE).unwrap();
    builder.ignore("age").unwrap();
    let filter = builder.compile().unwrap();

    assert!(!filter.accepts("age"));
    assert!(filter.accepts("name"));
}

#[test]
fn test_explicit_binding_synthesizes_nothing() {
    let mut builder = FilterInputBuilder::<Person>::new();
    builder.bind_fields(BindingBehavior::Explicit);
    builder.field_of(NAME).unwrap().operations([ops::EQ, ops::IN]);
    let filter = builder.compile().unwrap();

    assert_eq!(filter.field_names().collect::<Vec<_>>(), ["name"]);
    assert_eq!(filter.operations().count(), 0);
    assert!(filter.bind(&json!({"or": []})).is_err());
    assert!(matches!(
        filter.bind(&json!({"name": {"contains": "A"}})),
        Err(FilterError::Compilation(CompilationError::UnknownOperationName { .. }))
    ));
}

#[test]
fn test_duplicate_operation_codes_fail_compilation() {
    let mut builder = FilterInputBuilder::<Person>::new();
    builder.operation(ops::OR);
    builder.operation(ops::OR).name("either");

    assert_eq!(
        builder.compile().unwrap_err(),
        CompilationError::DuplicateOperation { code: ops::OR }
    );
}

#[test]
fn test_unknown_ignore_target_fails_compilation() {
    let mut builder = FilterInputBuilder::<Person>::new();
    builder.ignore("email").unwrap();

    assert!(matches!(
        builder.compile(),
        Err(CompilationError::UnknownIgnoreTarget { ref name }) if name == "email"
    ));
}

#[test]
fn test_combinators_and_nested_members() {
    let mut builder = FilterInputBuilder::<Person>::new();
    builder.field_of(CITY).unwrap();
    builder.operation(ops::NOT);
    let filter = builder.compile().unwrap();
    let data = people();

    let expression = json!({
        "addressCity": { "eq": "Oslo" },
        "or": [
            { "age": { "lt": 35 } },
            { "name": { "startsWith": "C" } }
        ]
    });
    let matched = filter
        .apply(&data, &expression, &CancellationSignal::never())
        .unwrap();
    assert_eq!(names(matched), ["Alice", "Carol"]);

    let matched = filter
        .apply(
            &data,
            &json!({"not": {"addressCity": {"eq": "Oslo"}}}),
            &CancellationSignal::never(),
        )
        .unwrap();
    assert_eq!(names(matched), ["Bob"]);
}

#[test]
fn test_unspecified_fields_impose_no_constraint() {
    let filter = ignoring_age();
    let data = people();

    for expression in [json!({}), Value::Null, json!({"name": null})] {
        let matched = filter
            .apply(&data, &expression, &CancellationSignal::never())
            .unwrap();
        assert_eq!(matched.len(), 3);
    }
}

#[test]
fn test_operand_mismatch_keeps_filter_usable() {
    let filter = FilterInputBuilder::<Person>::new().compile().unwrap();

    let err = filter.bind(&json!({"age": {"gt": "old"}})).unwrap_err();
    assert!(matches!(
        err,
        FilterError::Runtime(RuntimeFilterError::OperandMismatch { ref expected, .. }) if expected == "Int"
    ));
    assert!(matches!(
        filter.bind(&json!({"age": {"in": 3}})),
        Err(FilterError::Runtime(RuntimeFilterError::OperandMismatch { .. }))
    ));
    assert!(matches!(
        filter.bind(&json!([1, 2])),
        Err(FilterError::Runtime(RuntimeFilterError::InvalidExpression { .. }))
    ));

    let data = people();
    let count = filter
        .count(&data, &json!({"age": {"in": [17, 45]}}), &CancellationSignal::never())
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn test_int_operand_outside_32_bits_is_rejected() {
    let filter = FilterInputBuilder::<Person>::new().compile().unwrap();

    let err = filter.bind(&json!({"age": {"gte": 9_999_999_999_i64}})).unwrap_err();
    assert!(matches!(
        err,
        FilterError::Runtime(RuntimeFilterError::OperandMismatch { ref field, .. }) if field == "age"
    ));
    assert!(matches!(
        filter.bind(&json!({"age": {"in": [1, 2_147_483_648_i64]}})),
        Err(FilterError::Runtime(RuntimeFilterError::OperandMismatch { .. }))
    ));
    assert!(filter.bind(&json!({"age": {"lte": 2_147_483_647}})).is_ok());
}

#[test]
fn test_cancelled_application() {
    let filter = FilterInputBuilder::<Person>::new().compile().unwrap();
    let source = CancellationSource::new();
    source.cancel();

    let result = filter.apply(people(), &json!({}), &source.signal());
    assert_eq!(result, Err(FilterError::Runtime(RuntimeFilterError::Cancelled)));
}

#[tokio::test]
async fn test_concurrent_reuse() {
    let filter = FilterInputBuilder::<Person>::new().compile().unwrap();
    let before = filter.clone();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let filter = filter.clone();
            tokio::spawn(async move {
                let expression = json!({"age": {"gte": 17 + i}});
                filter
                    .apply(people(), &expression, &CancellationSignal::never())
                    .map(|matched| matched.len())
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().unwrap() >= 2);
    }
    assert_eq!(filter, before);
}

#[test]
fn test_json_elements() {
    let shape = ShapeDescriptor::new("Book")
        .scalar("title", ScalarKind::String)
        .optional("rating", MemberKind::Scalar(ScalarKind::Float));
    let filter = FilterInputBuilder::<Value>::for_shape(shape).compile().unwrap();
    let books = vec![
        json!({"title": "Dune", "rating": 4.5}),
        json!({"title": "Emma"}),
    ];

    let rated = filter
        .apply(&books, &json!({"rating": {"neq": null}}), &CancellationSignal::never())
        .unwrap();
    assert_eq!(rated, [&books[0]]);

    let unrated = filter
        .apply(&books, &json!({"rating": {"eq": null}}), &CancellationSignal::never())
        .unwrap();
    assert_eq!(unrated, [&books[1]]);
}

#[test]
fn test_filter_types_register_on_schema() {
    let filter = ignoring_age();
    let mut types = FilterTypeSet::new();
    types.add(&filter).unwrap();

    let people_field = FieldDefinition::new("people", "[String!]!")
        .unwrap()
        .argument(ArgumentDefinition::new("where", "PersonFilterInput").unwrap())
        .unwrap();
    let query = TypeDefinition::object("Query")
        .unwrap()
        .with_field(people_field)
        .unwrap();

    let mut builder = SchemaBuilder::new();
    builder.add_type(query);
    types.register(&mut builder);
    let schema = builder.create().unwrap();

    let input = schema.get_type("PersonFilterInput").unwrap();
    assert_eq!(
        input.fields().keys().collect::<Vec<_>>(),
        ["name", "and", "or"]
    );
    assert!(schema.get_type("StringOperationFilterInput").is_some());
    assert!(schema.get_type("IntOperationFilterInput").is_none());
}
