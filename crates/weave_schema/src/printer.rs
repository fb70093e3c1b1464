//! SDL printing for finalized schemas.

use crate::definition::{ArgumentDefinition, DirectiveInstance, TypeKind};
use crate::directive::DirectiveType;
use crate::graph::{NamedType, SchemaGraph};
use crate::registry::RootKind;
use crate::values::is_builtin_scalar;
use indexmap::IndexMap;
use serde_json::Value;

/// Prints a schema graph as SDL. Built-in scalars and directives are omitted.
pub struct SdlPrinter<'a> {
    schema: &'a SchemaGraph,
    output: String,
    indent: usize,
}

impl<'a> SdlPrinter<'a> {
    pub fn new(schema: &'a SchemaGraph) -> Self {
        Self {
            schema,
            output: String::new(),
            indent: 0,
        }
    }

    /// Prints the whole schema.
    pub fn print(mut self) -> String {
        let schema = self.schema;
        let mut blocks = 0;
        let mut separate = |output: &mut String| {
            if blocks > 0 {
                output.push_str("\n\n");
            }
            blocks += 1;
        };

        if self.needs_schema_block() {
            separate(&mut self.output);
            self.print_schema_block();
        }
        for directive in schema.directive_types().filter(|d| !d.is_builtin()) {
            separate(&mut self.output);
            self.print_directive_type(directive);
        }
        for ty in schema.types().filter(|t| !is_builtin_scalar(t.name())) {
            separate(&mut self.output);
            self.print_type(ty);
        }
        if !self.output.is_empty() {
            self.output.push('\n');
        }
        self.output
    }

    fn needs_schema_block(&self) -> bool {
        let conventional = RootKind::ALL.iter().all(|kind| {
            self.schema
                .root_type(*kind)
                .map_or(true, |ty| ty.name() == conventional_name(*kind))
        });
        !conventional
            || self.schema.description().is_some()
            || !self.schema.schema_directives().is_empty()
    }

    fn print_schema_block(&mut self) {
        let schema = self.schema;
        if let Some(description) = schema.description() {
            self.print_description(description);
        }
        self.output.push_str("schema");
        self.print_directives(schema.schema_directives());
        self.output.push_str(" {\n");
        for kind in RootKind::ALL {
            if let Some(ty) = schema.root_type(kind) {
                self.output.push_str("  ");
                self.output.push_str(kind.as_str());
                self.output.push_str(": ");
                self.output.push_str(ty.name());
                self.output.push('\n');
            }
        }
        self.output.push('}');
    }

    fn print_directive_type(&mut self, directive: &DirectiveType) {
        if let Some(description) = &directive.description {
            self.print_description(description);
        }
        self.output.push_str("directive @");
        self.output.push_str(&directive.name);
        self.print_arguments(&directive.arguments);
        if directive.repeatable {
            self.output.push_str(" repeatable");
        }
        self.output.push_str(" on ");
        let locations: Vec<_> = directive.locations.iter().map(|l| l.as_str()).collect();
        self.output.push_str(&locations.join(" | "));
    }

    fn print_type(&mut self, ty: &NamedType) {
        if let Some(description) = ty.description() {
            self.print_description(description);
        }
        self.output.push_str(ty.kind().keyword());
        self.output.push(' ');
        self.output.push_str(ty.name());

        if !ty.interfaces().is_empty() {
            self.output.push_str(" implements ");
            self.output.push_str(&ty.interfaces().join(" & "));
        }
        self.print_directives(ty.directives());

        match ty.kind() {
            TypeKind::Object | TypeKind::Interface | TypeKind::InputObject => {
                self.output.push_str(" {\n");
                self.indent += 1;
                for field in ty.fields().values() {
                    if let Some(description) = &field.description {
                        self.print_description(description);
                    }
                    self.push_indent();
                    self.output.push_str(&field.name);
                    self.print_arguments(&field.arguments);
                    self.output.push_str(": ");
                    self.output.push_str(&field.ty.to_string());
                    if let Some(default) = &field.default_value {
                        self.output.push_str(" = ");
                        self.print_value(default);
                    }
                    self.print_directives(&field.directives);
                    self.output.push('\n');
                }
                self.indent -= 1;
                self.output.push('}');
            }
            TypeKind::Union => {
                self.output.push_str(" = ");
                self.output.push_str(&ty.members().join(" | "));
            }
            TypeKind::Enum => {
                self.output.push_str(" {\n");
                self.indent += 1;
                for value in ty.values().values() {
                    if let Some(description) = &value.description {
                        self.print_description(description);
                    }
                    self.push_indent();
                    self.output.push_str(&value.name);
                    self.print_directives(&value.directives);
                    self.output.push('\n');
                }
                self.indent -= 1;
                self.output.push('}');
            }
            TypeKind::Scalar => {}
        }
    }

    fn print_arguments(&mut self, arguments: &IndexMap<String, ArgumentDefinition>) {
        if arguments.is_empty() {
            return;
        }
        self.output.push('(');
        for (i, argument) in arguments.values().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.output.push_str(&argument.name);
            self.output.push_str(": ");
            self.output.push_str(&argument.ty.to_string());
            if let Some(default) = &argument.default_value {
                self.output.push_str(" = ");
                self.print_value(default);
            }
            self.print_directives(&argument.directives);
        }
        self.output.push(')');
    }

    fn print_directives(&mut self, directives: &[DirectiveInstance]) {
        for directive in directives {
            self.output.push_str(" @");
            self.output.push_str(&directive.name);
            if directive.arguments.is_empty() {
                continue;
            }
            self.output.push('(');
            for (i, (name, value)) in directive.arguments.iter().enumerate() {
                if i > 0 {
                    self.output.push_str(", ");
                }
                self.output.push_str(name);
                self.output.push_str(": ");
                self.print_value(value);
            }
            self.output.push(')');
        }
    }

    fn print_value(&mut self, value: &Value) {
        match value {
            Value::Array(items) => {
                self.output.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.print_value(item);
                }
                self.output.push(']');
            }
            Value::Object(fields) => {
                self.output.push('{');
                for (i, (name, item)) in fields.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.output.push_str(name);
                    self.output.push_str(": ");
                    self.print_value(item);
                }
                self.output.push('}');
            }
            scalar => self.output.push_str(&scalar.to_string()),
        }
    }

    fn print_description(&mut self, description: &str) {
        self.push_indent();
        self.output.push_str("\"\"\"\n");
        for line in description.lines() {
            self.push_indent();
            self.output.push_str(line);
            self.output.push('\n');
        }
        self.push_indent();
        self.output.push_str("\"\"\"\n");
    }

    fn push_indent(&mut self) {
        for _ in 0..self.indent {
            self.output.push_str("  ");
        }
    }
}

fn conventional_name(kind: RootKind) -> &'static str {
    match kind {
        RootKind::Query => "Query",
        RootKind::Mutation => "Mutation",
        RootKind::Subscription => "Subscription",
    }
}

impl SchemaGraph {
    /// Prints the schema as SDL.
    pub fn to_sdl(&self) -> String {
        SdlPrinter::new(self).print()
    }
}
