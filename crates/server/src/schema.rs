//! Operation registry for the query/mutation API.
//!
//! Every operation the dispatcher serves is declared here once. The registry
//! is built and installed at startup ([`install`]) and never changes after.

use std::collections::BTreeMap;

use once_cell::sync::OnceCell;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
}

/// Resolver an operation name is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Register,
    Login,
    Me,
    Posts,
    Post,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub kind: OperationKind,
    #[serde(skip)]
    pub operation: Operation,
    /// Type of the `options` argument, if the operation takes one.
    pub input: Option<&'static str>,
    pub output: &'static str,
    pub nullable: bool,
}

impl OperationDescriptor {
    pub fn query(name: &'static str, operation: Operation) -> Self {
        Self { name, kind: OperationKind::Query, operation, input: None, output: "", nullable: false }
    }

    pub fn mutation(name: &'static str, operation: Operation) -> Self {
        Self { kind: OperationKind::Mutation, ..Self::query(name, operation) }
    }

    pub fn input(mut self, ty: &'static str) -> Self {
        self.input = Some(ty);
        self
    }

    pub fn returns(mut self, ty: &'static str) -> Self {
        self.output = ty;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("operation `{0}` registered twice")]
    Duplicate(&'static str),
    #[error("operation `{0}` has no output type")]
    MissingOutput(&'static str),
}

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    ops: Vec<OperationDescriptor>,
}

impl SchemaBuilder {
    pub fn operation(mut self, op: OperationDescriptor) -> Self {
        self.ops.push(op);
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut ops = BTreeMap::new();
        for op in self.ops {
            if op.output.is_empty() {
                return Err(SchemaError::MissingOutput(op.name));
            }
            let name = op.name;
            if ops.insert(name, op).is_some() {
                return Err(SchemaError::Duplicate(name));
            }
        }
        Ok(Schema { ops })
    }
}

#[derive(Debug)]
pub struct Schema {
    ops: BTreeMap<&'static str, OperationDescriptor>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn lookup(&self, name: &str) -> Option<&OperationDescriptor> {
        self.ops.get(name)
    }

    /// Descriptors in name order.
    pub fn operations(&self) -> impl Iterator<Item = &OperationDescriptor> {
        self.ops.values()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Operations of the account API.
pub fn account_schema() -> Result<Schema, SchemaError> {
    Schema::builder()
        .operation(
            OperationDescriptor::mutation("register", Operation::Register)
                .input("UsernamePasswordInput")
                .returns("UserResponse"),
        )
        .operation(
            OperationDescriptor::mutation("login", Operation::Login)
                .input("UsernamePasswordInput")
                .returns("UserResponse"),
        )
        .operation(OperationDescriptor::query("me", Operation::Me).returns("User").nullable())
        .operation(OperationDescriptor::query("posts", Operation::Posts).returns("[Post]"))
        .operation(
            OperationDescriptor::query("post", Operation::Post)
                .input("PostIdInput")
                .returns("Post")
                .nullable(),
        )
        .build()
}

static SCHEMA: OnceCell<Schema> = OnceCell::new();

/// Build and install the process-wide schema. Later calls return the
/// already installed instance.
pub fn install() -> Result<&'static Schema, SchemaError> {
    SCHEMA.get_or_try_init(account_schema)
}

/// The installed schema, if [`install`] has run.
pub fn installed() -> Option<&'static Schema> {
    SCHEMA.get()
}
