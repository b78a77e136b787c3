//! Schema model module

mod builder;
mod model;

pub use builder::ModelBuilder;
pub use model::{
    Column, Constraint, ConstraintKind, ForeignRef, FunctionDef, IgnoredStatement, Index, Policy,
    PolicyCommand, QualifiedName, SchemaModel, Table,
};
