//! External collaborator interfaces.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     SchemaBuilder::build(synthetic introspection request)
//!     → CompiledSchema (opaque) or SchemaBuildError (fatal)
//!
//! Per request:
//!     dispatcher
//!     → GraphqlExecutor::execute(schema, request)
//!     → RestAdapter::serve / RestAdapter::render_docs
//!     → Response or EngineError (status chosen by the collaborator)
//! ```
//!
//! # Design Decisions
//! - The router never looks inside a schema; collaborators downcast it
//! - Collaborators own the response; the router only adds context
//! - Engines are shared behind `Arc` and must be `Send + Sync`

pub mod collaborator;
pub mod schema;

pub use collaborator::{EngineError, Engines, GraphqlExecutor, RestAdapter};
pub use schema::{CompiledSchema, SchemaBuildError, SchemaBuilder, INTROSPECTION_QUERY};
