//! Opaque compiled schemas and the builders that produce them.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;

/// Standard GraphQL introspection document.
///
/// Sent as the body of the synthetic request used to check that every
/// configured schema builds before the router starts serving.
pub const INTROSPECTION_QUERY: &str = r#"
query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types { ...FullType }
    directives {
      name
      description
      locations
      args { ...InputValue }
    }
  }
}

fragment FullType on __Type {
  kind
  name
  description
  fields(includeDeprecated: true) {
    name
    description
    args { ...InputValue }
    type { ...TypeRef }
    isDeprecated
    deprecationReason
  }
  inputFields { ...InputValue }
  interfaces { ...TypeRef }
  enumValues(includeDeprecated: true) {
    name
    description
    isDeprecated
    deprecationReason
  }
  possibleTypes { ...TypeRef }
}

fragment InputValue on __InputValue {
  name
  description
  type { ...TypeRef }
  defaultValue
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
      }
    }
  }
}
"#;

/// A pre-built schema, opaque to the router.
///
/// Cloning is cheap (reference counted). Collaborators recover their
/// concrete type with [`CompiledSchema::downcast_ref`].
#[derive(Clone)]
pub struct CompiledSchema {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl CompiledSchema {
    /// Wrap a collaborator-specific schema value.
    pub fn new<T: Any + Send + Sync>(schema: T) -> Self {
        Self {
            inner: Arc::new(schema),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Borrow the wrapped schema as `T`, if that is what it holds.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Rust type name of the wrapped schema (diagnostics only).
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("type", &self.type_name)
            .finish()
    }
}

/// Error raised by a schema builder.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SchemaBuildError(pub String);

impl SchemaBuildError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Builds a schema for one direct-mode product.
///
/// Builders may inspect the request (e.g. the negotiated stage) and are
/// called once per request, plus once at startup with a synthetic
/// introspection request.
pub trait SchemaBuilder: Send + Sync {
    fn build(&self, request: &Request<Body>) -> Result<CompiledSchema, SchemaBuildError>;
}

impl<F> SchemaBuilder for F
where
    F: Fn(&Request<Body>) -> Result<CompiledSchema, SchemaBuildError> + Send + Sync,
{
    fn build(&self, request: &Request<Body>) -> Result<CompiledSchema, SchemaBuildError> {
        self(request)
    }
}
