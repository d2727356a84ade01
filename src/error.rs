use thiserror::Error;

/// Result type alias for type resolution
pub type Result<T> = std::result::Result<T, ResolutionError>;

/// Fatal conditions of the type resolution engine.
///
/// The first one encountered aborts the whole run.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("cannot resolve `{type_name}` without a referring package")]
    InvalidReference { type_name: String },

    #[error("alias `{alias}` is not imported in package {package}")]
    UnresolvedAlias { alias: String, package: String },

    #[error("type `{name}` referenced from package {package} was not found")]
    UnresolvedType { name: String, package: String },

    #[error("embedded type `{name}` of `{owner}` (package {package}) was not found")]
    UnresolvedEmbeddedType {
        name: String,
        owner: String,
        package: String,
    },

    #[error("type `{name}` embeds itself through `{owner}`")]
    CircularEmbedding { name: String, owner: String },

    #[error("while resolving {context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<ResolutionError>,
    },
}

impl ResolutionError {
    /// Wrap this error with one more step of the call chain
    pub fn in_context(self, context: impl Into<String>) -> Self {
        ResolutionError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with all context stripped
    pub fn root_cause(&self) -> &ResolutionError {
        match self {
            ResolutionError::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
