use sqlx::error::BoxDynError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("could not find name {name} in {model}")]
    UnknownField { name: String, model: &'static str },

    #[error("failed to encode bind argument: {0}")]
    Encode(#[source] BoxDynError),
}

impl CoreError {
    /// Shorthand for a named parameter the model does not expose.
    pub fn unknown_field<M: ?Sized>(name: &str) -> Self {
        CoreError::UnknownField {
            name: name.to_string(),
            model: std::any::type_name::<M>(),
        }
    }
}
