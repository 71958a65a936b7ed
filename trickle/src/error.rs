use std::fmt::Display;

/// A failure raised while producing template content.
///
/// Producers, deferred values and streams may fail with any error type that
/// converts into [`anyhow::Error`]; the failure travels up the chunk stream
/// until a [`Fallback`](crate::Fallback) catches it or it reaches the consumer.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Error(#[from] anyhow::Error);

impl Error {
    pub fn new<E>(error: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        let error: anyhow::Error = error.into();
        // never nest an `Error` inside another
        match error.downcast::<Error>() {
            Ok(inner) => inner,
            Err(error) => Error(error),
        }
    }

    pub fn msg<M>(message: M) -> Self
    where
        M: Display + std::fmt::Debug + Send + Sync + 'static,
    {
        Error(anyhow::Error::msg(message))
    }

    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Display + std::fmt::Debug + Send + Sync + 'static,
    {
        self.0.downcast_ref()
    }

    pub fn into_inner(self) -> anyhow::Error {
        self.0
    }
}

pub type Result<T = (), E = Error> = std::result::Result<T, E>;
