//! Parameter stores

use async_trait::async_trait;
use std::error;

mod in_memory;
#[cfg(feature = "ssm")]
mod ssm;

pub use in_memory::{InMemoryParameterStore, InMemoryStoreError, ParameterFetch};
#[cfg(feature = "ssm")]
#[cfg_attr(docsrs, doc(cfg(feature = "ssm")))]
pub use ssm::SsmParameterStore;

/// A key-value store holding parameters by name
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// The error type returned in the event that fetching a parameter fails
    type Error: error::Error + Send + Sync + 'static;

    /// Fetches the current value of the named parameter
    ///
    /// A parameter that exists but carries no value yields `Ok(None)`.
    async fn fetch(&self, name: &str, with_decryption: bool) -> Result<Option<String>, Self::Error>;
}

macro_rules! delegate_impls {
    ($($ty:ty)*) => {
        $(
            #[async_trait]
            impl<T> ParameterStore for $ty
            where
                T: ParameterStore + ?Sized,
            {
                type Error = T::Error;

                async fn fetch(
                    &self,
                    name: &str,
                    with_decryption: bool,
                ) -> Result<Option<String>, Self::Error> {
                    T::fetch(self, name, with_decryption).await
                }
            }
        )*
    }
}

delegate_impls!(
    Box<T>
    std::sync::Arc<T>
);
