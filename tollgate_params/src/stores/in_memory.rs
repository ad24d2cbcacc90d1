//! An in-memory parameter store

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use async_trait::async_trait;
use thiserror::Error;

use crate::stores::ParameterStore;

/// A record of a single fetch made against an [`InMemoryParameterStore`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterFetch {
    /// The parameter name requested
    pub name: String,
    /// Whether decryption was requested
    pub with_decryption: bool,
}

/// An error returned by the in-memory parameter store
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InMemoryStoreError {
    /// No parameter is stored under the requested name
    #[error("parameter '{0}' not found")]
    NotFound(String),
    /// The parameter was configured to fail
    #[error("parameter '{name}' unavailable: {reason}")]
    Unavailable {
        /// The parameter name requested
        name: String,
        /// The configured failure
        reason: String,
    },
}

#[derive(Clone, Debug)]
enum Stored {
    Value(String),
    Empty,
    Unavailable(String),
}

/// An in-memory parameter store
///
/// Every fetch is recorded and can be inspected with [`requests()`][Self::requests].
#[derive(Default, Debug)]
pub struct InMemoryParameterStore {
    parameters: HashMap<String, Stored>,
    requests: Mutex<Vec<ParameterFetch>>,
}

impl InMemoryParameterStore {
    /// Constructs a new, empty in-memory parameter store
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a parameter value under the given name
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters
            .insert(name.into(), Stored::Value(value.into()));
        self
    }

    /// Stores a parameter that exists but carries no value
    pub fn with_empty_parameter(mut self, name: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), Stored::Empty);
        self
    }

    /// Makes every fetch of the given name fail
    pub fn with_unavailable_parameter(
        mut self,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        self.parameters
            .insert(name.into(), Stored::Unavailable(reason.into()));
        self
    }

    /// The fetches made so far, in order
    pub fn requests(&self) -> Vec<ParameterFetch> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ParameterStore for InMemoryParameterStore {
    type Error = InMemoryStoreError;

    async fn fetch(&self, name: &str, with_decryption: bool) -> Result<Option<String>, Self::Error> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ParameterFetch {
                name: name.to_owned(),
                with_decryption,
            });

        match self.parameters.get(name) {
            Some(Stored::Value(value)) => Ok(Some(value.clone())),
            Some(Stored::Empty) => Ok(None),
            Some(Stored::Unavailable(reason)) => Err(InMemoryStoreError::Unavailable {
                name: name.to_owned(),
                reason: reason.clone(),
            }),
            None => Err(InMemoryStoreError::NotFound(name.to_owned())),
        }
    }
}
