use std::error::Error as StdError;

use thiserror::Error;

use crate::stores::ParameterStore;

/// Prefix under which Secrets Manager secrets are addressable as parameters
pub const SECRETS_MANAGER_PREFIX: &str = "/aws/reference/secretsmanager/";

/// Default root of the parameter namespace
pub const DEFAULT_ROOT: &str = "csaa";

/// Default system segment of the parameter namespace
pub const DEFAULT_SYSTEM: &str = "pmtctrl";

/// Default environment segment of the parameter namespace
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Indicates that a parameter could not be fetched from the store
#[derive(Debug, Error)]
#[error("unable to fetch parameter '{name}'")]
pub struct ParameterError {
    name: String,
    #[source]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

impl ParameterError {
    /// The resolved name of the parameter that could not be fetched
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The namespace used to resolve parameter paths
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParameterSettings {
    root: String,
    system: String,
    environment: String,
}

impl Default for ParameterSettings {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROOT.to_owned(),
            system: DEFAULT_SYSTEM.to_owned(),
            environment: DEFAULT_ENVIRONMENT.to_owned(),
        }
    }
}

impl ParameterSettings {
    /// Overrides the namespace root
    #[inline]
    pub fn with_root(self, root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            ..self
        }
    }

    /// Overrides the system segment
    #[inline]
    pub fn with_system(self, system: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            ..self
        }
    }

    /// Overrides the environment segment
    #[inline]
    pub fn with_environment(self, environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            ..self
        }
    }

    /// The namespace root
    pub fn root(&self) -> &str {
        &self.root
    }

    /// The system segment
    pub fn system(&self) -> &str {
        &self.system
    }

    /// The environment segment
    pub fn environment(&self) -> &str {
        &self.environment
    }
}

/// A request for a single parameter
///
/// When both [`as_secret()`][Self::as_secret] and
/// [`resolve_path()`][Self::resolve_path] are set, the secret lookup wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub struct ParameterRequest<'a> {
    key: &'a str,
    is_secret: bool,
    is_resolve_path: bool,
    secure: bool,
}

impl<'a> ParameterRequest<'a> {
    /// A request for the key, used verbatim as the parameter name
    pub const fn new(key: &'a str) -> Self {
        Self {
            key,
            is_secret: false,
            is_resolve_path: false,
            secure: false,
        }
    }

    /// A request for a Secrets Manager secret
    pub const fn secret(key: &'a str) -> Self {
        Self::new(key).as_secret()
    }

    /// Fetches the key from Secrets Manager
    pub const fn as_secret(self) -> Self {
        Self {
            is_secret: true,
            ..self
        }
    }

    /// Resolves the key against the configured namespace
    pub const fn resolve_path(self) -> Self {
        Self {
            is_resolve_path: true,
            ..self
        }
    }

    /// Resolves into the `secure` branch of the namespace rather than `insecure`
    pub const fn secure(self) -> Self {
        Self {
            secure: true,
            ..self
        }
    }

    /// The logical key requested
    pub const fn key(&self) -> &'a str {
        self.key
    }
}

/// Resolves logical keys to parameter names and fetches them from a store
#[derive(Debug, Clone)]
pub struct ParameterResolver<S> {
    settings: ParameterSettings,
    store: S,
}

impl<S> ParameterResolver<S> {
    /// Constructs a resolver using the default namespace
    pub fn new(store: S) -> Self {
        Self {
            settings: ParameterSettings::default(),
            store,
        }
    }

    /// Uses the given namespace settings
    pub fn with_settings(self, settings: ParameterSettings) -> Self {
        Self { settings, ..self }
    }

    /// The namespace settings in use
    pub fn settings(&self) -> &ParameterSettings {
        &self.settings
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The concrete parameter name that a request resolves to
    pub fn parameter_name(&self, request: &ParameterRequest<'_>) -> String {
        if request.is_secret {
            format!("{SECRETS_MANAGER_PREFIX}{}", request.key)
        } else if request.is_resolve_path {
            self.resolve_path(request.key, request.secure)
        } else {
            request.key.to_owned()
        }
    }

    fn resolve_path(&self, key: &str, secure: bool) -> String {
        let branch = if secure { "secure" } else { "insecure" };
        format!(
            "/{}/{}/{}/{}/{}",
            self.settings.root, self.settings.system, self.settings.environment, branch, key
        )
    }
}

impl<S> ParameterResolver<S>
where
    S: ParameterStore,
{
    /// Fetches the current value of a parameter
    ///
    /// Decryption is always requested. A parameter that exists without a
    /// value is returned as an empty string; callers should treat an empty
    /// value as absent.
    ///
    /// No retries are attempted.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails for any reason.
    #[tracing::instrument(skip_all, fields(parameter.name = tracing::field::Empty))]
    pub async fn get_parameter(
        &self,
        request: &ParameterRequest<'_>,
    ) -> Result<String, ParameterError> {
        let name = self.parameter_name(request);
        tracing::Span::current().record("parameter.name", name.as_str());
        tracing::debug!("fetching parameter");

        match self.store.fetch(&name, true).await {
            Ok(value) => {
                if value.is_none() {
                    tracing::debug!("parameter has no value");
                }
                Ok(value.unwrap_or_default())
            }
            Err(err) => {
                let error: &dyn StdError = &err;
                tracing::info!(error, "exception while fetching parameter");
                Err(ParameterError {
                    name,
                    source: Box::new(err),
                })
            }
        }
    }
}
