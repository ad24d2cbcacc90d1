//! Process configuration, read once at start-up

use std::time::Duration;

use aliri::{jwa, jwt::Issuer};
use clap::{builder::BoolishValueParser, ArgAction, Parser};
use tollgate_oidc::{IssuerPolicy, VerifierConfig};
use tollgate_params::{ParameterSettings, DEFAULT_ENVIRONMENT, DEFAULT_ROOT, DEFAULT_SYSTEM};

use crate::{DenialReporter, PolicyScope, TerseDenials, VerboseDenials};

/// Settings for the authorizer, taken from arguments or the environment
#[derive(Clone, Debug, Parser)]
#[command(name = "tollgate", version, about)]
pub struct Config {
    /// AWS region hosting the secret store
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Region used when `AWS_REGION` is unset
    #[arg(long, env = "REGION", hide = true)]
    pub fallback_region: Option<String>,

    /// Name of the secret holding the reference credential
    #[arg(long, env = "SECRET_NAME")]
    pub secret_name: String,

    /// Root segment of resolved parameter paths
    #[arg(long, env = "PARAM_ROOT", default_value = DEFAULT_ROOT)]
    pub param_root: String,

    /// System segment of resolved parameter paths
    #[arg(long, env = "PARAM_SYSTEM", default_value = DEFAULT_SYSTEM)]
    pub param_system: String,

    /// Environment segment of resolved parameter paths
    #[arg(long, env = "PARAM_ENVIRONMENT", default_value = DEFAULT_ENVIRONMENT)]
    pub param_environment: String,

    /// Issuers that may be trusted; any `https` issuer if empty
    #[arg(long, env = "ALLOWED_ISSUERS", value_delimiter = ',')]
    pub allowed_issuers: Vec<String>,

    /// Accept plain `http` issuers
    #[arg(
        long,
        env = "ALLOW_INSECURE_ISSUERS",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
    )]
    pub allow_insecure_issuers: bool,

    /// Approved token signing algorithms
    #[arg(long, env = "JWT_ALGORITHMS", value_delimiter = ',', default_value = "RS256")]
    pub jwt_algorithms: Vec<jwa::Algorithm>,

    /// Clock skew tolerated on token expiry, in seconds
    #[arg(long, env = "JWT_LEEWAY_SECS", default_value_t = 120)]
    pub jwt_leeway_secs: u64,

    /// Resource covered by returned policies
    #[arg(long, env = "POLICY_SCOPE", value_enum, default_value_t = PolicyScope::AllResources)]
    pub policy_scope: PolicyScope,

    /// Log the full cause chain of every denial
    #[arg(
        long,
        env = "VERBOSE_DENIALS",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value_t = false,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
    )]
    pub verbose_denials: bool,
}

impl Config {
    /// The configured region, preferring `AWS_REGION`
    pub fn region(&self) -> Option<&str> {
        self.region
            .as_deref()
            .or(self.fallback_region.as_deref())
            .filter(|r| !r.is_empty())
    }

    /// The namespace for resolved parameter paths
    pub fn parameter_settings(&self) -> ParameterSettings {
        ParameterSettings::default()
            .with_root(self.param_root.clone())
            .with_system(self.param_system.clone())
            .with_environment(self.param_environment.clone())
    }

    /// Settings for token verification
    pub fn verifier_config(&self) -> VerifierConfig {
        let allowed = self
            .allowed_issuers
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .map(|i| Issuer::new(i.to_owned()));

        let mut issuers = IssuerPolicy::default().extend_allowed_issuers(allowed);
        if self.allow_insecure_issuers {
            issuers = issuers.allow_insecure();
        }

        VerifierConfig::default()
            .with_issuer_policy(issuers)
            .with_approved_algorithms(self.jwt_algorithms.iter().copied())
            .with_leeway(Duration::from_secs(self.jwt_leeway_secs))
    }

    /// The configured denial reporter
    pub fn denial_reporter(&self) -> Box<dyn DenialReporter + Send + Sync> {
        if self.verbose_denials {
            Box::new(VerboseDenials)
        } else {
            Box::new(TerseDenials)
        }
    }
}
