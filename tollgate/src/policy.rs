//! Policies returned to the API gateway

use serde::{Deserialize, Serialize};

use crate::TokenAuthorizerEvent;

/// The IAM policy language version emitted in every document
pub const POLICY_VERSION: &str = "2012-10-17";

/// The only action an authorizer policy grants or denies
pub const INVOKE_ACTION: &str = "execute-api:Invoke";

/// Matches every principal or resource
pub const WILDCARD: &str = "*";

/// Whether a statement grants or refuses access
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Grant access
    Allow,
    /// Refuse access
    Deny,
}

/// A single policy statement
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    /// The action covered, always [`INVOKE_ACTION`]
    pub action: String,
    /// The effect of the statement
    pub effect: Effect,
    /// The resource covered
    pub resource: String,
}

/// A policy document holding the authorizer's statement
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    /// The policy language version, always [`POLICY_VERSION`]
    pub version: String,
    /// The statements of the policy
    pub statement: Vec<Statement>,
}

/// The response an authorizer hands back to the API gateway
///
/// The serialized form is:
///
/// ```json
/// {
///   "principalId": "*",
///   "policyDocument": {
///     "Version": "2012-10-17",
///     "Statement": [{ "Action": "execute-api:Invoke", "Effect": "Allow", "Resource": "*" }]
///   }
/// }
/// ```
///
/// `policyDocument` is omitted when the resource is empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    /// The principal the policy applies to
    pub principal_id: String,
    /// The policy, if one could be formed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_document: Option<PolicyDocument>,
}

impl AuthorizerResponse {
    /// Builds a response with a single `execute-api:Invoke` statement
    pub fn new(principal_id: impl Into<String>, effect: Effect, resource: &str) -> Self {
        let policy_document = (!resource.is_empty()).then(|| PolicyDocument {
            version: POLICY_VERSION.to_owned(),
            statement: vec![Statement {
                action: INVOKE_ACTION.to_owned(),
                effect,
                resource: resource.to_owned(),
            }],
        });

        Self {
            principal_id: principal_id.into(),
            policy_document,
        }
    }

    /// Builds a response granting access to `resource`
    pub fn allow(principal_id: impl Into<String>, resource: &str) -> Self {
        Self::new(principal_id, Effect::Allow, resource)
    }

    /// Builds a response refusing access to `resource`
    pub fn deny(principal_id: impl Into<String>, resource: &str) -> Self {
        Self::new(principal_id, Effect::Deny, resource)
    }

    /// The effect of the first statement
    ///
    /// A response without a policy document carries no effect, which the
    /// gateway treats as a refusal.
    pub fn effect(&self) -> Option<Effect> {
        self.policy_document
            .as_ref()
            .and_then(|doc| doc.statement.first())
            .map(|stmt| stmt.effect)
    }

    /// Whether the response grants access
    pub fn is_allowed(&self) -> bool {
        self.effect() == Some(Effect::Allow)
    }
}

/// The resource a decision's policy covers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PolicyScope {
    /// Every resource (`*`), so the gateway may cache one decision for all
    /// methods
    #[default]
    AllResources,
    /// Only the invoked method, or every resource if the event carries no ARN
    MethodArn,
}

impl PolicyScope {
    /// The resource to place in the policy for this event
    pub fn resource<'a>(&self, event: &'a TokenAuthorizerEvent) -> &'a str {
        match self {
            Self::AllResources => WILDCARD,
            Self::MethodArn => event
                .method_arn
                .as_deref()
                .filter(|arn| !arn.is_empty())
                .unwrap_or(WILDCARD),
        }
    }
}
