//! A parameter store backed by AWS Systems Manager Parameter Store

use async_trait::async_trait;
use aws_sdk_ssm::Client;

use crate::stores::ParameterStore;

/// Parameters held in AWS Systems Manager Parameter Store
///
/// Secrets Manager secrets are reachable through the same API by way of the
/// `/aws/reference/secretsmanager/` prefix.
#[derive(Debug, Clone)]
pub struct SsmParameterStore {
    client: Client,
}

impl SsmParameterStore {
    /// Constructs a store around an existing SSM client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ParameterStore for SsmParameterStore {
    type Error = aws_sdk_ssm::Error;

    async fn fetch(&self, name: &str, with_decryption: bool) -> Result<Option<String>, Self::Error> {
        let output = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(with_decryption)
            .send()
            .await?;

        Ok(output
            .parameter()
            .and_then(|p| p.value())
            .map(ToOwned::to_owned))
    }
}
