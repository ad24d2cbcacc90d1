use aws_config::{BehaviorVersion, Region};
use clap::Parser;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tollgate::{Authorizer, AuthorizerResponse, Config, TokenAuthorizerEvent};
use tollgate_oidc::OidcVerifier;
use tollgate_params::{stores::SsmParameterStore, ParameterResolver};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .init();

    let config = Config::parse();

    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = config.region() {
        loader = loader.region(Region::new(region.to_owned()));
    }
    let sdk_config = loader.load().await;

    let store = SsmParameterStore::new(aws_sdk_ssm::Client::new(&sdk_config));
    let parameters = ParameterResolver::new(store).with_settings(config.parameter_settings());
    let verifier = OidcVerifier::new(config.verifier_config())?;

    let authorizer = Authorizer::new(verifier, parameters, config.secret_name.clone())
        .with_policy_scope(config.policy_scope)
        .with_denial_reporter(config.denial_reporter());

    tracing::info!(
        secret.name = authorizer.secret_name(),
        policy.scope = ?authorizer.policy_scope(),
        "authorizer ready"
    );

    let authorizer = &authorizer;
    run(service_fn(
        move |event: LambdaEvent<TokenAuthorizerEvent>| async move {
            Ok::<AuthorizerResponse, Error>(authorizer.authorize(&event.payload).await)
        },
    ))
    .await
}
