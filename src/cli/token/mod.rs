//! Token commands - issue and verify tokens from the command line

use clap::Args;
use serde_json::json;

use crate::config::AppConfig;
use crate::infrastructure::auth::Authenticator;

#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Token to verify
    pub token: String,
}

/// Print a token for the given credentials
pub async fn issue(args: IssueArgs) -> anyhow::Result<()> {
    let authenticator = load_authenticator().await?;
    let output = issue_with(&authenticator, &args).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Verify a token and print the user it resolves to
pub async fn verify(args: VerifyArgs) -> anyhow::Result<()> {
    let authenticator = load_authenticator().await?;
    let output = verify_with(&authenticator, &args).await?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn load_authenticator() -> anyhow::Result<std::sync::Arc<Authenticator>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    crate::create_authenticator(&config).await
}

async fn issue_with(
    authenticator: &Authenticator,
    args: &IssueArgs,
) -> anyhow::Result<serde_json::Value> {
    let issued = authenticator
        .issue_token(&args.email, &args.password)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", e.kind(), e))?;

    Ok(json!({
        "token": issued.token,
        "expires_at": issued.expires_at.to_rfc3339(),
    }))
}

async fn verify_with(
    authenticator: &Authenticator,
    args: &VerifyArgs,
) -> anyhow::Result<serde_json::Value> {
    let user = authenticator
        .verify(args.token.trim())
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", e.kind(), e))?;

    Ok(serde_json::to_value(&user)?)
}
