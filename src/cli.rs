use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::info;

use crate::{
    aws::StsRoleAssumer,
    constants::{DEFAULT_AUDIENCE, DEFAULT_SESSION_DURATION_SECONDS},
    exchange::{Exchange, ExchangeRequest},
    gcp::GoogleIdentityIssuer,
};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "gaws",
    version,
    about = "AWS credential_process helper that exchanges a GCP identity token for temporary AWS credentials",
    long_about = None
)]
pub struct Cli {
    #[arg(long, default_value = DEFAULT_AUDIENCE, help = "Audience value for the GCP identity token")]
    pub audience: String,

    #[arg(
        long = "gcp-credential-file",
        value_name = "PATH",
        help = "GCP service account or impersonated service account credential file (defaults to Application Default Credentials)"
    )]
    pub gcp_credential_file: Option<PathBuf>,

    #[arg(long = "aws-arn", value_name = "ARN", help = "AWS IAM role ARN to assume")]
    pub aws_arn: String,

    #[arg(long, help = "AWS region for the STS client")]
    pub region: String,

    #[arg(
        long = "aws-session-name",
        value_name = "NAME",
        help = "AWS role session name (defaults to gcp-<uuid>)"
    )]
    pub aws_session_name: Option<String>,

    #[arg(
        long = "aws-duration",
        value_name = "SECONDS",
        default_value_t = DEFAULT_SESSION_DURATION_SECONDS,
        help = "STS session duration in seconds"
    )]
    pub aws_duration: i32,

    #[arg(long = "sts-endpoint", value_name = "URL", help = "Override the AWS STS endpoint")]
    pub sts_endpoint: Option<String>,

    #[arg(short = 'v', long, action = ArgAction::Count, help = "Increase verbosity (-v info, -vv debug, -vvv trace)")]
    pub verbose: u8,
}

impl Cli {
    /// Builds the exchange request; the session name is generated here when not given.
    pub fn to_request(&self) -> ExchangeRequest {
        let mut request = ExchangeRequest::new(&self.aws_arn, &self.region)
            .with_audience(&self.audience)
            .with_duration_seconds(self.aws_duration);

        if let Some(path) = &self.gcp_credential_file {
            request = request.with_credential_file(path);
        }
        if let Some(session_name) = &self.aws_session_name {
            request = request.with_session_name(session_name);
        }
        request
    }

    pub async fn execute(self) -> Result<()> {
        let request = self.to_request();

        let assumer = match &self.sts_endpoint {
            Some(endpoint) => StsRoleAssumer::with_endpoint(endpoint),
            None => StsRoleAssumer::new(),
        };
        let exchange = Exchange::new(GoogleIdentityIssuer::new(), assumer);

        let json = exchange.run_to_json(&request).await?;

        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{json}").context("Failed to write credentials to stdout")?;
        stdout.flush().context("Failed to flush stdout")?;

        info!("Credentials written for session {}", request.role_session_name);
        Ok(())
    }
}
