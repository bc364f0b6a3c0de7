//! Send a test email.

use clap::Args;

use crate::output::{self, OutputFormat};
use paywatch_core::error::AppError;
use paywatch_entity::delivery::EmailType;
use paywatch_entity::recipient::Language;
use paywatch_mail::{RetryPolicy, SendContext};

/// Message language
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LanguageArg {
    Tr,
    En,
}

impl From<LanguageArg> for Language {
    fn from(value: LanguageArg) -> Self {
        match value {
            LanguageArg::Tr => Language::Tr,
            LanguageArg::En => Language::En,
        }
    }
}

/// Arguments for the send-test command
#[derive(Debug, Args)]
pub struct SendTestArgs {
    /// Recipient address
    #[arg(long)]
    pub to: String,
    /// Message language
    #[arg(long, value_enum, default_value = "tr")]
    pub lang: LanguageArg,
}

/// Execute the send-test command
pub async fn execute(
    args: &SendTestArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (runtime, db) = super::build_runtime(config_path).await?;
    if !runtime.dispatcher.is_enabled() {
        output::print_warning("Email is disabled or no API key is configured.");
    }

    let email = runtime.composer.test_email(args.lang.into());
    let result = RetryPolicy::from_config(runtime.dispatcher.config())
        .send_with_retry(
            &runtime.dispatcher,
            &args.to,
            &email.subject,
            &email.html,
            Some(&email.text),
            SendContext::new(EmailType::Test),
        )
        .await;
    db.close().await;

    if format == OutputFormat::Json {
        output::print_json(&result);
    }

    if result.success {
        if format == OutputFormat::Table {
            output::print_success(&format!(
                "Test email sent to {} (message id: {})",
                args.to,
                output::or_dash(result.message_id.as_deref())
            ));
        }
        Ok(())
    } else {
        let error = result.error.unwrap_or_default();
        output::print_error(&format!("{}: {}", result.reason.as_str(), error));
        Err(AppError::external_service(format!("Test email not sent: {error}")))
    }
}
