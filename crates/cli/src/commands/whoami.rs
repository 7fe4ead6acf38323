//! whoami command - Show the caller identity

use skiff_aws::StsService;
use skiff_core::{CallerIdentity, Settings};

use super::report;
use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Execute the whoami command
pub async fn execute(settings: Settings, formatter: &Formatter) -> ExitCode {
    let sts = StsService::new(settings);

    match sts.get_caller_identity().await {
        Ok(identity) => {
            if formatter.is_json() {
                formatter.json(&identity);
            } else {
                for line in identity_lines(&identity, formatter) {
                    formatter.println(&line);
                }
            }
            ExitCode::Success
        }
        Err(e) => report(formatter, "Failed to resolve caller identity", &e),
    }
}

fn identity_lines(identity: &CallerIdentity, formatter: &Formatter) -> Vec<String> {
    [
        ("Account", &identity.account),
        ("Arn", &identity.arn),
        ("UserId", &identity.user_id),
    ]
    .into_iter()
    .map(|(label, value)| {
        format!(
            "{label:<8} {}",
            formatter.emphasis(value.as_deref().unwrap_or("-"))
        )
    })
    .collect()
}
