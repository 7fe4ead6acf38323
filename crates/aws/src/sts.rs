//! Security Token Service

use skiff_core::{CallerIdentity, Result, Settings};

use crate::error::from_sdk_error;
use crate::service::{AuthenticatedService, AwsService, ServiceId};

/// STS client factory
#[derive(Debug, Clone)]
pub struct StsService {
    base: AuthenticatedService,
}

impl AwsService for StsService {
    const SERVICE: ServiceId = ServiceId::Sts;

    fn base(&self) -> &AuthenticatedService {
        &self.base
    }
}

impl StsService {
    pub fn new(settings: Settings) -> Self {
        Self::with_base(AuthenticatedService::for_service(settings, Self::SERVICE))
    }

    pub fn with_base(base: AuthenticatedService) -> Self {
        Self { base }
    }

    /// Build a new STS client; not cached between calls
    pub async fn client(&self) -> Result<aws_sdk_sts::Client> {
        let config = self.base.sdk_config().await?;
        Ok(aws_sdk_sts::Client::new(&config))
    }

    /// Identity behind the resolved credentials
    pub async fn get_caller_identity(&self) -> Result<CallerIdentity> {
        let response = self
            .client()
            .await?
            .get_caller_identity()
            .send()
            .await
            .map_err(from_sdk_error)?;

        Ok(CallerIdentity {
            account: response.account().map(str::to_string),
            arn: response.arn().map(str::to_string),
            user_id: response.user_id().map(str::to_string),
        })
    }
}
