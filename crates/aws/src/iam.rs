//! Identity and Access Management

use skiff_core::{Result, Settings};

use crate::service::{AuthenticatedService, AwsService, ServiceId};

/// IAM client factory
#[derive(Debug, Clone)]
pub struct IamService {
    base: AuthenticatedService,
}

impl AwsService for IamService {
    const SERVICE: ServiceId = ServiceId::Iam;

    fn base(&self) -> &AuthenticatedService {
        &self.base
    }
}

impl IamService {
    pub fn new(settings: Settings) -> Self {
        Self::with_base(AuthenticatedService::for_service(settings, Self::SERVICE))
    }

    pub fn with_base(base: AuthenticatedService) -> Self {
        Self { base }
    }

    /// Build a new IAM client; not cached between calls
    pub async fn client(&self) -> Result<aws_sdk_iam::Client> {
        let config = self.base.sdk_config().await?;
        Ok(aws_sdk_iam::Client::new(&config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_identifier() {
        let service = IamService::new(Settings::default());
        assert_eq!(service.service_identifier(), "iam");
    }
}
