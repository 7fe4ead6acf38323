//! Authenticated service base
//!
//! Resolves credentials for the configured profile, falling back to the
//! interactive bootstrap, and produces the SDK configuration every concrete
//! service client is built from. Nothing is cached: each call re-resolves.

use std::fmt;
use std::sync::Arc;

use aws_config::profile::ProfileFileCredentialsProvider;
use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles};
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use skiff_core::{
    ConsolePrompt, CredentialFiles, CredentialPrompt, Error, Result, Settings, bootstrap,
};

/// Maximum attempts per request, including the first
pub const MAX_ATTEMPTS: u32 = 3;

/// Services skiff can build clients for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceId {
    Sts,
    Iam,
    S3,
}

impl ServiceId {
    /// Identifier used by the AWS SDKs and CLI
    pub const fn as_str(self) -> &'static str {
        match self {
            ServiceId::Sts => "sts",
            ServiceId::Iam => "iam",
            ServiceId::S3 => "s3",
        }
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by every concrete service
pub trait AwsService {
    /// The service this type talks to
    const SERVICE: ServiceId;

    /// Shared credential-resolution base
    fn base(&self) -> &AuthenticatedService;

    fn service_identifier(&self) -> &'static str {
        Self::SERVICE.as_str()
    }

    fn settings(&self) -> &Settings {
        self.base().settings()
    }
}

/// Credential resolution shared by all services
#[derive(Clone)]
pub struct AuthenticatedService {
    settings: Settings,
    service: Option<ServiceId>,
    files: Option<CredentialFiles>,
    prompt: Arc<dyn CredentialPrompt>,
}

impl fmt::Debug for AuthenticatedService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedService")
            .field("settings", &self.settings)
            .field("service", &self.service)
            .field("files", &self.files)
            .finish_non_exhaustive()
    }
}

impl AuthenticatedService {
    /// Base service with no target; resolving a client fails
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            service: None,
            files: None,
            prompt: Arc::new(ConsolePrompt::new()),
        }
    }

    /// Base bound to a concrete service
    pub fn for_service(settings: Settings, service: ServiceId) -> Self {
        tracing::debug!("Instantiating an AWS client with service: \"{service}\"");
        Self {
            service: Some(service),
            ..Self::new(settings)
        }
    }

    /// Replace the interactive prompt (e.g. with a non-interactive stub)
    pub fn with_prompt(mut self, prompt: Arc<dyn CredentialPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Read and write credentials at explicit locations
    pub fn with_credential_files(mut self, files: CredentialFiles) -> Self {
        self.files = Some(files);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Identifier of the target service
    pub fn service_identifier(&self) -> Result<&'static str> {
        self.service
            .map(ServiceId::as_str)
            .ok_or(Error::ServiceIdentifierMissing)
    }

    /// Resolve credentials and build the SDK configuration
    ///
    /// Prompts for credentials when none resolve and a user is available,
    /// persisting the answers before resolving again. Fails with
    /// `NoCredentials` if credentials are still absent. TLS certificate
    /// verification is always on in the SDK's HTTPS client.
    pub async fn sdk_config(&self) -> Result<SdkConfig> {
        let service = self.service_identifier()?;
        let files = match &self.files {
            Some(files) => files.clone(),
            None => CredentialFiles::new()?,
        };

        let config = self.load(&files).await;
        if has_credentials(&config).await {
            return Ok(config);
        }

        tracing::debug!("No credentials resolved for {service}, attempting bootstrap");

        // The prompt reads stdin, so it runs off the async workers
        let prompt = self.prompt.clone();
        let prompt_files = files.clone();
        let profile = self.settings.profile_or_default().to_string();
        let supplied = tokio::task::spawn_blocking(move || {
            bootstrap(prompt.as_ref(), &prompt_files, &profile)
        })
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))??;

        match supplied {
            Some(supplied) => {
                if supplied.region != self.settings.region() {
                    tracing::warn!(
                        "Region {} was saved for other tools; this session keeps using {}",
                        supplied.region,
                        self.settings.region()
                    );
                }
                let config = self.load(&files).await;
                if has_credentials(&config).await {
                    Ok(config)
                } else {
                    Err(Error::NoCredentials)
                }
            }
            None => Err(Error::NoCredentials),
        }
    }

    async fn load(&self, files: &CredentialFiles) -> SdkConfig {
        let profile_files = ProfileFiles::builder()
            .with_file(ProfileFileKind::Credentials, files.credentials_path())
            .with_file(ProfileFileKind::Config, files.config_path())
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.settings.region().to_string()))
            .retry_config(RetryConfig::standard().with_max_attempts(MAX_ATTEMPTS))
            .profile_files(profile_files.clone());

        // An explicit profile reads only the profile files, ignoring
        // environment credentials and instance metadata
        if let Some(profile) = self.settings.profile() {
            let provider = ProfileFileCredentialsProvider::builder()
                .profile_name(profile)
                .profile_files(profile_files.clone())
                .build();
            loader = loader.profile_name(profile).credentials_provider(provider);
        }

        loader.load().await
    }
}

async fn has_credentials(config: &SdkConfig) -> bool {
    let Some(provider) = config.credentials_provider() else {
        return false;
    };

    match provider.provide_credentials().await {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!("Credential resolution failed: {e}");
            false
        }
    }
}
