//! skiff-aws: AWS SDK adapter for skiff
//!
//! Builds authenticated STS, IAM and S3 clients and implements the
//! `ObjectBackend` trait from skiff-core over aws-sdk-s3. It is the only
//! crate that directly depends on the AWS SDK.

mod error;
pub mod iam;
pub mod multipart;
pub mod s3;
pub mod service;
pub mod sts;

pub use iam::IamService;
pub use multipart::MultipartConfig;
pub use s3::{S3Backend, S3Service};
pub use service::{AuthenticatedService, AwsService, ServiceId};
pub use sts::StsService;
