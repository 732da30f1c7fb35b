//! Live-service adapters, gated behind the `grpc` feature.
//!
//! No generated protobuf client is vendored here — wiring one in is out of
//! scope (see §1/§4.6). These adapters exist so a caller can depend on
//! [`crate::fetch::ProfileFetcher`]/[`crate::fetch::DistributionFetcher`]
//! against a real endpoint address today and get a real implementation
//! dropped in later without changing the trait boundary, the same way the
//! teacher's `kwok` provider stands next to `fake` behind one `Provider`
//! surface.

use async_trait::async_trait;

use crate::error::OptimizerError;
use crate::fetch::{DistributionFetcher, DistributionResponse, ProfileFetcher, ProfileRequest, ProfileResponse};

/// An async capability, mirrored by the sync [`DistributionFetcher`]/
/// [`ProfileFetcher`] traits via [`block_on_current_thread`] so `solve()`
/// itself never needs to be async (see §5).
#[async_trait]
pub trait AsyncDistributionFetcher {
    async fn fetch(&self) -> Result<DistributionResponse, OptimizerError>;
}

#[async_trait]
pub trait AsyncProfileFetcher {
    async fn fetch(&self, request: &ProfileRequest) -> Result<ProfileResponse, OptimizerError>;
}

/// A gRPC-backed distribution client. Connecting requires a generated
/// client stub that this crate does not vendor; constructing one is left to
/// callers who bring their own protobuf codegen.
pub struct GrpcDistributionClient {
    pub endpoint: String,
}

#[async_trait]
impl AsyncDistributionFetcher for GrpcDistributionClient {
    async fn fetch(&self) -> Result<DistributionResponse, OptimizerError> {
        Err(OptimizerError::Unimplemented(
            "gRPC distribution client requires a vendored protobuf stub",
        ))
    }
}

pub struct GrpcProfileClient {
    pub endpoint: String,
}

#[async_trait]
impl AsyncProfileFetcher for GrpcProfileClient {
    async fn fetch(&self, _request: &ProfileRequest) -> Result<ProfileResponse, OptimizerError> {
        Err(OptimizerError::Unimplemented(
            "gRPC profile client requires a vendored protobuf stub",
        ))
    }
}

fn block_on_current_thread<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build a current-thread tokio runtime")
        .block_on(future)
}

impl DistributionFetcher for GrpcDistributionClient {
    fn fetch(&self) -> Result<DistributionResponse, OptimizerError> {
        block_on_current_thread(AsyncDistributionFetcher::fetch(self))
    }
}

impl ProfileFetcher for GrpcProfileClient {
    fn fetch(&self, request: &ProfileRequest) -> Result<ProfileResponse, OptimizerError> {
        block_on_current_thread(AsyncProfileFetcher::fetch(self, request))
    }
}
