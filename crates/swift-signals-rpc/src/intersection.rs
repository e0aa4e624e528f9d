//! Client for the intersection service.

use std::time::Duration;

use async_trait::async_trait;
use swift_signals_core::{Details, OptimisationParameters, RequestScope, Result};

use crate::call::{self, ServiceStream, UNARY_TIMEOUT};
use crate::channel::{RpcChannel, RpcTransport};
use crate::convert;
use crate::proto::intersection::{
    methods, CreateIntersectionRequest, GetAllIntersectionsRequest, IntersectionIdRequest,
    IntersectionResponse, PutOptimisationRequest, PutOptimisationResponse,
    UpdateIntersectionRequest,
};

/// Page requested when listing intersections.
pub const LIST_PAGE: i32 = 1;

/// Page size requested when listing intersections.
pub const LIST_PAGE_SIZE: i32 = 100;

/// Inputs for creating an intersection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewIntersection {
    /// Human-readable name.
    pub name: String,
    /// Location.
    pub details: Details,
    /// Traffic density name; see [`convert::traffic_density_from_str`].
    pub traffic_density: String,
    /// The user-supplied baseline.
    pub default_parameters: OptimisationParameters,
}

/// Operations on intersection records.
#[async_trait]
pub trait IntersectionClient: Send + Sync {
    /// Create an intersection.
    async fn create_intersection(
        &self,
        scope: &RequestScope,
        intersection: &NewIntersection,
    ) -> Result<IntersectionResponse>;

    /// Fetch one intersection.
    async fn get_intersection(&self, scope: &RequestScope, id: &str) -> Result<IntersectionResponse>;

    /// Stream the first page of intersections, unfiltered.
    async fn get_all_intersections(
        &self,
        scope: &RequestScope,
    ) -> Result<ServiceStream<IntersectionResponse>>;

    /// Update name and details. An empty name or absent details leave the field unchanged.
    async fn update_intersection(
        &self,
        scope: &RequestScope,
        id: &str,
        name: &str,
        details: Option<&Details>,
    ) -> Result<IntersectionResponse>;

    /// Delete an intersection.
    async fn delete_intersection(&self, scope: &RequestScope, id: &str) -> Result<()>;

    /// Record the outcome of an optimisation run.
    async fn put_optimisation(
        &self,
        scope: &RequestScope,
        id: &str,
        parameters: &OptimisationParameters,
    ) -> Result<PutOptimisationResponse>;
}

/// gRPC implementation of [`IntersectionClient`].
#[derive(Debug, Clone)]
pub struct GrpcIntersectionClient<T: RpcTransport = RpcChannel> {
    transport: T,
    timeout: Duration,
}

impl<T: RpcTransport> GrpcIntersectionClient<T> {
    /// Create a client with the default unary deadline.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self {
            transport,
            timeout: UNARY_TIMEOUT,
        }
    }

    /// Override the unary deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl<T: RpcTransport> IntersectionClient for GrpcIntersectionClient<T> {
    async fn create_intersection(
        &self,
        scope: &RequestScope,
        intersection: &NewIntersection,
    ) -> Result<IntersectionResponse> {
        let message = CreateIntersectionRequest {
            name: intersection.name.clone(),
            details: Some(convert::details_to_wire(&intersection.details)),
            traffic_density: convert::traffic_density_from_str(&intersection.traffic_density)
                .into(),
            default_parameters: Some(convert::optimisation_parameters_to_wire(
                &intersection.default_parameters,
            )),
        };
        call::invoke(
            &self.transport,
            scope,
            methods::CREATE_INTERSECTION,
            message,
            self.timeout,
        )
        .await
    }

    async fn get_intersection(&self, scope: &RequestScope, id: &str) -> Result<IntersectionResponse> {
        let message = IntersectionIdRequest { id: id.to_string() };
        call::invoke(
            &self.transport,
            scope,
            methods::GET_INTERSECTION,
            message,
            self.timeout,
        )
        .await
    }

    async fn get_all_intersections(
        &self,
        scope: &RequestScope,
    ) -> Result<ServiceStream<IntersectionResponse>> {
        let message = GetAllIntersectionsRequest {
            page: LIST_PAGE,
            page_size: LIST_PAGE_SIZE,
            filter: String::new(),
        };
        call::open_stream(&self.transport, scope, methods::GET_ALL_INTERSECTIONS, message).await
    }

    async fn update_intersection(
        &self,
        scope: &RequestScope,
        id: &str,
        name: &str,
        details: Option<&Details>,
    ) -> Result<IntersectionResponse> {
        let message = UpdateIntersectionRequest {
            id: id.to_string(),
            name: name.to_string(),
            details: details.map(convert::details_to_wire),
        };
        call::invoke(
            &self.transport,
            scope,
            methods::UPDATE_INTERSECTION,
            message,
            self.timeout,
        )
        .await
    }

    async fn delete_intersection(&self, scope: &RequestScope, id: &str) -> Result<()> {
        let message = IntersectionIdRequest { id: id.to_string() };
        call::invoke(
            &self.transport,
            scope,
            methods::DELETE_INTERSECTION,
            message,
            self.timeout,
        )
        .await
    }

    async fn put_optimisation(
        &self,
        scope: &RequestScope,
        id: &str,
        parameters: &OptimisationParameters,
    ) -> Result<PutOptimisationResponse> {
        let message = PutOptimisationRequest {
            id: id.to_string(),
            parameters: Some(convert::optimisation_parameters_to_wire(parameters)),
        };
        call::invoke(
            &self.transport,
            scope,
            methods::PUT_OPTIMISATION,
            message,
            self.timeout,
        )
        .await
    }
}
