//! Intersection management and optimisation.
//!
//! Every operation on a single intersection first checks that its ID is on the
//! caller's record. Listing does not: it returns whatever the intersection service
//! lists.

use std::sync::Arc;

use async_trait::async_trait;
use swift_signals_core::{
    CreateIntersectionResponse, Details, Intersection, Intersections, OptimisationParameters,
    OptimisationResponse, RequestScope, Result, SimulationParameters,
};
use swift_signals_rpc::convert::{intersection_from_wire, optimisation_parameters_from_wire};
use swift_signals_rpc::{IntersectionClient, NewIntersection, OptimisationClient, UserClient};

use crate::access::{drain, ensure_intersection_access};

/// Optimisation type recorded for user-supplied default parameters.
pub const DEFAULT_OPTIMISATION_TYPE: &str = "none";

/// Inputs for creating an intersection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateIntersection {
    /// Human-readable name.
    pub name: String,
    /// Location.
    pub details: Details,
    /// `low`, `medium` or `high`.
    pub traffic_density: String,
    /// Baseline simulation parameters.
    pub default_parameters: SimulationParameters,
}

/// A partial update of an intersection. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntersectionUpdate {
    /// New name.
    pub name: Option<String>,
    /// New location.
    pub details: Option<Details>,
}

/// Intersection operations on behalf of a user.
#[async_trait]
pub trait IntersectionService: Send + Sync {
    /// Create an intersection and grant the creator access to it.
    async fn create(
        &self,
        scope: &RequestScope,
        user_id: &str,
        request: &CreateIntersection,
    ) -> Result<CreateIntersectionResponse>;

    /// List intersections.
    ///
    /// # Errors
    ///
    /// `internal` if the listing stream breaks.
    async fn get_all(&self, scope: &RequestScope, user_id: &str) -> Result<Intersections>;

    /// Fetch one of the caller's intersections.
    ///
    /// # Errors
    ///
    /// `forbidden` if the intersection is not on the caller's record.
    async fn get_by_id(&self, scope: &RequestScope, user_id: &str, id: &str)
        -> Result<Intersection>;

    /// Update one of the caller's intersections.
    async fn update_by_id(
        &self,
        scope: &RequestScope,
        user_id: &str,
        id: &str,
        update: &IntersectionUpdate,
    ) -> Result<Intersection>;

    /// Revoke the caller's access to an intersection, then delete it.
    async fn delete_by_id(&self, scope: &RequestScope, user_id: &str, id: &str) -> Result<()>;

    /// Optimise from the intersection's default parameters and record the outcome.
    async fn optimise_by_id(
        &self,
        scope: &RequestScope,
        user_id: &str,
        id: &str,
    ) -> Result<OptimisationResponse>;
}

/// [`IntersectionService`] backed by the user, intersection and optimisation services.
pub struct RpcIntersectionService {
    users: Arc<dyn UserClient>,
    intersections: Arc<dyn IntersectionClient>,
    optimiser: Arc<dyn OptimisationClient>,
}

impl RpcIntersectionService {
    /// Create the service.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserClient>,
        intersections: Arc<dyn IntersectionClient>,
        optimiser: Arc<dyn OptimisationClient>,
    ) -> Self {
        Self {
            users,
            intersections,
            optimiser,
        }
    }
}

#[async_trait]
impl IntersectionService for RpcIntersectionService {
    async fn create(
        &self,
        scope: &RequestScope,
        user_id: &str,
        request: &CreateIntersection,
    ) -> Result<CreateIntersectionResponse> {
        let new = NewIntersection {
            name: request.name.clone(),
            details: request.details.clone(),
            traffic_density: request.traffic_density.clone(),
            default_parameters: OptimisationParameters {
                optimisation_type: DEFAULT_OPTIMISATION_TYPE.to_string(),
                simulation_parameters: request.default_parameters.clone(),
            },
        };

        tracing::debug!(user_id, "calling intersection service to create intersection");
        let created = self.intersections.create_intersection(scope, &new).await?;

        // No compensation: if this fails the intersection exists but nobody can reach it.
        tracing::debug!(
            user_id,
            intersection_id = %created.id,
            "calling user service to add intersection ID"
        );
        self.users
            .add_intersection_id(scope, user_id, &created.id)
            .await?;

        Ok(CreateIntersectionResponse { id: created.id })
    }

    async fn get_all(&self, scope: &RequestScope, user_id: &str) -> Result<Intersections> {
        tracing::debug!(user_id, "calling intersection service to list intersections");
        let stream = self.intersections.get_all_intersections(scope).await?;
        let intersections = drain(stream, "intersections").await?;
        Ok(Intersections {
            intersections: intersections
                .into_iter()
                .map(intersection_from_wire)
                .collect(),
        })
    }

    async fn get_by_id(
        &self,
        scope: &RequestScope,
        user_id: &str,
        id: &str,
    ) -> Result<Intersection> {
        ensure_intersection_access(self.users.as_ref(), scope, user_id, id).await?;

        tracing::debug!(intersection_id = id, "calling intersection service to get intersection");
        let intersection = self.intersections.get_intersection(scope, id).await?;
        Ok(intersection_from_wire(intersection))
    }

    async fn update_by_id(
        &self,
        scope: &RequestScope,
        user_id: &str,
        id: &str,
        update: &IntersectionUpdate,
    ) -> Result<Intersection> {
        ensure_intersection_access(self.users.as_ref(), scope, user_id, id).await?;

        tracing::debug!(
            intersection_id = id,
            "calling intersection service to update intersection"
        );
        let intersection = self
            .intersections
            .update_intersection(
                scope,
                id,
                update.name.as_deref().unwrap_or_default(),
                update.details.as_ref(),
            )
            .await?;
        Ok(intersection_from_wire(intersection))
    }

    async fn delete_by_id(&self, scope: &RequestScope, user_id: &str, id: &str) -> Result<()> {
        ensure_intersection_access(self.users.as_ref(), scope, user_id, id).await?;

        tracing::debug!(intersection_id = id, "calling user service to remove intersection ID");
        self.users.remove_intersection_id(scope, user_id, id).await?;

        tracing::debug!(
            intersection_id = id,
            "calling intersection service to delete intersection"
        );
        self.intersections.delete_intersection(scope, id).await
    }

    async fn optimise_by_id(
        &self,
        scope: &RequestScope,
        user_id: &str,
        id: &str,
    ) -> Result<OptimisationResponse> {
        ensure_intersection_access(self.users.as_ref(), scope, user_id, id).await?;

        tracing::debug!(intersection_id = id, "calling intersection service to get intersection");
        let intersection = self.intersections.get_intersection(scope, id).await?;
        let intersection = intersection_from_wire(intersection);

        tracing::debug!(
            intersection_id = id,
            "calling optimisation service to optimise intersection"
        );
        let optimised = self
            .optimiser
            .run_optimisation(scope, &intersection.default_parameters)
            .await?;
        let optimised = optimisation_parameters_from_wire(optimised);

        tracing::debug!(
            intersection_id = id,
            "calling intersection service to store optimised parameters"
        );
        let stored = self
            .intersections
            .put_optimisation(scope, id, &optimised)
            .await?;

        tracing::info!(intersection_id = id, improved = stored.improved, "optimisation finished");
        Ok(OptimisationResponse {
            improved: stored.improved,
        })
    }
}
