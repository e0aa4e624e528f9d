//! In-memory backends for tests.
//!
//! Each fake implements one client trait over a `parking_lot::Mutex`-guarded map, records
//! the methods it was asked to run, and can be told to fail any method with a chosen
//! [`ErrorKind`] or to break a stream after a number of items.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use futures::stream;
use parking_lot::Mutex;
use prost_types::Timestamp;
use swift_signals_core::{
    Details, ErrorKind, OptimisationParameters, RequestScope, Result, ServiceError,
    SimulationParameters,
};

use crate::call::ServiceStream;
use crate::convert;
use crate::intersection::{IntersectionClient, NewIntersection};
use crate::optimisation::OptimisationClient;
use crate::proto::common::{self as pb_common, IntersectionStatus, OptimisationType};
use crate::proto::intersection::{self as pb_intersection, IntersectionResponse};
use crate::proto::simulation::{
    self as pb_simulation, SimulationOutputResponse, SimulationResultsResponse,
};
use crate::proto::user::{self as pb_user, IntersectionIdResponse, LoginUserResponse, UserResponse};
use crate::simulation::SimulationClient;
use crate::user::UserClient;

// =============================================================================
// Fault injection
// =============================================================================

/// Per-method failure switches and a call log shared by the fakes.
#[derive(Debug, Default)]
struct Faults {
    unary: Mutex<HashMap<&'static str, (ErrorKind, String)>>,
    streams: Mutex<HashMap<&'static str, usize>>,
    calls: Mutex<Vec<&'static str>>,
}

impl Faults {
    fn fail(&self, method: &'static str, kind: ErrorKind, message: &str) {
        self.unary
            .lock()
            .insert(method, (kind, message.to_string()));
    }

    fn break_stream_after(&self, method: &'static str, items: usize) {
        self.streams.lock().insert(method, items);
    }

    fn enter(&self, method: &'static str) -> Result<()> {
        self.calls.lock().push(method);
        match self.unary.lock().get(method) {
            Some((kind, message)) => {
                Err(ServiceError::new(*kind, message.clone()).with_context("method", method))
            }
            None => Ok(()),
        }
    }

    fn stream<T: Send + 'static>(&self, method: &'static str, items: Vec<T>) -> ServiceStream<T> {
        let mut items: Vec<Result<T>> = items.into_iter().map(Ok).collect();
        if let Some(after) = self.streams.lock().get(method).copied() {
            items.truncate(after);
            items.push(Err(ServiceError::unavailable("stream reset by peer")
                .with_context("method", method)));
        }
        Box::pin(stream::iter(items))
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }
}

fn now() -> Timestamp {
    let now = Utc::now();
    Timestamp {
        seconds: now.timestamp(),
        nanos: i32::try_from(now.timestamp_subsec_nanos()).unwrap_or(0),
    }
}

// =============================================================================
// User service
// =============================================================================

#[derive(Debug)]
struct Account {
    user: UserResponse,
    password: String,
}

#[derive(Debug, Default)]
struct UserState {
    accounts: BTreeMap<String, Account>,
    next_id: u64,
}

/// In-memory [`UserClient`].
#[derive(Debug, Default)]
pub struct FakeUserClient {
    state: Mutex<UserState>,
    faults: Faults,
}

impl FakeUserClient {
    /// An empty user store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account.
    pub fn insert_user(&self, user: UserResponse, password: &str) {
        self.state.lock().accounts.insert(
            user.id.clone(),
            Account {
                user,
                password: password.to_string(),
            },
        );
    }

    /// Seed a non-admin account with the given intersection IDs.
    pub fn insert_member(&self, id: &str, intersection_ids: &[&str]) {
        self.insert_user(
            UserResponse {
                id: id.to_string(),
                name: id.to_string(),
                email: format!("{id}@example.com"),
                intersection_ids: intersection_ids.iter().map(ToString::to_string).collect(),
                ..UserResponse::default()
            },
            "password123",
        );
    }

    /// The stored record of a user.
    #[must_use]
    pub fn user(&self, id: &str) -> Option<UserResponse> {
        self.state.lock().accounts.get(id).map(|a| a.user.clone())
    }

    /// The intersection IDs on a user's record.
    #[must_use]
    pub fn intersection_ids(&self, id: &str) -> Vec<String> {
        self.user(id).map(|u| u.intersection_ids).unwrap_or_default()
    }

    /// Fail every call to `method` (a `proto::user::methods` path).
    pub fn fail(&self, method: &'static str, kind: ErrorKind, message: &str) {
        self.faults.fail(method, kind, message);
    }

    /// Break streams of `method` after `items` items.
    pub fn break_stream_after(&self, method: &'static str, items: usize) {
        self.faults.break_stream_after(method, items);
    }

    /// Methods invoked so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.faults.calls()
    }

    fn with_account<R>(&self, id: &str, f: impl FnOnce(&mut Account) -> R) -> Result<R> {
        let mut state = self.state.lock();
        let account = state
            .accounts
            .get_mut(id)
            .ok_or_else(|| ServiceError::not_found("user not found").with_context("user_id", id))?;
        Ok(f(account))
    }
}

#[async_trait]
impl UserClient for FakeUserClient {
    async fn register_user(
        &self,
        _scope: &RequestScope,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserResponse> {
        self.faults.enter(pb_user::methods::REGISTER_USER)?;

        let mut state = self.state.lock();
        if state.accounts.values().any(|a| a.user.email == email) {
            return Err(ServiceError::already_exists("email already registered"));
        }
        state.next_id += 1;
        let user = UserResponse {
            id: format!("user-{}", state.next_id),
            name: name.to_string(),
            email: email.to_string(),
            created_at: Some(now()),
            updated_at: Some(now()),
            ..UserResponse::default()
        };
        state.accounts.insert(
            user.id.clone(),
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        Ok(user)
    }

    async fn login_user(
        &self,
        _scope: &RequestScope,
        email: &str,
        password: &str,
    ) -> Result<LoginUserResponse> {
        self.faults.enter(pb_user::methods::LOGIN_USER)?;

        let state = self.state.lock();
        let account = state
            .accounts
            .values()
            .find(|a| a.user.email == email)
            .ok_or_else(|| ServiceError::not_found("user not found"))?;
        if account.password != password {
            return Err(ServiceError::unauthorized("invalid credentials"));
        }
        Ok(LoginUserResponse {
            token: format!("token-{}", account.user.id),
            expires_at: None,
        })
    }

    async fn logout_user(&self, _scope: &RequestScope, user_id: &str) -> Result<()> {
        self.faults.enter(pb_user::methods::LOGOUT_USER)?;
        self.with_account(user_id, |_| ())
    }

    async fn get_user_by_id(&self, _scope: &RequestScope, user_id: &str) -> Result<UserResponse> {
        self.faults.enter(pb_user::methods::GET_USER_BY_ID)?;
        self.with_account(user_id, |a| a.user.clone())
    }

    async fn get_all_users(
        &self,
        _scope: &RequestScope,
        page: i32,
        page_size: i32,
        _filter: &str,
    ) -> Result<ServiceStream<UserResponse>> {
        self.faults.enter(pb_user::methods::GET_ALL_USERS)?;

        let size = usize::try_from(page_size).unwrap_or(0);
        let skip = usize::try_from(page.saturating_sub(1)).unwrap_or(0) * size;
        let users: Vec<UserResponse> = self
            .state
            .lock()
            .accounts
            .values()
            .skip(skip)
            .take(size)
            .map(|a| a.user.clone())
            .collect();
        Ok(self.faults.stream(pb_user::methods::GET_ALL_USERS, users))
    }

    async fn update_user(
        &self,
        _scope: &RequestScope,
        user_id: &str,
        name: &str,
        email: &str,
    ) -> Result<UserResponse> {
        self.faults.enter(pb_user::methods::UPDATE_USER)?;
        self.with_account(user_id, |a| {
            if !name.is_empty() {
                a.user.name = name.to_string();
            }
            if !email.is_empty() {
                a.user.email = email.to_string();
            }
            a.user.updated_at = Some(now());
            a.user.clone()
        })
    }

    async fn delete_user(&self, _scope: &RequestScope, user_id: &str) -> Result<()> {
        self.faults.enter(pb_user::methods::DELETE_USER)?;
        self.state
            .lock()
            .accounts
            .remove(user_id)
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("user not found"))
    }

    async fn get_user_intersection_ids(
        &self,
        _scope: &RequestScope,
        user_id: &str,
    ) -> Result<ServiceStream<IntersectionIdResponse>> {
        self.faults
            .enter(pb_user::methods::GET_USER_INTERSECTION_IDS)?;
        let ids = self.with_account(user_id, |a| a.user.intersection_ids.clone())?;
        let items = ids
            .into_iter()
            .map(|intersection_id| IntersectionIdResponse { intersection_id })
            .collect();
        Ok(self
            .faults
            .stream(pb_user::methods::GET_USER_INTERSECTION_IDS, items))
    }

    async fn add_intersection_id(
        &self,
        _scope: &RequestScope,
        user_id: &str,
        intersection_id: &str,
    ) -> Result<()> {
        self.faults.enter(pb_user::methods::ADD_INTERSECTION_ID)?;
        self.with_account(user_id, |a| {
            if !a.user.intersection_ids.iter().any(|id| id == intersection_id) {
                a.user.intersection_ids.push(intersection_id.to_string());
            }
        })
    }

    async fn remove_intersection_ids(
        &self,
        _scope: &RequestScope,
        user_id: &str,
        intersection_ids: &[String],
    ) -> Result<()> {
        self.faults.enter(pb_user::methods::REMOVE_INTERSECTION_IDS)?;
        self.with_account(user_id, |a| {
            a.user
                .intersection_ids
                .retain(|id| !intersection_ids.contains(id));
        })
    }

    async fn reset_password(&self, _scope: &RequestScope, _email: &str) -> Result<()> {
        self.faults.enter(pb_user::methods::RESET_PASSWORD)
    }
}

// =============================================================================
// Intersection service
// =============================================================================

/// A stored intersection with every parameter set populated except `best`.
#[must_use]
pub fn sample_intersection(id: &str, name: &str) -> IntersectionResponse {
    let params = pb_common::OptimisationParameters {
        optimisation_type: OptimisationType::None.into(),
        parameters: Some(pb_common::SimulationParameters {
            intersection_type: pb_common::IntersectionType::Trafficlight.into(),
            green: 10,
            yellow: 3,
            red: 7,
            speed: 60,
            seed: 42,
        }),
    };
    IntersectionResponse {
        id: id.to_string(),
        name: name.to_string(),
        details: Some(pb_intersection::IntersectionDetails {
            address: "1 Main St".into(),
            city: "Pretoria".into(),
            province: "Gauteng".into(),
        }),
        created_at: Some(now()),
        last_run_at: None,
        status: IntersectionStatus::Unoptimised.into(),
        run_count: 0,
        traffic_density: pb_common::TrafficDensity::Medium.into(),
        default_parameters: Some(params.clone()),
        best_parameters: None,
        current_parameters: Some(params),
    }
}

#[derive(Debug)]
struct IntersectionState {
    intersections: BTreeMap<String, IntersectionResponse>,
    next_id: u64,
    improved: bool,
}

impl Default for IntersectionState {
    fn default() -> Self {
        Self {
            intersections: BTreeMap::new(),
            next_id: 0,
            improved: true,
        }
    }
}

/// In-memory [`IntersectionClient`].
#[derive(Debug, Default)]
pub struct FakeIntersectionClient {
    state: Mutex<IntersectionState>,
    faults: Faults,
}

impl FakeIntersectionClient {
    /// An empty intersection store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an intersection.
    pub fn insert(&self, intersection: IntersectionResponse) {
        self.state
            .lock()
            .intersections
            .insert(intersection.id.clone(), intersection);
    }

    /// The stored record of an intersection.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<IntersectionResponse> {
        self.state.lock().intersections.get(id).cloned()
    }

    /// Whether `put_optimisation` reports an improvement (default `true`).
    pub fn set_improved(&self, improved: bool) {
        self.state.lock().improved = improved;
    }

    /// Fail every call to `method` (a `proto::intersection::methods` path).
    pub fn fail(&self, method: &'static str, kind: ErrorKind, message: &str) {
        self.faults.fail(method, kind, message);
    }

    /// Break streams of `method` after `items` items.
    pub fn break_stream_after(&self, method: &'static str, items: usize) {
        self.faults.break_stream_after(method, items);
    }

    /// Methods invoked so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.faults.calls()
    }

    fn with_intersection<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut IntersectionResponse, bool) -> R,
    ) -> Result<R> {
        let mut state = self.state.lock();
        let improved = state.improved;
        let intersection = state.intersections.get_mut(id).ok_or_else(|| {
            ServiceError::not_found("intersection not found").with_context("intersection_id", id)
        })?;
        Ok(f(intersection, improved))
    }
}

#[async_trait]
impl IntersectionClient for FakeIntersectionClient {
    async fn create_intersection(
        &self,
        _scope: &RequestScope,
        intersection: &NewIntersection,
    ) -> Result<IntersectionResponse> {
        self.faults
            .enter(pb_intersection::methods::CREATE_INTERSECTION)?;

        let defaults = convert::optimisation_parameters_to_wire(&intersection.default_parameters);
        let mut state = self.state.lock();
        state.next_id += 1;
        let created = IntersectionResponse {
            id: format!("int-{}", state.next_id),
            name: intersection.name.clone(),
            details: Some(convert::details_to_wire(&intersection.details)),
            created_at: Some(now()),
            last_run_at: None,
            status: IntersectionStatus::Unoptimised.into(),
            run_count: 0,
            traffic_density: convert::traffic_density_from_str(&intersection.traffic_density)
                .into(),
            default_parameters: Some(defaults.clone()),
            best_parameters: None,
            current_parameters: Some(defaults),
        };
        state
            .intersections
            .insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn get_intersection(&self, _scope: &RequestScope, id: &str) -> Result<IntersectionResponse> {
        self.faults
            .enter(pb_intersection::methods::GET_INTERSECTION)?;
        self.with_intersection(id, |i, _| i.clone())
    }

    async fn get_all_intersections(
        &self,
        _scope: &RequestScope,
    ) -> Result<ServiceStream<IntersectionResponse>> {
        self.faults
            .enter(pb_intersection::methods::GET_ALL_INTERSECTIONS)?;
        let all = self.state.lock().intersections.values().cloned().collect();
        Ok(self
            .faults
            .stream(pb_intersection::methods::GET_ALL_INTERSECTIONS, all))
    }

    async fn update_intersection(
        &self,
        _scope: &RequestScope,
        id: &str,
        name: &str,
        details: Option<&Details>,
    ) -> Result<IntersectionResponse> {
        self.faults
            .enter(pb_intersection::methods::UPDATE_INTERSECTION)?;
        self.with_intersection(id, |i, _| {
            if !name.is_empty() {
                i.name = name.to_string();
            }
            if let Some(details) = details {
                i.details = Some(convert::details_to_wire(details));
            }
            i.clone()
        })
    }

    async fn delete_intersection(&self, _scope: &RequestScope, id: &str) -> Result<()> {
        self.faults
            .enter(pb_intersection::methods::DELETE_INTERSECTION)?;
        self.state
            .lock()
            .intersections
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("intersection not found"))
    }

    async fn put_optimisation(
        &self,
        _scope: &RequestScope,
        id: &str,
        parameters: &OptimisationParameters,
    ) -> Result<pb_intersection::PutOptimisationResponse> {
        self.faults
            .enter(pb_intersection::methods::PUT_OPTIMISATION)?;
        let wire = convert::optimisation_parameters_to_wire(parameters);
        self.with_intersection(id, |i, improved| {
            if improved {
                i.best_parameters = Some(wire.clone());
            }
            i.current_parameters = Some(wire);
            i.status = IntersectionStatus::Optimised.into();
            i.run_count += 1;
            i.last_run_at = Some(now());
            pb_intersection::PutOptimisationResponse { improved }
        })
    }
}

// =============================================================================
// Optimisation service
// =============================================================================

/// In-memory [`OptimisationClient`].
///
/// Unless a result is set, answers with the input parameters relabelled as `gridsearch`
/// and a green phase one step longer.
#[derive(Debug, Default)]
pub struct FakeOptimisationClient {
    result: Mutex<Option<pb_common::OptimisationParameters>>,
    received: Mutex<Vec<OptimisationParameters>>,
    faults: Faults,
}

impl FakeOptimisationClient {
    /// A fake with the default behaviour.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every run with `result`.
    pub fn set_result(&self, result: pb_common::OptimisationParameters) {
        *self.result.lock() = Some(result);
    }

    /// Parameters received so far.
    #[must_use]
    pub fn received(&self) -> Vec<OptimisationParameters> {
        self.received.lock().clone()
    }

    /// Fail every run.
    pub fn fail(&self, kind: ErrorKind, message: &str) {
        self.faults
            .fail(crate::proto::optimisation::methods::RUN_OPTIMISATION, kind, message);
    }
}

#[async_trait]
impl OptimisationClient for FakeOptimisationClient {
    async fn run_optimisation(
        &self,
        _scope: &RequestScope,
        parameters: &OptimisationParameters,
    ) -> Result<pb_common::OptimisationParameters> {
        self.faults
            .enter(crate::proto::optimisation::methods::RUN_OPTIMISATION)?;
        self.received.lock().push(parameters.clone());

        if let Some(result) = self.result.lock().clone() {
            return Ok(result);
        }
        let mut tuned = convert::optimisation_parameters_to_wire(parameters);
        tuned.optimisation_type = OptimisationType::Gridsearch.into();
        if let Some(sim) = tuned.parameters.as_mut() {
            sim.green += 1;
        }
        Ok(tuned)
    }
}

// =============================================================================
// Simulation service
// =============================================================================

/// In-memory [`SimulationClient`] returning canned results and a one-node network.
#[derive(Debug)]
pub struct FakeSimulationClient {
    results: SimulationResultsResponse,
    output: SimulationOutputResponse,
    received: Mutex<Vec<(String, SimulationParameters)>>,
    faults: Faults,
}

impl Default for FakeSimulationClient {
    fn default() -> Self {
        Self {
            results: SimulationResultsResponse {
                total_vehicles: 120,
                average_travel_time: 42.5,
                total_travel_time: 5100.0,
                average_speed: 11.2,
                average_waiting_time: 8.25,
                total_waiting_time: 990.0,
                generated_vehicles: 125,
                emergency_brakes: 1,
                emergency_stops: 0,
                near_collisions: 2,
            },
            output: SimulationOutputResponse {
                intersection: Some(pb_simulation::Intersection {
                    nodes: vec![pb_simulation::Node {
                        id: "n0".into(),
                        x: 0.0,
                        y: 0.0,
                        node_type: pb_simulation::NodeType::TrafficLight.into(),
                    }],
                    ..pb_simulation::Intersection::default()
                }),
                vehicles: vec![pb_simulation::Vehicle {
                    id: "v0".into(),
                    positions: vec![pb_simulation::Position {
                        time: 0,
                        x: 1.0,
                        y: 2.0,
                        speed: 13.5,
                    }],
                }],
            },
            received: Mutex::new(Vec::new()),
            faults: Faults::default(),
        }
    }
}

impl FakeSimulationClient {
    /// A fake with the canned responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `(intersection_id, parameters)` pairs received so far, one per call.
    #[must_use]
    pub fn received(&self) -> Vec<(String, SimulationParameters)> {
        self.received.lock().clone()
    }

    /// Fail every call to `method` (a `proto::simulation::methods` path).
    pub fn fail(&self, method: &'static str, kind: ErrorKind, message: &str) {
        self.faults.fail(method, kind, message);
    }

    fn record(&self, intersection_id: &str, parameters: &SimulationParameters) {
        self.received
            .lock()
            .push((intersection_id.to_string(), parameters.clone()));
    }
}

#[async_trait]
impl SimulationClient for FakeSimulationClient {
    async fn get_simulation_results(
        &self,
        _scope: &RequestScope,
        intersection_id: &str,
        parameters: &SimulationParameters,
    ) -> Result<SimulationResultsResponse> {
        self.faults
            .enter(pb_simulation::methods::GET_SIMULATION_RESULTS)?;
        self.record(intersection_id, parameters);
        Ok(self.results.clone())
    }

    async fn get_simulation_output(
        &self,
        _scope: &RequestScope,
        intersection_id: &str,
        parameters: &SimulationParameters,
    ) -> Result<SimulationOutputResponse> {
        self.faults
            .enter(pb_simulation::methods::GET_SIMULATION_OUTPUT)?;
        self.record(intersection_id, parameters);
        Ok(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;

    #[tokio::test]
    async fn register_then_login() {
        let users = FakeUserClient::new();
        let scope = RequestScope::new("req");

        let user = users
            .register_user(&scope, "alice", "a@x.com", "pw12345678")
            .await
            .unwrap();
        assert!(!user.id.is_empty());

        let err = users
            .register_user(&scope, "alice2", "a@x.com", "pw12345678")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);

        let err = users.login_user(&scope, "a@x.com", "wrong").await.unwrap_err();
        assert_eq!(err.message(), "invalid credentials");

        let login = users.login_user(&scope, "a@x.com", "pw12345678").await.unwrap();
        assert_eq!(login.token, format!("token-{}", user.id));
    }

    #[tokio::test]
    async fn broken_stream_yields_prefix_then_error() {
        let users = FakeUserClient::new();
        users.insert_member("u-1", &["a", "b", "c"]);
        users.break_stream_after(pb_user::methods::GET_USER_INTERSECTION_IDS, 2);

        let items: Vec<_> = users
            .get_user_intersection_ids(&RequestScope::new("req"), "u-1")
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok() && items[1].is_ok());
        assert!(items[2].is_err());
    }

    #[tokio::test]
    async fn put_optimisation_records_best() {
        let intersections = FakeIntersectionClient::new();
        intersections.insert(sample_intersection("int-1", "Main"));

        let params = OptimisationParameters {
            optimisation_type: "gridsearch".into(),
            ..OptimisationParameters::default()
        };
        let response = intersections
            .put_optimisation(&RequestScope::new("req"), "int-1", &params)
            .await
            .unwrap();
        assert!(response.improved);

        let stored = intersections.get("int-1").unwrap();
        assert!(stored.best_parameters.is_some());
        assert_eq!(stored.run_count, 1);
    }
}
