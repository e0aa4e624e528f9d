//! `swiftsignals.user`: accounts, credentials and the user-to-intersection edge.

/// Fully-qualified method paths of `swiftsignals.user.UserService`.
pub mod methods {
    pub const REGISTER_USER: &str = "/swiftsignals.user.UserService/RegisterUser";
    pub const LOGIN_USER: &str = "/swiftsignals.user.UserService/LoginUser";
    pub const LOGOUT_USER: &str = "/swiftsignals.user.UserService/LogoutUser";
    pub const GET_USER_BY_ID: &str = "/swiftsignals.user.UserService/GetUserByID";
    pub const GET_ALL_USERS: &str = "/swiftsignals.user.UserService/GetAllUsers";
    pub const UPDATE_USER: &str = "/swiftsignals.user.UserService/UpdateUser";
    pub const DELETE_USER: &str = "/swiftsignals.user.UserService/DeleteUser";
    pub const GET_USER_INTERSECTION_IDS: &str =
        "/swiftsignals.user.UserService/GetUserIntersectionIDs";
    pub const ADD_INTERSECTION_ID: &str = "/swiftsignals.user.UserService/AddIntersectionID";
    pub const REMOVE_INTERSECTION_IDS: &str =
        "/swiftsignals.user.UserService/RemoveIntersectionIDs";
    pub const RESET_PASSWORD: &str = "/swiftsignals.user.UserService/ResetPassword";
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserIdRequest {
    #[prost(string, tag = "1")]
    pub user_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RegisterUserRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub email: String,
    #[prost(string, tag = "3")]
    pub password: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoginUserRequest {
    #[prost(string, tag = "1")]
    pub email: String,
    #[prost(string, tag = "2")]
    pub password: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoginUserResponse {
    #[prost(string, tag = "1")]
    pub token: String,
    #[prost(message, optional, tag = "3")]
    pub expires_at: ::core::option::Option<::prost_types::Timestamp>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetAllUsersRequest {
    #[prost(int32, tag = "1")]
    pub page: i32,
    #[prost(int32, tag = "2")]
    pub page_size: i32,
    #[prost(string, tag = "3")]
    pub filter: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateUserRequest {
    #[prost(string, tag = "1")]
    pub user_id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub email: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct IntersectionIdResponse {
    #[prost(string, tag = "1")]
    pub intersection_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AddIntersectionIdRequest {
    #[prost(string, tag = "1")]
    pub user_id: String,
    #[prost(string, tag = "2")]
    pub intersection_id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RemoveIntersectionIdRequest {
    #[prost(string, tag = "1")]
    pub user_id: String,
    #[prost(string, repeated, tag = "2")]
    pub intersection_id: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResetPasswordRequest {
    #[prost(string, tag = "1")]
    pub email: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UserResponse {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub email: String,
    #[prost(bool, tag = "4")]
    pub is_admin: bool,
    #[prost(string, repeated, tag = "5")]
    pub intersection_ids: Vec<String>,
    #[prost(message, optional, tag = "6")]
    pub created_at: ::core::option::Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "7")]
    pub updated_at: ::core::option::Option<::prost_types::Timestamp>,
}
