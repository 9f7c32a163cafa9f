use garde::Validate;
use kernel::model::{
    id::UserId,
    user::{
        event::{CreateUser, UpdateUser},
        User,
    },
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[garde(length(min = 1))]
    pub name: String,
    #[garde(email)]
    pub email: String,
}

impl From<CreateUserRequest> for CreateUser {
    fn from(value: CreateUserRequest) -> Self {
        let CreateUserRequest { name, email } = value;
        CreateUser {
            user_name: name,
            email,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[garde(inner(length(min = 1)))]
    pub name: Option<String>,
    #[garde(inner(email))]
    pub email: Option<String>,
}

impl UpdateUserRequest {
    pub fn into_event(self, user_id: UserId) -> UpdateUser {
        let UpdateUserRequest { name, email } = self;
        UpdateUser {
            user_id,
            user_name: name,
            email,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(value: User) -> Self {
        let User {
            user_id,
            user_name,
            email,
        } = value;
        Self {
            id: user_id,
            name: user_name,
            email,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersResponse {
    pub users: Vec<UserResponse>,
}

impl From<Vec<User>> for UsersResponse {
    fn from(value: Vec<User>) -> Self {
        Self {
            users: value.into_iter().map(UserResponse::from).collect(),
        }
    }
}
