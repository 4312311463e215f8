// User endpoints

use tracing::debug;

use super::client::{Call, MarzbanClient};
use crate::error::Error;
use crate::models::{User, UserCreate, UserModify};
use crate::schema::{self, EntityKind, SchemaError};

impl MarzbanClient {
    /// `POST /api/user`
    pub async fn add_user(&self, user: &UserCreate) -> Result<User, Error> {
        let body = schema::serialize_full(user)?;
        let url = self.endpoint(&["api", "user"])?;
        let raw = self.send_json(Call::post(url).json(body)).await?;
        Ok(schema::parse(raw)?)
    }

    /// `GET /api/user/{username}`
    pub async fn get_user(&self, username: &str) -> Result<User, Error> {
        let url = self.endpoint(&["api", "user", username])?;
        let raw = self.send_json(Call::get(url)).await?;
        Ok(schema::parse(raw)?)
    }

    /// Change only the fields set in `changes`.
    ///
    /// `PUT /api/user/{username}`
    pub async fn modify_user(&self, username: &str, changes: &UserModify) -> Result<User, Error> {
        let body = schema::serialize_partial(changes)?;
        let url = self.endpoint(&["api", "user", username])?;
        let raw = self.send_json(Call::put(url).json(body)).await?;
        Ok(schema::parse(raw)?)
    }

    /// `DELETE /api/user/{username}`
    pub async fn remove_user(&self, username: &str) -> Result<(), Error> {
        let url = self.endpoint(&["api", "user", username])?;
        self.send_empty(Call::delete(url)).await
    }

    /// One page of users. `offset`/`limit` are passed through untouched.
    ///
    /// `GET /api/users?offset=&limit=`
    pub async fn get_users(&self, offset: u64, limit: u64) -> Result<Vec<User>, Error> {
        let url = self.endpoint(&["api", "users"])?;
        let call = Call::get(url).query("offset", offset).query("limit", limit);
        let raw = self.send_json(call).await?;

        let mut envelope = schema::parse_object(EntityKind::Users, raw)?;
        let users = envelope
            .remove("users")
            .ok_or_else(|| SchemaError::new(EntityKind::Users, "missing field `users`"))?;
        let users: Vec<User> = schema::parse_list(users)?;

        debug!(count = users.len(), offset, limit, "listed users");
        Ok(users)
    }
}
