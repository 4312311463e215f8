// Admin endpoints and password-grant authentication

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::client::{Call, MarzbanClient};
use crate::error::Error;
use crate::models::{Admin, AdminCreate, AdminModify, Token};
use crate::schema;

impl MarzbanClient {
    /// Exchange admin credentials for a bearer token.
    ///
    /// `POST /api/admin/token` (form-encoded password grant)
    ///
    /// On success the token is stored and sent on every later admin call.
    /// A 2xx answer that is not a usable token becomes [`Error::Token`];
    /// on any failure the previously held token, if any, is kept.
    pub async fn authenticate(
        &mut self,
        username: &str,
        password: &SecretString,
    ) -> Result<Token, Error> {
        let url = self.endpoint(&["api", "admin", "token"])?;
        let form = [
            ("grant_type", "password"),
            ("username", username),
            ("password", password.expose_secret()),
        ];

        let raw = match self.send_json(Call::post(url).form(&form).anonymous()).await {
            Ok(raw) => raw,
            Err(Error::Deserialization { message, .. }) => {
                return Err(Error::Token {
                    message: format!("failed to obtain access token: {message}"),
                });
            }
            Err(e) => return Err(e),
        };

        let token: Token = schema::parse(raw).map_err(|e| Error::Token {
            message: format!("failed to obtain access token: {e}"),
        })?;

        self.set_token(token.access_token.clone());
        debug!(username, token_type = %token.token_type, "authenticated");
        Ok(token)
    }

    /// The admin the current token belongs to.
    ///
    /// `GET /api/admin`
    pub async fn get_current_admin(&self) -> Result<Admin, Error> {
        let url = self.endpoint(&["api", "admin"])?;
        let raw = self.send_json(Call::get(url)).await?;
        Ok(schema::parse(raw)?)
    }

    /// `POST /api/admin` -- sudo only.
    pub async fn create_admin(&self, admin: &AdminCreate) -> Result<Admin, Error> {
        let body = schema::serialize_full(admin)?;
        let url = self.endpoint(&["api", "admin"])?;
        let raw = self.send_json(Call::post(url).json(body)).await?;
        Ok(schema::parse(raw)?)
    }

    /// `PUT /api/admin/{username}`
    pub async fn modify_admin(&self, username: &str, changes: &AdminModify) -> Result<Admin, Error> {
        let body = schema::serialize_partial(changes)?;
        let url = self.endpoint(&["api", "admin", username])?;
        let raw = self.send_json(Call::put(url).json(body)).await?;
        Ok(schema::parse(raw)?)
    }

    /// `DELETE /api/admin/{username}`
    pub async fn remove_admin(&self, username: &str) -> Result<(), Error> {
        let url = self.endpoint(&["api", "admin", username])?;
        self.send_empty(Call::delete(url)).await
    }

    /// `GET /api/admins?offset=&limit=`
    pub async fn get_admins(&self, offset: u64, limit: u64) -> Result<Vec<Admin>, Error> {
        let url = self.endpoint(&["api", "admins"])?;
        let call = Call::get(url).query("offset", offset).query("limit", limit);
        let admins: Vec<Admin> = schema::parse_list(self.send_json(call).await?)?;
        debug!(count = admins.len(), "listed admins");
        Ok(admins)
    }
}
