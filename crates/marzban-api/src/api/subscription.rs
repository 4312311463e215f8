// Subscription endpoints
//
// The subscription link is authenticated by its token alone, so the
// lookup goes out without the admin bearer header.

use super::client::{Call, MarzbanClient};
use crate::error::Error;
use crate::models::SubscriptionUser;
use crate::schema;

impl MarzbanClient {
    /// `GET /sub/{token}/`
    pub async fn get_user_subscription(&self, token: &str) -> Result<SubscriptionUser, Error> {
        let url = self.endpoint(&["sub", token, ""])?;
        let raw = self.send_json(Call::get(url).anonymous()).await?;
        Ok(schema::parse(raw)?)
    }

    /// Issue a new subscription link for the user, invalidating the old one.
    ///
    /// `POST /api/user/{username}/revoke_sub`
    pub async fn revoke_user_subscription(&self, username: &str) -> Result<(), Error> {
        let url = self.endpoint(&["api", "user", username, "revoke_sub"])?;
        self.send_empty(Call::post(url)).await
    }
}
