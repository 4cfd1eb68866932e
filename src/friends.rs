//! Friend requests on the community site.
use crate::client::GiftClient;
use crate::errors::GiftError;
use crate::net::{de, Surface};
use crate::steam_id::SteamId;
use serde::Deserialize;

const ADD_FRIEND_PATH: &str = "actions/AddFriendAjax";

#[derive(Debug, Deserialize)]
struct AddFriendResponse {
    #[serde(default, deserialize_with = "de::flag")]
    success: bool,
}

impl GiftClient {
    /// Sends a friend request to `steam_id`.
    ///
    /// Returns the `success` flag of the answer. A missing flag counts as
    /// `false`; a body that is not JSON at all is a [`GiftError::MalformedResponse`].
    pub async fn add_friend(&mut self, steam_id: SteamId) -> Result<bool, GiftError> {
        let url = self.gateway.endpoint(Surface::Community, ADD_FRIEND_PATH)?;
        let form = [
            ("accept_invite", "0".to_string()),
            ("sessionID", self.session.session_id()),
            ("steamid", steam_id.to_string()),
        ];

        let response = self.gateway.post_form(url, &form).await?;
        let body: AddFriendResponse = response.json()?;

        log::info!("friend request to {steam_id}: success={}", body.success);
        Ok(body.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{mock_client, mock_client_with_cart};
    use serde_json::json;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    fn friend() -> SteamId {
        SteamId::from_steam_id64(76561198000000001)
    }

    #[tokio::test]
    async fn add_friend_posts_the_request() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/actions/AddFriendAjax"))
            .and(matchers::body_string_contains("accept_invite=0"))
            .and(matchers::body_string_contains("sessionID=sess42"))
            .and(matchers::body_string_contains("steamid=76561198000000001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let mut client = mock_client_with_cart(&server, "CART1");
        assert!(client.add_friend(friend()).await.unwrap());
    }

    #[tokio::test]
    async fn add_friend_without_success_flag_is_false() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/actions/AddFriendAjax"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "failed_invites": [] })))
            .mount(&server)
            .await;

        let mut client = mock_client(&server);
        assert!(!client.add_friend(friend()).await.unwrap());
    }

    #[tokio::test]
    async fn add_friend_with_non_json_body_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/actions/AddFriendAjax"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>Sorry!</html>"))
            .mount(&server)
            .await;

        let mut client = mock_client(&server);
        assert!(matches!(client.add_friend(friend()).await, Err(GiftError::MalformedResponse(_))));
    }
}
