//! reqwest implementation of [`VendorApi`].
//!
//! JSON in, JSON out, bearer auth. Upstream rejections are surfaced as
//! [`ApiError::Upstream`] carrying the status and the `{message}` body the
//! upstream uses for errors.

use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{
    Campaign, CampaignPayload, LoginResponse, Paged, Product, Promotion, UserRecord, VendorApi,
};
use crate::error::ApiError;

/// Error body shape the upstream uses for 4xx/5xx responses.
#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    message: String,
}

/// REST client for the upstream vendor API.
pub struct RestApi {
    client: Client,
    base_url: String,
}

impl RestApi {
    /// Create a client for the given base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn request(&self, method: Method, endpoint: &str, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut req = self.client.request(method, url);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        req
    }

    async fn send(&self, endpoint: &str, req: RequestBuilder) -> Result<Response, ApiError> {
        let response = req.send().await.map_err(|e| ApiError::RequestFailed {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<UpstreamErrorBody>()
                .await
                .map(|body| body.message)
                .unwrap_or_else(|_| status.to_string());
            debug!(endpoint, status = status.as_u16(), "Upstream rejected request");
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        req: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(endpoint, req).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait::async_trait]
impl VendorApi for RestApi {
    async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginResponse, ApiError> {
        let endpoint = "/auth/login";
        let req = self.request(Method::POST, endpoint, None).json(&serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
        }));
        self.read_json(endpoint, req).await
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<UserRecord, ApiError> {
        let endpoint = "/auth/register";
        let req = self.request(Method::POST, endpoint, None).json(&serde_json::json!({
            "name": name,
            "email": email,
            "password": password.expose_secret(),
        }));
        #[derive(Deserialize)]
        struct RegisterResponse {
            user: UserRecord,
        }
        let body: RegisterResponse = self.read_json(endpoint, req).await?;
        Ok(body.user)
    }

    async fn logout(&self, refresh_token: &SecretString) -> Result<(), ApiError> {
        let endpoint = "/auth/logout";
        let req = self.request(Method::POST, endpoint, None).json(&serde_json::json!({
            "refreshToken": refresh_token.expose_secret(),
        }));
        // 204, body irrelevant
        self.send(endpoint, req).await?;
        Ok(())
    }

    async fn products(
        &self,
        access_token: &str,
        company_id: &str,
    ) -> Result<Paged<Product>, ApiError> {
        let endpoint = format!("/products?companyId={company_id}");
        let req = self.request(Method::GET, &endpoint, Some(access_token));
        self.read_json(&endpoint, req).await
    }

    async fn promotions(
        &self,
        access_token: &str,
        company_id: &str,
    ) -> Result<Paged<Promotion>, ApiError> {
        let endpoint = format!("/promotions?companyId={company_id}");
        let req = self.request(Method::GET, &endpoint, Some(access_token));
        self.read_json(&endpoint, req).await
    }

    async fn campaigns(
        &self,
        access_token: &str,
        company_id: &str,
    ) -> Result<Paged<Campaign>, ApiError> {
        let endpoint = format!("/campaigns?companyId={company_id}");
        let req = self.request(Method::GET, &endpoint, Some(access_token));
        self.read_json(&endpoint, req).await
    }

    async fn campaign(&self, access_token: &str, id: &str) -> Result<Campaign, ApiError> {
        let endpoint = format!("/campaigns/{id}");
        let req = self.request(Method::GET, &endpoint, Some(access_token));
        self.read_json(&endpoint, req).await
    }

    async fn create_campaign(
        &self,
        access_token: &str,
        payload: &CampaignPayload,
    ) -> Result<Campaign, ApiError> {
        let endpoint = "/campaigns";
        let req = self
            .request(Method::POST, endpoint, Some(access_token))
            .json(payload);
        self.read_json(endpoint, req).await
    }

    async fn update_campaign(
        &self,
        access_token: &str,
        id: &str,
        payload: &CampaignPayload,
    ) -> Result<Campaign, ApiError> {
        let endpoint = format!("/campaigns/{id}");
        let req = self
            .request(Method::PUT, &endpoint, Some(access_token))
            .json(payload);
        self.read_json(&endpoint, req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slashes_are_stripped() {
        let api = RestApi::new("http://localhost:3000/v1///");
        assert_eq!(api.base_url, "http://localhost:3000/v1");
    }

    #[test]
    fn upstream_error_body_parses() {
        let body: UpstreamErrorBody =
            serde_json::from_str(r#"{"message": "Invalid email or password"}"#).unwrap();
        assert_eq!(body.message, "Invalid email or password");
    }
}
