//! [`ShopApi`] over HTTP with `reqwest`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use proshop_core::ProductId;
use proshop_core::wire::{
    CreateReviewRequest, LoginRequest, Message, Product, ProductListQuery, ProductPage,
    RegisterRequest, UpdateProfileRequest, UserInfo, UserProfile,
};

use crate::api::{ApiError, ShopApi};

/// HTTP client for the ProShop API.
#[derive(Debug, Clone)]
pub struct HttpShopApi {
    client: Client,
    base_url: Url,
}

impl HttpShopApi {
    /// Create a client for the API served at `base_url` (e.g. `http://127.0.0.1:5000`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if `base_url` does not parse.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::execute(request).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn execute(request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Prefer the server's `{"message"}`; fall back to the status text
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Message>(&body).map_or_else(
            |_| {
                status
                    .canonical_reason()
                    .map_or_else(|| status.to_string(), str::to_owned)
            },
            |m| m.message,
        );
        debug!(status = status.as_u16(), %message, "API error response");

        Err(ApiError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ShopApi for HttpShopApi {
    #[instrument(skip(self))]
    async fn list_products(&self, query: &ProductListQuery) -> Result<ProductPage, ApiError> {
        let mut url = self.url("api/products")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("keyword", query.keyword.as_deref().unwrap_or_default());
            if let Some(page) = query.page_number {
                pairs.append_pair("pageNumber", &page.to_string());
            }
        }
        Self::send(self.client.get(url)).await
    }

    async fn top_products(&self) -> Result<Vec<Product>, ApiError> {
        Self::send(self.client.get(self.url("api/products/top")?)).await
    }

    #[instrument(skip(self))]
    async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        Self::send(self.client.get(self.url(&format!("api/products/{id}"))?)).await
    }

    #[instrument(skip(self, review, token))]
    async fn create_review(
        &self,
        id: ProductId,
        review: &CreateReviewRequest,
        token: &str,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("api/products/{id}/reviews"))?;
        let _: Message = Self::send(self.client.post(url).bearer_auth(token).json(review)).await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn login(&self, request: &LoginRequest) -> Result<UserInfo, ApiError> {
        Self::send(self.client.post(self.url("api/users/login")?).json(request)).await
    }

    #[instrument(skip_all)]
    async fn register(&self, request: &RegisterRequest) -> Result<UserInfo, ApiError> {
        Self::send(self.client.post(self.url("api/users")?).json(request)).await
    }

    #[instrument(skip_all)]
    async fn profile(&self, token: &str) -> Result<UserProfile, ApiError> {
        Self::send(self.client.get(self.url("api/users/profile")?).bearer_auth(token)).await
    }

    #[instrument(skip_all)]
    async fn update_profile(&self, request: &UpdateProfileRequest, token: &str) -> Result<UserInfo, ApiError> {
        Self::send(
            self.client
                .put(self.url("api/users/profile")?)
                .bearer_auth(token)
                .json(request),
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn product_json(id: i32) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Airpods Wireless Bluetooth Headphones",
            "image": "/images/airpods.jpg",
            "brand": "Apple",
            "category": "Electronics",
            "description": "Bluetooth technology",
            "price": 89.99,
            "countInStock": 10,
            "rating": 4.5,
            "numReviews": 2,
            "reviews": [],
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn test_list_products_sends_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products"))
            .and(query_param("keyword", "air"))
            .and(query_param("pageNumber", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "products": [product_json(1)],
                "page": 2,
                "pages": 3
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpShopApi::new(&server.uri()).unwrap();
        let page = api
            .list_products(&ProductListQuery {
                keyword: Some("air".to_owned()),
                page_number: Some(2),
            })
            .await
            .unwrap();

        assert_eq!(page.page, 2);
        assert_eq!(page.pages, 3);
        assert_eq!(page.products.first().unwrap().count_in_stock, 10);
    }

    #[tokio::test]
    async fn test_server_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/9"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Product not found"})))
            .mount(&server)
            .await;

        let api = HttpShopApi::new(&server.uri()).unwrap();
        let err = api.product(ProductId::new(9)).await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Server {
                status: 404,
                message: "Product not found".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn test_non_json_error_falls_back_to_status_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/top"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let api = HttpShopApi::new(&server.uri()).unwrap();
        let err = api.top_products().await.unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.to_string(), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_review_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/products/3/reviews"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(json!({"rating": 5, "comment": "Great"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "Review added"})))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpShopApi::new(&server.uri()).unwrap();
        api.create_review(
            ProductId::new(3),
            &CreateReviewRequest {
                rating: 5,
                comment: "Great".to_owned(),
            },
            "tok",
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_base_url_with_path_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/shop/api/users/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1,
                "name": "Jane",
                "email": "jane@example.com",
                "isAdmin": false,
                "token": "t"
            })))
            .mount(&server)
            .await;

        let api = HttpShopApi::new(&format!("{}/shop", server.uri())).unwrap();
        let info = api
            .login(&LoginRequest {
                email: "jane@example.com".to_owned(),
                password: "123456".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(info.token, "t");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let api = HttpShopApi::new("http://127.0.0.1:1").unwrap();
        let err = api.top_products().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(HttpShopApi::new("not a url"), Err(ApiError::InvalidUrl(_))));
    }
}
