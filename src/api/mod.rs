use crate::models::{Bookmark, SessionUser};
use crate::storage::{TOKEN_KEY, USER_KEY};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {body}"),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// Backend endpoint + anon key, discovered from `window.ENV`.
///
/// We support BOTH `window.ENV.SUPABASE_URL` (documented in README) and
/// `window.ENV.supabase_url` (legacy/implementation detail) for compatibility,
/// same for the anon key.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub supabase_url: String,
    pub anon_key: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let mut cfg = Self {
            supabase_url: "http://localhost:54321".to_string(),
            anon_key: "dev-anon-key".to_string(),
        };

        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    if let Some(url) = read_env_str(&env, "SUPABASE_URL", "supabase_url") {
                        cfg.supabase_url = url;
                    }
                    if let Some(key) = read_env_str(&env, "SUPABASE_ANON_KEY", "supabase_anon_key")
                    {
                        cfg.anon_key = key;
                    }
                }
            }
        }

        cfg
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn read_env_str(env: &wasm_bindgen::JsValue, key: &str, fallback_key: &str) -> Option<String> {
    for k in [key, fallback_key] {
        if let Ok(v) = js_sys::Reflect::get(env, &(*k).into()) {
            if let Some(s) = v.as_string() {
                return Some(s);
            }
        }
    }
    None
}

#[derive(Serialize, Clone, Debug)]
struct PasswordGrantRequest {
    email: String,
    password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct SignInResponse {
    pub access_token: String,
    pub user: SessionUser,
}

#[derive(Serialize, Clone, Debug)]
struct NewBookmarkRow<'a> {
    title: &'a str,
    url: &'a str,
    user_id: &'a str,
}

/// Filter + order query for the initial snapshot: the current user's rows,
/// newest first.
pub(crate) fn snapshot_query(user_id: &str) -> String {
    format!("?select=*&user_id=eq.{user_id}&order=created_at.desc")
}

/// Thin facade over the hosted backend: auth (GoTrue) and row CRUD (PostgREST).
/// Retries, batching, and transport concerns stay on the other side of this
/// boundary.
#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) anon_key: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self {
            base_url,
            anon_key,
            token: None,
        }
    }

    pub fn load_from_storage() -> Self {
        let cfg = EnvConfig::new();
        let token = leptos::web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item(TOKEN_KEY).ok().flatten());

        Self {
            base_url: cfg.supabase_url,
            anon_key: cfg.anon_key,
            token,
        }
    }

    pub fn save_to_storage(&self) {
        if let Some(storage) =
            leptos::web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        {
            if let Some(token) = &self.token {
                let _ = storage.set_item(TOKEN_KEY, token);
            }
        }
    }

    pub fn clear_storage() {
        if let Some(storage) =
            leptos::web_sys::window().and_then(|w| w.local_storage().ok().flatten())
        {
            let _ = storage.remove_item(TOKEN_KEY);
            let _ = storage.remove_item(USER_KEY);
        }
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub(crate) fn get_auth_token(&self) -> Option<String> {
        self.token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn logout(&mut self) {
        self.token = None;
        Self::clear_storage();
    }

    fn with_service_headers(&self, mut req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req = req.header("apikey", self.anon_key.clone());
        if let Some(token) = self.get_auth_token() {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        req
    }

    fn rest_url(&self, query: &str) -> String {
        format!("{}/rest/v1/bookmarks{}", self.base_url, query)
    }

    async fn send(&self, req: reqwest::RequestBuilder, ctx: &str) -> ApiResult<reqwest::Response> {
        let res = req.send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            Ok(res)
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, ctx))
        }
    }

    /// Password-grant sign-in. The anon key authenticates the request; the
    /// returned access token scopes every later call to this user's rows.
    pub async fn sign_in(&self, email: &str, password: &str) -> ApiResult<SignInResponse> {
        let client = reqwest::Client::new();
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let req = client
            .post(url)
            .header("apikey", self.anon_key.clone())
            .json(&PasswordGrantRequest {
                email: email.to_string(),
                password: password.to_string(),
            });

        let res = self.send(req, "Sign in failed").await?;
        res.json().await.map_err(ApiError::parse)
    }

    /// Best-effort server-side session revocation. The local session is
    /// cleared by the caller regardless of the outcome.
    pub async fn sign_out(&self) -> ApiResult<()> {
        let client = reqwest::Client::new();
        let url = format!("{}/auth/v1/logout", self.base_url);
        let req = self.with_service_headers(client.post(url));
        self.send(req, "Sign out failed").await?;
        Ok(())
    }

    /// Initial snapshot: all of the user's bookmarks, newest first.
    pub async fn fetch_bookmarks(&self, user_id: &str) -> ApiResult<Vec<Bookmark>> {
        let client = reqwest::Client::new();
        let req = self.with_service_headers(client.get(self.rest_url(&snapshot_query(user_id))));

        let res = self.send(req, "Loading bookmarks failed").await?;
        let data: serde_json::Value = res.json().await.map_err(ApiError::parse)?;
        Ok(Self::parse_bookmark_rows(data))
    }

    /// Insert one bookmark and return the created row
    /// (`Prefer: return=representation`).
    pub async fn insert_bookmark(
        &self,
        title: &str,
        url: &str,
        user_id: &str,
    ) -> ApiResult<Bookmark> {
        let client = reqwest::Client::new();
        let req = self
            .with_service_headers(client.post(self.rest_url("")))
            .header("Prefer", "return=representation")
            .json(&[NewBookmarkRow {
                title,
                url,
                user_id,
            }]);

        let res = self.send(req, "Adding bookmark failed").await?;
        let data: serde_json::Value = res.json().await.map_err(ApiError::parse)?;

        Self::parse_bookmark_rows(data)
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::parse("Insert succeeded but response has no row"))
    }

    /// Delete by id. The visible removal is expected to arrive through the
    /// change feed, not from this call.
    pub async fn delete_bookmark(&self, id: &str) -> ApiResult<()> {
        let client = reqwest::Client::new();
        let req =
            self.with_service_headers(client.delete(self.rest_url(&format!("?id=eq.{id}"))));
        self.send(req, "Deleting bookmark failed").await?;
        Ok(())
    }

    /// PostgREST returns a plain JSON array of rows. Malformed entries are
    /// skipped rather than failing the whole response.
    pub(crate) fn parse_bookmark_rows(data: serde_json::Value) -> Vec<Bookmark> {
        let list = data.as_array().cloned().unwrap_or_default();

        let mut out: Vec<Bookmark> = Vec::with_capacity(list.len());
        for item in list {
            match serde_json::from_value::<Bookmark>(item) {
                Ok(b) if !b.id.trim().is_empty() => out.push(b),
                _ => {}
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new(
            "http://localhost:54321".to_string(),
            "anon-key".to_string(),
        )
    }

    #[test]
    fn test_sign_in_response_contract_deserialize() {
        // Contract based on GoTrue's password-grant token endpoint.
        let json = r#"{
            "access_token": "jwt-token",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "r",
            "user": {"id": "u1", "email": "u@example.com", "aud": "authenticated"}
        }"#;
        let parsed: SignInResponse =
            serde_json::from_str(json).expect("sign-in response should parse");
        assert_eq!(parsed.access_token, "jwt-token");
        assert_eq!(parsed.user.id, "u1");
    }

    #[test]
    fn test_snapshot_query_filters_and_orders() {
        assert_eq!(
            snapshot_query("u1"),
            "?select=*&user_id=eq.u1&order=created_at.desc"
        );
    }

    #[test]
    fn test_insert_body_is_a_row_array() {
        let body = serde_json::to_value([NewBookmarkRow {
            title: "Example",
            url: "https://example.com",
            user_id: "u1",
        }])
        .expect("should serialize");
        assert!(body.is_array());
        assert_eq!(body[0]["title"], "Example");
        assert_eq!(body[0]["user_id"], "u1");
    }

    #[test]
    fn test_parse_bookmark_rows_skips_malformed() {
        let data = serde_json::json!([
            {"id": "b1", "title": "A", "url": "http://a", "user_id": "u1", "created_at": "t1"},
            {"title": "missing id", "url": "http://x"},
            {"id": "", "title": "blank id", "url": "http://y", "user_id": "u1"},
            {"id": "b2", "title": "B", "url": "http://b", "user_id": "u1", "created_at": "t2"}
        ]);
        let rows = ApiClient::parse_bookmark_rows(data);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "b1");
        assert_eq!(rows[1].id, "b2");
    }

    #[test]
    fn test_parse_bookmark_rows_non_array_is_empty() {
        let rows = ApiClient::parse_bookmark_rows(serde_json::json!({"message": "error"}));
        assert!(rows.is_empty());
    }

    #[test]
    fn test_rest_url() {
        let c = client();
        assert_eq!(
            c.rest_url("?id=eq.b1"),
            "http://localhost:54321/rest/v1/bookmarks?id=eq.b1"
        );
    }

    #[test]
    fn test_api_client_token_state() {
        let mut c = client();
        assert!(!c.is_authenticated());
        c.set_token("t".to_string());
        assert!(c.is_authenticated());
        assert_eq!(c.get_auth_token().as_deref(), Some("t"));
    }
}
