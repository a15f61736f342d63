#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response, header},
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use shopease_api::{
    app::build_router,
    config::HttpLimits,
    middleware::cors::CorsPolicy,
    repos::error::RepoError,
    services::{
        auth::{
            AccessPolicy, AuthService, Credential, CredentialStore, Identity, NewCredential,
            PasswordHasher, Role, SigningKey, TokenCodec, TokenConfig, policy::shop_policy,
        },
        catalog::{
            Category, CategoryStore, NewCategory, Product, ProductFilter, ProductInput,
            ProductStore,
        },
    },
    state::AppState,
};

pub const ALLOWED_ORIGIN: &str = "http://localhost:3000";

#[derive(Default)]
pub struct MemoryCredentials {
    users: Mutex<BTreeMap<String, Credential>>,
}

impl MemoryCredentials {
    pub fn is_empty(&self) -> bool {
        self.users.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentials {
    async fn find_by_login_id(&self, login_id: &str) -> Result<Option<Credential>, RepoError> {
        Ok(self.users.lock().unwrap().get(login_id).cloned())
    }

    async fn create(&self, new: NewCredential) -> Result<Credential, RepoError> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&new.login_id) {
            return Err(RepoError::Conflict);
        }
        let credential = Credential {
            user_id: Uuid::new_v4(),
            login_id: new.login_id.clone(),
            password_hash: new.password_hash,
            roles: new.roles,
        };
        users.insert(new.login_id, credential.clone());
        Ok(credential)
    }
}

#[derive(Default)]
pub struct MemoryCatalog {
    categories: Mutex<BTreeMap<i64, Category>>,
    products: Mutex<BTreeMap<i64, Product>>,
}

impl MemoryCatalog {
    pub fn category_count(&self) -> usize {
        self.categories.lock().unwrap().len()
    }

    fn next_id<T>(map: &BTreeMap<i64, T>) -> i64 {
        map.keys().next_back().map_or(1, |id| id + 1)
    }

    fn product(id: i64, input: ProductInput) -> Product {
        Product {
            id,
            name: input.name,
            description: input.description,
            price_cents: input.price_cents,
            stock: input.stock,
            image_url: input.image_url,
            category_id: input.category_id,
        }
    }
}

#[async_trait]
impl CategoryStore for MemoryCatalog {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        Ok(self.categories.lock().unwrap().values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Category>, RepoError> {
        Ok(self.categories.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, new: NewCategory) -> Result<Category, RepoError> {
        let mut categories = self.categories.lock().unwrap();
        if categories.values().any(|c| c.name == new.name) {
            return Err(RepoError::Conflict);
        }
        let category = Category {
            id: Self::next_id(&categories),
            name: new.name,
            description: new.description,
        };
        categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.categories.lock().unwrap().remove(&id).is_some())
    }
}

#[async_trait]
impl ProductStore for MemoryCatalog {
    async fn list(&self) -> Result<Vec<Product>, RepoError> {
        Ok(self.products.lock().unwrap().values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Product>, RepoError> {
        Ok(self.products.lock().unwrap().get(&id).cloned())
    }

    async fn create(&self, input: ProductInput) -> Result<Product, RepoError> {
        let mut products = self.products.lock().unwrap();
        let product = Self::product(Self::next_id(&products), input);
        products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(&self, id: i64, input: ProductInput) -> Result<Option<Product>, RepoError> {
        let mut products = self.products.lock().unwrap();
        let Some(slot) = products.get_mut(&id) else {
            return Ok(None);
        };
        *slot = Self::product(id, input);
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.products.lock().unwrap().remove(&id).is_some())
    }

    async fn search(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepoError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }
}

pub fn token_config() -> TokenConfig {
    TokenConfig {
        signing_key: SigningKey::new(vec![7u8; 32]).unwrap(),
        issuer: "shopease".into(),
        audience: "shopease-web".into(),
        ttl: chrono::Duration::seconds(3600),
        leeway_seconds: 0,
    }
}

/// The production router over in-memory stores.
pub struct TestApp {
    pub router: Router,
    pub codec: TokenCodec,
    pub credentials: Arc<MemoryCredentials>,
    pub catalog: Arc<MemoryCatalog>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_policy(shop_policy().unwrap())
    }

    pub fn with_policy(policy: AccessPolicy) -> Self {
        let codec = TokenCodec::new(&token_config());
        let credentials = Arc::new(MemoryCredentials::default());
        let catalog = Arc::new(MemoryCatalog::default());

        let auth = AuthService::new(codec.clone(), PasswordHasher::new(), credentials.clone())
            .unwrap();
        let state = AppState::new(
            Arc::new(auth),
            Arc::new(policy),
            catalog.clone(),
            catalog.clone(),
        );

        let cors = CorsPolicy::new(&[ALLOWED_ORIGIN.to_string()], true).unwrap();
        let limits = HttpLimits {
            body_limit_bytes: 1024 * 1024,
            timeout: Duration::from_secs(30),
        };

        Self {
            router: build_router(state, &cors, limits),
            codec,
            credentials,
            catalog,
        }
    }

    pub fn token_for(&self, roles: &[Role]) -> String {
        let identity = Identity::new(
            "someone@example.com".to_string(),
            Uuid::new_v4(),
            roles.iter().copied().collect::<BTreeSet<_>>(),
        )
        .unwrap();
        self.codec.issue_now(&identity).unwrap().token
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    request("GET", uri, token, None)
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn json_body(res: Response<Body>) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
