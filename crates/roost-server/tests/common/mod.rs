// Shared fixtures for the HTTP tests: an app over the in-memory store, a
// signer that never talks to S3, and helpers that seed accounts directly
// through the services.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use async_trait::async_trait;
use config::Config;

use roost_auth::{
    AuthContext,
    service::{
        auth::encode_jwt_token,
        user::{NewAccount, register},
    },
};
use roost_common::UserRole;
use roost_persistence::{MemoryPersistService, PersistenceService, ProductInfo, UserInfo};
use roost_server::{
    model::{
        AppState, Configuration,
        request::{CreateProductRequest, LocationRequest, RegisterBusinessRequest},
    },
    service::{product, upload::UploadSigner, user},
};

pub const CONTEXT_PATH: &str = "/api/v1";
pub const SECRET: &str = "cm9vc3QtdGVzdC1zZWNyZXQta2V5LTAxMjM0NTY3ODlhYmNkZWY=";
pub const PASSWORD: &str = "secret123";

/// Builds the service under test with the authentication middleware
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(roost_server::middleware::auth::Authentication)
                .app_data($state.clone())
                .configure(|cfg| {
                    roost_server::startup::configure_app(cfg, common::CONTEXT_PATH)
                }),
        )
        .await
    };
}

pub struct FakeSigner;

#[async_trait]
impl UploadSigner for FakeSigner {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> anyhow::Result<String> {
        Ok(format!(
            "https://photos.s3.test/{}?type={}&expires={}",
            key,
            content_type,
            expires_in.as_secs()
        ))
    }
}

pub fn configuration() -> Configuration {
    let config = Config::builder()
        .set_override("roost.storage.mode", "memory")
        .and_then(|b| b.set_override("roost.auth.token.secret.key", SECRET))
        .and_then(|b| b.set_override("roost.auth.bcrypt.cost", 4))
        .and_then(|b| b.set_override("roost.s3.bucket", "photos"))
        .and_then(|b| b.set_override("roost.s3.publicBaseUrl", "https://cdn.test"))
        .and_then(|b| b.build())
        .unwrap();
    Configuration::from_config(config)
}

pub fn app_state() -> web::Data<AppState> {
    let persistence: Arc<dyn PersistenceService> = Arc::new(MemoryPersistService::new());
    web::Data::new(AppState::new(
        configuration(),
        persistence,
        Arc::new(FakeSigner),
    ))
}

pub fn url(path: &str) -> String {
    format!("{}{}", CONTEXT_PATH, path)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// A signed-in account
pub struct Session {
    pub user: UserInfo,
    pub token: String,
}

impl Session {
    pub fn ctx(&self) -> AuthContext {
        AuthContext {
            user_id: self.user.id.clone(),
            role: self.user.role,
            jwt_error: None,
            token_provided: true,
        }
    }
}

fn sign(user: &UserInfo) -> String {
    encode_jwt_token(&user.id, user.role, SECRET, 3600).unwrap()
}

pub async fn seed_user(state: &web::Data<AppState>, email: &str) -> Session {
    let user = register(
        state.persistence(),
        NewAccount {
            name: "Test Guest".to_string(),
            email: email.to_string(),
            password: PASSWORD.to_string(),
            phone: None,
        },
        4,
    )
    .await
    .unwrap();

    let token = sign(&user);
    Session { user, token }
}

/// A user that registered a business
pub async fn seed_host(state: &web::Data<AppState>, email: &str) -> Session {
    let guest = seed_user(state, email).await;

    user::register_business(
        state.persistence(),
        &guest.ctx(),
        &guest.user.id,
        RegisterBusinessRequest {
            name: "Harbour Stays".to_string(),
            description: String::new(),
            phone: "+351 210 000 000".to_string(),
            email: email.to_string(),
            address: "Porto".to_string(),
        },
    )
    .await
    .unwrap();

    let mut user = guest.user;
    user.role = UserRole::Business;
    let token = sign(&user);
    Session { user, token }
}

pub fn product_request(city: &str, category: &str, price: f64, max_guests: i32) -> CreateProductRequest {
    CreateProductRequest {
        title: format!("Stay in {}", city),
        description: "Quiet and bright".to_string(),
        category: category.to_string(),
        location: LocationRequest {
            address: "1 Main Street".to_string(),
            city: city.to_string(),
            country: "PT".to_string(),
            lat: None,
            lng: None,
        },
        price,
        max_guests,
        bedrooms: 1,
        beds: 1,
        bathrooms: 1,
        amenities: vec!["wifi".to_string()],
        images: vec![],
    }
}

pub async fn seed_product(
    state: &web::Data<AppState>,
    host: &Session,
    request: CreateProductRequest,
) -> ProductInfo {
    product::create(state.persistence(), &host.ctx(), request)
        .await
        .unwrap()
}
