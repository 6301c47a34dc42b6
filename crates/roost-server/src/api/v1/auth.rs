use actix_web::{
    HttpRequest, HttpResponse, post,
    cookie::{Cookie, SameSite, time::Duration},
    web,
};
use validator::Validate;

use roost_auth::{
    model::{AUTHORIZATION_HEADER, ROLE_COOKIE, TOKEN_COOKIE, TOKEN_PREFIX, USER_ID_COOKIE},
    service::{
        auth,
        user::{self, NewAccount},
    },
};

use crate::{
    error::AppError,
    metrics,
    middleware::auth::extract_token,
    model::{
        AppState,
        request::{LoginRequest, RegisterRequest},
        response::MessageResult,
    },
};

fn session_cookie(name: &'static str, value: String, max_age: i64, http_only: bool) -> Cookie<'static> {
    Cookie::build(name, value)
        .path("/")
        .http_only(http_only)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age))
        .finish()
}

fn expired_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, "").path("/").finish();
    cookie.make_removal();
    cookie
}

#[post("/register")]
async fn register(
    data: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;
    let body = body.into_inner();

    let user = user::register(
        data.persistence(),
        NewAccount {
            name: body.name,
            email: body.email,
            password: body.password,
            phone: body.phone,
        },
        data.configuration.bcrypt_cost(),
    )
    .await?;

    Ok(HttpResponse::Created().json(user))
}

/// Issue a JWT in the body, the `Authorization` header and session cookies
#[post("/login")]
async fn login(
    data: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    let result = user::login(
        data.persistence(),
        &body.email,
        &body.password,
        &data.configuration.token_secret_key(),
        data.configuration.auth_token_expire_seconds(),
    )
    .await;
    metrics::record_login(result.is_ok());
    let result = result?;

    let ttl = result.token_ttl;
    Ok(HttpResponse::Ok()
        .insert_header((
            AUTHORIZATION_HEADER,
            format!("{}{}", TOKEN_PREFIX, result.access_token),
        ))
        .cookie(session_cookie(TOKEN_COOKIE, result.access_token.clone(), ttl, true))
        .cookie(session_cookie(ROLE_COOKIE, result.role.to_string(), ttl, false))
        .cookie(session_cookie(USER_ID_COOKIE, result.user_id.clone(), ttl, false))
        .json(result))
}

#[post("/logout")]
async fn logout(req: HttpRequest) -> HttpResponse {
    if let Some(token) = extract_token(&req) {
        auth::invalidate_token(&token);
    }

    let mut response = MessageResult::http_ok("logged out");
    for name in [TOKEN_COOKIE, ROLE_COOKIE, USER_ID_COOKIE] {
        if let Err(e) = response.add_cookie(&expired_cookie(name)) {
            tracing::warn!("Failed to clear cookie {}: {}", name, e);
        }
    }
    response
}
