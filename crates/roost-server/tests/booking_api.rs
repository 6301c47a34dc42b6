#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{Value, json};

use common::{app_state, bearer, product_request, seed_host, seed_product, seed_user, url};

fn booking(product_id: &str, check_in: &str, check_out: &str) -> Value {
    json!({"productId": product_id, "checkIn": check_in, "checkOut": check_out, "guests": 2})
}

#[actix_web::test]
async fn test_overlap_rejected_and_touching_accepted() {
    let state = app_state();
    let host = seed_host(&state, "host@example.com").await;
    let guest = seed_user(&state, "guest@example.com").await;
    let other = seed_user(&state, "other@example.com").await;
    let listing = seed_product(&state, &host, product_request("Lisbon", "apartment", 100.0, 4)).await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri(&url("/bookings/create"))
        .insert_header(bearer(&guest.token))
        .set_json(booking(&listing.id, "2030-06-01", "2030-06-05"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["nights"], 4);
    assert_eq!(created["totalPrice"], 400.0);
    assert_eq!(created["status"], "confirmed");

    let req = test::TestRequest::post()
        .uri(&url("/bookings/create"))
        .insert_header(bearer(&other.token))
        .set_json(booking(&listing.id, "2030-06-04", "2030-06-06"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "listing is not available for these dates");

    let req = test::TestRequest::post()
        .uri(&url("/bookings/create"))
        .insert_header(bearer(&other.token))
        .set_json(booking(&listing.id, "2030-06-05", "2030-06-08"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri(&url(&format!("/product/{}/availability", listing.id)))
        .to_request();
    let ranges: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ranges.as_array().unwrap().len(), 2);
    assert_eq!(ranges[0]["checkIn"], "2030-06-01");
}

#[actix_web::test]
async fn test_inverted_dates_rejected_before_listing_lookup() {
    let state = app_state();
    let guest = seed_user(&state, "guest@example.com").await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri(&url("/bookings/create"))
        .insert_header(bearer(&guest.token))
        .set_json(booking("no-such-listing", "2030-06-05", "2030-06-01"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "check-out date must be after check-in date");
}

#[actix_web::test]
async fn test_missing_listing_and_guest_limit() {
    let state = app_state();
    let host = seed_host(&state, "host@example.com").await;
    let guest = seed_user(&state, "guest@example.com").await;
    let listing = seed_product(&state, &host, product_request("Porto", "house", 80.0, 2)).await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri(&url("/bookings/create"))
        .insert_header(bearer(&guest.token))
        .set_json(booking("no-such-listing", "2030-06-01", "2030-06-02"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri(&url("/bookings/create"))
        .insert_header(bearer(&guest.token))
        .set_json(json!({
            "productId": listing.id,
            "checkIn": "2030-06-01",
            "checkOut": "2030-06-02",
            "guests": 3
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_booking_requires_token() {
    let state = app_state();
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri(&url("/bookings/create"))
        .set_json(booking("p1", "2030-06-01", "2030-06-02"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_concurrent_requests_book_once() {
    let state = app_state();
    let host = seed_host(&state, "host@example.com").await;
    let listing = seed_product(&state, &host, product_request("Faro", "villa", 150.0, 6)).await;

    let mut guests = Vec::new();
    for i in 0..6 {
        guests.push(seed_user(&state, &format!("guest{}@example.com", i)).await);
    }
    let app = test_app!(state);

    let requests = guests.iter().map(|guest| {
        let req = test::TestRequest::post()
            .uri(&url("/bookings/create"))
            .insert_header(bearer(&guest.token))
            .set_json(booking(&listing.id, "2030-08-10", "2030-08-15"))
            .to_request();
        test::call_service(&app, req)
    });
    let responses = futures::future::join_all(requests).await;

    let created = responses
        .iter()
        .filter(|r| r.status() == StatusCode::CREATED)
        .count();
    assert_eq!(created, 1);
}

#[actix_web::test]
async fn test_cancel_rules() {
    let state = app_state();
    let host = seed_host(&state, "host@example.com").await;
    let guest = seed_user(&state, "guest@example.com").await;
    let stranger = seed_user(&state, "stranger@example.com").await;
    let listing = seed_product(&state, &host, product_request("Braga", "cabin", 60.0, 2)).await;
    let app = test_app!(state);

    let mut ids = Vec::new();
    for (check_in, check_out) in [("2020-01-01", "2020-01-03"), ("2030-01-01", "2030-01-03")] {
        let req = test::TestRequest::post()
            .uri(&url("/bookings/create"))
            .insert_header(bearer(&guest.token))
            .set_json(booking(&listing.id, check_in, check_out))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        ids.push(body["id"].as_str().unwrap().to_string());
    }

    // past stay
    let req = test::TestRequest::delete()
        .uri(&url(&format!("/bookings/{}", ids[0])))
        .insert_header(bearer(&guest.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::delete()
        .uri(&url(&format!("/bookings/{}", ids[1])))
        .insert_header(bearer(&stranger.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&url(&format!("/bookings/{}", ids[1])))
        .insert_header(bearer(&guest.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "cancelled");

    let req = test::TestRequest::delete()
        .uri(&url("/bookings/no-such-booking"))
        .insert_header(bearer(&guest.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_booking_visibility() {
    let state = app_state();
    let host = seed_host(&state, "host@example.com").await;
    let guest = seed_user(&state, "guest@example.com").await;
    let stranger = seed_user(&state, "stranger@example.com").await;
    let listing = seed_product(&state, &host, product_request("Lisbon", "loft", 90.0, 2)).await;
    let app = test_app!(state);

    let req = test::TestRequest::post()
        .uri(&url("/bookings/create"))
        .insert_header(bearer(&guest.token))
        .set_json(booking(&listing.id, "2030-03-01", "2030-03-04"))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let booking_id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&url("/bookings"))
        .insert_header(bearer(&guest.token))
        .to_request();
    let mine: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);

    for (token, expected) in [
        (&guest.token, StatusCode::OK),
        (&host.token, StatusCode::OK),
        (&stranger.token, StatusCode::FORBIDDEN),
    ] {
        let req = test::TestRequest::get()
            .uri(&url(&format!("/bookings/{}", booking_id)))
            .insert_header(bearer(token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
    }

    let req = test::TestRequest::get()
        .uri(&url(&format!("/bookings/product/{}", listing.id)))
        .insert_header(bearer(&host.token))
        .to_request();
    let for_host: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(for_host.as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri(&url(&format!("/bookings/product/{}", listing.id)))
        .insert_header(bearer(&guest.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}
