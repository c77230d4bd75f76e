// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use mimesis_gallery::error::AppError;

#[test]
fn test_is_credential_error_matches() {
    for code in [
        "EMAIL_NOT_FOUND",
        "INVALID_PASSWORD",
        "INVALID_LOGIN_CREDENTIALS",
        "EMAIL_EXISTS",
        "WEAK_PASSWORD : Password should be at least 6 characters",
    ] {
        let err = AppError::IdentityProvider(code.to_string());
        assert!(err.is_credential_error(), "{}", code);
    }
}

#[test]
fn test_is_credential_error_no_match() {
    let err = AppError::IdentityProvider("HTTP 503 Service Unavailable: ".to_string());
    assert!(!err.is_credential_error());

    let err = AppError::IdentityProvider("TOO_MANY_ATTEMPTS_TRY_LATER".to_string());
    assert!(!err.is_credential_error());

    let err = AppError::BadRequest("EMAIL_NOT_FOUND".to_string());
    assert!(!err.is_credential_error());
}

#[test]
fn test_status_codes() {
    let cases = [
        (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        (AppError::InvalidToken, StatusCode::UNAUTHORIZED),
        (AppError::NotFound("x".to_string()), StatusCode::NOT_FOUND),
        (AppError::BadRequest("x".to_string()), StatusCode::BAD_REQUEST),
        (AppError::Conflict("x".to_string()), StatusCode::CONFLICT),
        (
            AppError::IdentityProvider("INVALID_PASSWORD".to_string()),
            StatusCode::UNAUTHORIZED,
        ),
        (
            AppError::IdentityProvider("HTTP 500".to_string()),
            StatusCode::BAD_GATEWAY,
        ),
        (AppError::Storage("x".to_string()), StatusCode::BAD_GATEWAY),
        (
            AppError::Database("x".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            AppError::Internal(anyhow::anyhow!("x")),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, status) in cases {
        assert_eq!(err.into_response().status(), status);
    }
}
