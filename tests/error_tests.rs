use axum::{
    http::StatusCode,
    response::IntoResponse,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tpo_admin::error::{AppError, ErrorBody, FieldError};

// Test for AppError Display implementation
#[test]
fn test_app_error_display() {
    let error1 = AppError::not_found("student", "42");
    assert_eq!(error1.to_string(), "Not found: student 42");

    let error2 = AppError::InvalidRequest("missing body".to_string());
    assert_eq!(error2.to_string(), "Invalid request: missing body");

    let error3 = AppError::Validation(vec![
        FieldError::new("name", "Name must be at least 2 characters"),
        FieldError::new("email", "Email is required"),
    ]);
    assert_eq!(error3.to_string(), "Validation failed: name, email");

    let error4 = AppError::Conflict("registration number CS2021001 is already in use".to_string());
    assert_eq!(
        error4.to_string(),
        "Conflict: registration number CS2021001 is already in use"
    );

    let error5 = AppError::Unauthorized("missing bearer token".to_string());
    assert_eq!(error5.to_string(), "Unauthorized: missing bearer token");
}

#[test]
fn test_app_error_status_codes() {
    assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::InvalidRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::Validation(vec![]).status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
    assert_eq!(AppError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::Upstream("x".into()).status_code(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        AppError::SerializationError("x".into()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        AppError::InternalError("x".into()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

// Test for AppError IntoResponse implementation
#[tokio::test]
async fn test_app_error_into_response() {
    let error = AppError::not_found("job", "abc");
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(body["error"], "Not found: job abc");
    assert!(body.get("fields").is_none());

    let error = AppError::Validation(vec![FieldError::new("cgpa", "CGPA must be between 0 and 10")]);
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(body["error"], "Validation failed: cgpa");
    assert_eq!(body["fields"][0]["field"], "cgpa");
    assert_eq!(body["fields"][0]["message"], "CGPA must be between 0 and 10");
}

#[test]
fn test_error_body_maps_back_to_app_error() {
    let body = ErrorBody {
        error: "Validation failed: year".to_string(),
        fields: Some(vec![FieldError::new("year", "Year must be between 1 and 4")]),
    };
    match body.into_app_error(StatusCode::UNPROCESSABLE_ENTITY) {
        AppError::Validation(fields) => assert_eq!(fields[0].field, "year"),
        other => panic!("expected validation error, got {:?}", other),
    }

    let body = ErrorBody {
        error: "Not found: student 1".to_string(),
        fields: None,
    };
    assert!(matches!(
        body.into_app_error(StatusCode::NOT_FOUND),
        AppError::NotFound(_)
    ));

    let body = ErrorBody {
        error: "boom".to_string(),
        fields: None,
    };
    assert!(matches!(
        body.into_app_error(StatusCode::INTERNAL_SERVER_ERROR),
        AppError::Upstream(_)
    ));
}

#[test]
fn test_serde_error_converts() {
    let err = serde_json::from_str::<Value>("{not json").unwrap_err();
    assert!(matches!(AppError::from(err), AppError::SerializationError(_)));
}
