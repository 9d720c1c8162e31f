use super::*;

fn status(status: StatusCode, api: Option<ApiError>) -> TransportError {
    TransportError::Status {
        url: "http://localhost:3001/api/todos/1".to_string(),
        status,
        api,
    }
}

#[test]
fn not_found_body_means_the_record_is_gone() {
    let err = status(StatusCode::NOT_FOUND, Some(ApiError::not_found("task 1 not found")));
    assert!(err.is_not_found());
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[test]
fn bare_404_still_counts_as_gone() {
    assert!(status(StatusCode::NOT_FOUND, None).is_not_found());
}

#[test]
fn not_found_status_with_another_error_code_is_not_tolerated() {
    let err = status(StatusCode::NOT_FOUND, Some(ApiError::validation("bad id")));
    assert!(!err.is_not_found());

    let err = status(
        StatusCode::NOT_FOUND,
        Some(ApiError::new(ErrorCode::Internal, "routing failed")),
    );
    assert!(!err.is_not_found());
}

#[test]
fn other_statuses_are_not_not_found() {
    let err = status(
        StatusCode::SERVICE_UNAVAILABLE,
        Some(ApiError::not_found("task 1 not found")),
    );
    assert!(!err.is_not_found());
    assert!(!TransportError::invalid_url("nope", "bad").is_not_found());
}
