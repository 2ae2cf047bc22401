use super::*;

#[test]
fn kind_tag_matches_each_variant() {
    assert_eq!(Error::Invalid("x".into()).kind_tag(), "invalid");
    assert_eq!(Error::NotFound("x".into()).kind_tag(), "not_found");
    assert_eq!(Error::Conflict("x".into()).kind_tag(), "conflict");
    assert_eq!(Error::Unauthorized("x".into()).kind_tag(), "unauthorized");
    assert_eq!(Error::Forbidden("x".into()).kind_tag(), "forbidden");
    assert_eq!(
        Error::RuntimeUnavailable("x".into()).kind_tag(),
        "runtime_unavailable"
    );
    assert_eq!(Error::ImagePull("x".into()).kind_tag(), "image_pull");
    assert_eq!(Error::Internal("x".into()).kind_tag(), "internal");
}

#[test]
fn display_includes_message() {
    let err = Error::NotFound("srv-abc123 not found".to_string());
    assert_eq!(err.to_string(), "not found: srv-abc123 not found");
}

#[test]
fn error_is_cloneable() {
    let err = Error::Conflict("port 25565 already bound".to_string());
    let cloned = err.clone();
    assert_eq!(err.to_string(), cloned.to_string());
}
