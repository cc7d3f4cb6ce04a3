use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        MockupError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(MockupError::decode("x").to_string().contains("decode error:"));
    assert!(MockupError::render("x").to_string().contains("render error:"));
    assert!(MockupError::encode("x").to_string().contains("encode error:"));
    assert!(MockupError::io("x").to_string().contains("io error:"));
    assert!(
        MockupError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MockupError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_decode_and_io_are_input_errors() {
    assert!(MockupError::decode("bad png").is_input_error());
    assert!(MockupError::io("missing").is_input_error());
    assert!(!MockupError::render("x").is_input_error());
    assert!(!MockupError::encode("x").is_input_error());
    assert!(!MockupError::validation("x").is_input_error());
}
