use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        WaylineError::config("x")
            .to_string()
            .contains("config error:")
    );
    assert!(WaylineError::font("x").to_string().contains("font error:"));
    assert!(
        WaylineError::render("x")
            .to_string()
            .contains("render error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = WaylineError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
