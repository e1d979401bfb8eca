use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        AnimError::syntax(3, "x")
            .to_string()
            .contains("syntax error at line 3:")
    );
    assert!(AnimError::render("x").to_string().contains("render error:"));
    assert!(AnimError::cache("x").to_string().contains("cache error:"));
    assert!(AnimError::config("x").to_string().contains("config error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = AnimError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn resolution_errors_carry_their_line() {
    let err = AnimError::DuplicateName {
        name: "x".to_string(),
        line: 2,
        first_line: 1,
    };
    assert_eq!(err.line(), Some(2));
    assert!(err.to_string().contains("duplicate name 'x' at line 2"));
    assert_eq!(AnimError::render("boom").line(), None);
}

#[test]
fn blank_render_output_is_dropped() {
    let AnimError::Render { output, .. } = AnimError::render_with_output("exit 1", "  \n") else {
        panic!("expected render error");
    };
    assert!(output.is_none());
}
