use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        EpigramError::asset_not_found("x")
            .to_string()
            .contains("asset not found:")
    );
    assert!(
        EpigramError::image_load(std::io::Error::other("boom"))
            .to_string()
            .contains("image load error:")
    );
    assert!(EpigramError::layout("x").to_string().contains("layout error:"));
    assert!(
        EpigramError::render(std::io::Error::other("boom"))
            .to_string()
            .contains("render error:")
    );
}

#[test]
fn image_load_preserves_cause_chain() {
    use anyhow::Context;

    let cause: Result<(), _> = Err(std::io::Error::other("decoder exploded"));
    let err = EpigramError::image_load(cause.context("open background bg.png").unwrap_err());

    let text = err.to_string();
    assert!(text.contains("open background bg.png"));
    assert!(text.contains("decoder exploded"));

    let EpigramError::ImageLoad(inner) = err else {
        panic!("expected ImageLoad");
    };
    assert_eq!(inner.chain().count(), 2);
}

#[test]
fn render_wraps_arbitrary_errors() {
    let err = EpigramError::render(std::fmt::Error);
    assert!(matches!(err, EpigramError::Render(_)));
}
