use extractor_core::{update, ExtractionConfig, Msg, Session};

#[test]
fn update_is_noop() {
    let (state, _) = Session::start("https://player.example.com/e/1", ExtractionConfig::default());
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}
