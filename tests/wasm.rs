// Browser smoke tests, run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn start_game_fails_without_container() {
    // The harness page has no #game-container, so mounting must refuse
    // rather than panic.
    assert!(drop_catch::start_game().is_err());
}

#[wasm_bindgen_test]
fn start_game_mounts_once_container_exists() {
    let doc = web_sys::window().unwrap().document().unwrap();
    let container = doc.create_element("div").unwrap();
    container.set_id("game-container");
    doc.body().unwrap().append_child(&container).unwrap();

    assert!(drop_catch::start_game().is_ok());

    container.remove();
}
