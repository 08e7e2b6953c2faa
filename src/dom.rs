//! Browser adapter: wires the pure [`GameSession`] to the page.
//!
//! Expected markup mirrors the stylesheet contract: a `#game-container` box
//! the drops fall inside, `#score` / `#time` readouts, a `#start-btn`, and
//! `input[name="difficulty"]` radios. Drops are `div.water-drop` elements
//! (plus `bad-drop` for penalty drops); the falling motion itself is a CSS
//! animation whose duration we set from the session's difficulty. All timing
//! runs off one `requestAnimationFrame` loop feeding timestamps into
//! `GameSession::advance`; clicks are caught by a single delegated listener
//! on the container.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, Document, Element, HtmlElement, HtmlInputElement, MouseEvent};

use crate::rng::SplitMix64;
use crate::session::{
    Difficulty, DropId, GameSession, SessionEvent, SessionState, Verdict,
};

const WIN_COLOR: &str = "#FFC907";
const LOSE_COLOR: &str = "#BF6C46";
const GOOD_POPUP_COLOR: &str = "#003366";
const POPUP_LIFETIME_MS: i32 = 650;

struct DomGame {
    session: GameSession,
    rng: SplitMix64,
    container: HtmlElement,
    score_el: Option<Element>,
    time_el: Option<Element>,
    /// Live drop elements by id; entries leave when the drop resolves.
    drops: HashMap<DropId, HtmlElement>,
}

thread_local! {
    static GAME: RefCell<Option<DomGame>> = const { RefCell::new(None) };
}

/// Attach to the DOM and arm the start button. The session itself stays Idle
/// until the player clicks start.
pub fn mount() -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win.document().ok_or_else(|| JsValue::from_str("no document"))?;

    let container: HtmlElement = doc
        .get_element_by_id("game-container")
        .ok_or_else(|| JsValue::from_str("missing #game-container"))?
        .dyn_into()?;

    let game = DomGame {
        session: GameSession::new(),
        rng: SplitMix64::new(entropy_seed()),
        container: container.clone(),
        score_el: doc.get_element_by_id("score"),
        time_el: doc.get_element_by_id("time"),
        drops: HashMap::new(),
    };
    GAME.with(|g| g.replace(Some(game)));

    // Start button begins (or restarts after an ended round) a session.
    if let Some(btn) = doc.get_element_by_id("start-btn") {
        let cb = Closure::wrap(Box::new(begin_session) as Box<dyn FnMut()>);
        btn.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    // One delegated listener handles clicks on every drop, present and future.
    let cb = Closure::wrap(Box::new(move |e: MouseEvent| on_container_click(&e))
        as Box<dyn FnMut(MouseEvent)>);
    container.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
    cb.forget();

    // Visual cleanup for drops whose CSS fall finishes after the session has
    // ended; while Running the core's expiry event removes them first.
    let cb = Closure::wrap(Box::new(move |e: web_sys::Event| on_animation_end(&e))
        as Box<dyn FnMut(web_sys::Event)>);
    container.add_event_listener_with_callback("animationend", cb.as_ref().unchecked_ref())?;
    cb.forget();

    start_frame_loop();
    Ok(())
}

fn entropy_seed() -> u64 {
    #[cfg(feature = "rng")]
    {
        let mut bytes = [0u8; 8];
        if getrandom::getrandom(&mut bytes).is_ok() {
            return u64::from_le_bytes(bytes);
        }
    }
    // Clock bits are plenty for arcade spawn jitter.
    let now = window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0);
    now.to_bits() ^ 0x9e37_79b9_7f4a_7c15
}

// --- Frame loop ---------------------------------------------------------------

fn start_frame_loop() {
    let f: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
        frame(now);
        if let Some(w) = window() {
            let _ = w.request_animation_frame(f.borrow().as_ref().unwrap().as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(w) = window() {
        let _ = w.request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}

fn frame(now_ms: f64) {
    let Some(doc) = window().and_then(|w| w.document()) else {
        return;
    };
    GAME.with(|g| {
        if let Some(game) = g.borrow_mut().as_mut() {
            if game.session.state() != SessionState::Running {
                return;
            }
            let width = f64::from(game.container.offset_width());
            let events = game.session.advance(now_ms, width, &mut game.rng);
            apply_events(&doc, game, &events);
        }
    });
}

// --- Input paths --------------------------------------------------------------

fn begin_session() {
    let Some(win) = window() else { return };
    let Some(doc) = win.document() else { return };
    let now = win.performance().map(|p| p.now()).unwrap_or(0.0);
    let selected = selected_difficulty(&doc);
    GAME.with(|g| {
        if let Some(game) = g.borrow_mut().as_mut() {
            let events = game.session.start(selected, now);
            apply_events(&doc, game, &events);
        }
    });
}

/// Reads the checked difficulty radio; None (no selection, unknown value)
/// lets the session fall back to medium.
fn selected_difficulty(doc: &Document) -> Option<Difficulty> {
    let el = doc
        .query_selector("input[name=\"difficulty\"]:checked")
        .ok()
        .flatten()?;
    let input = el.dyn_into::<HtmlInputElement>().ok()?;
    Difficulty::from_name(&input.value())
}

fn on_container_click(e: &MouseEvent) {
    let Some(target) = e.target() else { return };
    let Ok(el) = target.dyn_into::<Element>() else { return };
    let Ok(Some(drop_el)) = el.closest(".water-drop") else { return };
    let Some(id) = drop_el
        .get_attribute("data-drop-id")
        .and_then(|v| v.parse::<DropId>().ok())
    else {
        return;
    };
    let Some(doc) = window().and_then(|w| w.document()) else {
        return;
    };
    GAME.with(|g| {
        if let Some(game) = g.borrow_mut().as_mut() {
            // The core rejects late or repeated clicks; only a real catch
            // comes back as an event.
            let events = game.session.catch(id);
            apply_events(&doc, game, &events);
            for ev in &events {
                if let SessionEvent::DropCaught { delta, .. } = ev {
                    let rect = game.container.get_bounding_client_rect();
                    let x = f64::from(e.client_x()) - rect.left();
                    let y = f64::from(e.client_y()) - rect.top();
                    let _ = score_popup(&doc, &game.container, x, y, *delta);
                }
            }
        }
    });
}

fn on_animation_end(e: &web_sys::Event) {
    let Some(target) = e.target() else { return };
    let Ok(el) = target.dyn_into::<Element>() else { return };
    if el.class_list().contains("water-drop") {
        el.remove();
    }
}

// --- Event application --------------------------------------------------------

fn apply_events(doc: &Document, game: &mut DomGame, events: &[SessionEvent]) {
    for ev in events {
        match ev {
            SessionEvent::Started {
                score,
                remaining_secs,
            } => {
                clear_leftovers(doc, game);
                set_text(&game.score_el, &score.to_string());
                set_text(&game.time_el, &remaining_secs.to_string());
            }
            SessionEvent::ClockTicked { remaining_secs } => {
                set_text(&game.time_el, &remaining_secs.to_string());
            }
            SessionEvent::DropSpawned {
                id,
                size,
                x,
                fall_duration_secs,
                bad,
            } => {
                let _ = render_drop(doc, game, *id, *size, *x, *fall_duration_secs, *bad);
            }
            SessionEvent::DropCaught { id, score, .. } => {
                set_text(&game.score_el, &score.to_string());
                remove_drop(game, *id);
            }
            SessionEvent::DropExpired { id } => {
                remove_drop(game, *id);
            }
            SessionEvent::Ended { verdict, message } => {
                let _ = show_verdict(doc, game, *verdict, message);
            }
        }
    }
}

/// Missing readout elements are tolerated: the update is skipped and the
/// session carries on.
fn set_text(el: &Option<Element>, value: &str) {
    if let Some(el) = el {
        el.set_text_content(Some(value));
    }
}

fn render_drop(
    doc: &Document,
    game: &mut DomGame,
    id: DropId,
    size: f64,
    x: f64,
    fall_duration_secs: f64,
    bad: bool,
) -> Result<(), JsValue> {
    let el: HtmlElement = doc.create_element("div")?.dyn_into()?;
    el.set_class_name(if bad { "water-drop bad-drop" } else { "water-drop" });
    el.set_attribute("data-drop-id", &id.to_string())?;
    let style = el.style();
    style.set_property("width", &format!("{size}px"))?;
    style.set_property("height", &format!("{size}px"))?;
    style.set_property("left", &format!("{x}px"))?;
    style.set_property("animation-duration", &format!("{fall_duration_secs}s"))?;
    game.container.append_child(&el)?;
    game.drops.insert(id, el);
    Ok(())
}

fn remove_drop(game: &mut DomGame, id: DropId) {
    if let Some(el) = game.drops.remove(&id) {
        el.remove();
    }
}

/// Sweep anything a previous round left behind: stray drop/popup nodes and
/// the old verdict message.
fn clear_leftovers(doc: &Document, game: &mut DomGame) {
    game.drops.clear();
    if let Ok(list) = game.container.query_selector_all(".water-drop, .score-popup") {
        for i in 0..list.length() {
            if let Some(node) = list.item(i) {
                if let Ok(el) = node.dyn_into::<Element>() {
                    el.remove();
                }
            }
        }
    }
    if let Some(msg) = doc.get_element_by_id("result-message") {
        msg.remove();
    }
}

fn show_verdict(
    doc: &Document,
    game: &DomGame,
    verdict: Verdict,
    message: &str,
) -> Result<(), JsValue> {
    let el: HtmlElement = match doc.get_element_by_id("result-message") {
        Some(el) => el.dyn_into()?,
        None => {
            let el: HtmlElement = doc.create_element("div")?.dyn_into()?;
            el.set_id("result-message");
            let style = el.style();
            style.set_property("text-align", "center")?;
            style.set_property("font-size", "1.5em")?;
            style.set_property("margin", "20px 0")?;
            if let Some(wrapper) = doc.query_selector(".game-wrapper")? {
                wrapper.insert_before(&el, Some(game.container.as_ref()))?;
            } else {
                // No wrapper on the page: fall back to the container's parent.
                if let Some(parent) = game.container.parent_node() {
                    parent.insert_before(&el, Some(game.container.as_ref()))?;
                }
            }
            el
        }
    };
    el.set_text_content(Some(message));
    let color = match verdict {
        Verdict::Win => WIN_COLOR,
        Verdict::Lose => LOSE_COLOR,
    };
    el.style().set_property("color", color)?;
    Ok(())
}

/// Brief floating "+1" / "-1" at the click position: rises and fades over
/// 600ms, removed shortly after.
fn score_popup(
    doc: &Document,
    container: &HtmlElement,
    x: f64,
    y: f64,
    delta: i32,
) -> Result<(), JsValue> {
    let el: HtmlElement = doc.create_element("span")?.dyn_into()?;
    el.set_class_name("score-popup");
    el.set_text_content(Some(if delta < 0 { "-1" } else { "+1" }));
    let style = el.style();
    style.set_property("position", "absolute")?;
    style.set_property("pointer-events", "none")?;
    style.set_property("font-weight", "bold")?;
    style.set_property(
        "color",
        if delta < 0 { LOSE_COLOR } else { GOOD_POPUP_COLOR },
    )?;
    style.set_property("left", &format!("{x}px"))?;
    style.set_property("top", &format!("{y}px"))?;
    style.set_property("transition", "transform 600ms ease-out, opacity 600ms ease-out")?;
    style.set_property("transform", "translateY(0px)")?;
    style.set_property("opacity", "1")?;
    container.append_child(&el)?;

    if let Some(w) = window() {
        // Kick the transition on the next frame, then drop the node.
        let kicked = el.clone();
        let kick = Closure::once_into_js(move || {
            let style = kicked.style();
            let _ = style.set_property("transform", "translateY(-40px)");
            let _ = style.set_property("opacity", "0");
        });
        let _ = w.request_animation_frame(kick.unchecked_ref());

        let cleanup = Closure::once_into_js(move || el.remove());
        let _ = w.set_timeout_with_callback_and_timeout_and_arguments_0(
            cleanup.unchecked_ref(),
            POPUP_LIFETIME_MS,
        );
    }
    Ok(())
}
