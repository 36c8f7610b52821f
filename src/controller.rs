//! Interaction controller.
//!
//! Turns UI input into [`UiAction`]s and applies them to the catalog and the shared
//! [`ViewParams`]. Natively the keyboard stands in for the thumbnail strip and the
//! sliders; in the browser the page's DOM controls are bound in [`web`].

use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::{
    catalog::{AssetDescriptor, Catalog},
    params::{ParamKey, ViewParams},
};

#[derive(Clone, Debug, PartialEq)]
pub enum UiAction {
    /// Load the catalog entry (or collection) with this display name.
    Select(String),
    SetParam(ParamKey, f32),
    /// Move a parameter by a number of slider steps.
    Nudge(ParamKey, i32),
    ResetParams,
    Refit,
}

/// What the viewer has to do after an action was applied.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Load(Vec<AssetDescriptor>),
    Refit,
    Nothing,
}

pub fn apply(action: UiAction, catalog: &Catalog, params: &mut ViewParams) -> Command {
    match action {
        UiAction::Select(name) => match catalog.resolve(&name) {
            Ok(descriptors) => Command::Load(descriptors),
            Err(e) => {
                log::warn!("Ignoring selection: {}", e);
                Command::Nothing
            }
        },
        UiAction::SetParam(key, value) => {
            let value = params.set(key, value);
            log::debug!("{} = {:.2}", key.name(), value);
            Command::Nothing
        }
        UiAction::Nudge(key, steps) => {
            let value = params.nudge(key, steps);
            log::debug!("{} = {:.2}", key.name(), value);
            Command::Nothing
        }
        UiAction::ResetParams => {
            *params = ViewParams::default();
            Command::Nothing
        }
        UiAction::Refit => Command::Refit,
    }
}

/// Maps a pressed key to an action. Digits select the catalog entries in catalog order.
pub fn key_action(code: KeyCode, catalog: &Catalog) -> Option<UiAction> {
    let nth = |n: usize| catalog.names().nth(n).map(|name| UiAction::Select(name.to_string()));
    match code {
        KeyCode::Digit1 => nth(0),
        KeyCode::Digit2 => nth(1),
        KeyCode::Digit3 => nth(2),
        KeyCode::Digit4 => nth(3),
        KeyCode::Digit5 => nth(4),
        KeyCode::Digit6 => nth(5),
        KeyCode::Digit7 => nth(6),
        KeyCode::Digit8 => nth(7),
        KeyCode::Digit9 => nth(8),
        KeyCode::KeyR => Some(UiAction::Nudge(ParamKey::Roughness, 1)),
        KeyCode::KeyF => Some(UiAction::Nudge(ParamKey::Roughness, -1)),
        KeyCode::KeyM => Some(UiAction::Nudge(ParamKey::Metalness, 1)),
        KeyCode::KeyN => Some(UiAction::Nudge(ParamKey::Metalness, -1)),
        KeyCode::KeyE => Some(UiAction::Nudge(ParamKey::Exposure, 1)),
        KeyCode::KeyD => Some(UiAction::Nudge(ParamKey::Exposure, -1)),
        KeyCode::Space => Some(UiAction::Refit),
        KeyCode::Backspace => Some(UiAction::ResetParams),
        _ => None,
    }
}

pub fn window_action(event: &WindowEvent, catalog: &Catalog) -> Option<UiAction> {
    match event {
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state: ElementState::Pressed,
                    ..
                },
            ..
        } => key_action(*code, catalog),
        _ => None,
    }
}

/// DOM bindings for the browser build.
#[cfg(target_arch = "wasm32")]
pub mod web {
    use wasm_bindgen::{JsCast, closure::Closure};
    use web_sys::{Element, Event, HtmlInputElement};

    use super::UiAction;
    use crate::params::ParamKey;

    pub const MODEL_ATTRIBUTE: &str = "data-model";
    pub const PARAM_ATTRIBUTE: &str = "data-param";

    fn elements(selector: &str) -> Vec<Element> {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return Vec::new();
        };
        let Ok(list) = document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    /// Registers click handlers on `[data-model]` elements and input handlers on
    /// `input[type=range][data-param]` sliders. Returns how many controls were bound.
    pub fn bind_controls(send: impl Fn(UiAction) + Clone + 'static) -> usize {
        let mut bound = 0;
        for element in elements(&format!("[{MODEL_ATTRIBUTE}]")) {
            let Some(name) = element.get_attribute(MODEL_ATTRIBUTE) else {
                continue;
            };
            let send = send.clone();
            let on_click = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                send(UiAction::Select(name.clone()));
            });
            if element
                .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
                .is_ok()
            {
                bound += 1;
            }
            // Handlers live as long as the page
            on_click.forget();
        }

        for element in elements(&format!("input[type=range][{PARAM_ATTRIBUTE}]")) {
            let Some(key) = element
                .get_attribute(PARAM_ATTRIBUTE)
                .and_then(|name| ParamKey::parse(&name))
            else {
                log::warn!("Slider with unknown {} ignored", PARAM_ATTRIBUTE);
                continue;
            };
            let Ok(input) = element.dyn_into::<HtmlInputElement>() else {
                continue;
            };
            let slider = input.clone();
            let send = send.clone();
            let on_input = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                if let Ok(value) = slider.value().parse::<f32>() {
                    send(UiAction::SetParam(key, value));
                }
            });
            if input
                .add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref())
                .is_ok()
            {
                bound += 1;
            }
            on_input.forget();
        }
        log::info!("Bound {} DOM controls", bound);
        bound
    }

    /// Moves the sliders to the current parameter values.
    pub fn sync_sliders(params: &crate::params::ViewParams) {
        for element in elements(&format!("input[type=range][{PARAM_ATTRIBUTE}]")) {
            let key = element
                .get_attribute(PARAM_ATTRIBUTE)
                .and_then(|name| ParamKey::parse(&name));
            if let (Some(key), Ok(input)) = (key, element.dyn_into::<HtmlInputElement>()) {
                input.set_value(&format!("{:.2}", params.get(key)));
            }
        }
    }
}
