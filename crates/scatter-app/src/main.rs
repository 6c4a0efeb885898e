//! Scatter visual - WASM frontend
//!
//! Mounts the chart over a bundled sample data view, follows the window size and loads
//! the backdrop image when one is configured.

mod sample;

use leptos::prelude::*;
use scatter_charts::{BackdropImage, ScatterChart, SelectTarget};
use scatter_core::{DataView, Viewport};
use scatter_state::{VisualState, provide_visual_state, use_visual_state};
use wasm_bindgen::{JsCast, closure::Closure};

fn main() {
    console_error_panic_hook::set_once();
    init_logging();

    tracing::info!("Starting scatter visual");
    leptos::mount::mount_to_body(App);
}

#[cfg(target_arch = "wasm32")]
fn init_logging() {
    tracing_wasm::set_as_global_default();
}

#[cfg(not(target_arch = "wasm32"))]
fn init_logging() {
    tracing_subscriber::fmt().with_target(false).init();
}

/// Window inner size, or nothing outside a browser
fn window_viewport() -> Option<Viewport> {
    let window = web_sys::window()?;
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some(Viewport::new(width, height))
}

/// Start loading `url`; the result feeds back into the state
fn load_backdrop(state: VisualState, url: String) {
    let Ok(image) = web_sys::HtmlImageElement::new() else {
        tracing::warn!("Cannot create image element for backdrop");
        return;
    };

    let onload = {
        let image = image.clone();
        let state = state.clone();
        let url = url.clone();
        Closure::<dyn FnMut()>::new(move || {
            let size = Viewport::new(image.natural_width() as f64, image.natural_height() as f64);
            state.backdrop_loaded(BackdropImage {
                url: url.clone(),
                size,
            });
        })
    };
    let onerror = {
        let url = url.clone();
        Closure::<dyn FnMut()>::new(move || state.backdrop_failed(&url))
    };

    image.set_onload(Some(onload.as_ref().unchecked_ref()));
    image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    onload.forget();
    onerror.forget();
    image.set_src(&url);
}

#[component]
fn App() -> impl IntoView {
    let state = provide_visual_state();

    let load = {
        let state = state.clone();
        move |url: Option<String>| {
            if let Some(url) = url {
                load_backdrop(state.clone(), url);
            }
        }
    };

    load(state.set_settings_json(sample::SETTINGS));
    match DataView::from_json(sample::DATA_VIEW) {
        Ok(view) => load(state.set_data(view)),
        Err(e) => tracing::warn!("Sample data view rejected: {}", e),
    }
    if let Some(viewport) = window_viewport() {
        load(state.resize(viewport));
    }

    let _resize = {
        let state = state.clone();
        let load = load.clone();
        window_event_listener(leptos::ev::resize, move |_| {
            if let Some(viewport) = window_viewport() {
                load(state.resize(viewport));
            }
        })
    };

    view! {
        <main class="scatter-app" style="width: 100vw; height: 100vh; margin: 0;">
            <ScatterPanel />
        </main>
    }
}

/// Chart bound to the state in context
#[component]
fn ScatterPanel() -> impl IntoView {
    let state = use_visual_state();
    let frame = state.frame;
    let crosshair = state.crosshair;
    let on_select =
        Callback::new(move |(target, multi): (SelectTarget, bool)| state.select(target, multi));

    view! { <ScatterChart frame=frame crosshair=crosshair on_select=on_select /> }
}
