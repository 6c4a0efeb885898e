//! # scatter-state
//!
//! Reactive state for the scatter visual.
//! Host inputs (data view, settings, viewport) live in Leptos signals; every change
//! re-runs the update pipeline and publishes a fresh frame.

pub mod backdrop;

pub use backdrop::BackdropLoader;

use leptos::prelude::*;
use scatter_charts::{BackdropImage, Crosshair, ScatterFrame, ScatterVisual, SelectTarget, Selection};
use scatter_core::{DataView, Viewport, VisualSettings};

// ============================================================================
// PIPELINE
// ============================================================================

/// One full update: flatten, lay out, then reconcile the selection
pub fn render_frame(
    visual: &ScatterVisual,
    view: &DataView,
    settings: &VisualSettings,
    viewport: Viewport,
    selection: &Selection,
    backdrop: Option<&BackdropImage>,
) -> ScatterFrame {
    let mut frame = visual.update(view, settings, viewport, backdrop);
    frame.apply_selection(selection);
    frame
}

// ============================================================================
// VISUAL STATE
// ============================================================================

/// Reactive visual state
#[derive(Clone)]
pub struct VisualState {
    /// Host data view
    pub view: RwSignal<DataView>,
    /// Formatting options
    pub settings: RwSignal<VisualSettings>,
    /// Outer size of the visual
    pub viewport: RwSignal<Viewport>,
    /// Last rendered frame
    pub frame: RwSignal<ScatterFrame>,
    /// Selected points and series
    pub selection: RwSignal<Selection>,
    /// Pointer readout
    pub crosshair: RwSignal<Crosshair>,
    /// Backdrop load bookkeeping
    pub backdrop: RwSignal<BackdropLoader>,
    visual: StoredValue<ScatterVisual>,
}

impl VisualState {
    /// Create new visual state
    pub fn new() -> Self {
        Self::with_visual(ScatterVisual::new())
    }

    /// Create state around a configured pipeline (e.g. a DOM text measurer)
    pub fn with_visual(visual: ScatterVisual) -> Self {
        let view = DataView::default();
        let settings = VisualSettings::default();
        let viewport = Viewport::default();
        let frame = render_frame(&visual, &view, &settings, viewport, &Selection::default(), None);

        Self {
            view: RwSignal::new(view),
            settings: RwSignal::new(settings),
            viewport: RwSignal::new(viewport),
            frame: RwSignal::new(frame),
            selection: RwSignal::new(Selection::default()),
            crosshair: RwSignal::new(Crosshair::default()),
            backdrop: RwSignal::new(BackdropLoader::new()),
            visual: StoredValue::new(visual),
        }
    }

    // ========================================================================
    // Host Inputs
    // ========================================================================

    /// Replace the data view; returns a backdrop url the host must load, if any
    pub fn set_data(&self, view: DataView) -> Option<String> {
        if view.row_count() == 0 && self.has_selection() {
            self.clear_selection();
        }
        self.view.set(view);
        self.refresh()
    }

    /// Replace the settings; returns a backdrop url the host must load, if any
    pub fn set_settings(&self, settings: VisualSettings) -> Option<String> {
        self.settings.set(settings);
        self.refresh()
    }

    /// Parse and apply settings JSON, falling back to defaults
    pub fn set_settings_json(&self, json: &str) -> Option<String> {
        self.set_settings(VisualSettings::from_json_or_default(json))
    }

    /// Resize the visual
    pub fn resize(&self, viewport: Viewport) -> Option<String> {
        if self.viewport.get_untracked() == viewport {
            return None;
        }
        self.viewport.set(viewport);
        self.refresh()
    }

    /// Re-run the pipeline from the current inputs
    pub fn refresh(&self) -> Option<String> {
        let loader = self.backdrop.get_untracked();
        let frame = self.visual.with_value(|visual| {
            self.view.with_untracked(|view| {
                self.settings.with_untracked(|settings| {
                    self.selection.with_untracked(|selection| {
                        render_frame(
                            visual,
                            view,
                            settings,
                            self.viewport.get_untracked(),
                            selection,
                            loader.image(),
                        )
                    })
                })
            })
        });

        let mut to_load = None;
        if let Some(url) = frame.backdrop_url.as_deref() {
            self.backdrop.update(|b| {
                if b.request(url) {
                    to_load = Some(url.to_string());
                }
            });
        }

        tracing::debug!(
            "Frame refreshed: {} points, converged={}",
            frame.points.len(),
            frame.solution.converged
        );
        self.frame.set(frame);
        to_load
    }

    // ========================================================================
    // Backdrop
    // ========================================================================

    /// Record a finished backdrop load; re-renders only for a new image
    pub fn backdrop_loaded(&self, image: BackdropImage) -> bool {
        let mut rerender = false;
        self.backdrop.update(|b| rerender = b.on_loaded(image));
        if rerender {
            tracing::info!("Backdrop loaded, re-rendering");
            self.refresh();
        }
        rerender
    }

    pub fn backdrop_failed(&self, url: &str) {
        self.backdrop.update(|b| b.on_failed(url));
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Apply a click; `multi` is the ctrl/cmd modifier
    pub fn select(&self, target: SelectTarget, multi: bool) {
        self.selection.update(|s| s.apply(target, multi));
        self.selection.with_untracked(|selection| {
            self.frame.update(|frame| frame.apply_selection(selection));
        });
    }

    pub fn clear_selection(&self) {
        self.select(SelectTarget::Clear, false);
    }

    pub fn has_selection(&self) -> bool {
        self.selection.with(|s| !s.is_empty())
    }
}

impl Default for VisualState {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// CONTEXT HELPERS
// ============================================================================

/// Provide visual state context to component tree
pub fn provide_visual_state() -> VisualState {
    let state = VisualState::new();
    provide_context(state.clone());
    state
}

/// Use visual state from context
pub fn use_visual_state() -> VisualState {
    expect_context::<VisualState>()
}

/// Try to get visual state from context (returns None if not provided)
pub fn try_use_visual_state() -> Option<VisualState> {
    use_context::<VisualState>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scatter_core::{CategoryColumn, ColumnSource, PrimitiveValue, Role, ValueColumn, ValueGroup};

    fn view() -> DataView {
        let measure = |name: &str, role, values: [f64; 2]| {
            ValueColumn::new(
                ColumnSource::new(name, role),
                values.iter().map(|v| Some(PrimitiveValue::from(*v))).collect(),
            )
        };
        DataView {
            categories: vec![CategoryColumn::new(
                ColumnSource::new("City", Role::Category),
                vec![Some("Oslo".into()), Some("Bergen".into())],
            )],
            groups: vec![ValueGroup::new(
                None,
                vec![measure("Sales", Role::X, [1.0, 2.0]), measure("Profit", Role::Y, [3.0, 4.0])],
            )],
            series: None,
        }
    }

    #[test]
    fn test_render_frame_applies_selection() {
        let visual = ScatterVisual::new();
        let settings = VisualSettings::default();
        let viewport = Viewport::new(400.0, 300.0);

        let frame = render_frame(&visual, &view(), &settings, viewport, &Selection::default(), None);
        assert_eq!(frame.points.len(), 2);
        assert!(!frame.has_selection());

        let mut selection = Selection::default();
        selection.apply(SelectTarget::Point(frame.points[0].identity.key.clone()), false);
        let frame = render_frame(&visual, &view(), &settings, viewport, &selection, None);
        assert!(frame.points[0].selected);
        assert!(!frame.points[1].selected);
    }

    #[test]
    fn test_context_and_selection() {
        let owner = Owner::new();
        owner.with(|| {
            assert!(try_use_visual_state().is_none());
            let state = provide_visual_state();
            state.resize(Viewport::new(400.0, 300.0));
            state.set_data(view());
            assert_eq!(use_visual_state().frame.get_untracked().points.len(), 2);

            let key = state.frame.with_untracked(|f| f.points[1].identity.key.clone());
            state.select(SelectTarget::Point(key), false);
            assert!(state.has_selection());
            assert!(state.frame.with_untracked(|f| f.points[1].selected));

            // empty data clears the selection
            state.set_data(DataView::default());
            assert!(!state.has_selection());
            assert!(state.frame.with_untracked(|f| f.points.is_empty()));
        });
    }

    #[test]
    fn test_backdrop_load_rerenders_once() {
        let owner = Owner::new();
        owner.with(|| {
            let state = VisualState::new();
            state.resize(Viewport::new(400.0, 300.0));
            let mut settings = VisualSettings::default();
            settings.backdrop.show = true;
            settings.backdrop.url = Some("floor.png".to_string());

            assert_eq!(state.set_settings(settings).as_deref(), Some("floor.png"));
            assert_eq!(state.set_data(view()), None);

            let image = BackdropImage {
                url: "floor.png".to_string(),
                size: Viewport::new(100.0, 100.0),
            };
            assert!(state.backdrop_loaded(image.clone()));
            assert!(state.frame.with_untracked(|f| f.solution.backdrop_applied));
            assert!(!state.backdrop_loaded(image));
        });
    }
}
