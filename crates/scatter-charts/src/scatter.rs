//! Scatter/bubble chart component
//!
//! Draws a [`ScatterFrame`]: backdrop, grid, axes, titles, markers, category labels,
//! legend, tooltip and crosshair. All geometry comes from the frame; the component only
//! wires pointer events.

use crate::{
    axes::{Axes, AxisProperties, wrap_words},
    chartkit::Scale,
    colors,
    crosshair::{Crosshair, map_pointer},
    point::{LegendData, TooltipItem},
    text::TextMeasurer,
    visual::{Marker, ScatterFrame, SelectTarget},
};
use leptos::prelude::*;
use scatter_core::{LegendSettings, Viewport};
use wasm_bindgen::JsCast;

/// Tooltip anchored at a hovered marker, in percent of the chart box
#[derive(Debug, Clone, PartialEq)]
struct HoverTip {
    left: f64,
    top: f64,
    items: Vec<TooltipItem>,
}

/// Scatter chart component
#[component]
pub fn ScatterChart(
    #[prop(into)] frame: Signal<ScatterFrame>,
    #[prop(optional)] crosshair: Option<RwSignal<Crosshair>>,
    #[prop(optional)] on_select: Option<Callback<(SelectTarget, bool)>>,
) -> impl IntoView {
    let crosshair = crosshair.unwrap_or_else(|| RwSignal::new(Crosshair::default()));
    let hovered = RwSignal::new(None::<HoverTip>);

    let on_mousemove = move |ev: web_sys::MouseEvent| {
        if !frame.with_untracked(|f| f.settings.crosshair.show) {
            return;
        }
        let Some(svg) = ev
            .current_target()
            .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
        else {
            return;
        };
        let rect = svg.get_bounding_client_rect();
        let raw = (
            ev.client_x() as f64 - rect.left(),
            ev.client_y() as f64 - rect.top(),
        );
        let rendered = Viewport::new(rect.width(), rect.height());
        let readout = frame.with_untracked(|f| {
            let layout = f.layout();
            map_pointer(
                raw,
                rendered,
                layout.viewport,
                layout,
                &f.solution.axes.x.scale,
                &f.solution.axes.y.scale,
            )
        });
        crosshair.update(|c| c.update(readout));
    };

    view! {
        <div class="scatter-visual" style="position: relative; width: 100%; height: 100%;">
            {move || {
                frame.with(|f| {
                    f.legend_visible()
                        .then(|| legend_view(&f.legend, &f.settings.legend, on_select))
                })
            }}

            <svg
                class="scatter-chart"
                viewBox=move || frame.with(|f| f.layout().viewbox())
                preserveAspectRatio="none"
                style="width: 100%; height: 100%;"
                on:mousemove=on_mousemove
                on:mouseenter=move |_| crosshair.update(|c| c.enter())
                on:mouseleave=move |_| {
                    crosshair.update(|c| c.leave());
                    hovered.set(None);
                }
                on:click=move |_| {
                    if let Some(cb) = on_select {
                        cb.run((SelectTarget::Clear, false));
                    }
                }
            >
                {move || {
                    let f = frame.get();
                    plot_view(&f, on_select, hovered)
                }}

                // Crosshair overlay
                {move || {
                    let readout = crosshair.get().shown()?;
                    let (viewport_in, transform) =
                        frame.with(|f| (f.viewport_in(), f.layout().inner_transform()));
                    let g = readout.geometry(viewport_in);
                    Some(view! {
                        <g class="crosshair" transform=transform pointer-events="none">
                            <line
                                x1=g.vertical.0 y1=g.vertical.1
                                x2=g.vertical.2 y2=g.vertical.3
                                stroke=colors::CROSSHAIR
                                stroke-dasharray="4,3"
                            />
                            <line
                                x1=g.horizontal.0 y1=g.horizontal.1
                                x2=g.horizontal.2 y2=g.horizontal.3
                                stroke=colors::CROSSHAIR
                                stroke-dasharray="4,3"
                            />
                            <text x=g.x_label.0 y=g.x_label.1 fill=colors::TEXT_MUTED font-size="10">
                                {readout.data_x.to_string()}
                            </text>
                            <text x=g.y_label.0 y=g.y_label.1 fill=colors::TEXT_MUTED font-size="10">
                                {readout.data_y.to_string()}
                            </text>
                        </g>
                    })
                }}
            </svg>

            // Tooltip
            {move || {
                hovered.get().map(|tip| {
                    view! {
                        <div
                            class="scatter-tooltip"
                            style=format!(
                                "position: absolute; left: {:.2}%; top: {:.2}%; pointer-events: none;",
                                tip.left,
                                tip.top,
                            )
                        >
                            {tip.items.into_iter().map(|item| view! {
                                <div class="tooltip-row">
                                    <span class="tooltip-name">{item.display_name}</span>
                                    <span class="tooltip-value">{item.value}</span>
                                </div>
                            }).collect_view()}
                        </div>
                    }
                })
            }}
        </div>
    }
}

/// Everything inside the SVG except the crosshair
fn plot_view(
    frame: &ScatterFrame,
    on_select: Option<Callback<(SelectTarget, bool)>>,
    hovered: RwSignal<Option<HoverTip>>,
) -> impl IntoView + use<> {
    let layout = *frame.layout();
    let viewport_in = frame.viewport_in();
    let axes = &frame.solution.axes;
    let y_on_right = frame.settings.value_axis.position_right;

    let backdrop = frame.backdrop_url.clone().map(|url| {
        view! {
            <image
                class="backdrop"
                href=url
                x=layout.margin.left
                y=layout.margin.top
                width=viewport_in.width
                height=viewport_in.height
                preserveAspectRatio="none"
            />
        }
    });

    let x_axis = axes.x.show.then(|| x_axis_view(&axes.x, viewport_in, frame.measurer.as_ref()));
    let y_axis = axes
        .y
        .show
        .then(|| y_axis_view(&axes.y, viewport_in, y_on_right));

    let x_title = axes.x.axis_label.clone().map(|title| {
        view! {
            <text
                class="x-axis-title"
                x={layout.margin.left + viewport_in.width / 2.0}
                y={layout.viewport.height - 6.0}
                text-anchor="middle"
                fill=colors::TEXT_PRIMARY
                font-size="12"
            >
                {title}
            </text>
        }
    });
    let y_title = axes.y.axis_label.clone().map(|title| {
        let x = if y_on_right { layout.viewport.width - 6.0 } else { 12.0 };
        let y = layout.margin.top + viewport_in.height / 2.0;
        view! {
            <text
                class="y-axis-title"
                transform=format!("translate({:.2}, {:.2}) rotate(-90)", x, y)
                text-anchor="middle"
                fill=colors::TEXT_PRIMARY
                font-size="12"
            >
                {title}
            </text>
        }
    });

    let markers = markers_view(frame, frame.markers(), on_select, hovered);

    view! {
        <rect
            width=layout.viewport.width
            height=layout.viewport.height
            fill=colors::BG_PANEL
        />
        {backdrop}
        <g class="plot-area" transform=layout.inner_transform()>
            {grid_view(axes, viewport_in)}
            {x_axis}
            {y_axis}
            {markers}
        </g>
        {x_title}
        {y_title}
    }
}

/// Dashed grid at the tick positions
fn grid_view(axes: &Axes, viewport_in: Viewport) -> impl IntoView + use<> {
    let vertical = axes
        .x
        .values
        .iter()
        .map(|v| {
            let x = axes.x.scale.scale(*v);
            view! {
                <line x1=x y1="0" x2=x y2=viewport_in.height
                    stroke=colors::GRID stroke-width="1" stroke-dasharray="2,2" />
            }
        })
        .collect_view();
    let horizontal = axes
        .y
        .values
        .iter()
        .map(|v| {
            let y = axes.y.scale.scale(*v);
            view! {
                <line x1="0" y1=y x2=viewport_in.width y2=y
                    stroke=colors::GRID stroke-width="1" stroke-dasharray="2,2" />
            }
        })
        .collect_view();

    view! {
        <g class="chart-grid">
            {vertical}
            {horizontal}
        </g>
    }
}

fn x_axis_view(
    axis: &AxisProperties,
    viewport_in: Viewport,
    measurer: &dyn TextMeasurer,
) -> impl IntoView + use<> {
    let font_size = axis.font_size;
    let slot = axis.label_slot();
    let (fit, word_break) = (axis.will_labels_fit, axis.will_labels_word_break);

    let ticks = axis
        .values
        .iter()
        .zip(axis.tick_labels())
        .map(|(value, label)| {
            let x = axis.scale.scale(*value);
            let text = if fit {
                view! {
                    <text y="9" dy="0.71em" text-anchor="middle"
                        fill=colors::TEXT_MUTED font-size=font_size>
                        {label}
                    </text>
                }
                .into_any()
            } else if word_break {
                let lines = wrap_words(&label, slot, font_size, measurer);
                view! {
                    <text y="9" text-anchor="middle" fill=colors::TEXT_MUTED font-size=font_size>
                        {lines.into_iter().enumerate().map(|(i, line)| view! {
                            <tspan x="0" dy={if i == 0 { "0.71em" } else { "1.2em" }}>{line}</tspan>
                        }).collect_view()}
                    </text>
                }
                .into_any()
            } else {
                view! {
                    <text y="9" dy="0.35em" text-anchor="end" transform="rotate(-45)"
                        fill=colors::TEXT_MUTED font-size=font_size>
                        {label}
                    </text>
                }
                .into_any()
            };
            view! {
                <g class="tick" transform=format!("translate({:.2}, 0)", x)>
                    <line y2="6" stroke=colors::AXIS_LINE />
                    {text}
                </g>
            }
        })
        .collect_view();

    view! {
        <g class="x-axis" transform=format!("translate(0, {})", viewport_in.height)>
            <line x1="0" y1="0" x2=viewport_in.width y2="0" stroke=colors::AXIS_LINE stroke-width="1" />
            {ticks}
        </g>
    }
}

fn y_axis_view(axis: &AxisProperties, viewport_in: Viewport, on_right: bool) -> impl IntoView + use<> {
    let font_size = axis.font_size;
    let (axis_x, tick_x2, label_x, anchor) = if on_right {
        (viewport_in.width, 6.0, 8.0, "start")
    } else {
        (0.0, -6.0, -8.0, "end")
    };

    let ticks = axis
        .values
        .iter()
        .zip(axis.tick_labels())
        .map(|(value, label)| {
            let y = axis.scale.scale(*value);
            view! {
                <g class="tick" transform=format!("translate(0, {:.2})", y)>
                    <line x2=tick_x2 stroke=colors::AXIS_LINE />
                    <text x=label_x dy="0.32em" text-anchor=anchor
                        fill=colors::TEXT_MUTED font-size=font_size>
                        {label}
                    </text>
                </g>
            }
        })
        .collect_view();

    view! {
        <g class="y-axis" transform=format!("translate({}, 0)", axis_x)>
            <line x1="0" y1="0" x2="0" y2=viewport_in.height stroke=colors::AXIS_LINE stroke-width="1" />
            {ticks}
        </g>
    }
}

fn markers_view(
    frame: &ScatterFrame,
    markers: Vec<Marker>,
    on_select: Option<Callback<(SelectTarget, bool)>>,
    hovered: RwSignal<Option<HoverTip>>,
) -> impl IntoView + use<> {
    let layout = *frame.layout();
    let labels = frame.settings.category_labels.clone();

    markers
        .into_iter()
        .map(|marker| {
            let key = marker.key.clone();
            let tip = HoverTip {
                left: (layout.margin.left + marker.cx) / layout.viewport.width.max(1.0) * 100.0,
                top: (layout.margin.top + marker.cy) / layout.viewport.height.max(1.0) * 100.0,
                items: marker.tooltip.clone(),
            };
            let r = marker.radius;

            let body = match marker.image.clone() {
                Some(url) => view! {
                    <image href=url x={-r} y={-r} width={2.0 * r} height={2.0 * r} />
                }
                .into_any(),
                None => view! {
                    <path
                        d=marker.path.clone()
                        fill={marker.fill.clone().unwrap_or_else(|| "none".to_string())}
                        stroke=marker.stroke.clone()
                        stroke-width=marker.stroke_width
                    />
                }
                .into_any(),
            };

            let label = marker.label.clone().map(|text| {
                view! {
                    <text
                        class="category-label"
                        x=marker.cx
                        y=marker.label_y
                        text-anchor="middle"
                        fill=labels.color.clone()
                        font-size=labels.font_size
                        pointer-events="none"
                    >
                        {text}
                    </text>
                }
            });

            view! {
                <g
                    class="dot"
                    transform=marker.transform.clone()
                    opacity=marker.opacity
                    on:click=move |ev: web_sys::MouseEvent| {
                        ev.stop_propagation();
                        if let Some(cb) = on_select {
                            cb.run((SelectTarget::Point(key.clone()), ev.ctrl_key() || ev.meta_key()));
                        }
                    }
                    on:mouseenter=move |_| hovered.set(Some(tip.clone()))
                    on:mouseleave=move |_| hovered.set(None)
                >
                    {body}
                </g>
                {label}
            }
        })
        .collect_view()
}

/// Legend row above the chart; clicking an entry selects its series
fn legend_view(
    legend: &LegendData,
    settings: &LegendSettings,
    on_select: Option<Callback<(SelectTarget, bool)>>,
) -> impl IntoView + use<> {
    let font = format!("font-size: {}px; color: {};", settings.font_size, settings.label_color);
    let title = legend.title.clone().map(|t| {
        view! { <span class="legend-title" style="font-weight: 600;">{t}</span> }
    });
    let entries = legend
        .data_points
        .iter()
        .map(|entry| {
            let key = entry.identity.clone();
            let swatch = format!(
                "display: inline-block; width: 8px; height: 8px; border-radius: 50%; background: {};",
                entry.color
            );
            view! {
                <span
                    class="legend-item"
                    class:selected=entry.selected
                    style="cursor: pointer; margin-left: 10px;"
                    on:click=move |ev: web_sys::MouseEvent| {
                        if let Some(cb) = on_select {
                            cb.run((SelectTarget::Series(key.clone()), ev.ctrl_key() || ev.meta_key()));
                        }
                    }
                >
                    <span class="legend-swatch" style=swatch></span>
                    " "
                    {entry.label.clone()}
                </span>
            }
        })
        .collect_view();

    view! {
        <div class="scatter-legend" style=font>
            {title}
            {entries}
        </div>
    }
}
