//! The heatmap dashboard widget.
//!
//! One component, three concerns:
//! - view state: the heat-layer knobs and the map/layer visibility toggles,
//!   purely local;
//! - remote data: heat points and markers, always a full snapshot scoped to
//!   the active user;
//! - interaction state: the pending-marker composer.
//!
//! The component wires signals to the async effects in [`effects`] and pushes
//! snapshots into the map collaborator through [`crate::interop`].

pub mod effects;
pub mod notify;
pub mod options;
pub mod state;

use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use shared_types::MarkerPoint;

use crate::interop::{ensure_map_assets, map_bridge_ready, MapRuntime};
use notify::{NoticeFeed, NoticeLevel};
use options::{Knob, WidgetConfig};
use state::{Composer, FetchTag, RemoteData};

const MAP_CONTAINER_ID: &str = "heatmap-map";

/// How long to wait for `assets/map.js` to register its helpers.
const BRIDGE_POLL_ATTEMPTS: u32 = 40;
const BRIDGE_POLL_INTERVAL_MS: u32 = 125;

#[component]
pub fn HeatmapDashboard(config: WidgetConfig) -> Element {
    let config_signal = use_signal(|| config.clone());
    let mut options = use_signal(|| config.options.clone());
    let mut map_hidden = use_signal(|| false);
    let mut layer_hidden = use_signal(|| false);
    let data = use_signal(RemoteData::default);
    let mut composer = use_signal(Composer::default);
    let mut notices = use_signal(NoticeFeed::default);
    let mut active_user = use_signal(String::new);
    let mut user_input = use_signal(String::new);
    let mut runtime = use_signal(|| None::<MapRuntime>);

    let remove_marker = use_callback(move |id: String| {
        let tag = FetchTag::capture(&active_user());
        spawn(effects::delete_marker(
            tag,
            active_user,
            id,
            data,
            composer,
            notices,
        ));
    });

    // Mount the map collaborator once its scripts are loaded; tear it down
    // while the map is hidden.
    use_effect(move || {
        if map_hidden() {
            if runtime.read().is_some() {
                runtime.set(None);
            }
            return;
        }
        if runtime.read().is_some() {
            return;
        }

        spawn(async move {
            if let Err(e) = ensure_map_assets() {
                dioxus_logger::tracing::error!("failed to inject map scripts: {:?}", e);
                notices
                    .write()
                    .push(NoticeLevel::Error, "Map scripts failed to load");
                return;
            }
            for _ in 0..BRIDGE_POLL_ATTEMPTS {
                if map_bridge_ready() {
                    break;
                }
                TimeoutFuture::new(BRIDGE_POLL_INTERVAL_MS).await;
            }
            if !map_bridge_ready() {
                dioxus_logger::tracing::error!("map bridge never became ready");
                notices
                    .write()
                    .push(NoticeLevel::Error, "Map scripts failed to load");
                return;
            }

            let config = config_signal();
            let rt = MapRuntime::mount(
                MAP_CONTAINER_ID,
                &config,
                move |lat, lng| {
                    // Last click wins: a new click replaces any open composition.
                    composer.write().begin(lat, lng);
                },
                move |id| remove_marker.call(id),
            );
            runtime.set(Some(rt));
        });
    });

    // Push the heat snapshot whenever the knobs, the data or the layer
    // visibility change.
    use_effect(move || {
        let options = options();
        let data_ref = data.read();
        let visible = !layer_hidden();
        if let Some(rt) = runtime.read().as_ref() {
            rt.set_layer_visible(visible);
            rt.push_heat(
                &options,
                &data_ref.heat_points,
                config_signal.read().fit_bounds_on_update,
            );
        }
    });

    // Push the marker snapshot.
    use_effect(move || {
        let data_ref = data.read();
        if let Some(rt) = runtime.read().as_ref() {
            rt.push_markers(&data_ref.markers);
        }
    });

    // Mirror the composer onto the map as a pending-marker indicator.
    use_effect(move || {
        let pending = composer.read().pending().map(|(lat, lng, _)| (lat, lng));
        if let Some(rt) = runtime.read().as_ref() {
            rt.show_pending(pending);
        }
    });

    // Callbacks
    let fetch_data = use_callback(move |_: ()| {
        let user = user_input();
        active_user.set(user.clone());
        let tag = FetchTag::capture(&user);
        spawn(effects::load_heat_points(
            tag.clone(),
            active_user,
            data,
            notices,
        ));
        spawn(effects::load_markers(
            tag, active_user, data, composer, notices,
        ));
    });

    let submit_pending = use_callback(move |_: ()| {
        let pending = {
            let composer_ref = composer.read();
            composer_ref
                .pending()
                .map(|(lat, lng, label)| (lat, lng, label.to_string()))
        };
        let Some((lat, lng, label)) = pending else {
            return;
        };
        let tag = FetchTag::capture(&active_user());
        spawn(effects::submit_marker(
            tag,
            active_user,
            lat,
            lng,
            label,
            data,
            composer,
            notices,
        ));
    });

    let set_knob = use_callback(move |(knob, value): (Knob, f64)| {
        options.write().set(knob, value);
    });

    let dismiss_notice = use_callback(move |index: usize| {
        notices.write().dismiss(index);
    });

    // Hidden map keeps only the toggle, like the rest of the dashboard tiles.
    if map_hidden() {
        return rsx! {
            style { {WIDGET_STYLES} }
            div {
                class: "heatmap-widget",
                button {
                    class: "control-button",
                    onclick: move |_| map_hidden.set(false),
                    "Show map"
                }
            }
        };
    }

    let current_data = data.read();
    let composer_ref = composer.read();

    rsx! {
        style { {WIDGET_STYLES} }

        div {
            class: "heatmap-widget",

            NoticeStack {
                notices: notices.read().clone(),
                on_dismiss: dismiss_notice,
            }

            div {
                class: "heatmap-canvas",
                id: MAP_CONTAINER_ID,
            }

            div {
                class: "control-panel",

                div {
                    class: "control-row",
                    button {
                        class: "control-button",
                        onclick: move |_| map_hidden.set(true),
                        "Hide map"
                    }
                    button {
                        class: "control-button",
                        onclick: move |_| layer_hidden.set(!layer_hidden()),
                        if layer_hidden() { "Show heat layer" } else { "Hide heat layer" }
                    }
                }

                for knob in Knob::ALL {
                    KnobSlider {
                        knob,
                        value: options.read().get(knob),
                        on_change: set_knob,
                    }
                }

                div {
                    class: "user-row",
                    label { class: "user-label", "User id" }
                    input {
                        class: "user-input",
                        r#type: "text",
                        value: "{user_input}",
                        oninput: move |e| user_input.set(e.value()),
                        onkeydown: move |e| {
                            if e.key() == Key::Enter {
                                fetch_data.call(());
                            }
                        },
                    }
                    button {
                        class: "control-button",
                        onclick: move |_| fetch_data.call(()),
                        "Fetch data"
                    }
                }

                if !active_user().is_empty() {
                    div {
                        class: "scope-line",
                        "Showing data for \"{active_user}\""
                    }
                }
            }

            if let Some((lat, lng, label)) = composer_ref.pending() {
                PendingMarkerPanel {
                    lat,
                    lng,
                    label: label.to_string(),
                    on_label: move |value: String| composer.write().set_label(value),
                    on_submit: submit_pending,
                    on_close: move |_: ()| composer.write().close(),
                }
            }

            if !current_data.markers.is_empty() {
                div {
                    class: "marker-list",
                    div { class: "marker-list-title", "Markers" }
                    for marker in current_data.markers.iter() {
                        MarkerRow {
                            marker: marker.clone(),
                            on_remove: remove_marker,
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn KnobSlider(knob: Knob, value: f64, on_change: Callback<(Knob, f64)>) -> Element {
    let range = knob.range();

    rsx! {
        div {
            class: "knob-row",
            label { class: "knob-label", "{knob.label()}" }
            input {
                r#type: "range",
                class: "knob-slider",
                min: "{range.min}",
                max: "{range.max}",
                step: "{range.step}",
                value: "{value}",
                oninput: move |e| {
                    if let Ok(parsed) = e.value().parse::<f64>() {
                        on_change.call((knob, parsed));
                    }
                },
            }
            span { class: "knob-value", "{value}" }
        }
    }
}

#[component]
fn PendingMarkerPanel(
    lat: f64,
    lng: f64,
    label: String,
    on_label: Callback<String>,
    on_submit: Callback<()>,
    on_close: Callback<()>,
) -> Element {
    rsx! {
        div {
            class: "pending-panel",
            div { class: "pending-title", "New marker" }
            div { class: "pending-coords", "Lat: {lat}" }
            div { class: "pending-coords", "Lng: {lng}" }
            input {
                class: "user-input",
                r#type: "text",
                placeholder: "Label",
                value: "{label}",
                oninput: move |e| on_label.call(e.value()),
            }
            div {
                class: "control-row",
                button {
                    class: "control-button",
                    onclick: move |_| on_submit.call(()),
                    "Add marker"
                }
                button {
                    class: "control-button",
                    onclick: move |_| on_close.call(()),
                    "Cancel"
                }
            }
        }
    }
}

#[component]
fn MarkerRow(marker: MarkerPoint, on_remove: Callback<String>) -> Element {
    let marker_id = marker.id.clone();

    rsx! {
        div {
            class: "marker-row",
            span { class: "marker-name", title: "{marker.name}", "{marker.name}" }
            span { class: "marker-coords", "({marker.lat}, {marker.lng})" }
            button {
                class: "control-button danger",
                onclick: move |_| on_remove.call(marker_id.clone()),
                "Remove"
            }
        }
    }
}

#[component]
fn NoticeStack(notices: NoticeFeed, on_dismiss: Callback<usize>) -> Element {
    if notices.is_empty() {
        return rsx! {};
    }

    rsx! {
        div {
            class: "notice-stack",
            for (index, notice) in notices.iter().enumerate() {
                div {
                    class: if matches!(notice.level, NoticeLevel::Error) {
                        "notice notice-error"
                    } else {
                        "notice notice-info"
                    },
                    span { class: "notice-message", "{notice.message}" }
                    button {
                        class: "notice-dismiss",
                        onclick: move |_| on_dismiss.call(index),
                        "×"
                    }
                }
            }
        }
    }
}

const WIDGET_STYLES: &str = r#"
.heatmap-widget {
    position: relative;
    display: flex;
    flex-direction: column;
    gap: 0.75rem;
    height: 100%;
    color: var(--text-primary, #f8fafc);
}

.heatmap-canvas {
    height: 480px;
    border-radius: 8px;
    overflow: hidden;
    background: var(--bg-secondary, #1e293b);
}

.control-panel {
    display: flex;
    flex-direction: column;
    gap: 0.5rem;
    padding: 0.75rem 1rem;
    background: var(--bg-secondary, #1e293b);
    border: 1px solid var(--border-color, #334155);
    border-radius: 8px;
}

.control-row {
    display: flex;
    gap: 0.5rem;
}

.control-button {
    padding: 0.375rem 0.75rem;
    background: var(--accent-bg, #3b82f6);
    color: white;
    border: none;
    border-radius: 6px;
    cursor: pointer;
    font-size: 0.8125rem;
}

.control-button:hover {
    background: var(--accent-bg-hover, #2563eb);
}

.control-button.danger {
    background: var(--danger-bg, #ef4444);
}

.knob-row {
    display: flex;
    align-items: center;
    gap: 0.75rem;
}

.knob-label {
    width: 6.5rem;
    font-size: 0.8125rem;
    color: var(--text-secondary, #94a3b8);
}

.knob-slider {
    flex: 1;
}

.knob-value {
    width: 3rem;
    text-align: right;
    font-size: 0.8125rem;
    font-variant-numeric: tabular-nums;
}

.user-row {
    display: flex;
    align-items: center;
    gap: 0.5rem;
}

.user-label {
    font-size: 0.8125rem;
    color: var(--text-secondary, #94a3b8);
}

.user-input {
    flex: 1;
    padding: 0.375rem 0.625rem;
    background: var(--input-bg, #0f172a);
    color: var(--text-primary, #f8fafc);
    border: 1px solid var(--border-color, #334155);
    border-radius: 6px;
    font-size: 0.8125rem;
    outline: none;
}

.scope-line {
    font-size: 0.75rem;
    color: var(--text-muted, #64748b);
}

.pending-panel {
    position: absolute;
    top: 1rem;
    right: 1rem;
    z-index: 1000;
    display: flex;
    flex-direction: column;
    gap: 0.5rem;
    width: 15rem;
    padding: 0.75rem;
    background: var(--bg-secondary, #1e293b);
    border: 1px solid var(--border-color, #334155);
    border-radius: 8px;
    box-shadow: 0 10px 40px rgba(0, 0, 0, 0.5);
}

.pending-title {
    font-weight: 600;
    font-size: 0.875rem;
}

.pending-coords {
    font-size: 0.75rem;
    color: var(--text-secondary, #94a3b8);
    font-variant-numeric: tabular-nums;
}

.marker-list {
    display: flex;
    flex-direction: column;
    gap: 0.375rem;
    padding: 0.75rem 1rem;
    background: var(--bg-secondary, #1e293b);
    border: 1px solid var(--border-color, #334155);
    border-radius: 8px;
}

.marker-list-title {
    font-weight: 600;
    font-size: 0.875rem;
}

.marker-row {
    display: flex;
    align-items: center;
    gap: 0.75rem;
}

.marker-name {
    flex: 1;
    overflow: hidden;
    text-overflow: ellipsis;
    white-space: nowrap;
    font-size: 0.8125rem;
}

.marker-coords {
    font-size: 0.75rem;
    color: var(--text-muted, #64748b);
    font-variant-numeric: tabular-nums;
}

.notice-stack {
    display: flex;
    flex-direction: column;
    gap: 0.375rem;
}

.notice {
    display: flex;
    align-items: center;
    gap: 0.5rem;
    padding: 0.5rem 0.75rem;
    border-radius: 6px;
    font-size: 0.8125rem;
}

.notice-error {
    background: var(--danger-bg, #ef4444);
    color: white;
}

.notice-info {
    background: var(--success-bg, #10b981);
    color: white;
}

.notice-message {
    flex: 1;
}

.notice-dismiss {
    background: transparent;
    border: none;
    color: inherit;
    cursor: pointer;
    font-size: 1rem;
    line-height: 1;
}
"#;
