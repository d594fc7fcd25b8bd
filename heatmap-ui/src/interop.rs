//! JS interop with the map collaborator.
//!
//! The tile basemap and the heat-layer renderer live behind `window`-level
//! helper functions implemented in `assets/map.js` (Leaflet + leaflet.heat).
//! The collaborator is a dumb drawing surface: it receives JSON snapshots and
//! configuration and never talks to the network. [`MapRuntime`] owns the map
//! handle plus the click closure and disposes both on drop.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::map::options::{HeatLayerOptions, WidgetConfig, HEAT_GRADIENT};
use shared_types::{HeatPoint, MarkerPoint};

#[wasm_bindgen(js_namespace = window)]
extern "C" {
    #[wasm_bindgen(js_name = createHeatmapMap)]
    fn create_heatmap_map(container_id: &str, config_json: &str) -> u32;

    #[wasm_bindgen(js_name = onHeatmapMapClick)]
    fn on_heatmap_map_click(id: u32, cb: &Closure<dyn FnMut(f64, f64)>);

    #[wasm_bindgen(js_name = onHeatmapMarkerRemove)]
    fn on_heatmap_marker_remove(id: u32, cb: &Closure<dyn FnMut(String)>);

    #[wasm_bindgen(js_name = setHeatmapData)]
    fn set_heatmap_data(id: u32, points_json: &str, fit_bounds: bool);

    #[wasm_bindgen(js_name = setHeatmapOptions)]
    fn set_heatmap_options(id: u32, options_json: &str);

    #[wasm_bindgen(js_name = setHeatmapVisible)]
    fn set_heatmap_visible(id: u32, visible: bool);

    #[wasm_bindgen(js_name = setHeatmapMarkers)]
    fn set_heatmap_markers(id: u32, markers_json: &str);

    #[wasm_bindgen(js_name = setHeatmapPending)]
    fn set_heatmap_pending(id: u32, lat: f64, lng: f64);

    #[wasm_bindgen(js_name = clearHeatmapPending)]
    fn clear_heatmap_pending(id: u32);

    #[wasm_bindgen(js_name = disposeHeatmapMap)]
    fn dispose_heatmap_map(id: u32);
}

/// Inject the leaflet stylesheet and the map scripts. Safe to call on every
/// mount: elements are keyed by id and appended only if missing.
pub fn ensure_map_assets() -> Result<(), JsValue> {
    ensure_stylesheet(
        "leaflet-css",
        "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css",
    )?;
    ensure_script("leaflet-js", "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js")?;
    ensure_script(
        "leaflet-heat-js",
        "https://unpkg.com/leaflet.heat@0.2.0/dist/leaflet-heat.js",
    )?;
    ensure_script("map-bridge-js", "/map.js")?;
    Ok(())
}

fn document() -> Result<web_sys::Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("document unavailable"))
}

fn ensure_script(id: &str, src: &str) -> Result<(), JsValue> {
    let document = document()?;
    if document.get_element_by_id(id).is_some() {
        return Ok(());
    }

    let script: web_sys::HtmlScriptElement = document
        .create_element("script")?
        .dyn_into::<web_sys::HtmlScriptElement>()?;
    script.set_id(id);
    script.set_src(src);
    // Injected scripts execute out of order unless async is cleared, and
    // leaflet.heat needs leaflet loaded first.
    script.set_async(false);

    if let Some(head) = document.head() {
        head.append_child(&script)?;
    } else if let Some(body) = document.body() {
        body.append_child(&script)?;
    }

    Ok(())
}

fn ensure_stylesheet(id: &str, href: &str) -> Result<(), JsValue> {
    let document = document()?;
    if document.get_element_by_id(id).is_some() {
        return Ok(());
    }

    let link: web_sys::HtmlLinkElement = document
        .create_element("link")?
        .dyn_into::<web_sys::HtmlLinkElement>()?;
    link.set_id(id);
    link.set_rel("stylesheet");
    link.set_href(href);

    if let Some(head) = document.head() {
        head.append_child(&link)?;
    }

    Ok(())
}

/// True once `assets/map.js` has registered its helpers on `window`. Script
/// loading is asynchronous, so callers poll this before mounting.
pub fn map_bridge_ready() -> bool {
    web_sys::window()
        .map(|w| {
            js_sys::Reflect::has(w.as_ref(), &JsValue::from_str("createHeatmapMap"))
                .unwrap_or(false)
        })
        .unwrap_or(false)
}

/// Heat points scaled by the intensity multiplier, as the `[[lat, lng, w]]`
/// array the heat renderer expects.
pub fn heat_payload_json(points: &[HeatPoint], intensity: f64) -> String {
    let scaled: Vec<[f64; 3]> = points
        .iter()
        .map(|p| [p.lat(), p.lng(), p.intensity() * intensity])
        .collect();
    serde_json::to_string(&scaled).unwrap_or_else(|_| "[]".to_string())
}

/// Markers in their wire shape; the collaborator reads `_id`, `lat`, `lng`
/// and `name` directly.
pub fn markers_payload_json(markers: &[MarkerPoint]) -> String {
    serde_json::to_string(markers).unwrap_or_else(|_| "[]".to_string())
}

/// A mounted map instance.
pub struct MapRuntime {
    map_id: u32,
    _on_click: Closure<dyn FnMut(f64, f64)>,
    _on_remove: Closure<dyn FnMut(String)>,
}

impl MapRuntime {
    /// Create the map inside `container_id` and register the callbacks:
    /// map clicks feed the pending-marker composer, the popup remove button
    /// reports the marker id back.
    pub fn mount(
        container_id: &str,
        config: &WidgetConfig,
        on_click: impl FnMut(f64, f64) + 'static,
        on_remove: impl FnMut(String) + 'static,
    ) -> Self {
        let map_id = create_heatmap_map(container_id, &config.map_json());
        let on_click = Closure::wrap(Box::new(on_click) as Box<dyn FnMut(f64, f64)>);
        on_heatmap_map_click(map_id, &on_click);
        let on_remove = Closure::wrap(Box::new(on_remove) as Box<dyn FnMut(String)>);
        on_heatmap_marker_remove(map_id, &on_remove);
        Self {
            map_id,
            _on_click: on_click,
            _on_remove: on_remove,
        }
    }

    /// Push the heat options and the scaled point snapshot.
    pub fn push_heat(&self, options: &HeatLayerOptions, points: &[HeatPoint], fit_bounds: bool) {
        set_heatmap_options(self.map_id, &options.renderer_json(&HEAT_GRADIENT));
        set_heatmap_data(
            self.map_id,
            &heat_payload_json(points, options.intensity),
            fit_bounds,
        );
    }

    pub fn set_layer_visible(&self, visible: bool) {
        set_heatmap_visible(self.map_id, visible);
    }

    pub fn push_markers(&self, markers: &[MarkerPoint]) {
        set_heatmap_markers(self.map_id, &markers_payload_json(markers));
    }

    /// Show or clear the pending-marker indicator at the clicked location.
    pub fn show_pending(&self, pending: Option<(f64, f64)>) {
        match pending {
            Some((lat, lng)) => set_heatmap_pending(self.map_id, lat, lng),
            None => clear_heatmap_pending(self.map_id),
        }
    }
}

impl Drop for MapRuntime {
    fn drop(&mut self) {
        dispose_heatmap_map(self.map_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heat_payload_applies_the_intensity_multiplier() {
        let points = vec![HeatPoint(1.0, 2.0, 3.0), HeatPoint(4.0, 5.0, 0.5)];
        let json = heat_payload_json(&points, 2.0);
        let parsed: Vec<[f64; 3]> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![[1.0, 2.0, 6.0], [4.0, 5.0, 1.0]]);
    }

    #[test]
    fn unit_intensity_leaves_points_unchanged() {
        let points = vec![HeatPoint(1.0, 2.0, 3.0)];
        let json = heat_payload_json(&points, 1.0);
        assert_eq!(json, "[[1.0,2.0,3.0]]");
    }

    #[test]
    fn marker_payload_keeps_the_wire_shape() {
        let markers = vec![MarkerPoint {
            id: "m1".to_string(),
            lat: 1.0,
            lng: 2.0,
            name: "Home".to_string(),
        }];
        let json = markers_payload_json(&markers);
        assert!(json.contains("\"_id\":\"m1\""));
        assert!(json.contains("\"name\":\"Home\""));
    }
}
