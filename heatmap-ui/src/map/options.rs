//! Overlay rendering parameters and widget configuration.
//!
//! Six numeric knobs control how heat points are drawn. Each has a fixed
//! inclusive range and step; out-of-range input is clamped, never rejected,
//! so the overlay stays renderable no matter what the sliders report. The
//! knobs affect rendering only — they have no effect on the data or on
//! network calls.

use serde_json::json;

/// Inclusive range plus step for one knob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Clamp into range and snap to the step grid. Non-finite input falls
    /// back to the minimum.
    pub fn clamp(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.min;
        }
        let clamped = value.clamp(self.min, self.max);
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }
}

/// One adjustable rendering parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Knob {
    Radius,
    Blur,
    Max,
    MaxZoom,
    MinOpacity,
    Intensity,
}

impl Knob {
    pub const ALL: [Knob; 6] = [
        Knob::Radius,
        Knob::Blur,
        Knob::Max,
        Knob::MaxZoom,
        Knob::MinOpacity,
        Knob::Intensity,
    ];

    pub fn range(self) -> ParamRange {
        match self {
            Knob::Radius => ParamRange::new(1.0, 40.0, 1.0),
            Knob::Blur => ParamRange::new(1.0, 30.0, 1.0),
            Knob::Max => ParamRange::new(0.1, 5.0, 0.1),
            Knob::MaxZoom => ParamRange::new(1.0, 36.0, 1.0),
            Knob::MinOpacity => ParamRange::new(0.0, 0.2, 0.01),
            Knob::Intensity => ParamRange::new(0.5, 5.0, 0.1),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Knob::Radius => "Radius",
            Knob::Blur => "Blur",
            Knob::Max => "Max",
            Knob::MaxZoom => "Max zoom",
            Knob::MinOpacity => "Min opacity",
            Knob::Intensity => "Intensity",
        }
    }
}

/// The heat overlay knobs. `intensity` is a client-side multiplier applied
/// to each point before it reaches the renderer; the rest map directly onto
/// heat-layer options.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatLayerOptions {
    pub radius: f64,
    pub blur: f64,
    pub max: f64,
    pub max_zoom: f64,
    pub min_opacity: f64,
    pub intensity: f64,
}

impl Default for HeatLayerOptions {
    fn default() -> Self {
        Self {
            radius: 11.0,
            blur: 18.0,
            max: 3.5,
            max_zoom: 18.0,
            min_opacity: 0.01,
            intensity: 1.0,
        }
    }
}

impl HeatLayerOptions {
    pub fn get(&self, knob: Knob) -> f64 {
        match knob {
            Knob::Radius => self.radius,
            Knob::Blur => self.blur,
            Knob::Max => self.max,
            Knob::MaxZoom => self.max_zoom,
            Knob::MinOpacity => self.min_opacity,
            Knob::Intensity => self.intensity,
        }
    }

    /// Set a knob, clamping into its range.
    pub fn set(&mut self, knob: Knob, value: f64) {
        let value = knob.range().clamp(value);
        match knob {
            Knob::Radius => self.radius = value,
            Knob::Blur => self.blur = value,
            Knob::Max => self.max = value,
            Knob::MaxZoom => self.max_zoom = value,
            Knob::MinOpacity => self.min_opacity = value,
            Knob::Intensity => self.intensity = value,
        }
    }

    /// Options object for the heat renderer. Intensity is excluded — it is
    /// folded into the point data instead.
    pub fn renderer_json(&self, gradient: &[(f64, &str)]) -> String {
        let gradient: serde_json::Map<String, serde_json::Value> = gradient
            .iter()
            .map(|(stop, color)| (stop.to_string(), json!(color)))
            .collect();
        json!({
            "radius": self.radius,
            "blur": self.blur,
            "max": self.max,
            "maxZoom": self.max_zoom,
            "minOpacity": self.min_opacity,
            "gradient": gradient,
        })
        .to_string()
    }
}

/// Color ramp for the density overlay.
pub const HEAT_GRADIENT: [(f64, &str); 6] = [
    (0.1, "#89BDE0"),
    (0.2, "#96E3E6"),
    (0.4, "#82CEB6"),
    (0.6, "#FAF3A5"),
    (0.8, "#F5D98B"),
    (1.0, "#DE9A96"),
];

/// Marker icon handed to the map at construction. Explicit configuration, not
/// a module-global default swap.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerIcon {
    pub icon_url: String,
    pub shadow_url: String,
    /// Pixel offset from the icon's top-left corner to its tip.
    pub anchor: (f64, f64),
}

impl Default for MarkerIcon {
    fn default() -> Self {
        Self {
            icon_url: "https://unpkg.com/leaflet@1.9.4/dist/images/marker-icon.png".to_string(),
            shadow_url: "https://unpkg.com/leaflet@1.9.4/dist/images/marker-shadow.png".to_string(),
            anchor: (12.5, 41.0),
        }
    }
}

/// Everything the widget needs at construction. The deployment picks default
/// knob values and feature flags here instead of forking the component.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetConfig {
    pub options: HeatLayerOptions,
    /// Re-fit the viewport to the heat data whenever it is replaced.
    pub fit_bounds_on_update: bool,
    pub center: (f64, f64),
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
    pub marker_icon: MarkerIcon,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            options: HeatLayerOptions::default(),
            fit_bounds_on_update: false,
            center: (24.786520252180928, 120.99776387214662),
            zoom: 16,
            tile_url: "https://{s}.tile.osm.org/{z}/{x}/{y}.png".to_string(),
            attribution:
                "&copy; <a href=\"https://osm.org/copyright\">OpenStreetMap</a> contributors"
                    .to_string(),
            marker_icon: MarkerIcon::default(),
        }
    }
}

impl WidgetConfig {
    /// Construction-time payload for the map collaborator.
    pub fn map_json(&self) -> String {
        json!({
            "center": [self.center.0, self.center.1],
            "zoom": self.zoom,
            "tileUrl": self.tile_url,
            "attribution": self.attribution,
            "icon": {
                "iconUrl": self.marker_icon.icon_url,
                "shadowUrl": self.marker_icon.shadow_url,
                "iconAnchor": [self.marker_icon.anchor.0, self.marker_icon.anchor.1],
            },
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_within_their_ranges() {
        let options = HeatLayerOptions::default();
        for knob in Knob::ALL {
            let range = knob.range();
            let value = options.get(knob);
            assert!(
                value >= range.min && value <= range.max,
                "{} default {} outside {}..={}",
                knob.label(),
                value,
                range.min,
                range.max
            );
        }
    }

    #[test]
    fn out_of_range_input_is_clamped_not_rejected() {
        let mut options = HeatLayerOptions::default();
        options.set(Knob::Radius, 500.0);
        assert_eq!(options.radius, 40.0);
        options.set(Knob::Radius, -3.0);
        assert_eq!(options.radius, 1.0);
        options.set(Knob::MinOpacity, 0.9);
        assert_eq!(options.min_opacity, 0.2);
    }

    #[test]
    fn values_snap_to_the_step_grid() {
        let mut options = HeatLayerOptions::default();
        options.set(Knob::Blur, 12.7);
        assert_eq!(options.blur, 13.0);
        options.set(Knob::Max, 2.34);
        assert!((options.max - 2.3).abs() < 1e-9);
    }

    #[test]
    fn non_finite_input_falls_back_to_the_minimum() {
        let mut options = HeatLayerOptions::default();
        options.set(Knob::Intensity, f64::NAN);
        assert_eq!(options.intensity, 0.5);
        options.set(Knob::Blur, f64::INFINITY);
        assert_eq!(options.blur, 30.0);
    }

    #[test]
    fn renderer_json_uses_heat_layer_names_and_skips_intensity() {
        let options = HeatLayerOptions::default();
        let rendered = options.renderer_json(&HEAT_GRADIENT);
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["radius"], 11.0);
        assert_eq!(value["maxZoom"], 18.0);
        assert_eq!(value["minOpacity"], 0.01);
        assert_eq!(value["gradient"]["0.1"], "#89BDE0");
        assert!(value.get("intensity").is_none());
    }

    #[test]
    fn widget_config_json_carries_icon_and_viewport() {
        let config = WidgetConfig::default();
        let value: serde_json::Value = serde_json::from_str(&config.map_json()).unwrap();
        assert_eq!(value["zoom"], 16);
        assert_eq!(value["icon"]["iconAnchor"][1], 41.0);
        assert!(value["tileUrl"].as_str().unwrap().contains("{z}"));
    }
}
