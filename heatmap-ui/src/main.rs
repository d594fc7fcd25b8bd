use dioxus::launch;
use dioxus::prelude::*;
use dioxus_logger::tracing::Level;

use heatmap_ui::map::options::WidgetConfig;
use heatmap_ui::HeatmapDashboard;

fn main() {
    // Initialize logging for WASM
    wasm_logger::init(wasm_logger::Config::default());
    dioxus_logger::init(Level::INFO).ok();

    launch(App);
}

#[component]
fn App() -> Element {
    rsx! {
        div {
            style: "min-height: 100vh; background-color: #111827; color: white; padding: 1rem;",
            HeatmapDashboard { config: WidgetConfig::default() }
        }
    }
}
