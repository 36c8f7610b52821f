#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    flow_showroom::flow::init_logging();
    let config = flow_showroom::ViewerConfig::from_env()?;
    flow_showroom::run(config)
}

// The browser build starts through the library's `#[wasm_bindgen(start)]` hook
#[cfg(target_arch = "wasm32")]
fn main() {}
