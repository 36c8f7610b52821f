//! The showroom flow.
//!
//! [`Showroom`] is the device independent half: it owns the catalog, the selection loader
//! and the scene, and turns finished loads into an arranged [`ModelGroup`]. [`Viewer`] wraps
//! it as a [`GraphicsFlow`] that uploads attached groups, frames the camera and forwards the
//! live parameters to the GPU.

use instant::Duration;
use winit::event::{DeviceEvent, WindowEvent};

use crate::{
    catalog::{AssetDescriptor, Catalog},
    context::Context,
    controller::{self, Command, UiAction},
    config::ViewerConfig,
    data_structures::{
        bounds::Aabb,
        model::LoadedObject,
        scene_graph::{Generation, ModelGroup, Scene},
    },
    fit,
    flow::{self, EventSender, FlowConstructor, GraphicsFlow, Out},
    layout::{self, LayoutOptions},
    loader::{Completion, LoadRequest, SelectionLoader},
    material,
    params::ViewParams,
    render::{GpuGroup, Render},
    resources::{self, AssetSource, LoadError},
};

#[derive(Debug)]
pub enum ViewerEvent {
    Loaded {
        generation: Generation,
        slot: usize,
        result: Result<LoadedObject, LoadError>,
    },
    Ui(UiAction),
}

/// Selection, loading and layout state of the showroom.
#[derive(Debug)]
pub struct Showroom {
    catalog: Catalog,
    source: AssetSource,
    loader: SelectionLoader,
    scene: Scene,
    layout: LayoutOptions,
}

impl Showroom {
    pub fn new(catalog: Catalog, source: AssetSource, layout: LayoutOptions) -> Self {
        Self {
            catalog,
            source,
            loader: SelectionLoader::new(),
            scene: Scene::new(),
            layout,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(
            config.catalog.clone(),
            AssetSource::new(config.asset_root.clone()),
            config.layout_options(),
        )
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn source(&self) -> &AssetSource {
        &self.source
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn generation(&self) -> Generation {
        self.loader.generation()
    }

    /// Clears the scene and starts loading `descriptors` as a new selection. The returned
    /// requests have to be loaded and fed back through [`Showroom::loaded`].
    pub fn select(&mut self, descriptors: Vec<AssetDescriptor>) -> Vec<LoadRequest> {
        if let Some(previous) = self.scene.detach() {
            log::debug!("Detached group {} with {} objects", previous.generation, previous.len());
        }
        let requests = self.loader.begin(descriptors);
        if let Some(Completion::Ready { generation, .. }) = self.loader.poll_empty() {
            log::info!("Selection {} is empty, nothing to show", generation);
        }
        requests
    }

    /// Feeds one finished load. Returns the newly attached group once the whole selection
    /// is settled and at least one of its objects loaded.
    pub fn loaded(
        &mut self,
        generation: Generation,
        slot: usize,
        result: Result<LoadedObject, LoadError>,
        params: &ViewParams,
    ) -> Option<&ModelGroup> {
        let result = result.map(|mut object| {
            if generation == self.loader.generation() {
                material::normalize(&mut object, params);
            }
            object
        });
        match self.loader.complete(generation, slot, result) {
            Completion::Ready {
                generation,
                objects,
                failures,
            } => self.assemble(generation, objects, failures),
            Completion::Pending { remaining } => {
                log::debug!("Selection {} waits for {} more asset(s)", generation, remaining);
                None
            }
            Completion::Stale | Completion::Duplicate => None,
        }
    }

    fn assemble(
        &mut self,
        generation: Generation,
        objects: Vec<LoadedObject>,
        failures: usize,
    ) -> Option<&ModelGroup> {
        if objects.is_empty() {
            log::warn!(
                "Selection {} produced no objects ({} failed), nothing attached",
                generation,
                failures
            );
            return None;
        }
        let group = layout::arrange(generation, objects, &self.layout);
        log::info!(
            "Attaching selection {} with {} objects ({} failed)",
            generation,
            group.len(),
            failures
        );
        if let Some(previous) = self.scene.attach(group) {
            log::debug!("Replaced group {}", previous.generation);
        }
        self.scene.group()
    }

    /// Reapplies the live parameters to every attached material.
    pub fn apply_params(&mut self, params: &ViewParams) {
        if let Some(group) = self.scene.group_mut() {
            group
                .get_children_mut()
                .iter_mut()
                .for_each(|object| material::apply_params(object, params));
        }
    }

    pub fn bounds(&self) -> Option<Aabb> {
        self.scene.group().map(ModelGroup::bounds)
    }
}

/// Loads one request and wraps the outcome as an event.
pub async fn load(source: AssetSource, request: LoadRequest) -> ViewerEvent {
    let result = resources::load_object(&source, &request.descriptor).await;
    ViewerEvent::Loaded {
        generation: request.generation,
        slot: request.slot,
        result,
    }
}

pub struct Viewer {
    config: ViewerConfig,
    showroom: Showroom,
    gpu: Option<GpuGroup>,
    applied: Option<ViewParams>,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        let showroom = Showroom::from_config(&config);
        Self {
            config,
            showroom,
            gpu: None,
            applied: None,
        }
    }

    pub fn showroom(&self) -> &Showroom {
        &self.showroom
    }

    fn handle(&mut self, action: UiAction, params: &mut ViewParams) -> Out<ViewerEvent> {
        match controller::apply(action, self.showroom.catalog(), params) {
            Command::Load(descriptors) => {
                let requests = self.showroom.select(descriptors);
                // Dropping the upload releases the old group's buffers and textures
                self.gpu = None;
                if requests.is_empty() {
                    return Out::Empty;
                }
                let source = self.showroom.source().clone();
                Out::FutEvent(
                    requests
                        .into_iter()
                        .map(|request| flow::boxed(load(source.clone(), request)))
                        .collect(),
                )
            }
            Command::Refit => self.refit(),
            Command::Nothing => Out::Empty,
        }
    }

    fn refit(&self) -> Out<ViewerEvent> {
        let Some(bounds) = self.showroom.bounds() else {
            return Out::Empty;
        };
        let min_distance = self.config.min_fit_distance;
        Out::Configure(Box::new(move |ctx: &mut Context| {
            match fit::fit(&bounds, &ctx.camera.camera, ctx.projection.fovy, min_distance) {
                Some(framing) => {
                    fit::apply(&framing, &mut ctx.camera.camera, &mut ctx.projection);
                    ctx.camera.controller.reset();
                    log::info!(
                        "Framed camera at distance {:.2} (near {:.3}, far {:.1})",
                        framing.distance,
                        framing.znear,
                        framing.zfar
                    );
                }
                None => log::debug!("Nothing to frame"),
            }
        }))
    }
}

impl GraphicsFlow<ViewParams, ViewerEvent> for Viewer {
    fn on_init(
        &mut self,
        ctx: &mut Context,
        state: &mut ViewParams,
        #[allow(unused_variables)] events: EventSender<ViewerEvent>,
    ) -> Out<ViewerEvent> {
        ctx.clear_colour = self.config.clear_colour();
        ctx.camera.camera.position = self.config.camera_position.into();
        ctx.camera.camera.target = cgmath::Point3::new(0.0, 0.0, 0.0);
        ctx.projection.fovy = cgmath::Deg(self.config.fov_degrees).into();
        ctx.projection.znear = self.config.znear;
        ctx.projection.zfar = self.config.zfar;

        #[cfg(target_arch = "wasm32")]
        {
            controller::web::bind_controls(move |action| {
                if !events.send(ViewerEvent::Ui(action)) {
                    log::warn!("UI event dropped, event loop is gone");
                }
            });
            controller::web::sync_sliders(state);
        }

        match self.config.initial_selection.clone() {
            Some(name) => self.handle(UiAction::Select(name), state),
            None => Out::Empty,
        }
    }

    fn on_update(&mut self, _: &Context, _: &mut ViewParams, _: Duration) -> Out<ViewerEvent> {
        Out::Empty
    }

    fn on_device_events(
        &mut self,
        _: &Context,
        _: &mut ViewParams,
        _: &DeviceEvent,
    ) -> Out<ViewerEvent> {
        Out::Empty
    }

    fn on_window_events(
        &mut self,
        _: &Context,
        state: &mut ViewParams,
        event: &WindowEvent,
    ) -> Out<ViewerEvent> {
        match controller::window_action(event, self.showroom.catalog()) {
            Some(action) => self.handle(action, state),
            None => Out::Empty,
        }
    }

    fn on_custom_events(
        &mut self,
        ctx: &Context,
        state: &mut ViewParams,
        event: ViewerEvent,
    ) -> Out<ViewerEvent> {
        match event {
            ViewerEvent::Ui(action) => self.handle(action, state),
            ViewerEvent::Loaded {
                generation,
                slot,
                result,
            } => match self.showroom.loaded(generation, slot, result, state) {
                Some(group) => {
                    self.gpu = Some(GpuGroup::upload(ctx, group, state));
                    self.refit()
                }
                None => Out::Empty,
            },
        }
    }

    fn on_render(&mut self, ctx: &Context, state: &ViewParams) -> Render<'_> {
        let params = *state;
        if self.applied != Some(params) {
            self.showroom.apply_params(&params);
            ctx.light.write_exposure(&ctx.queue, params.exposure());
            #[cfg(target_arch = "wasm32")]
            controller::web::sync_sliders(&params);
            self.applied = Some(params);
        }
        // A fresh upload may lag behind the parameters; this is a no-op otherwise
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.sync_params(&ctx.queue, &params);
        }
        Render::from(self.gpu.as_ref())
    }
}

/// Opens the showroom window and runs it until it is closed.
pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    let params = config.params;
    let constructor: FlowConstructor<ViewParams, ViewerEvent> =
        Box::new(move |_: &Context| Box::new(Viewer::new(config)));
    flow::run(params, vec![constructor])
}
