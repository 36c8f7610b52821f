//! Flow control and application event loop.
//!
//! A "flow" is a self-contained part of the application that handles user input, reacts to
//! its own asynchronous events and says what to draw each frame. The runtime owns the GPU
//! context and the shared application state and drives every flow through the winit
//! event loop.
//!
//! # User-facing types
//!
//! - [`GraphicsFlow<S, E>`] is the trait implemented by flows
//! - [`Out<E>`] is the output type for async event handling and context configuration
//! - [`EventSender<E>`] lets code outside the event loop (e.g. DOM callbacks) post events
//!
//! # Lifecycle Flow
//!
//! The event loop follows this pattern each frame:
//! 1. Collect window/device events
//! 2. Call `on_<device/window/custom>_events` on all flows for event distribution
//! 3. Record frame statistics, update the orbit camera and the flows (via `on_update`)
//! 4. Call the flows' `on_render()` with a snapshot of the state to collect drawables
//! 5. Render to the frame buffer with the standard pipeline
//! 6. Present frame

use std::{fmt::Debug, iter, sync::Arc};

use instant::{Duration, Instant};

use futures::future::FutureExt;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    context::Context,
    data_structures::texture::Texture,
    render::{DrawStandard, Instanced, Render},
    stats::FrameStats,
};

const WINDOW_TITLE: &str = "flow-showroom";

/// Futures handed to the runtime. Natively they run on a multi-threaded runtime and must
/// be `Send`; in the browser they stay on the main thread.
#[cfg(not(target_arch = "wasm32"))]
pub type FlowFuture<E> = futures::future::BoxFuture<'static, E>;
#[cfg(target_arch = "wasm32")]
pub type FlowFuture<E> = futures::future::LocalBoxFuture<'static, E>;

/// `Send` where futures cross threads, nothing in the browser.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSend: Send {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send> MaybeSend for T {}
#[cfg(target_arch = "wasm32")]
pub trait MaybeSend {}
#[cfg(target_arch = "wasm32")]
impl<T> MaybeSend for T {}

/// Boxes a future the way the current platform needs it.
#[cfg(not(target_arch = "wasm32"))]
pub fn boxed<E, F>(future: F) -> FlowFuture<E>
where
    F: Future<Output = E> + Send + 'static,
{
    future.boxed()
}
#[cfg(target_arch = "wasm32")]
pub fn boxed<E, F>(future: F) -> FlowFuture<E>
where
    F: Future<Output = E> + 'static,
{
    future.boxed_local()
}

///
/// This is the Output Type for every lifecycle hook where the user can pass async events that are
/// handled according to the platform you're running on.
///
/// `Out::FutEvent` resolves every future independently and puts its event in the event queue as
/// soon as it completes. The caller is responsible for handling the event later on and it will
/// have no side effects unless handled.
///
/// `Out::Configure` can be used to modify the Context during runtime, for instance to move the
/// camera or change the clear colour.
///
/// `Out::Pass` hands a custom event that was not consumed on to the next flow.
///
/// `Empty` is the default output used when no eventing/futures need to be handled.
///
pub enum Out<E> {
    FutEvent(Vec<FlowFuture<E>>),
    Configure(Box<dyn FnOnce(&mut Context)>),
    Pass(E),
    Empty,
}

impl<E> Default for Out<E> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<E> Debug for Out<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Out::FutEvent(futures) => write!(f, "FutEvent({} futures)", futures.len()),
            Out::Configure(_) => f.write_str("Configure(|&mut Context| -> {...})"),
            Out::Pass(_) => f.write_str("Pass(E)"),
            Out::Empty => f.write_str("Empty"),
        }
    }
}

/// Trait for implementing a part of the application.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once when the context is ready; configure context (camera, clear colour, etc.)
/// 2. `on_window_events()` and `on_device_events()` are called for each winit input event
/// 3. `on_custom_events()` is called for the flow's own events, e.g. finished futures
/// 4. `on_update()` is called every frame
/// 5. `on_render()` is called each frame and specifies what to draw
///
pub trait GraphicsFlow<S, E> {
    /// Initialize the flow and configure the context.
    ///
    /// `events` can be cloned into callbacks that live outside the event loop.
    fn on_init(&mut self, ctx: &mut Context, state: &mut S, events: EventSender<E>) -> Out<E>;

    /// Update state every frame.
    fn on_update(&mut self, ctx: &Context, state: &mut S, dt: Duration) -> Out<E>;

    /// Handle raw device events (keyboard, mouse hardware input).
    fn on_device_events(&mut self, ctx: &Context, state: &mut S, event: &DeviceEvent) -> Out<E>;

    /// Handle window events (keyboard, mouse, window resizing, etc.).
    fn on_window_events(&mut self, ctx: &Context, state: &mut S, event: &WindowEvent) -> Out<E>;

    /// Handle custom application events.
    ///
    /// Return [`Out::Pass`] with the event if it was not consumed, allowing it to be passed
    /// to the next flow.
    fn on_custom_events(&mut self, ctx: &Context, state: &mut S, event: E) -> Out<E>;

    /// Return renderable objects for this flow.
    ///
    /// Called each frame with a snapshot of the state. Uniforms that follow the state may
    /// be written through `ctx.queue` here.
    fn on_render(&mut self, ctx: &Context, state: &S) -> Render<'_>;
}

// Dummy impl to make wasm work
impl<State, Event> Debug for dyn GraphicsFlow<State, Event> + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// Type alias for a flow constructor (factory function).
///
/// Constructors run once the GPU context exists.
pub type FlowConstructor<S, E> = Box<dyn FnOnce(&Context) -> Box<dyn GraphicsFlow<S, E>>>;

/// Posts custom events into the event loop from anywhere on the event loop's thread.
pub struct EventSender<E: 'static> {
    proxy: EventLoopProxy<FlowEvent<E>>,
}

impl<E: 'static> Clone for EventSender<E> {
    fn clone(&self) -> Self {
        Self {
            proxy: self.proxy.clone(),
        }
    }
}

impl<E: 'static> EventSender<E> {
    /// Returns `false` once the event loop has shut down.
    pub fn send(&self, event: E) -> bool {
        self.proxy.send_event(FlowEvent::Custom(event)).is_ok()
    }
}

/// Application state bundle: GPU context, app state, and surface status.
#[derive(Debug)]
pub struct AppState<State: 'static> {
    pub(crate) ctx: Context,
    state: State,
    is_surface_configured: bool,
}

impl<State> AppState<State> {
    #[cfg(not(target_arch = "wasm32"))]
    async fn new(window: Arc<Window>, state: State) -> anyhow::Result<Self> {
        let ctx = Context::new(window).await?;
        Ok(Self {
            ctx,
            state,
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
        }
    }

    fn render<Event>(
        &mut self,
        graphics_flows: &mut [Box<dyn GraphicsFlow<State, Event>>],
    ) -> Result<(), wgpu::CurrentSurfaceTexture> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = match self.ctx.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(texture)
            | wgpu::CurrentSurfaceTexture::Suboptimal(texture) => texture,
            status => return Err(status),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder: wgpu::CommandEncoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });
        {
            let ctx = &self.ctx;
            let mut render_pass: wgpu::RenderPass<'_> =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(ctx.clear_colour),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &ctx.depth_texture.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                    ..Default::default()
                });

            let snapshot = &self.state;
            let mut basics: Vec<Instanced> = Vec::new();
            graphics_flows.iter_mut().for_each(|flow| {
                flow.on_render(ctx, snapshot).collect(&mut basics);
            });

            render_pass.set_pipeline(&ctx.pipeline);
            for instanced in basics {
                if instanced.amount == 0 || instanced.instance.size() == 0 {
                    log::warn!("you attempted to render something with zero instances");
                    continue;
                }
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_mesh_instanced(
                    instanced.mesh,
                    0..instanced.amount as u32,
                    &ctx.camera.bind_group,
                    &ctx.light.bind_group,
                );
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

pub struct App<State: 'static, Event: 'static> {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<FlowEvent<Event>>,
    state: Option<AppState<State>>,
    // This will hold the fully initialized flows once they are ready.
    graphics_flows: Vec<Box<dyn GraphicsFlow<State, Event>>>,
    // Taken once the context exists
    constructors: Option<Vec<FlowConstructor<State, Event>>>,
    initial_state: Option<State>,
    started: bool,
    last_time: Instant,
    stats: FrameStats,
}

impl<State, Event> App<State, Event>
where
    State: 'static,
    Event: 'static,
{
    fn new(
        event_loop: &EventLoop<FlowEvent<Event>>,
        initial_state: State,
        constructors: Vec<FlowConstructor<State, Event>>,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            initial_state: Some(initial_state),
            started: false,
            last_time: Instant::now(),
            stats: FrameStats::default(),
        })
    }

    /// Builds the flows and runs their `on_init` hooks.
    fn initialize(&mut self, mut app_state: AppState<State>)
    where
        Event: MaybeSend,
    {
        let constructors = self.constructors.take().unwrap_or_default();
        self.graphics_flows = constructors
            .into_iter()
            .map(|constructor| constructor(&app_state.ctx))
            .collect();

        let size = app_state.ctx.window.inner_size();
        app_state.resize(size.width, size.height);
        for flow in self.graphics_flows.iter_mut() {
            let events = EventSender {
                proxy: self.proxy.clone(),
            };
            let out = flow.on_init(&mut app_state.ctx, &mut app_state.state, events);
            handle_flow_output(
                #[cfg(not(target_arch = "wasm32"))]
                &self.async_runtime,
                &mut app_state.ctx,
                &self.proxy,
                out,
            );
        }
        app_state.ctx.window.request_redraw();
        self.state = Some(app_state);
    }
}

pub(crate) enum FlowEvent<Event: 'static> {
    // Only the browser initializes asynchronously; natively the context is built in `resumed`
    #[cfg(target_arch = "wasm32")]
    Initialized(anyhow::Result<Context>),
    Custom(Event),
}

impl<Event> Debug for FlowEvent<Event> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(target_arch = "wasm32")]
            Self::Initialized(ctx) => f
                .debug_tuple("Initialized")
                .field(&ctx.as_ref().map(|_| "Context"))
                .finish(),
            Self::Custom(_) => f.write_str("Custom(E)"),
        }
    }
}

impl<State: 'static, Event: 'static + MaybeSend> ApplicationHandler<FlowEvent<Event>>
    for App<State, Event>
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Mobile and web platforms may resume more than once
        if self.started {
            return;
        }
        self.started = true;

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title(WINDOW_TITLE);

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let canvas = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(CANVAS_ID));
            match canvas {
                Some(canvas) => {
                    window_attributes =
                        window_attributes.with_canvas(Some(canvas.unchecked_into()));
                }
                None => log::warn!("No <canvas id=\"{}\"> found, winit creates one", CANVAS_ID),
            }
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Could not create the window: {}", e);
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            let Some(state) = self.initial_state.take() else {
                return;
            };
            match self.async_runtime.block_on(AppState::new(window, state)) {
                Ok(app_state) => self.initialize(app_state),
                Err(e) => {
                    log::error!("App initialization failed. Cannot create the main context: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let ctx = Context::new(window).await;
                if proxy.send_event(FlowEvent::Initialized(ctx)).is_err() {
                    log::error!("Event loop closed before the context was ready");
                }
            });
        }
    }

    #[cfg_attr(not(target_arch = "wasm32"), allow(unused_variables))]
    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent<Event>) {
        match event {
            #[cfg(target_arch = "wasm32")]
            FlowEvent::Initialized(ctx) => {
                // This is the message from our wasm `spawn_local`
                let ctx = match ctx {
                    Ok(ctx) => ctx,
                    Err(e) => {
                        log::error!("App initialization failed. Cannot create the main context: {:#}", e);
                        event_loop.exit();
                        return;
                    }
                };
                let Some(state) = self.initial_state.take() else {
                    return;
                };
                self.initialize(AppState {
                    ctx,
                    state,
                    is_surface_configured: false,
                });
            }
            FlowEvent::Custom(custom_event) => {
                let Some(state) = &mut self.state else {
                    log::warn!("Custom event arrived before initialization and was dropped");
                    return;
                };
                let mut pending = Some(custom_event);
                for flow in self.graphics_flows.iter_mut() {
                    let Some(event) = pending.take() else {
                        break;
                    };
                    match flow.on_custom_events(&state.ctx, &mut state.state, event) {
                        Out::Pass(event) => pending = Some(event),
                        out => handle_flow_output(
                            #[cfg(not(target_arch = "wasm32"))]
                            &self.async_runtime,
                            &mut state.ctx,
                            &self.proxy,
                            out,
                        ),
                    }
                }
                if pending.is_some() {
                    log::warn!("Warning! Custom event was not consumed this cycle");
                }
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            state.ctx.camera.controller.handle_mouse(dx, dy);
        }
        self.graphics_flows.iter_mut().for_each(|f| {
            let out = f.on_device_events(&state.ctx, &mut state.state, &event);
            handle_flow_output(
                #[cfg(not(target_arch = "wasm32"))]
                &self.async_runtime,
                &mut state.ctx,
                &self.proxy,
                out,
            );
        });
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        // general stuff
        state.ctx.camera.controller.handle_window_events(&event);

        self.graphics_flows.iter_mut().for_each(|f| {
            let out = f.on_window_events(&state.ctx, &mut state.state, &event);
            handle_flow_output(
                #[cfg(not(target_arch = "wasm32"))]
                &self.async_runtime,
                &mut state.ctx,
                &self.proxy,
                out,
            );
        });

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                if let Some(report) = self.stats.record(dt) {
                    log::debug!(
                        "{} frames, {:.1} fps, mean {:.2} ms, worst {:.2} ms",
                        report.frames,
                        report.fps,
                        report.mean_ms,
                        report.worst_ms
                    );
                    state.ctx.window.set_title(&report.title(WINDOW_TITLE));
                }

                // Update the camera
                state
                    .ctx
                    .camera
                    .controller
                    .update(&mut state.ctx.camera.camera, dt);
                state.ctx.write_camera();
                // Update custom stuff
                self.graphics_flows.iter_mut().for_each(|f| {
                    let out = f.on_update(&state.ctx, &mut state.state, dt);
                    handle_flow_output(
                        #[cfg(not(target_arch = "wasm32"))]
                        &self.async_runtime,
                        &mut state.ctx,
                        &self.proxy,
                        out,
                    );
                });

                match state.render(&mut self.graphics_flows) {
                    Ok(_) => (),
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::CurrentSurfaceTexture::Lost | wgpu::CurrentSurfaceTexture::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {:?}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

fn handle_flow_output<Event: 'static + MaybeSend>(
    #[cfg(not(target_arch = "wasm32"))] async_runtime: &tokio::runtime::Runtime,
    ctx: &mut Context,
    proxy: &EventLoopProxy<FlowEvent<Event>>,
    out: Out<Event>,
) {
    match out {
        // Every future reports back on its own so slow loads don't hold up fast ones
        Out::FutEvent(futures) => {
            for future in futures {
                let proxy = proxy.clone();
                let task = async move {
                    let event = future.await;
                    if proxy.send_event(FlowEvent::Custom(event)).is_err() {
                        log::warn!("Event loop was closed before a future resolved");
                    }
                };
                #[cfg(not(target_arch = "wasm32"))]
                async_runtime.spawn(task);
                #[cfg(target_arch = "wasm32")]
                wasm_bindgen_futures::spawn_local(task);
            }
        }
        Out::Configure(f) => f(ctx),
        Out::Pass(_) => log::warn!("Only custom events can be passed on; dropping the event"),
        Out::Empty => (),
    }
}

/// Installs the platform logger. Safe to call more than once.
pub fn init_logging() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        // Fails only if a logger is already installed
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init();
    }

    #[cfg(target_arch = "wasm32")]
    {
        let _ = console_log::init_with_level(log::Level::Info);
    }
}

/// Runs the event loop until the window is closed.
///
/// `initial_state` becomes the state shared by all flows; every constructor is invoked
/// once the GPU context is ready.
pub fn run<State: 'static, Event: 'static + MaybeSend>(
    initial_state: State,
    constructors: Vec<FlowConstructor<State, Event>>,
) -> anyhow::Result<()> {
    init_logging();

    let event_loop: EventLoop<FlowEvent<Event>> = EventLoop::with_user_event().build()?;

    let mut app: App<State, Event> = App::new(&event_loop, initial_state, constructors)?;

    #[cfg(not(target_arch = "wasm32"))]
    event_loop.run_app(&mut app)?;

    #[cfg(target_arch = "wasm32")]
    {
        use winit::platform::web::EventLoopExtWebSys;
        event_loop.spawn_app(app);
    }

    Ok(())
}
