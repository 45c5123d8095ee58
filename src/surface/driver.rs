use crate::config::Settings;
use crate::errors::SurfaceError;
use crate::events::{EventSource, HostEvent, KeyEvent, SizeChange};
use crate::host::{Placeholder, SurfaceHost};
use crate::render::backend::{
    BackendFactory, FramebufferHandle, PaintSurface, PixelFormat, SurfaceConfig,
};
use crate::render::Viewport;
use crate::surface::lifecycle::{BackendSlot, LifecycleState};
use crate::surface::negotiator::{Negotiation, SurfaceNegotiator};
use crate::surface::timer::{Clock, FrameTimer, SystemClock};
use crate::surface::SurfaceId;
use crate::tick::{FrameGate, FrameStamp, TickOutcome};
use std::thread::{self, ThreadId};
use std::time::Duration;

/// What the render listener gets to see of a presented frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Wall-clock time since the previous presented frame (or since start for the first one)
    pub elapsed: Duration,
    /// Number of frames presented so far, this one included
    pub frame_index: u64,
    /// Backend framebuffer the frame was presented from
    pub framebuffer: FramebufferHandle,
    /// Framebuffer width in device pixels
    pub width: u32,
    /// Framebuffer height in device pixels
    pub height: u32,
    pub format: PixelFormat,
}

/// What a paint pass ended up doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaintOutcome {
    /// Backend content was presented and the listeners ran
    Presented(FrameContext),
    /// A placeholder was drawn instead of backend content
    Placeholder(Placeholder),
    /// Nothing was drawn (degenerate layout, or the surface is unloaded)
    Skipped,
}

type RenderListener = Box<dyn FnMut(&FrameContext)>;
type AsyncRenderListener = Box<dyn FnMut()>;
type ReadyListener = Box<dyn FnOnce()>;

/// Drives a backend surface from host notifications.
///
/// A driver lives on the host UI thread. Every public entry point asserts (in debug builds)
/// that it is called from the thread that created the driver; there is no locking.
pub struct SurfaceDriver<H: SurfaceHost> {
    /// ID of the surface, used in log output
    id: SurfaceId,
    /// Host UI framework
    host: H,
    /// Builds the backend on start
    factory: Box<dyn BackendFactory>,
    /// Copy of the settings taken at start
    settings: Option<Settings>,
    /// Size/format policy, available once started
    negotiator: Option<SurfaceNegotiator>,
    lifecycle: LifecycleState,
    backend: BackendSlot,

    /// Last visibility reported by the host
    visible: bool,
    /// Is the host frame clock currently delivering ticks to us
    subscribed: bool,
    /// Duplicate frame suppression
    gate: FrameGate,
    /// Current logical layout size
    layout: Viewport,
    /// Time between presented frames
    timer: FrameTimer,
    frame_index: u64,

    on_render: Option<RenderListener>,
    on_async_render: Option<AsyncRenderListener>,
    on_ready: Option<ReadyListener>,

    /// Host UI thread
    owner: ThreadId,
}

impl<H: SurfaceHost> SurfaceDriver<H> {
    /// Creates an unstarted driver. The backend is only constructed by [`start`](Self::start).
    pub fn new(host: H, factory: impl BackendFactory + 'static) -> Self {
        Self {
            id: SurfaceId::new(),
            host,
            factory: Box::new(factory),
            settings: None,
            negotiator: None,
            lifecycle: LifecycleState::Unstarted,
            backend: BackendSlot::NoBackend,
            visible: false,
            subscribed: false,
            gate: FrameGate::new(),
            layout: Viewport::default(),
            timer: FrameTimer::new(Box::new(SystemClock)),
            frame_index: 0,
            on_render: None,
            on_async_render: None,
            on_ready: None,
            owner: thread::current().id(),
        }
    }

    /// Replace the clock used to measure elapsed time between frames.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.timer = FrameTimer::new(Box::new(clock));
        self
    }

    /// Register the per-frame render listener. Called after every present.
    pub fn on_render(&mut self, f: impl FnMut(&FrameContext) + 'static) {
        self.assert_owner_thread();
        if self.on_render.replace(Box::new(f)).is_some() {
            log::debug!("Surface[{}]: replacing render listener", self.id);
        }
    }

    /// Register the post-present listener, for out-of-band GPU work. Called after the render
    /// listener.
    pub fn on_async_render(&mut self, f: impl FnMut() + 'static) {
        self.assert_owner_thread();
        if self.on_async_render.replace(Box::new(f)).is_some() {
            log::debug!("Surface[{}]: replacing async render listener", self.id);
        }
    }

    /// Register the listener fired once at the end of a successful [`start`](Self::start).
    pub fn on_ready(&mut self, f: impl FnOnce() + 'static) {
        self.assert_owner_thread();
        if self.on_ready.replace(Box::new(f)).is_some() {
            log::debug!("Surface[{}]: replacing ready listener", self.id);
        }
    }

    /// Start the surface: copy the settings, construct the backend and begin driving frames.
    ///
    /// Fails without touching any state when the surface was started before, when the
    /// settings are invalid, or when the backend cannot be constructed.
    pub fn start(&mut self, settings: &Settings) -> Result<(), SurfaceError> {
        self.assert_owner_thread();
        if let Err(e) = self.lifecycle.check_can_start() {
            log::error!("Surface[{}]: start refused in state {:?}", self.id, self.lifecycle);
            return Err(e);
        }
        settings.validate()?;

        let settings = settings.clone();
        let backend = self.factory.construct(&settings.backend)?;
        log::info!(
            "Surface[{}]: started with {} (continuous: {}, device dpi: {}, transparent: {})",
            self.id,
            backend.name(),
            settings.render_continuously,
            settings.use_device_dpi,
            settings.transparent_background
        );

        self.negotiator = Some(SurfaceNegotiator::new(&settings));
        self.backend = BackendSlot::Backend(backend);
        self.settings = Some(settings);
        self.lifecycle = LifecycleState::Started;
        self.gate = FrameGate::new();
        self.frame_index = 0;
        self.timer.restart();

        self.sync_frame_clock();
        self.host.request_redraw();

        if let Some(ready) = self.on_ready.take() {
            ready();
        }
        Ok(())
    }

    /// Dispatch a host notification.
    pub fn handle_event(&mut self, event: HostEvent) -> Result<(), SurfaceError> {
        match event {
            HostEvent::VisibilityChanged(visible) => self.on_visibility_changed(visible),
            HostEvent::FrameTick(stamp) => {
                self.on_frame_clock_tick(stamp);
            }
            HostEvent::SizeChanged(change) => {
                self.on_size_changed(change);
            }
            HostEvent::Loaded => self.on_loaded(),
            HostEvent::Unloaded => return self.on_unloaded(),
            HostEvent::KeyDown(key) => {
                self.on_key(&key, true);
            }
            HostEvent::KeyUp(key) => {
                self.on_key(&key, false);
            }
        }
        Ok(())
    }

    /// Track visibility and (un)subscribe the frame clock accordingly.
    pub fn on_visibility_changed(&mut self, visible: bool) {
        self.assert_owner_thread();
        self.visible = visible;
        self.sync_frame_clock();
    }

    /// Host frame clock fired. Requests a redraw for every new frame when rendering
    /// continuously.
    pub fn on_frame_clock_tick(&mut self, stamp: FrameStamp) -> TickOutcome {
        self.assert_owner_thread();
        if !self.subscribed {
            return TickOutcome::Ignored;
        }
        if !self.gate.admit(stamp) {
            log::trace!("Surface[{}]: duplicate frame {:?}", self.id, stamp);
            return TickOutcome::Duplicate;
        }
        if self.render_continuously() {
            self.host.request_redraw();
            TickOutcome::RedrawRequested
        } else {
            TickOutcome::Recorded
        }
    }

    /// Record the new layout size. Returns true when a redraw was requested; an unloaded surface
    /// never asks for one.
    pub fn on_size_changed(&mut self, change: SizeChange) -> bool {
        self.assert_owner_thread();
        self.layout = change.new;

        let unloaded = self.lifecycle == LifecycleState::Unloaded;
        if !unloaded && change.new.has_area() && change.any_changed() {
            self.host.request_redraw();
            true
        } else {
            log::trace!("Surface[{}]: no redraw for size change {:?}", self.id, change);
            false
        }
    }

    /// Control attached to the host tree.
    pub fn on_loaded(&mut self) {
        self.assert_owner_thread();
        if self.lifecycle.is_started() {
            self.host.request_redraw();
        }
    }

    /// Control detached: collapse the backend and stop driving frames for good.
    ///
    /// The lifecycle moves to [`LifecycleState::Unloaded`] even when the backend fails to
    /// collapse; that failure is returned afterwards.
    pub fn on_unloaded(&mut self) -> Result<(), SurfaceError> {
        self.assert_owner_thread();
        if !self.lifecycle.is_started() {
            log::debug!("Surface[{}]: unload ignored in state {:?}", self.id, self.lifecycle);
            return Ok(());
        }

        let collapsed = match &mut self.backend {
            BackendSlot::Backend(backend) => backend.set_size(SurfaceConfig::collapsed()),
            BackendSlot::NoBackend => Ok(()),
        };

        self.on_render = None;
        self.on_async_render = None;
        self.lifecycle = LifecycleState::Unloaded;
        self.sync_frame_clock();
        log::info!("Surface[{}]: unloaded", self.id);

        collapsed.map_err(SurfaceError::from)
    }

    /// Keyboard compatibility shim: hand events that did not originate from this control back
    /// to the host. Returns true when the event was rerouted.
    pub fn on_key(&mut self, event: &KeyEvent, pressed: bool) -> bool {
        self.assert_owner_thread();
        let reroute = self
            .settings
            .as_ref()
            .map(|s| s.reroute_keyboard_events)
            .unwrap_or(false);

        if reroute && event.source != EventSource::ThisControl {
            log::trace!(
                "Surface[{}]: rerouting key {} ({}) {}",
                self.id,
                event.key,
                event.modifiers,
                if pressed { "down" } else { "up" }
            );
            self.host.reroute_key(event, pressed);
            true
        } else {
            false
        }
    }

    /// Explicitly mark the surface as needing a repaint.
    pub fn invalidate(&mut self) {
        self.assert_owner_thread();
        if self.lifecycle != LifecycleState::Unloaded {
            self.host.request_redraw();
        }
    }

    /// Paint pass: negotiate the backend configuration, present, then run the listeners.
    pub fn paint(&mut self, surface: &mut dyn PaintSurface) -> Result<PaintOutcome, SurfaceError> {
        self.assert_owner_thread();
        if self.host.is_design_mode() {
            self.host.draw_placeholder(surface, Placeholder::DesignTime);
            return Ok(PaintOutcome::Placeholder(Placeholder::DesignTime));
        }
        if self.lifecycle == LifecycleState::Unloaded {
            return Ok(PaintOutcome::Skipped);
        }

        let (BackendSlot::Backend(backend), Some(negotiator)) =
            (&mut self.backend, self.negotiator.as_ref())
        else {
            self.host.draw_placeholder(surface, Placeholder::Unstarted);
            return Ok(PaintOutcome::Placeholder(Placeholder::Unstarted));
        };

        let transform = self.host.device_transform();
        let negotiation = negotiator.negotiate(self.layout, transform, &mut **backend)?;
        if negotiation == Negotiation::Degenerate {
            return Ok(PaintOutcome::Skipped);
        }

        backend.present(surface)?;

        self.frame_index += 1;
        let frame = FrameContext {
            elapsed: self.timer.lap(),
            frame_index: self.frame_index,
            framebuffer: backend.handle(),
            width: backend.width(),
            height: backend.height(),
            format: backend.config().format,
        };

        if let Some(render) = self.on_render.as_mut() {
            render(&frame);
        }
        if let Some(async_render) = self.on_async_render.as_mut() {
            async_render();
        }
        Ok(PaintOutcome::Presented(frame))
    }

    /// Frame clock subscription follows `visible && started`.
    fn sync_frame_clock(&mut self) {
        let want = self.visible && self.lifecycle.is_started();
        if want == self.subscribed {
            return;
        }
        if want {
            self.host.subscribe_frame_clock();
        } else {
            self.host.unsubscribe_frame_clock();
        }
        self.subscribed = want;
        log::debug!("Surface[{}]: frame clock subscribed: {}", self.id, want);
    }

    fn assert_owner_thread(&self) {
        debug_assert_eq!(
            thread::current().id(),
            self.owner,
            "Surface[{}] used from a thread other than the one that created it",
            self.id
        );
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.lifecycle
    }

    /// Settings copy taken at start
    pub fn settings(&self) -> Option<&Settings> {
        self.settings.as_ref()
    }

    /// Current backend framebuffer, [`FramebufferHandle::NONE`] without a backend.
    pub fn framebuffer(&self) -> FramebufferHandle {
        self.backend.handle()
    }

    pub fn framebuffer_width(&self) -> u32 {
        self.backend.width()
    }

    pub fn framebuffer_height(&self) -> u32 {
        self.backend.height()
    }

    /// False until the surface is started.
    pub fn render_continuously(&self) -> bool {
        self.settings
            .as_ref()
            .map(|s| s.render_continuously)
            .unwrap_or(false)
    }

    pub fn is_frame_clock_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn layout(&self) -> Viewport {
        self.layout
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: SurfaceHost> Drop for SurfaceDriver<H> {
    fn drop(&mut self) {
        if self.lifecycle.is_started() {
            if let Err(e) = self.on_unloaded() {
                log::warn!("Surface[{}]: backend collapse failed on drop: {}", self.id, e);
            }
        }
    }
}
