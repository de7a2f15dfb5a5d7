//! Gizmo entry point
//!
//! [`Gizmo`] owns the dispatcher and everything its callbacks need, bundled
//! as a [`GizmoContext`]. A host drives it once per frame:
//!
//! ```text
//! set_camera ─▶ add_interactable* ─▶ interact(ray) ─▶ press/release ─▶ draw
//! ```

use gim_geometry::{CameraView, Ray};

use crate::command::{CommandBus, CommandError, CommandHistory, TransformAction};
use crate::config::GizmoConfig;
use crate::dispatcher::Dispatcher;
use crate::handle::{Handle, HandleId};
use crate::manipulator::{
    Frame, GizmoMode, GizmoSpace, HandleVisual, Manipulator, ROTATE_GROUP, RotateManipulator,
    SCALE_GROUP, ScaleManipulator, TRANSLATE_GROUP, TranslateManipulator, visuals,
};
use crate::pivot::Pivot;

/// State reachable from handle callbacks.
pub struct GizmoContext<B> {
    mode: GizmoMode,
    space: GizmoSpace,
    pivot: Pivot,
    camera: CameraView,
    config: GizmoConfig,
    bus: B,
    translate: TranslateManipulator,
    rotate: RotateManipulator,
    scale: ScaleManipulator,
}

impl<B: CommandBus> GizmoContext<B> {
    pub fn mode(&self) -> GizmoMode {
        self.mode
    }

    pub fn space(&self) -> GizmoSpace {
        self.space
    }

    pub fn pivot(&self) -> &Pivot {
        &self.pivot
    }

    pub fn pivot_mut(&mut self) -> &mut Pivot {
        &mut self.pivot
    }

    pub fn camera(&self) -> &CameraView {
        &self.camera
    }

    pub fn config(&self) -> &GizmoConfig {
        &self.config
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn translate(&self) -> &TranslateManipulator {
        &self.translate
    }

    pub fn rotate(&self) -> &RotateManipulator {
        &self.rotate
    }

    pub fn scale(&self) -> &ScaleManipulator {
        &self.scale
    }

    fn frame(&self) -> Frame<'_> {
        Frame {
            camera: &self.camera,
            config: &self.config,
            space: self.space,
        }
    }

    fn manipulator(&self, mode: GizmoMode) -> &dyn Manipulator {
        match mode {
            GizmoMode::Translate => &self.translate,
            GizmoMode::Rotate => &self.rotate,
            GizmoMode::Scale => &self.scale,
        }
    }

    /// Split borrows for a callback on a handle of `group`.
    fn route(
        &mut self,
        group: u32,
    ) -> Option<(&mut dyn Manipulator, &mut Pivot, Frame<'_>, &mut B)> {
        let Self {
            space,
            pivot,
            camera,
            config,
            bus,
            translate,
            rotate,
            scale,
            ..
        } = self;
        let manipulator: &mut dyn Manipulator = match group {
            TRANSLATE_GROUP => translate,
            ROTATE_GROUP => rotate,
            SCALE_GROUP => scale,
            _ => return None,
        };
        let frame = Frame {
            camera,
            config,
            space: *space,
        };
        Some((manipulator, pivot, frame, bus))
    }

    fn hover(&mut self, id: HandleId, hovered: bool) {
        if let Some((manipulator, ..)) = self.route(id.group()) {
            manipulator.set_hovered(id, hovered);
        }
    }

    fn begin(&mut self, id: HandleId, ray: &Ray, t: f32) {
        if let Some((manipulator, pivot, frame, _)) = self.route(id.group()) {
            manipulator.begin(id, ray, t, pivot, &frame);
        }
    }

    fn drag(&mut self, id: HandleId, ray: &Ray) {
        if let Some((manipulator, pivot, frame, _)) = self.route(id.group()) {
            manipulator.drag(ray, pivot, &frame);
        }
    }

    fn end(&mut self, id: HandleId) {
        if let Some((manipulator, pivot, _, bus)) = self.route(id.group()) {
            manipulator.end(pivot, bus);
        }
    }

    fn in_gesture(&self) -> bool {
        self.translate.in_gesture() || self.rotate.in_gesture() || self.scale.in_gesture()
    }
}

/// Interactive transform gizmo over one pivot.
pub struct Gizmo<B = CommandHistory> {
    dispatcher: Dispatcher<GizmoContext<B>>,
    ctx: GizmoContext<B>,
}

impl<B: CommandBus + 'static> Gizmo<B> {
    pub fn new(pivot: Pivot, camera: CameraView, config: GizmoConfig, bus: B) -> Self {
        Self {
            dispatcher: Dispatcher::new(),
            ctx: GizmoContext {
                mode: GizmoMode::default(),
                space: GizmoSpace::default(),
                pivot,
                camera,
                config: config.validated(),
                bus,
                translate: TranslateManipulator::new(),
                rotate: RotateManipulator::new(),
                scale: ScaleManipulator::new(),
            },
        }
    }

    pub fn mode(&self) -> GizmoMode {
        self.ctx.mode
    }

    /// Switch the active manipulator; ignored while a handle is held.
    pub fn set_mode(&mut self, mode: GizmoMode) -> bool {
        if self.is_held() {
            tracing::debug!(?mode, "mode change ignored while held");
            return false;
        }
        self.ctx.mode = mode;
        self.dispatcher.clear_hover(&mut self.ctx);
        true
    }

    pub fn space(&self) -> GizmoSpace {
        self.ctx.space
    }

    /// Switch handle axes; ignored while a handle is held.
    pub fn set_space(&mut self, space: GizmoSpace) -> bool {
        if self.is_held() {
            tracing::debug!(?space, "space change ignored while held");
            return false;
        }
        self.ctx.space = space;
        self.dispatcher.clear_hover(&mut self.ctx);
        true
    }

    pub fn set_camera(&mut self, camera: CameraView) {
        self.ctx.camera = camera;
    }

    pub fn set_config(&mut self, config: GizmoConfig) {
        self.ctx.config = config.validated();
    }

    /// Manipulate a different target; ignored while a handle is held.
    pub fn set_pivot(&mut self, pivot: Pivot) -> bool {
        if self.is_held() {
            tracing::debug!("pivot change ignored while held");
            return false;
        }
        self.ctx.pivot = pivot;
        self.dispatcher.clear_hover(&mut self.ctx);
        true
    }

    pub fn pivot(&self) -> &Pivot {
        &self.ctx.pivot
    }

    pub fn context(&self) -> &GizmoContext<B> {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut GizmoContext<B> {
        &mut self.ctx
    }

    /// Register a handle of another subsystem for the next [`Gizmo::interact`].
    ///
    /// Handle groups below [`crate::manipulator::FIRST_USER_GROUP`] are
    /// reserved for the gizmo's own handles.
    pub fn add_interactable(&mut self, handle: Handle<GizmoContext<B>>) {
        self.dispatcher.add_interactable(handle);
    }

    /// Run one frame of interaction with the picking ray.
    pub fn interact(&mut self, ray: &Ray) {
        let screen_pixels = self.ctx.config.screen_pixels;
        self.ctx
            .pivot
            .update_screen_scale(&self.ctx.camera, screen_pixels);

        let specs = {
            let manipulator = self.ctx.manipulator(self.ctx.mode);
            manipulator.handles(&self.ctx.pivot, &self.ctx.frame())
        };
        for spec in specs {
            self.dispatcher.add_interactable(
                Handle::new(spec.id, spec.priority, spec.shape)
                    .on_enter(|ctx: &mut GizmoContext<B>, id| ctx.hover(id, true))
                    .on_exit(|ctx: &mut GizmoContext<B>, id| ctx.hover(id, false))
                    .on_pressed(|ctx: &mut GizmoContext<B>, id, ray, t| ctx.begin(id, ray, t))
                    .while_held(|ctx: &mut GizmoContext<B>, id, ray| ctx.drag(id, ray))
                    .on_released(|ctx: &mut GizmoContext<B>, id| ctx.end(id)),
            );
        }

        self.dispatcher.interact(ray, &mut self.ctx);
    }

    pub fn press(&mut self) -> bool {
        self.dispatcher.press(&mut self.ctx)
    }

    pub fn release(&mut self) -> bool {
        self.dispatcher.release(&mut self.ctx)
    }

    pub fn is_held(&self) -> bool {
        self.dispatcher.is_held()
    }

    /// Whether a manipulator gesture is running.
    pub fn in_gesture(&self) -> bool {
        self.ctx.in_gesture()
    }

    pub fn hovered_handle(&self) -> Option<HandleId> {
        self.dispatcher.active_id()
    }

    /// Handles of the active manipulator with their current colors.
    pub fn draw(&self) -> Vec<HandleVisual> {
        visuals(
            self.ctx.manipulator(self.ctx.mode),
            &self.ctx.pivot,
            &self.ctx.frame(),
        )
    }
}

impl Gizmo<CommandHistory> {
    /// Gizmo committing into an in-memory undo history.
    pub fn with_history(pivot: Pivot, camera: CameraView, config: GizmoConfig) -> Self {
        Self::new(pivot, camera, config, CommandHistory::new())
    }

    pub fn undo(&mut self) -> Result<TransformAction, CommandError> {
        if self.is_held() {
            return Err(CommandError::GestureInProgress);
        }
        let GizmoContext { pivot, bus, .. } = &mut self.ctx;
        bus.undo(pivot)
    }

    pub fn redo(&mut self) -> Result<TransformAction, CommandError> {
        if self.is_held() {
            return Err(CommandError::GestureInProgress);
        }
        let GizmoContext { pivot, bus, .. } = &mut self.ctx;
        bus.redo(pivot)
    }
}
