use glam::Mat4;
use novaground_engine::camera::Camera;
use novaground_engine::color::Color;
use novaground_engine::core::{App, AppControl, FrameCtx};
use novaground_engine::input::{Key, KeyEvent};
use novaground_engine::render::{ColorMeshRenderer, MeshDraw, MeshHandle, RenderCtx};
use winit::window::WindowId;

use crate::geometry::{self, RocketShape};
use crate::station::Station;

const BACKGROUND: Color = Color::new(0.02, 0.02, 0.05, 1.0);
const CUBE_COLOR: Color = Color::WHITE;
const CROSSHAIR_COLOR: Color = Color::new(0.6, 0.6, 0.6, 1.0);
/// Crosshair arm length in normalized device units.
const CROSSHAIR_SIZE: f32 = 0.03;
const ORBIT_STEP_DEG: f32 = 5.0;
const DOLLY_STEP: f32 = 10.0;
const MIN_CAMERA_DISTANCE: f32 = 15.0;
/// Seconds between window title refreshes.
const TITLE_INTERVAL: f64 = 0.25;

struct SceneMeshes {
    cube: MeshHandle,
    axes: MeshHandle,
    rocket: MeshHandle,
    crosshair: MeshHandle,
}

/// The 3D view plus the station it visualises.
pub struct GroundStation {
    station: Station,
    camera: Camera,
    follow: bool,
    renderer: ColorMeshRenderer,
    meshes: Option<SceneMeshes>,
    next_title_at: f64,
}

impl GroundStation {
    pub fn new(station: Station) -> Self {
        Self {
            station,
            camera: Camera::default(),
            follow: false,
            renderer: ColorMeshRenderer::new(),
            meshes: None,
            next_title_at: 0.0,
        }
    }

    fn camera_key(&mut self, key: Key) -> bool {
        match key {
            Key::Q => self.camera.orbit(ORBIT_STEP_DEG),
            Key::E => self.camera.orbit(-ORBIT_STEP_DEG),
            Key::Equal => self.camera.dolly(DOLLY_STEP, MIN_CAMERA_DISTANCE),
            Key::Minus => self.camera.dolly(-DOLLY_STEP, MIN_CAMERA_DISTANCE),
            Key::F => {
                self.follow = !self.follow;
                if !self.follow {
                    let offset = self.camera.eye - self.camera.target;
                    self.camera.target = glam::Vec3::ZERO;
                    self.camera.eye = offset;
                }
                log::info!("camera follow {}", if self.follow { "on" } else { "off" });
            }
            _ => return false,
        }
        true
    }

    fn track_rocket(&mut self) {
        if !self.follow {
            return;
        }
        let offset = self.camera.eye - self.camera.target;
        self.camera.target = self.station.pose().position;
        self.camera.eye = self.camera.target + offset;
    }
}

fn upload_scene(renderer: &mut ColorMeshRenderer, ctx: &RenderCtx<'_>) -> SceneMeshes {
    let edge = geometry::cube_edge(geometry::GRID_SIZE, geometry::GRID_SPACING);
    log::info!("environment cube {edge} units, axes {} units", edge / 4.0);
    SceneMeshes {
        cube: renderer.upload(ctx, &geometry::reference_cube(edge, CUBE_COLOR)),
        axes: renderer.upload(ctx, &geometry::coordinate_axes(edge / 4.0)),
        rocket: renderer.upload(ctx, &geometry::rocket(RocketShape::default())),
        crosshair: renderer.upload(ctx, &geometry::crosshair(CROSSHAIR_SIZE, CROSSHAIR_COLOR)),
    }
}

impl App for GroundStation {
    fn on_key(&mut self, _window_id: WindowId, event: &KeyEvent) -> AppControl {
        if !event.is_press() {
            return AppControl::Continue;
        }
        if event.key == Key::Escape {
            return AppControl::Exit;
        }
        if !self.camera_key(event.key) && !self.station.handle_key(event.key) {
            log::trace!("unbound key {:?}", event.key);
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.station.update();
        self.track_rocket();

        if ctx.time.elapsed >= self.next_title_at {
            ctx.window.set_title(&self.station.status_line());
            self.next_title_at = ctx.time.elapsed + TITLE_INTERVAL;
        }

        let camera = self.camera;
        let model = self.station.pose().model_matrix();
        let renderer = &mut self.renderer;
        let meshes = &mut self.meshes;

        ctx.render(BACKGROUND, |rctx, target| {
            let scene = meshes.get_or_insert_with(|| upload_scene(renderer, rctx));
            let draws = [
                MeshDraw::transformed(scene.cube, Mat4::IDENTITY),
                MeshDraw::transformed(scene.axes, Mat4::IDENTITY),
                MeshDraw::transformed(scene.rocket, model),
                MeshDraw::clip_space(scene.crosshair),
            ];
            renderer.render(rctx, target, camera.view_proj(rctx.aspect()), &draws);
        })
    }
}

impl Drop for GroundStation {
    fn drop(&mut self) {
        self.station.shutdown();
    }
}
