use std::f32::consts::TAU;
use std::rc::Rc;

use strata_engine::canvas::{Canvas, Path};
use strata_engine::coords::{Transform2D, Vec2};
use strata_engine::core::{Game, Platform};
use strata_engine::paint::{Color, Gradient, LineJoin};
use strata_engine::raster::RasterBackend;
use strata_engine::scene::{GroupLayer, LayerId, SceneGraph};
use strata_engine::text::FontId;

/// Key of the tile image the host writes next to the frames.
pub const TILE_KEY: &str = "tile.png";

const FLOOR_HEIGHT: f32 = 48.0;
const SPINNER_SIZE: u32 = 96;
const BALL_COLORS: [u32; 4] = [0xFFE8_5D75, 0xFF5D_C8E8, 0xFFF2_C14E, 0xFF7B_E05D];

#[derive(Debug, Clone, Copy)]
struct Ball {
    prev: Vec2,
    pos: Vec2,
    vel: Vec2,
    radius: f32,
    color: Color,
}

/// Layer handles created during `init`.
#[derive(Debug, Clone, Copy)]
struct Layers {
    balls: LayerId,
    spinner: LayerId,
    hud: LayerId,
}

/// Bouncing balls over a tiled floor, with a spinning star and a text HUD.
///
/// Updates at a fixed 50 Hz; paint interpolates ball positions between the
/// last two updates.
pub struct Demo {
    scene: SceneGraph,
    display: Canvas<RasterBackend>,
    font: Option<FontId>,
    balls: Vec<Ball>,
    angle: (f32, f32),
    updates: u64,
    painted: u64,
    layers: Option<Layers>,
}

impl Demo {
    pub fn new(width: u32, height: u32, font: Option<FontId>) -> Self {
        let w = width as f32;
        let h = height as f32 - FLOOR_HEIGHT;
        let balls = BALL_COLORS
            .iter()
            .enumerate()
            .map(|(i, &argb)| {
                let k = i as f32 + 1.0;
                let pos = Vec2::new(w * 0.15 * k, h * 0.2 * k);
                Ball {
                    prev: pos,
                    pos,
                    vel: Vec2::new(90.0 * k, -60.0 * k + 40.0),
                    radius: 10.0 + 4.0 * k,
                    color: Color(argb),
                }
            })
            .collect();

        Self {
            scene: SceneGraph::new(),
            display: Canvas::new(RasterBackend::new(width, height)),
            font,
            balls,
            angle: (0.0, 0.0),
            updates: 0,
            painted: 0,
            layers: None,
        }
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Frames painted so far.
    pub fn painted(&self) -> u64 {
        self.painted
    }

    /// The last painted frame as straight-alpha RGBA8.
    pub fn frame_rgba(&self) -> (u32, u32, Vec<u8>) {
        let pixmap = self.display.backend().pixmap();
        (pixmap.width(), pixmap.height(), pixmap.to_straight_rgba8())
    }

    fn arena(&self) -> Vec2 {
        Vec2::new(self.display.width(), self.display.height() - FLOOR_HEIGHT)
    }

    fn build_background(&mut self, platform: &Platform) -> LayerId {
        let (w, h) = (self.display.width(), self.display.height());
        let id = self.scene.create_canvas(platform.width(), platform.height());
        if let Some(layer) = self.scene.layer_mut(id).as_canvas_mut() {
            let sky = Gradient::linear(
                0.0,
                0.0,
                0.0,
                h,
                &[Color::rgb(0x14, 0x18, 0x2c), Color::rgb(0x3a, 0x2f, 0x5b)],
                &[0.0, 1.0],
            );
            layer
                .canvas_mut()
                .set_fill_gradient(Rc::new(sky))
                .fill_rect(0.0, 0.0, w, h)
                .set_stroke_color(0x80FF_FFFFu32)
                .set_stroke_width(2.0)
                .stroke_round_rect(4.0, 4.0, w - 8.0, h - 8.0, 12.0);
        }
        id
    }

    fn build_spinner(&mut self) -> LayerId {
        let size = SPINNER_SIZE as f32;
        let c = size / 2.0;
        let mut star = Path::new();
        for i in 0..10 {
            let r = if i % 2 == 0 { c - 4.0 } else { c * 0.45 };
            let a = i as f32 * TAU / 10.0 - TAU / 4.0;
            let (x, y) = (c + r * a.cos(), c + r * a.sin());
            if i == 0 {
                star.move_to(x, y);
            } else {
                star.line_to(x, y);
            }
        }
        star.close();

        let id = self.scene.create_canvas(SPINNER_SIZE, SPINNER_SIZE);
        let layer = self.scene.layer_mut(id);
        layer.set_origin(c, c).set_alpha(0.9);
        if let Some(l) = layer.as_canvas_mut() {
            l.canvas_mut()
                .set_fill_color(0xFFF5_E663u32)
                .fill_path(&star)
                .set_stroke_color(0xFF8A_6A12u32)
                .set_stroke_width(3.0)
                .set_line_join(LineJoin::Round)
                .stroke_path(&star);
        }
        id
    }

    fn paint_balls(&mut self, balls: LayerId, alpha: f32) {
        let Some(surface) = self.scene.layer_mut(balls).as_surface_mut() else {
            return;
        };
        let canvas = surface.begin();
        for ball in &self.balls {
            let p = ball.prev.lerp(ball.pos, alpha);
            canvas
                .set_fill_color(ball.color)
                .fill_circle(p.x, p.y, ball.radius)
                .set_stroke_color(Color::WHITE.with_alpha(0xA0))
                .set_stroke_width(1.5)
                .stroke_circle(p.x, p.y, ball.radius);
        }
    }

    fn paint_hud(&mut self, hud: LayerId) {
        let Some(font) = self.font else {
            return;
        };
        let text = format!("updates {}  frames {}", self.updates, self.painted + 1);
        if let Some(surface) = self.scene.layer_mut(hud).as_surface_mut() {
            surface
                .begin()
                .set_font(font, 16.0)
                .set_fill_color(Color::WHITE)
                .draw_text(&text, 0.0, 16.0);
        }
    }
}

impl Game for Demo {
    fn init(&mut self, platform: &mut Platform) -> anyhow::Result<()> {
        self.display.backend_mut().set_fonts(Some(Rc::clone(platform.fonts())));
        let root = self.scene.root();
        let arena = self.arena();

        let background = self.build_background(platform);
        self.scene.add(root, background);

        let floor = self.scene.create_image(platform.load_image(TILE_KEY));
        if let Some(tiles) = self.scene.layer_mut(floor).as_image_mut() {
            tiles.set_size(arena.x, FLOOR_HEIGHT).set_repeat_x(true).set_repeat_y(true);
        }
        self.scene.add_translated(root, floor, 0.0, arena.y);
        self.scene.layer_mut(floor).set_alpha(0.75);

        let world = self.scene.create(GroupLayer::clipped(arena.x, arena.y));
        self.scene.add(root, world);

        let spinner = self.build_spinner();
        self.scene.add(world, spinner);

        let balls = self.scene.create_surface(platform.width(), platform.height());
        self.scene.add(world, balls);

        let hud = self.scene.create_surface(platform.width(), 24);
        self.scene.add_translated(root, hud, 12.0, 8.0);

        self.layers = Some(Layers { balls, spinner, hud });
        log::debug!("demo scene built ({} layers)", self.scene.live_count());
        Ok(())
    }

    fn update(&mut self, delta_ms: f32) -> anyhow::Result<()> {
        let dt = delta_ms / 1000.0;
        let arena = self.arena();
        for ball in &mut self.balls {
            ball.prev = ball.pos;
            ball.pos = ball.pos + ball.vel * dt;
            if ball.pos.x < ball.radius || ball.pos.x > arena.x - ball.radius {
                ball.vel.x = -ball.vel.x;
                ball.pos.x = ball.pos.x.clamp(ball.radius, arena.x - ball.radius);
            }
            if ball.pos.y < ball.radius || ball.pos.y > arena.y - ball.radius {
                ball.vel.y = -ball.vel.y;
                ball.pos.y = ball.pos.y.clamp(ball.radius, arena.y - ball.radius);
            }
        }
        self.angle = (self.angle.1, (self.angle.1 + dt * 1.5) % TAU);
        self.updates += 1;
        Ok(())
    }

    fn paint(&mut self, alpha: f32) -> anyhow::Result<()> {
        let Some(layers) = self.layers else {
            anyhow::bail!("paint called before init");
        };

        let (from, to) = self.angle;
        // Unwrap across the TAU boundary so interpolation takes the short way.
        let to = if to < from { to + TAU } else { to };
        let angle = from + (to - from) * alpha;
        let center = self.arena() * 0.5;
        self.scene
            .layer_mut(layers.spinner)
            .set_transform(Transform2D::rotation(angle))
            .set_translation(center.x, center.y);

        self.paint_balls(layers.balls, alpha);
        self.paint_hud(layers.hud);

        self.display.reset_stats();
        self.display.clear();
        self.scene.paint(&mut self.display);
        log::trace!("painted frame with {} canvas calls", self.display.stats().calls);
        self.painted += 1;
        Ok(())
    }

    fn update_rate(&self) -> u32 {
        20
    }
}
