//! Interactive color diffusion viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the simulation grid and
//! implements [`eframe::App`] to render the color field as a bitmap and
//! route mouse input into brush strokes.

use diffuse_core::{
    color::{Channel, Rgb},
    diffusion,
    error::GridError,
    grid::DiffusionGrid,
};
use eframe::App;

/// Fraction of a cell's intensity diffused to its neighbors each step.
const DIFFUSE_PERCENT: f64 = 0.99;
/// Grid dimensions in cells.
const GRID_WIDTH: usize = 320;
const GRID_HEIGHT: usize = 240;
/// Number of steps a fresh run advances before stopping on its own.
const INITIAL_STEP_BUDGET: i32 = 100;

/// What a mouse press on the color field does.
///
/// The two tool buttons toggle between these states: pressing the button
/// of the active tool returns to [`PaintTool::Idle`], pressing the other
/// tool's button switches directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintTool {
    /// Mouse input is ignored.
    Idle,
    /// Strokes paint ordinary color cells that diffuse away.
    Color,
    /// Strokes paint emitter cells that hold their color.
    Emitter,
}

impl PaintTool {
    /// State after pressing the button for `pressed`.
    fn toggled(self, pressed: PaintTool) -> PaintTool {
        if self == pressed { PaintTool::Idle } else { pressed }
    }
}

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The simulation core: a [`DiffusionGrid`] stepped via [`diffusion::step`].
/// - UI state (active paint tool, brush color and size, run budget).
/// - eframe/egui callbacks for drawing and user interaction.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / brush input.
/// 2. If `running`, advance one simulation step (until the budget runs out).
/// 3. Upload the current generation as an RGB texture and draw it.
///
/// ### Fields
/// - `grid` - The diffusion grid being simulated and painted.
/// - `tool` - Active paint tool; controls what clicks and drags do.
/// - `brush_color` - Brush color as linear RGB in `[0, 1]` per channel.
/// - `brush_size` - Side length of the square brush, in cells.
///
/// - `running` - Whether the simulation is currently auto-advancing.
/// - `max_steps` - Steps a run performs before stopping on its own.
/// - `steps_done` - Steps performed by the current run.
///
/// - `texture` - GPU texture holding the last uploaded generation;
///   created lazily on the first frame.
pub struct Viewer {
    grid: DiffusionGrid,
    tool: PaintTool,
    brush_color: [f32; 3],
    brush_size: i32,

    running: bool,
    max_steps: i32,
    steps_done: i32,

    texture: Option<egui::TextureHandle>,
}

impl Viewer {
    /// Creates a viewer with a black grid and everything idle.
    ///
    /// The grid uses the fixed dimensions and diffusion coefficient of
    /// the application; the brush starts white with a moderate size.
    ///
    /// ### Returns
    /// The initialized viewer, or the grid construction error.
    pub fn new() -> Result<Self, GridError> {
        Ok(Self {
            grid: DiffusionGrid::new(GRID_WIDTH, GRID_HEIGHT, DIFFUSE_PERCENT)?,
            tool: PaintTool::Idle,
            brush_color: [1.0, 1.0, 1.0],
            brush_size: 8,
            running: false,
            max_steps: INITIAL_STEP_BUDGET,
            steps_done: 0,
            texture: None,
        })
    }

    /// Advances one animation frame of a running simulation.
    ///
    /// Performs a single [`diffusion::step`] while the step budget lasts;
    /// once `steps_done` reaches `max_steps` the run stops itself.
    fn tick(&mut self) {
        if self.steps_done < self.max_steps {
            diffusion::step(&mut self.grid);
            self.steps_done += 1;
        } else {
            self.running = false;
        }
    }

    /// Applies the active tool's brush stroke at the given cell.
    fn apply_brush(&mut self, cell: (i32, i32)) {
        let color = Rgb::new(
            self.brush_color[0] as f64,
            self.brush_color[1] as f64,
            self.brush_color[2] as f64,
        );

        match self.tool {
            PaintTool::Idle => {}
            PaintTool::Color => self.grid.paint(cell.0, cell.1, self.brush_size, color, false),
            PaintTool::Emitter => self.grid.paint(cell.0, cell.1, self.brush_size, color, true),
        }
    }

    /// Screen rectangle the grid bitmap is drawn into.
    ///
    /// The grid keeps its aspect ratio and is centered in the available
    /// area at the largest fitting scale.
    fn image_rect(&self, avail: egui::Rect) -> egui::Rect {
        let (width, height) = self.grid.dimensions();
        let scale = (avail.width() / width as f32).min(avail.height() / height as f32);
        let size = egui::vec2(width as f32 * scale, height as f32 * scale);
        egui::Rect::from_center_size(avail.center(), size)
    }

    /// Converts a screen position to grid cell coordinates.
    ///
    /// The result may lie outside the grid; painting clamps it.
    fn screen_to_cell(&self, pos: egui::Pos2, rect: egui::Rect) -> (i32, i32) {
        let (width, _) = self.grid.dimensions();
        let scale = rect.width() / width as f32;
        let x = ((pos.x - rect.min.x) / scale).floor() as i32;
        let y = ((pos.y - rect.min.y) / scale).floor() as i32;
        (x, y)
    }

    /// Converts grid cell coordinates to the screen position of the
    /// cell's center. Inverse of [`Viewer::screen_to_cell`].
    fn cell_to_screen(&self, cell: (i32, i32), rect: egui::Rect) -> egui::Pos2 {
        let (width, _) = self.grid.dimensions();
        let scale = rect.width() / width as f32;
        egui::pos2(
            rect.min.x + (cell.0 as f32 + 0.5) * scale,
            rect.min.y + (cell.1 as f32 + 0.5) * scale,
        )
    }

    /// Uploads the current generation's channel planes as an RGB texture.
    fn refresh_texture(&mut self, ctx: &egui::Context) {
        let (width, height) = self.grid.dimensions();
        let red = self.grid.channel(Channel::Red);
        let green = self.grid.channel(Channel::Green);
        let blue = self.grid.channel(Channel::Blue);

        let mut rgb = Vec::with_capacity(width * height * 3);
        for idx in 0..width * height {
            rgb.push((red[idx] * 255.0) as u8);
            rgb.push((green[idx] * 255.0) as u8);
            rgb.push((blue[idx] * 255.0) as u8);
        }

        let image = egui::ColorImage::from_rgb([width, height], &rgb);
        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
            None => {
                self.texture =
                    Some(ctx.load_texture("diffusion-grid", image, egui::TextureOptions::NEAREST));
            }
        }
    }

    /// Builds the top panel UI (run controls, clear, paint tools).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Stop" } else { "▶ Run" })
                    .clicked()
                {
                    if self.running {
                        self.running = false;
                    } else {
                        // A fresh run starts its step budget over.
                        self.steps_done = 0;
                        self.running = true;
                    }
                }

                ui.add(
                    egui::DragValue::new(&mut self.max_steps)
                        .prefix("steps = ")
                        .range(1..=100_000),
                );

                if ui.button("Clear").clicked() {
                    self.grid.clear();
                }

                ui.separator();

                if ui
                    .selectable_label(self.tool == PaintTool::Color, "🖊 Color")
                    .clicked()
                {
                    self.tool = self.tool.toggled(PaintTool::Color);
                }

                if ui
                    .selectable_label(self.tool == PaintTool::Emitter, "⚡ Emitter")
                    .clicked()
                {
                    self.tool = self.tool.toggled(PaintTool::Emitter);
                }

                // Brush controls only make sense while a tool is active.
                if self.tool != PaintTool::Idle {
                    ui.separator();
                    ui.color_edit_button_rgb(&mut self.brush_color);
                    ui.add(egui::Slider::new(&mut self.brush_size, 2..=64).text("Brush"));
                }
            });
        });
    }

    /// Builds the bottom status bar (grid info and step progress).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("step {} / {}", self.steps_done, self.max_steps));
                ui.separator();
                ui.label(format!("d = {}", self.grid.diffuse_percent()));
                let (width, height) = self.grid.dimensions();
                ui.label(format!("{width} x {height}"));
            });
        });
    }

    /// Builds the central panel: bitmap view, brush input, brush preview.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = self.image_rect(response.rect);
            let painter = ui.painter_at(response.rect);

            // Route clicks and drags into brush strokes.
            if (response.clicked() || response.dragged())
                && let Some(pos) = response.interact_pointer_pos()
            {
                let cell = self.screen_to_cell(pos, rect);
                self.apply_brush(cell);
            }

            // Auto-run the simulation while a step budget remains.
            if self.running {
                self.tick();
                ctx.request_repaint();
            }

            self.refresh_texture(ctx);
            if let Some(texture) = &self.texture {
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                painter.image(texture.id(), rect, uv, egui::Color32::WHITE);
            }

            // Brush preview square follows the hovered cell while painting.
            if self.tool != PaintTool::Idle
                && let Some(pos) = response.hover_pos()
            {
                let center = self.cell_to_screen(self.screen_to_cell(pos, rect), rect);
                let scale = rect.width() / self.grid.width() as f32;
                let side = self.brush_size as f32 * scale;
                let color = egui::Color32::from_rgb(
                    (self.brush_color[0] * 255.0) as u8,
                    (self.brush_color[1] * 255.0) as u8,
                    (self.brush_color[2] * 255.0) as u8,
                );
                painter.rect_filled(
                    egui::Rect::from_center_size(center, egui::vec2(side, side)),
                    egui::CornerRadius::ZERO,
                    color,
                );
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_central_panel(ctx);
    }
}
