//! Application entry point for the color diffusion viewer.
//!
//! This binary sets up eframe/egui and delegates all interactive
//! logic and rendering to [`Viewer`] from the `viewer` module.

mod viewer;

use viewer::Viewer;

/// Starts the native eframe application.
///
/// This function configures [`eframe::NativeOptions`] with default
/// settings and launches the main window titled `"Color Diffusion"`.
/// All UI state and rendering are handled by [`Viewer`]; a grid
/// construction failure is propagated through the app creator.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Color Diffusion",
        options,
        Box::new(|_cc| Ok(Box::new(Viewer::new()?))),
    )
}
