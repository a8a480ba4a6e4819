// src/config.rs
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};

/// Fixed shell parameters. Nothing here is read from the command line or the
/// environment; the bootstrap takes every constant from this one place.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellConfig {
    pub title: String,
    /// Initial inner size in logical units.
    pub size: LogicalSize<f64>,
    /// Vertical box margin, horizontal then vertical, in pixels.
    pub margin: (u32, u32),
    /// Vertical box gap between children, in pixels.
    pub gap: u32,
    pub menu_bar_height: u32,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            title: "blunderDB".to_owned(),
            size: LogicalSize::new(800.0, 600.0),
            margin: (5, 5),
            gap: 2,
            menu_bar_height: 20,
        }
    }
}

/// Top-left position that centres `window` on a monitor at `monitor_pos`
/// with `monitor_size`. Windows larger than the monitor are pinned to its
/// top-left corner.
pub fn centered_position(
    monitor_pos: PhysicalPosition<i32>,
    monitor_size: PhysicalSize<u32>,
    window: PhysicalSize<u32>,
) -> PhysicalPosition<i32> {
    let dx = monitor_size.width.saturating_sub(window.width) / 2;
    let dy = monitor_size.height.saturating_sub(window.height) / 2;
    PhysicalPosition::new(monitor_pos.x + dx as i32, monitor_pos.y + dy as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_main_window() {
        let cfg = ShellConfig::default();
        assert_eq!(cfg.title, "blunderDB");
        assert_eq!(cfg.size, LogicalSize::new(800.0, 600.0));
        assert_eq!(cfg.margin, (5, 5));
        assert_eq!(cfg.gap, 2);
    }

    #[test]
    fn centres_on_a_secondary_monitor() {
        let pos = centered_position(
            PhysicalPosition::new(1920, 0),
            PhysicalSize::new(1920, 1080),
            PhysicalSize::new(800, 600),
        );
        assert_eq!(pos, PhysicalPosition::new(1920 + 560, 240));
    }

    #[test]
    fn oversized_window_is_pinned_to_the_corner() {
        let pos = centered_position(
            PhysicalPosition::new(0, 0),
            PhysicalSize::new(640, 480),
            PhysicalSize::new(800, 600),
        );
        assert_eq!(pos, PhysicalPosition::new(0, 0));
    }
}
