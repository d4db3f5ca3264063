//! World geometry of the board and the container row.

use serde::{Deserialize, Serialize};

use crate::types::Vec3;

/// Spacing and offsets used to place holes and containers.
///
/// Columns are centred on `x_offset`; row 0 sits at `z_offset` and deeper
/// rows recede along -z. Containers form a centred row in front of the board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    pub spacing_x: f32,
    pub spacing_z: f32,
    pub x_offset: f32,
    pub y_offset: f32,
    pub z_offset: f32,
    pub container_spacing: f32,
    pub container_y: f32,
    pub container_z: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            spacing_x: 2.0,
            spacing_z: 2.0,
            x_offset: 0.0,
            y_offset: 0.0,
            z_offset: 0.0,
            container_spacing: 3.0,
            container_y: 1.0,
            container_z: 5.0,
        }
    }
}

impl Layout {
    pub fn hole_position(&self, column: usize, row: usize, column_count: usize) -> Vec3 {
        let half_width = column_count.saturating_sub(1) as f32 * self.spacing_x / 2.0;
        Vec3::new(
            column as f32 * self.spacing_x - half_width + self.x_offset,
            self.y_offset,
            -(row as f32) * self.spacing_z + self.z_offset,
        )
    }

    pub fn container_position(&self, index: usize, count: usize) -> Vec3 {
        let half_width = count.saturating_sub(1) as f32 * self.container_spacing / 2.0;
        Vec3::new(
            index as f32 * self.container_spacing - half_width,
            self.container_y,
            self.container_z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_are_centred() {
        let layout = Layout::default();
        assert_eq!(layout.hole_position(0, 0, 3).x, -2.0);
        assert_eq!(layout.hole_position(1, 0, 3).x, 0.0);
        assert_eq!(layout.hole_position(2, 0, 3).x, 2.0);
        assert_eq!(layout.hole_position(0, 2, 3).z, -4.0);
    }

    #[test]
    fn containers_are_centred() {
        let layout = Layout::default();
        assert_eq!(layout.container_position(0, 3), Vec3::new(-3.0, 1.0, 5.0));
        assert_eq!(layout.container_position(2, 3), Vec3::new(3.0, 1.0, 5.0));
        assert_eq!(layout.container_position(0, 1).x, 0.0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let layout: Layout = serde_json::from_str(r#"{ "spacing_x": 4.0 }"#).unwrap();
        assert_eq!(layout.spacing_x, 4.0);
        assert_eq!(layout.container_z, 5.0);
    }
}
