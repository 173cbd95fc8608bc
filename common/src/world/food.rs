use serde::{Deserialize, Serialize};

use crate::geometry::Point;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Food {
    pub position: Point,
    pub value: i32,
    pub radius: f64,
}

impl Food {
    pub fn new(position: Point, value: i32, radius: f64) -> Self {
        Self { position, value, radius }
    }
}
