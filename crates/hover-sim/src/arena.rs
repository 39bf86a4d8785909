use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------
// Arena coordinates are in cm with the origin at one corner and y pointing
// "down" on a plan view, so positive headings turn clockwise (to the right).

/// Axis-aligned block standing on the floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub min: Vector2<f64>,
    pub max: Vector2<f64>,
}

impl Obstacle {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            min: Vector2::new(x0.min(x1), y0.min(y1)),
            max: Vector2::new(x0.max(x1), y0.max(y1)),
        }
    }

    pub fn contains(&self, p: &Vector2<f64>, margin: f64) -> bool {
        p.x > self.min.x - margin
            && p.x < self.max.x + margin
            && p.y > self.min.y - margin
            && p.y < self.max.y + margin
    }

    /// Distance along a unit ray to the block, if it is hit ahead.
    pub fn ray_hit(&self, origin: &Vector2<f64>, dir: &Vector2<f64>) -> Option<f64> {
        let mut t_near = f64::NEG_INFINITY;
        let mut t_far = f64::INFINITY;

        for axis in 0..2 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < 1e-12 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let t0 = (lo - o) / d;
            let t1 = (hi - o) / d;
            t_near = t_near.max(t0.min(t1));
            t_far = t_far.min(t0.max(t1));
        }

        if t_near <= t_far && t_far >= 0.0 {
            Some(t_near.max(0.0))
        } else {
            None
        }
    }
}

/// Strip of ceiling across the arena, spanning `x_min..x_max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverheadBar {
    pub x_min: f64,
    pub x_max: f64,
    /// Height of the bar above the upward sensor (cm).
    pub clearance: f64,
}

impl OverheadBar {
    pub fn is_above(&self, p: &Vector2<f64>) -> bool {
        p.x >= self.x_min && p.x <= self.x_max
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
    pub obstacles: Vec<Obstacle>,
    pub bar: Option<OverheadBar>,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
            obstacles: Vec::new(),
            bar: None,
        }
    }
}

impl Arena {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_obstacle(mut self, obstacle: Obstacle) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    pub fn with_bar(mut self, bar: OverheadBar) -> Self {
        self.bar = Some(bar);
        self
    }

    pub fn contains(&self, p: &Vector2<f64>) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    /// Distance from `origin` along the unit vector `dir` to the first wall
    /// or obstacle.
    pub fn ray_distance(&self, origin: &Vector2<f64>, dir: &Vector2<f64>) -> f64 {
        let mut best = f64::INFINITY;

        for axis in 0..2 {
            let d = dir[axis];
            if d.abs() < 1e-12 {
                continue;
            }
            let bound = if d > 0.0 {
                if axis == 0 { self.width } else { self.height }
            } else {
                0.0
            };
            let t = (bound - origin[axis]) / d;
            if t >= 0.0 {
                best = best.min(t);
            }
        }

        for obstacle in &self.obstacles {
            if let Some(t) = obstacle.ray_hit(origin, dir) {
                best = best.min(t);
            }
        }

        best.max(0.0)
    }

    /// Clearance above `p`, `None` where there is open sky.
    pub fn overhead_clearance(&self, p: &Vector2<f64>) -> Option<f64> {
        self.bar.filter(|b| b.is_above(p)).map(|b| b.clearance)
    }

    /// Keeps a disc of `radius` inside the walls and out of obstacles.
    /// Returns the corrected position and whether anything was hit.
    pub fn resolve_collision(
        &self,
        p: Vector2<f64>,
        prev: Vector2<f64>,
        radius: f64,
    ) -> (Vector2<f64>, bool) {
        let clamped = Vector2::new(
            p.x.clamp(radius, self.width - radius),
            p.y.clamp(radius, self.height - radius),
        );
        let mut hit = clamped != p;

        let mut out = clamped;
        if self.obstacles.iter().any(|o| o.contains(&out, radius)) {
            out = prev;
            hit = true;
        }
        (out, hit)
    }
}
