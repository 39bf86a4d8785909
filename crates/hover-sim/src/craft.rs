use nalgebra::Vector2;

use crate::arena::Arena;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub struct CraftParams {
    pub radius: f64,             // cm
    pub max_speed: f64,          // cm/s at full duty
    pub speed_time_const: f64,   // s
    pub yaw_authority: f64,      // °/s² per ° of rudder at full duty
    pub yaw_damping: f64,        // 1/s on the cushion
    pub ground_damping: f64,     // 1/s with lift off
    pub disturbance: f64,        // °/s², constant yaw torque (trim error)
    pub steering_neutral: f64,   // servo angle with zero rudder
}

impl Default for CraftParams {
    fn default() -> Self {
        Self {
            radius: 10.0,
            max_speed: 60.0,
            speed_time_const: 0.5,
            yaw_authority: 4.0,
            yaw_damping: 2.0,
            ground_damping: 20.0,
            disturbance: 3.0,
            steering_neutral: 93.0,
        }
    }
}

/// Commanded actuator outputs as seen by the plant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorInputs {
    pub steering: u8,
    pub propulsion: u8,
    pub lift: bool,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub struct CraftState {
    pub position: Vector2<f64>, // cm
    pub heading: f64,           // °, clockwise positive, unwrapped
    pub yaw_rate: f64,          // °/s
    pub speed: f64,             // cm/s along the heading
    pub collisions: u32,
}

impl CraftState {
    pub fn new(position: Vector2<f64>, heading: f64) -> Self {
        Self {
            position,
            heading,
            yaw_rate: 0.0,
            speed: 0.0,
            collisions: 0,
        }
    }

    pub fn forward(&self) -> Vector2<f64> {
        let h = self.heading.to_radians();
        Vector2::new(h.cos(), h.sin())
    }

    /// Semi-implicit Euler step of the planar dynamics.
    pub fn step(&mut self, p: &CraftParams, arena: &Arena, input: ActuatorInputs, dt: f64) {
        let thrust = input.propulsion as f64 / 255.0;

        let (target_speed, damping, rudder, disturbance) = if input.lift {
            (
                p.max_speed * thrust,
                p.yaw_damping,
                (input.steering as f64 - p.steering_neutral) * thrust * p.yaw_authority,
                p.disturbance,
            )
        } else {
            // Sitting on the skirt: no thrust response, friction stops it.
            (0.0, p.ground_damping, 0.0, 0.0)
        };

        let yaw_accel = rudder + disturbance - damping * self.yaw_rate;
        self.yaw_rate += yaw_accel * dt;
        self.heading += self.yaw_rate * dt;

        let tau = if input.lift { p.speed_time_const } else { p.speed_time_const * 0.2 };
        self.speed += (target_speed - self.speed) * (dt / tau).min(1.0);

        let prev = self.position;
        let next = prev + self.forward() * self.speed * dt;
        let (resolved, hit) = arena.resolve_collision(next, prev, p.radius);
        self.position = resolved;
        if hit {
            if self.speed > 0.0 {
                self.collisions += 1;
            }
            self.speed = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(steering: u8, propulsion: u8, lift: bool) -> ActuatorInputs {
        ActuatorInputs {
            steering,
            propulsion,
            lift,
        }
    }

    #[test]
    fn test_straight_line_speed() {
        let p = CraftParams {
            disturbance: 0.0,
            ..CraftParams::default()
        };
        let arena = Arena::new(10_000.0, 1000.0);
        let mut s = CraftState::new(Vector2::new(100.0, 500.0), 0.0);
        for _ in 0..5000 {
            s.step(&p, &arena, input(93, 255, true), 0.001);
        }
        assert!((s.speed - 60.0).abs() < 0.5);
        assert!(s.heading.abs() < 1e-9);
        assert!((s.position.y - 500.0).abs() < 1e-9);
        assert!(s.position.x > 300.0);
    }

    #[test]
    fn test_rudder_turns_right() {
        let p = CraftParams {
            disturbance: 0.0,
            ..CraftParams::default()
        };
        let arena = Arena::new(10_000.0, 10_000.0);
        let mut s = CraftState::new(Vector2::new(5000.0, 5000.0), 0.0);
        for _ in 0..1000 {
            s.step(&p, &arena, input(180, 130, true), 0.001);
        }
        assert!(s.yaw_rate > 0.0);
        assert!(s.heading > 0.0);

        let mut s = CraftState::new(Vector2::new(5000.0, 5000.0), 0.0);
        for _ in 0..1000 {
            s.step(&p, &arena, input(0, 130, true), 0.001);
        }
        assert!(s.heading < 0.0);
    }

    #[test]
    fn test_no_lift_stays_put() {
        let p = CraftParams::default();
        let arena = Arena::default();
        let mut s = CraftState::new(Vector2::new(100.0, 100.0), 0.0);
        for _ in 0..2000 {
            s.step(&p, &arena, input(180, 255, false), 0.001);
        }
        assert_eq!(s.position, Vector2::new(100.0, 100.0));
        assert_eq!(s.yaw_rate, 0.0);
    }

    #[test]
    fn test_wall_stops_craft() {
        let p = CraftParams {
            disturbance: 0.0,
            ..CraftParams::default()
        };
        let arena = Arena::new(200.0, 100.0);
        let mut s = CraftState::new(Vector2::new(150.0, 50.0), 0.0);
        for _ in 0..5000 {
            s.step(&p, &arena, input(93, 255, true), 0.001);
        }
        assert!((s.position.x - 190.0).abs() < 1e-9);
        assert!(s.collisions >= 1);
    }
}
