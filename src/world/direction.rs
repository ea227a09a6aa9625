//! Compass directions on the tile grid

use std::f32::consts::{FRAC_PI_4, PI, TAU};

use glam::{IVec2, Vec2};

/// Vectors shorter than this are treated as zero
pub const ZERO_TOLERANCE: f32 = 1e-6;

/// Half-width of the angular band around each diagonal that snaps to it
const DIAGONAL_BAND: f32 = PI / 5.5;

/// One of the eight grid directions, or no movement at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// (1, 0)
    XPlus,
    /// (0, 1)
    YPlus,
    /// (-1, 0)
    XMinus,
    /// (0, -1)
    YMinus,
    /// (1, 1)
    XYPlus,
    /// (-1, -1)
    XYMinus,
    /// (1, -1)
    XYPlusMinus,
    /// (-1, 1)
    XYMinusPlus,
    /// (0, 0)
    #[default]
    Zero,
}

impl Direction {
    /// Every movement direction
    pub const ALL: [Self; 8] = [
        Self::XPlus,
        Self::YPlus,
        Self::XMinus,
        Self::YMinus,
        Self::XYPlus,
        Self::XYMinus,
        Self::XYPlusMinus,
        Self::XYMinusPlus,
    ];

    /// Horizontal and vertical directions only
    pub const HV: [Self; 4] = [Self::XPlus, Self::YPlus, Self::XMinus, Self::YMinus];

    /// Diagonal directions only
    pub const DIAGONAL: [Self; 4] = [
        Self::XYPlus,
        Self::XYMinus,
        Self::XYPlusMinus,
        Self::XYMinusPlus,
    ];

    /// Movement directions ordered by increasing angle
    pub const CLOCKWISE: [Self; 8] = [
        Self::XPlus,
        Self::XYPlus,
        Self::YPlus,
        Self::XYMinusPlus,
        Self::XMinus,
        Self::XYMinus,
        Self::YMinus,
        Self::XYPlusMinus,
    ];

    /// Integer step taken on the tile grid
    #[must_use]
    pub const fn vector(self) -> IVec2 {
        match self {
            Self::XPlus => IVec2::new(1, 0),
            Self::YPlus => IVec2::new(0, 1),
            Self::XMinus => IVec2::new(-1, 0),
            Self::YMinus => IVec2::new(0, -1),
            Self::XYPlus => IVec2::new(1, 1),
            Self::XYMinus => IVec2::new(-1, -1),
            Self::XYPlusMinus => IVec2::new(1, -1),
            Self::XYMinusPlus => IVec2::new(-1, 1),
            Self::Zero => IVec2::ZERO,
        }
    }

    /// Unit-length vector pointing this way (zero for `Zero`)
    #[must_use]
    pub fn unit_vector(self) -> Vec2 {
        self.vector().as_vec2().normalize_or_zero()
    }

    /// Whether both axes change when stepping this way
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Self::XYPlus | Self::XYMinus | Self::XYPlusMinus | Self::XYMinusPlus
        )
    }

    /// The X component of this direction as a direction of its own
    #[must_use]
    pub fn x_component(self) -> Self {
        Self::from_vector(Vec2::new(self.vector().x as f32, 0.0))
    }

    /// The Y component of this direction as a direction of its own
    #[must_use]
    pub fn y_component(self) -> Self {
        Self::from_vector(Vec2::new(0.0, self.vector().y as f32))
    }

    /// Snap an arbitrary vector to the nearest grid direction
    ///
    /// Vectors within `PI / 5.5` of a diagonal snap to that diagonal; the rest
    /// snap to their dominant axis.
    #[must_use]
    pub fn from_vector(vector: Vec2) -> Self {
        if vector.length() <= ZERO_TOLERANCE {
            return Self::Zero;
        }

        let dir = vector.normalize();
        let angle = dir.y.abs().atan2(dir.x.abs());

        if (angle - FRAC_PI_4).abs() <= DIAGONAL_BAND {
            match (dir.x > 0.0, dir.y > 0.0) {
                (true, true) => Self::XYPlus,
                (true, false) => Self::XYPlusMinus,
                (false, true) => Self::XYMinusPlus,
                (false, false) => Self::XYMinus,
            }
        } else if dir.x.abs() > dir.y.abs() {
            if dir.x < 0.0 { Self::XMinus } else { Self::XPlus }
        } else if dir.y < 0.0 {
            Self::YMinus
        } else {
            Self::YPlus
        }
    }

    /// Direction closest to the given heading (radians, counter-clockwise from +X)
    #[must_use]
    pub fn from_angle(angle: f32) -> Self {
        Self::from_vector(Vec2::from_angle(angle))
    }

    /// Heading of this direction in `[0, 2π)`
    #[must_use]
    pub fn angle(self) -> f32 {
        let v = self.vector().as_vec2();
        v.y.atan2(v.x).rem_euclid(TAU)
    }

    /// Next direction turning with increasing angle
    #[must_use]
    pub fn clockwise(self) -> Self {
        match Self::CLOCKWISE.iter().position(|&d| d == self) {
            Some(i) => Self::CLOCKWISE[(i + 1) % Self::CLOCKWISE.len()],
            None => self,
        }
    }

    /// Next direction turning with decreasing angle
    #[must_use]
    pub fn counter_clockwise(self) -> Self {
        let len = Self::CLOCKWISE.len();
        match Self::CLOCKWISE.iter().position(|&d| d == self) {
            Some(i) => Self::CLOCKWISE[(i + len - 1) % len],
            None => self,
        }
    }
}
