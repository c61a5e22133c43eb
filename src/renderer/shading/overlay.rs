//! Procedural overlay patterns
//!
//! Grid lines tint shadowed floor regions; hatch and dot patterns recolor
//! dark regions as a grayscale halftone. Every mask is anti-aliased with a
//! smoothstep band instead of a hard threshold.

use glam::{Vec2, Vec3};

/// Hermite smoothstep. A collapsed band degrades to a step at `edge0`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 >= edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// World-space grid lines on the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridParams {
    /// Grid lines per world unit.
    pub scale: f32,
    /// Half width of a line, as a fraction of one cell. Lines run through
    /// the middle of each cell.
    pub line_width: f32,
    /// Width of the soft edge beyond `line_width`.
    pub feather: f32,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            scale: 2.0,
            line_width: 0.03,
            feather: 0.02,
        }
    }
}

/// Parallel lines in object space, rotated by `angle`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HatchParams {
    /// Distance between line centres.
    pub period: f32,
    /// Full line width.
    pub line_width: f32,
    /// Rotation of the lines in radians.
    pub angle: f32,
    /// Width of the soft edge.
    pub feather: f32,
}

impl Default for HatchParams {
    fn default() -> Self {
        Self {
            period: 0.12,
            line_width: 0.04,
            angle: std::f32::consts::FRAC_PI_4,
            feather: 0.01,
        }
    }
}

/// Screen-space dot lattice, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotParams {
    pub period_px: f32,
    pub radius_px: f32,
    /// Anti-aliasing half band.
    pub aa_px: f32,
}

impl Default for DotParams {
    fn default() -> Self {
        Self {
            period_px: 8.0,
            radius_px: 2.5,
            aa_px: 0.75,
        }
    }
}

/// One overlay pattern with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlayPattern {
    Grid(GridParams),
    Hatch(HatchParams),
    Dot(DotParams),
}

impl OverlayPattern {
    /// Coverage in [0, 1] at `coord`.
    ///
    /// `coord` is world XZ for grid and hatch, pixel position for dots.
    pub fn mask(&self, coord: Vec2) -> f32 {
        match self {
            Self::Grid(p) => grid_mask(coord, p),
            Self::Hatch(p) => hatch_mask(coord, p),
            Self::Dot(p) => dot_mask(coord, p),
        }
    }

    /// True for patterns sampled in screen pixels.
    pub fn is_screen_space(&self) -> bool {
        matches!(self, Self::Dot(_))
    }
}

fn grid_mask(p: Vec2, params: &GridParams) -> f32 {
    let g = p * params.scale;
    // zero on a line, 0.5 at the cell corners
    let to_line = (g - g.floor() - Vec2::splat(0.5)).abs();
    let d = to_line.x.min(to_line.y);
    1.0 - smoothstep(params.line_width, params.line_width + params.feather, d)
}

fn hatch_mask(p: Vec2, params: &HatchParams) -> f32 {
    if params.period <= 0.0 {
        return 0.0;
    }
    let (sin, cos) = params.angle.sin_cos();
    let u = p.x * cos + p.y * sin;
    let t = u / params.period;
    let d = (t - t.round()).abs() * params.period;
    let half = 0.5 * params.line_width;
    1.0 - smoothstep(half, half + params.feather, d)
}

fn dot_mask(px: Vec2, params: &DotParams) -> f32 {
    if params.period_px <= 0.0 || params.radius_px <= 0.0 {
        return 0.0;
    }
    let center = ((px / params.period_px).floor() + 0.5) * params.period_px;
    let d = px.distance(center);
    let inner = (params.radius_px - params.aa_px).max(0.0);
    1.0 - smoothstep(inner, params.radius_px + params.aa_px, d)
}

/// `mix(base, tint, shadow_amount * mask * darkness)`.
pub fn grid_tint(base: Vec3, tint: Vec3, shadow_amount: f32, mask: f32, darkness: f32) -> Vec3 {
    let t = (shadow_amount * mask * darkness).clamp(0.0, 1.0);
    base.lerp(tint, t)
}

/// Grayscale halftone value.
///
/// `luma_width` is the screen-space change of luminance across one pixel;
/// it widens the black/white transition so the edge stays anti-aliased.
pub fn halftone(
    luma: f32,
    threshold: f32,
    luma_width: f32,
    pattern: f32,
    ink: f32,
    paper: f32,
) -> f32 {
    let w = luma_width.abs().max(1e-4);
    let black = 1.0 - smoothstep(threshold - w, threshold + w, luma);
    paper + (ink - paper) * (black * pattern)
}

/// Which overlay the floor draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayMode {
    #[default]
    Grid,
    Hatch,
    Dot,
}

impl OverlayMode {
    /// Next mode in Grid, Hatch, Dot order.
    pub fn next(self) -> Self {
        match self {
            Self::Grid => Self::Hatch,
            Self::Hatch => Self::Dot,
            Self::Dot => Self::Grid,
        }
    }

    pub(crate) fn index(self) -> u32 {
        match self {
            Self::Grid => 1,
            Self::Hatch => 2,
            Self::Dot => 3,
        }
    }
}

/// Overlay configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayConfig {
    pub enabled: bool,
    pub mode: OverlayMode,
    /// Grid line color in shadow.
    pub tint: Vec3,
    /// Strength of the grid tint.
    pub darkness: f32,
    pub grid: GridParams,
    pub hatch: HatchParams,
    pub dot: DotParams,
    /// Luminance below which the halftone turns to ink.
    pub threshold: f32,
    pub ink: f32,
    pub paper: f32,
}

impl OverlayConfig {
    pub fn with_mode(mut self, mode: OverlayMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_tint(mut self, tint: Vec3, darkness: f32) -> Self {
        self.tint = tint;
        self.darkness = darkness.clamp(0.0, 1.0);
        self
    }

    pub fn with_grid(mut self, grid: GridParams) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_hatch(mut self, hatch: HatchParams) -> Self {
        self.hatch = hatch;
        self
    }

    pub fn with_dot(mut self, dot: DotParams) -> Self {
        self.dot = dot;
        self
    }

    /// The active pattern.
    pub fn pattern(&self) -> OverlayPattern {
        match self.mode {
            OverlayMode::Grid => OverlayPattern::Grid(self.grid),
            OverlayMode::Hatch => OverlayPattern::Hatch(self.hatch),
            OverlayMode::Dot => OverlayPattern::Dot(self.dot),
        }
    }

    /// Final display color of an overlaid fragment.
    ///
    /// `linear` is the shaded color before gamma, `shadow` the visibility
    /// factor, `world_xz` and `pixel` the pattern coordinates.
    pub fn apply(
        &self,
        linear: Vec3,
        shadow: f32,
        world_xz: Vec2,
        pixel: Vec2,
        luma_width: f32,
    ) -> Vec3 {
        let encoded = super::gamma_encode(linear);
        if !self.enabled {
            return encoded;
        }

        let pattern = self.pattern();
        let coord = if pattern.is_screen_space() {
            pixel
        } else {
            world_xz
        };
        let mask = pattern.mask(coord);

        match self.mode {
            OverlayMode::Grid => super::gamma_encode(grid_tint(
                linear,
                self.tint,
                1.0 - shadow,
                mask,
                self.darkness,
            )),
            OverlayMode::Hatch | OverlayMode::Dot => {
                let luma = super::luminance(encoded);
                Vec3::splat(halftone(
                    luma,
                    self.threshold,
                    luma_width,
                    mask,
                    self.ink,
                    self.paper,
                ))
            }
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: OverlayMode::Grid,
            tint: Vec3::new(0.25, 0.55, 1.0),
            darkness: 0.85,
            grid: GridParams::default(),
            hatch: HatchParams::default(),
            dot: DotParams::default(),
            threshold: 0.3,
            ink: 0.08,
            paper: 0.92,
        }
    }
}
