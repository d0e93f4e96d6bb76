use palette::LinSrgba;

pub const WHITE: LinSrgba = LinSrgba::new(1., 1., 1., 1.);
pub const BLACK: LinSrgba = LinSrgba::new(0., 0., 0., 1.);
pub const TRANSPARENT: LinSrgba = LinSrgba::new(0., 0., 0., 0.);

pub const DEFAULT_TEXT_COLOR: LinSrgba = BLACK;
pub const DEFAULT_WIDGET_BACKGROUND: LinSrgba = LinSrgba::new(0., 0., 1., 1.);

pub const DEFAULT_CHARACTER_SIZE: u32 = 30;
pub const DEFAULT_SHAPE_NUM_VERTICES: u32 = 3;
