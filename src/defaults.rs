//! Format constants shared by the parser, serializer and raw codec.

/// Digits of the base used for modifier parameters.
pub const BASE10_DIGITS: &str = "0123456789";

/// Digits of the base used for stroke data. Lowercase only.
pub const BASE36_DIGITS: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

/// Digits per coordinate in `Brush`, `Pencil` and `Data` strokes (signed).
pub const COORD_WIDTH: usize = 3;

/// Digits per coordinate in `Raw` elements and the raw format (unsigned).
pub const RAW_COORD_WIDTH: usize = 2;

/// Digits per pressure sample in `Brush` strokes (unsigned).
pub const PRESSURE_WIDTH: usize = 2;

/// Digits of a `Brush` stroke diameter (unsigned).
pub const DIAMETER_WIDTH: usize = 2;

/// Largest encodable pressure sample, `36^2 - 1`. Pressure `1.0` maps here.
pub const PRESSURE_SCALE: f32 = (36 * 36 - 1) as f32;

/// Largest `Array` count a document may hold.
pub const MAX_ARRAY_COUNT: usize = u16::MAX as usize;

/// Diameter strokes without one are drawn with.
pub const FLAT_DIAMETER: u32 = 3;

/// Separator allowed between points of a stroke digit run.
pub const TICK: char = '\'';
