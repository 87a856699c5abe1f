use crate::geometry::{AbsRect, IntVec};

/// Startup settings for a [`Root`](super::Root).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RootConfig {
    /// Window area in pixels.
    pub area: AbsRect,
    pub dpi: IntVec,
    pub line_height: f32,
    pub font_scale: f32,
    /// Caret blink period in seconds.
    pub cursor_blink: f64,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            area: AbsRect::new(0.0, 0.0, 800.0, 600.0),
            dpi: IntVec::new(96, 96),
            line_height: 30.0,
            font_scale: 1.0,
            cursor_blink: 0.53,
        }
    }
}

impl RootConfig {
    pub fn with_area(mut self, width: f32, height: f32) -> Self {
        self.area = AbsRect::new(0.0, 0.0, width, height);
        self
    }

    pub fn with_dpi(mut self, dpi: i32) -> Self {
        self.dpi = IntVec::splat(dpi);
        self
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::RootConfig;
    use crate::element::ElementFlags;
    use crate::geometry::Geometry;
    use crate::render::{AssetId, FontId};

    fn serializable<T: serde::Serialize + serde::de::DeserializeOwned>() {}

    #[test]
    fn value_types_implement_serde() {
        serializable::<RootConfig>();
        serializable::<ElementFlags>();
        serializable::<Geometry>();
        serializable::<AssetId>();
        serializable::<FontId>();
    }
}
