//! Rendered text fragments and their geometry

/// Axis-aligned rectangle in viewport pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Vertical centre
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// One renderable unit of text on a page
///
/// The handle is opaque to the locator: it is passed back to the collaborator
/// to restyle the fragment or to ask for its bounds, and is never compared.
#[derive(Debug, Clone)]
pub struct TextFragment<H> {
    /// Rendered text content
    pub text: String,
    /// Collaborator handle for styling and geometry
    pub handle: H,
}

impl<H> TextFragment<H> {
    /// Create a new fragment
    pub fn new(text: impl Into<String>, handle: H) -> Self {
        Self {
            text: text.into(),
            handle,
        }
    }
}

/// Visual style applied to matched fragments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightStyle {
    /// Background colour as (r, g, b, alpha)
    pub background: (u8, u8, u8, f32),
    /// Corner radius in pixels
    pub border_radius: f32,
    /// Vertical and horizontal padding in pixels
    pub padding: (f32, f32),
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            background: (255, 235, 59, 0.4),
            border_radius: 3.0,
            padding: (2.0, 1.0),
        }
    }
}

impl HighlightStyle {
    /// CSS `background-color` value
    pub fn css_background(&self) -> String {
        let (r, g, b, a) = self.background;
        format!("rgba({r}, {g}, {b}, {a})")
    }
}
