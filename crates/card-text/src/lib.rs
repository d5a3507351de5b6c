//! Card Text - text layout for card templates
//!
//! This crate provides:
//! - The anchor grid used to position fields (`la`, `mt`, `rb`, ...)
//! - Character-granularity line wrapping (works for scripts without spaces)
//! - Width measurement with custom letter spacing
//! - Block geometry: per-line origins and the anchored bounding box
//!
//! Nothing here knows about fonts. Every function takes a `measure` closure
//! returning the advance width of a string, so the same geometry can be
//! computed against a real font, a canvas context, or a fixed-width fake.
//!
//! # Example
//!
//! ```
//! use card_text::{layout_block, Anchor, TextStyle};
//!
//! let style = TextStyle::new(20.0).with_anchor(Anchor::MM);
//! let measure = |s: &str| s.chars().count() as f32 * 10.0;
//! let block = layout_block("Hello", (100.0, 50.0), &style, 16.0, measure);
//!
//! assert_eq!(block.width, 50.0);
//! assert_eq!(block.x, 75.0);
//! assert_eq!(block.y, 40.0);
//! ```

mod anchor;
mod layout;
mod wrap;

pub use anchor::{Anchor, HAlign, ParseAnchorError, VAlign};
pub use layout::{block_height, layout_block, BlockLayout, LineLayout, TextStyle};
pub use wrap::{measure_with_spacing, wrap_text};
