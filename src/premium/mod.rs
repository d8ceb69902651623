/*!
 * Premium Module
 * View gating, subscription expiry, and per-view writer compensation
 */
pub mod author;
pub mod compensation;
pub mod gate;
pub mod sweep;

pub use compensation::{PLATFORM_SHARE, VIEW_UNIT_PRICE, WRITER_SHARE};
