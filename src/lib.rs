//! Discord timestamp rendering: relative phrases that know when they go
//! stale, the absolute `t T d D f F` styles, and `<t:…>` message markup.

pub mod config;
pub mod internal;
pub mod utils;

pub use internal::error::{TimestampError, TimestampResult};
pub use internal::models::{DiscordTimestamp, Rendered, TimestampStyle};
pub use internal::render::TimestampRenderer;
pub use utils::datetime::{RelativeTime, format_relative, format_relative_now};
pub use utils::phrases::{EnglishPhrases, RelativePhrases};
pub use utils::units::{TimeUnit, UnitSpec, UnitTable};
