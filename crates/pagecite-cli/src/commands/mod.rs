//! Command implementations.

pub mod ask;
pub mod health;
pub mod locate;
pub mod profile;
pub mod reset;
pub mod upload;
pub mod viewer;

pub use self::ask::{execute_ask, stream_answer};
pub use self::health::execute_health;
pub use self::locate::execute_locate;
pub use self::profile::execute_profile;
pub use self::reset::execute_reset;
pub use self::upload::execute_upload;
pub use self::viewer::{open_citation, show_page, PageDisplay, RenderedPage};
