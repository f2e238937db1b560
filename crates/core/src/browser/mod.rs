//! Browser automation capability.
//!
//! Pipelines drive a real browser through [`BrowserSession`] primitives:
//! navigate, wait for an element, type, press enter, click, read text. The
//! production implementation is [`WebDriverBrowser`], a W3C WebDriver HTTP
//! client that works against chromedriver or geckodriver.

mod config;
mod error;
mod guard;
mod traits;
mod webdriver;

pub use config::BrowserConfig;
pub use error::BrowserError;
pub use guard::SessionGuard;
pub use traits::{BrowserDriver, BrowserSession, ElementRef};
pub use webdriver::WebDriverBrowser;
