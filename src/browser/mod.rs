//! Remote browser access: sessions against a WebDriver endpoint and page
//! navigation within them.
//!
//! The scraping pipeline only talks to the [`Connector`], [`Session`] and
//! [`LoadedPage`] traits; [`WebDriverConnector`] is the production
//! implementation backed by `fantoccini`.

pub mod navigator;
pub mod session;

#[cfg(test)]
pub(crate) mod fake;

pub use navigator::{LoadedPage, WebDriverPage, load};
pub use session::{Connector, Session, WebDriverConnector, WebDriverSession};
