//! Catalog client: turns a query into sound records scraped from the
//! provider's results page.

mod client;
mod parse;

pub use client::{Catalog, HttpCatalog, build_http_client};

#[cfg(test)]
mod tests;
