//! Audit Pro web surface: HTML pages and a JSON view API over one [`audit_view::AuditSession`].

mod error;
mod html;
mod pages;
pub mod server;
