// handlers/public/mod.rs - Public handlers (no session required)
//
// Landing pages under /auth/* are still gated: a session whose role matches the
// page is redirected to its dashboard before these handlers run.

pub mod landing;
pub mod service;

pub use landing::*;
pub use service::*;
