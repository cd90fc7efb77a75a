//! Packager implementations.
//!
//! Each supported package-management tool gets one module implementing the
//! [`Packager`](crate::traits::Packager) trait. Currently:
//! - `pnpm` - the pnpm CLI adapter

pub mod pnpm;

pub use pnpm::Pnpm;
