//! Domain models for the Warehouse Management Platform

mod document;
mod party;
mod product;
mod sj;
mod spg;
mod spk;
mod surat_lain;
mod transfer;
mod warehouse;

pub use document::*;
pub use party::*;
pub use product::*;
pub use sj::*;
pub use spg::*;
pub use spk::*;
pub use surat_lain::*;
pub use transfer::*;
pub use warehouse::*;
