//! HTTP handlers for the warehouse management API

pub mod category;
pub mod customer;
pub mod product;
pub mod sj;
pub mod spg;
pub mod spk;
pub mod stock;
pub mod supplier;
pub mod surat_lain;
pub mod transfer;
pub mod warehouse;

pub use category::*;
pub use customer::*;
pub use product::*;
pub use sj::*;
pub use spg::*;
pub use spk::*;
pub use stock::*;
pub use supplier::*;
pub use surat_lain::*;
pub use transfer::*;
pub use warehouse::*;

use serde::Deserialize;
use shared::types::ViewFilter;

/// Common `?view=` query parameter for soft-deletable listings
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub view: Option<String>,
}

impl ViewQuery {
    pub fn filter(&self) -> ViewFilter {
        ViewFilter::from_param(self.view.as_deref())
    }
}
