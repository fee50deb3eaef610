//! Business logic services for the warehouse management backend

pub mod category;
pub mod customer;
pub mod document_number;
pub mod lifecycle;
pub mod product;
pub mod sj;
pub mod spg;
pub mod spk;
pub mod stock;
pub mod supplier;
pub mod surat_lain;
pub mod transfer;
pub mod warehouse;

pub use category::CategoryService;
pub use customer::CustomerService;
pub use product::ProductService;
pub use sj::SjService;
pub use spg::SpgService;
pub use spk::SpkService;
pub use stock::StockService;
pub use supplier::SupplierService;
pub use surat_lain::SuratLainService;
pub use transfer::TransferService;
pub use warehouse::WarehouseService;
