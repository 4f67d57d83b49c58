//! Chained writes across the two partitions of an edge

pub mod client;
pub mod request;

pub use client::InternalStorageClient;
pub use request::{
    make_chain_add_request, make_chain_delete_request, make_chain_update_request, ChainRequest,
    ChainWrite,
};
