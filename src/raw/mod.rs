mod arena;
mod handle;
mod raw_bst_map;
mod raw_chain_map;

pub(crate) use handle::Handle;
pub(crate) use raw_bst_map::{RawBstMap, Spine};
pub(crate) use raw_chain_map::RawChainMap;
