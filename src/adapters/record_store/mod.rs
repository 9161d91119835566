mod disabled;
mod memory;

pub use disabled::DisabledRecordStore;
pub use memory::MemoryRecordStore;
