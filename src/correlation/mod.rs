mod component_index;
mod table;

pub use component_index::ComponentIndex;
pub use table::{CorrelationEntry, EntityCorrelationTable};
