pub mod spec;
pub mod view;

pub use spec::{ExportSpec, Import, NormalizedExports, Visibility};
pub use view::{Access, ExportView};
