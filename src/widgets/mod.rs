pub mod connection_table;
pub mod filter_bar;
pub mod lookup_popup;

pub use self::connection_table::ConnectionTableWidget;
pub use self::filter_bar::{FilterBarWidget, SearchEdit};
pub use self::lookup_popup::LookupPopupWidget;
