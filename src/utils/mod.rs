//! Miscellaneous components used in the library.

mod name_table;
pub use name_table::NameTable;
