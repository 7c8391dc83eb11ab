//! Categories: labels for transactions that say whether money came in or went
//! out.

mod core;
mod endpoints;

pub use core::{
    Category, CategoryKind, CategoryPatch, NewCategory, create_category, create_category_table,
    delete_category, get_all_categories, get_category, map_category_row_with_offset,
    update_category,
};
pub use endpoints::{
    create_category_endpoint, delete_category_endpoint, edit_category_endpoint,
    get_categories_endpoint,
};
