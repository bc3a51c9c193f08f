mod string;

pub use string::{format_money, format_number_with_separators};
