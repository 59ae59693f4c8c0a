pub mod add;
pub mod delete;
pub mod edit;
pub mod expenses;
pub mod list;
pub mod process;
