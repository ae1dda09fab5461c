mod id;
mod table;


pub use id::{Id, IdError};
pub use table::{TableName, TableNameError};
