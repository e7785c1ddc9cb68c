pub mod cms;
pub mod commerce;
pub mod content;
pub mod page_type;
pub mod setting;
