pub mod id;
pub mod model;
pub mod section;
pub mod sections;
pub mod validate;
