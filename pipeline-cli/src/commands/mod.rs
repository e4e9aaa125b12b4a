pub mod accessors;
