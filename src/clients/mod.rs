pub mod geocoding;
pub mod geodb;
pub mod llm;
pub mod weather;
