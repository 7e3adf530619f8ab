pub mod bundle;
pub mod graphviz;
pub mod permalink;
pub mod rdf;
