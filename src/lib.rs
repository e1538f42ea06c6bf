pub mod assemble;
pub mod extract;
pub mod fetch;
pub mod fields;
pub mod normalize;
pub mod output;
pub mod pipeline;
