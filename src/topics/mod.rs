// Topic extraction: text cleaning, phrase mining, vectorization and LDA.

pub mod format;
pub mod lda;
pub mod merge;
pub mod normalize;
pub mod phrases;
pub mod pipeline;
pub mod tokenize;
pub mod traits;
pub mod vectorize;

pub use format::{Topic, TopicSummary, TopicTerm};
pub use pipeline::{PipelineConfig, TopicPipeline};
