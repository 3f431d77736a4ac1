// Analysis module - classification seam for the laugh round
//
// - classifier: opaque ClassifierService / ClassifierLoader traits and
//   ordered endpoint fallback
// - laughter: lexicon that turns scored categories into a per-tick
//   laughter probability

pub mod classifier;
pub mod laughter;

pub use classifier::{
    connect_first, Category, ClassifierLoader, ClassifierService, ConnectedClassifier,
};
pub use laughter::LaughterLexicon;
