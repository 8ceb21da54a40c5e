pub mod answer;
pub mod completion;
pub mod flashcard;
pub mod history;
pub mod item;
pub mod matcher;
pub mod matching;
pub mod module;
pub mod quiz;
pub mod result;
pub mod score;
pub mod sorting;
pub mod timer;
pub mod undo;
pub mod view;

#[cfg(test)]
pub mod testing;
