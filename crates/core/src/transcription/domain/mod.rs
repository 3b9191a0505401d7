pub mod recognition_outcome;
pub mod segment_recognizer;
pub mod speech_recognizer;
