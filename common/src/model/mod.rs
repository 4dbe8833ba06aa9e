pub mod card;
pub mod company;
pub mod field;
pub mod form;
pub mod ocr;
pub mod submission;
pub mod template;
