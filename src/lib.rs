//! Weekly sales activity tracker. Representatives log daily calls, emails, contacts and
//! responses, see them measured against configurable goals, and every saved week can be exported
//! into a multi sheet workbook.
//!

pub mod cli;
pub mod error;
pub mod export;
pub mod progress;
pub mod state;
pub mod storage;
pub mod utils;
