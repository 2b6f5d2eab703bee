mod confirm_vm;
mod markdown_vm;
mod quiz_vm;
mod result_vm;
mod time_fmt;

pub use confirm_vm::ConfirmBridge;
pub use markdown_vm::{markdown_to_html, sanitize_html};
pub use quiz_vm::{
    CompletedQuiz, CountdownVm, OptionVm, PickerItemVm, QuestionVm, countdown_vm,
    map_current_question, map_picker, progress_label, unanswered_message,
};
pub use result_vm::{AdviceVm, ResultsVm, ReviewRowVm, map_advice, map_results, map_review_rows};
pub use time_fmt::{format_clock, format_time_spent};
