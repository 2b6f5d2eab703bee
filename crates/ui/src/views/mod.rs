mod advice;
mod assessment;
mod home;
mod login;
mod results;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use advice::AdviceView;
pub use assessment::AssessmentView;
pub use home::HomeView;
pub use login::LoginView;
pub use results::ResultsView;
pub use state::ViewError;
