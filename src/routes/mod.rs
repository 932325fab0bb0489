// One module per resource; each exposes a `router()` merged by `create_app`
pub mod analytics;
pub mod announcements;
pub mod applications;
pub mod companies;
pub mod extract;
pub mod jobs;
pub mod students;
